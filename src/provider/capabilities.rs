//! Seam to the surrounding wallet: account listing, transaction processing,
//! and the client version string. The pipeline holds the implementation by
//! reference for its lifetime and never inspects what the wallet does inside
//! these operations.

use anyhow::Result;
use futures::future::BoxFuture;
use serde_json::Value;

/// Operations the wallet exposes to the provider pipeline.
///
/// `process_transaction` receives the raw `eth_sendTransaction` params and is
/// fully responsible for gas, nonce, and signing; this layer only routes.
pub trait WalletCapabilities: Send + Sync {
    /// Addresses currently exposed by the account-management subsystem.
    fn get_accounts(&self) -> BoxFuture<'_, Result<Vec<String>>>;

    /// Hands transaction params to the wallet's transaction pipeline and
    /// returns whatever it resolves to (typically a transaction hash).
    fn process_transaction(&self, params: Value) -> BoxFuture<'_, Result<Value>>;

    /// Version string advertised through `web3_clientVersion`.
    fn client_version(&self) -> &str;
}

//! JSON-RPC transport plumbing: envelope types, retry policy, metrics, and
//! the retrying HTTP client.

pub mod helpers;
pub mod metrics;
pub mod options;
pub mod payload;
pub(crate) mod retry;
pub mod transport;

pub use helpers::{format_quantity, parse_quantity};
pub use metrics::TransportMetricsSnapshot;
pub use options::TransportOptions;
pub use payload::{RpcErrorObject, RpcRequest, RpcResponse};
pub use transport::{RetryingTransport, TransportError};

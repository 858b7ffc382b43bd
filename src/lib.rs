pub mod controller;
pub mod network;
pub mod provider;
pub mod rpc;
pub mod telemetry;

pub use controller::{ControllerError, NetworkController};
pub use network::{NetworkConfig, NetworkConfigRegistry, NetworkKind, UnknownNetworkError};
pub use provider::{
    BlockPoller, LatestBlock, Provider, ProviderFactory, ProviderSettings, WalletCapabilities,
};
pub use rpc::{
    RetryingTransport, RpcErrorObject, RpcRequest, RpcResponse, TransportError,
    TransportMetricsSnapshot, TransportOptions,
};
pub use telemetry::init_tracing;

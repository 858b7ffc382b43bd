//! Network identity: static chain metadata and endpoint resolution.

pub mod config;
pub mod registry;

pub use config::{NetworkConfig, NetworkKind, INFURA_ENDPOINT_TEMPLATE};
pub use registry::{NetworkConfigRegistry, UnknownNetworkError};

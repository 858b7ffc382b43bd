//! Provider pipeline: interception stages, block polling, and the factory
//! composing them for one network.

pub mod capabilities;
pub mod interceptor;
pub mod pipeline;
pub mod poller;
pub mod settings;

pub use capabilities::WalletCapabilities;
pub use interceptor::StaticMethodInterceptor;
pub use pipeline::{Provider, ProviderFactory};
pub use poller::{BlockPoller, LatestBlock};
pub use settings::{ProviderSettings, ProviderSettingsBuilder};

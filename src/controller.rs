//! Owns the currently active (network, pipeline, poller) triple and drives
//! network switches and teardown. Exactly one triple is active at a time;
//! switching builds the replacement before the previous pair is stopped, so
//! racing callers observe either the old or the new pipeline, never neither.

use crate::network::{NetworkConfig, NetworkConfigRegistry};
use crate::provider::pipeline::{Provider, ProviderFactory};
use crate::provider::poller::BlockPoller;
use crate::rpc::payload::{RpcRequest, RpcResponse};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug)]
pub enum ControllerError {
    /// Any `submit`/`set_network` after `destroy()`.
    Destroyed,
    /// `submit` before the first `set_network`.
    NoActiveNetwork,
}

impl std::fmt::Display for ControllerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControllerError::Destroyed => write!(f, "provider controller has been destroyed"),
            ControllerError::NoActiveNetwork => {
                write!(f, "provider controller has no active network")
            }
        }
    }
}

impl std::error::Error for ControllerError {}

struct ActivePipeline {
    network: NetworkConfig,
    provider: Arc<Provider>,
    poller: BlockPoller,
}

enum ControllerState {
    Uninitialized,
    Active(ActivePipeline),
    Destroyed,
}

/// Lifecycle owner for the provider pipeline.
///
/// State machine: `Uninitialized → Active(network)* → Destroyed`. The state
/// lock is only held to inspect or swap the triple; request execution and
/// poller shutdown happen outside it, so long-running calls never block a
/// concurrent switch.
pub struct NetworkController {
    registry: NetworkConfigRegistry,
    factory: ProviderFactory,
    state: Mutex<ControllerState>,
}

impl NetworkController {
    pub fn new(registry: NetworkConfigRegistry, factory: ProviderFactory) -> Self {
        Self {
            registry,
            factory,
            state: Mutex::new(ControllerState::Uninitialized),
        }
    }

    /// Network config of the active pipeline, if any.
    pub async fn active_network(&self) -> Option<NetworkConfig> {
        match &*self.state.lock().await {
            ControllerState::Active(active) => Some(active.network.clone()),
            _ => None,
        }
    }

    /// Activates `name`: resolves it against the registry, builds and starts
    /// a fresh pipeline/poller pair, then swaps it in and stops the previous
    /// pair. Fails with `UnknownNetworkError` on unmapped names (leaving any
    /// active pipeline untouched) and `ControllerError::Destroyed` after
    /// `destroy()`.
    pub async fn set_network(&self, name: &str) -> Result<()> {
        if matches!(&*self.state.lock().await, ControllerState::Destroyed) {
            return Err(ControllerError::Destroyed.into());
        }

        let network = self.registry.resolve(name)?;
        let (provider, mut poller) = self.factory.build(network.clone())?;
        poller.start();

        let replacement = ActivePipeline {
            network: network.clone(),
            provider: Arc::new(provider),
            poller,
        };

        let previous = {
            let mut state = self.state.lock().await;
            if matches!(&*state, ControllerState::Destroyed) {
                // Destroyed while the new pair was being built; unwind it.
                drop(state);
                let ActivePipeline { mut poller, .. } = replacement;
                poller.stop().await;
                return Err(ControllerError::Destroyed.into());
            }
            std::mem::replace(&mut *state, ControllerState::Active(replacement))
        };

        if let ControllerState::Active(mut old) = previous {
            old.poller.stop().await;
            tracing::info!(
                from = %old.network.name(),
                to = %network.name(),
                "switched active network"
            );
        } else {
            tracing::info!(network = %network.name(), "activated network");
        }

        Ok(())
    }

    /// Submits a request to the active pipeline.
    pub async fn submit(&self, request: RpcRequest) -> Result<RpcResponse> {
        let provider = {
            match &*self.state.lock().await {
                ControllerState::Active(active) => active.provider.clone(),
                ControllerState::Uninitialized => {
                    return Err(ControllerError::NoActiveNetwork.into())
                }
                ControllerState::Destroyed => return Err(ControllerError::Destroyed.into()),
            }
        };

        provider.submit(request).await
    }

    /// Tears down the active pipeline and rejects all further use. Idempotent.
    pub async fn destroy(&self) {
        let previous = {
            let mut state = self.state.lock().await;
            std::mem::replace(&mut *state, ControllerState::Destroyed)
        };

        if let ControllerState::Active(mut active) = previous {
            active.poller.stop().await;
            tracing::info!(network = %active.network.name(), "controller destroyed");
        }
    }
}

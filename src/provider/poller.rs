//! Background refresh of the chain's latest block number, shared with the
//! pipeline's cache stage so callers get current height without issuing their
//! own polling calls.

use crate::rpc::helpers::parse_quantity;
use crate::rpc::payload::RpcRequest;
use crate::rpc::transport::RetryingTransport;
use serde_json::json;
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Latest observed block height. Single writer (the poller's own tick),
/// multiple readers; readers see the most recently committed value.
#[derive(Debug, Default)]
pub struct LatestBlock {
    value: AtomicU64,
    ready: AtomicBool,
}

impl LatestBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, height: u64) {
        self.value.store(height, Ordering::SeqCst);
        self.ready.store(true, Ordering::SeqCst);
    }

    /// `None` until the first successful probe commits a value.
    pub fn current(&self) -> Option<u64> {
        if self.ready.load(Ordering::SeqCst) {
            Some(self.value.load(Ordering::SeqCst))
        } else {
            None
        }
    }
}

/// Timer-driven loop refreshing [`LatestBlock`] through the transport. An
/// immediate probe runs on `start()`, then one per interval until `stop()`.
/// Failed ticks (including ticks whose transport retries were exhausted) are
/// logged and the loop keeps going.
pub struct BlockPoller {
    transport: Arc<RetryingTransport>,
    latest: Arc<LatestBlock>,
    poll_interval: Duration,
    shutdown: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl BlockPoller {
    pub fn new(
        transport: Arc<RetryingTransport>,
        latest: Arc<LatestBlock>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            transport,
            latest,
            poll_interval,
            shutdown: CancellationToken::new(),
            handle: None,
        }
    }

    /// Most recently committed block height, if any probe has succeeded.
    pub fn latest(&self) -> Option<u64> {
        self.latest.current()
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Spawns the refresh loop. Calling `start` on a running poller is a
    /// no-op.
    pub fn start(&mut self) {
        if self.handle.is_some() {
            return;
        }

        let transport = self.transport.clone();
        let latest = self.latest.clone();
        let shutdown = self.shutdown.clone();
        let poll_interval = self.poll_interval;

        self.handle = Some(tokio::spawn(async move {
            let mut ticker = interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut probe_id: u64 = 0;

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                probe_id += 1;
                let request = RpcRequest::new(json!(probe_id), "eth_blockNumber", json!([]));

                // The probe itself races the token too, so cancellation drops
                // an in-flight call instead of waiting out its retry budget.
                let outcome = tokio::select! {
                    _ = shutdown.cancelled() => break,
                    outcome = transport.call(&request) => outcome,
                };

                match outcome {
                    Ok(response) => match response.result.as_ref().and_then(|v| v.as_str()) {
                        Some(quantity) => match parse_quantity(quantity) {
                            Ok(height) => {
                                latest.update(height);
                                tracing::debug!(height, "refreshed latest block number");
                            }
                            Err(err) => {
                                tracing::warn!(error = %err, "latest block probe returned bad quantity");
                            }
                        },
                        None => {
                            tracing::warn!(?response.error, "latest block probe returned no result");
                        }
                    },
                    Err(err) => {
                        tracing::warn!(error = %err, "failed to refresh latest block number");
                    }
                }
            }

            tracing::info!("block poller stopped");
        }));
    }

    /// Cancels the loop and waits for it to wind down. Idempotent; any probe
    /// in flight at cancellation is dropped and never reschedules a tick.
    pub async fn stop(&mut self) {
        self.shutdown.cancel();

        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                tracing::warn!(error = %err, "block poller task panicked");
            }
        }
    }
}

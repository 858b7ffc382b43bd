//! Retrying JSON-RPC transport. Executes one call at a time against a fixed
//! endpoint, classifying each attempt and retrying transient failures until
//! the budget is exhausted. Callers see either a resolved envelope or one of
//! the `TransportError` kinds; retries are invisible except as latency.

use crate::rpc::metrics::{TransportMetrics, TransportMetricsSnapshot};
use crate::rpc::options::TransportOptions;
use crate::rpc::payload::{RpcRequest, RpcResponse};
use crate::rpc::retry::{backoff_delay, classify_reply, classify_send_error, AttemptOutcome};
use anyhow::{anyhow, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};

#[derive(Debug)]
pub enum TransportError {
    MethodNotAvailable,
    RateLimited,
    RetriesExhausted,
    /// The request could not be constructed at all; retrying cannot help.
    MalformedRequest(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::MethodNotAvailable => {
                write!(f, "The method does not exist / is not available.")
            }
            TransportError::RateLimited => write!(f, "Request is being rate limited."),
            TransportError::RetriesExhausted => write!(
                f,
                "InfuraProvider - cannot complete request. All retries exhausted."
            ),
            TransportError::MalformedRequest(detail) => {
                write!(f, "request could not be constructed: {detail}")
            }
        }
    }
}

impl std::error::Error for TransportError {}

/// HTTP JSON-RPC client bound to one endpoint URL, with retry/backoff applied
/// per call. Each in-flight call carries its own attempt counter, so multiple
/// requests may be outstanding concurrently.
#[derive(Debug, Clone)]
pub struct RetryingTransport {
    endpoint: Arc<String>,
    client: reqwest::Client,
    options: TransportOptions,
    metrics: Arc<TransportMetrics>,
}

impl RetryingTransport {
    pub fn new(endpoint: impl Into<String>, options: TransportOptions) -> Result<Self> {
        options.validate()?;

        let client = reqwest::Client::builder()
            .timeout(options.request_timeout)
            .build()
            .map_err(|err| anyhow!("failed to build HTTP client: {err}"))?;

        Ok(Self {
            endpoint: Arc::new(endpoint.into()),
            client,
            options,
            metrics: Arc::new(TransportMetrics::default()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn metrics(&self) -> TransportMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Executes one JSON-RPC call, retrying transient failures with backoff.
    pub async fn call(&self, request: &RpcRequest) -> Result<RpcResponse> {
        let mut attempt = 0;

        loop {
            attempt += 1;
            let start = Instant::now();

            match self.attempt_once(request).await {
                AttemptOutcome::Resolved(response) => {
                    self.metrics.record_success(start.elapsed());
                    tracing::trace!(method = %request.method, attempt, "rpc call resolved");
                    return Ok(response);
                }
                AttemptOutcome::Terminal(err) => {
                    self.metrics.record_failure(start.elapsed());
                    tracing::warn!(
                        method = %request.method,
                        attempt,
                        error = %err,
                        "rpc call failed terminally"
                    );
                    return Err(err.into());
                }
                AttemptOutcome::Retry { reason } => {
                    if attempt >= self.options.max_attempts {
                        self.metrics.record_failure(start.elapsed());
                        tracing::error!(
                            method = %request.method,
                            attempt,
                            reason,
                            "rpc call exhausted retries"
                        );
                        return Err(TransportError::RetriesExhausted.into());
                    }

                    self.metrics.record_retry(start.elapsed());
                    let backoff = backoff_delay(&self.options, attempt);
                    tracing::warn!(
                        method = %request.method,
                        attempt,
                        backoff_ms = duration_to_millis(backoff),
                        reason,
                        "rpc call failed; retrying"
                    );
                    sleep(backoff).await;
                }
            }
        }
    }

    async fn attempt_once(&self, request: &RpcRequest) -> AttemptOutcome {
        let reply = self
            .client
            .post(self.endpoint.as_str())
            .json(request)
            .send()
            .await;

        let response = match reply {
            Ok(response) => response,
            Err(err) => return classify_send_error(&err),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                return AttemptOutcome::Retry {
                    reason: format!("failed to read response body: {err}"),
                }
            }
        };

        classify_reply(status, &body, &request.id)
    }
}

fn duration_to_millis(duration: Duration) -> u64 {
    duration.as_millis().min(u128::from(u64::MAX)) as u64
}

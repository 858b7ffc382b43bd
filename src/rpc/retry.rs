//! Retry policy: pure classification of a single attempt's outcome plus the
//! backoff schedule. Keeping this free of I/O lets the taxonomy be tested
//! without a socket.

use crate::rpc::options::TransportOptions;
use crate::rpc::payload::RpcResponse;
use crate::rpc::transport::TransportError;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

/// Raw body Infura-style backends return with a 2xx status when the requested
/// block does not exist. Treated as a successful call with a null result.
const NOT_FOUND_BODY: &str = "Not Found";

/// Classification of one outbound attempt.
#[derive(Debug)]
pub(crate) enum AttemptOutcome {
    /// The call resolved; the envelope (result or JSON-RPC error) is passed
    /// through to the caller unchanged.
    Resolved(RpcResponse),
    /// Transient failure; retry after backoff if budget remains.
    Retry { reason: String },
    /// Permanent failure; surfaced immediately, bypassing the budget.
    Terminal(TransportError),
}

/// Classifies an HTTP reply (status + raw body) for the request with `id`.
pub(crate) fn classify_reply(status: StatusCode, body: &str, id: &Value) -> AttemptOutcome {
    match status.as_u16() {
        405 => AttemptOutcome::Terminal(TransportError::MethodNotAvailable),
        429 => AttemptOutcome::Terminal(TransportError::RateLimited),
        503 | 504 => AttemptOutcome::Retry {
            reason: format!("upstream unavailable (HTTP {})", status.as_u16()),
        },
        _ => {
            if status.is_success() && body == NOT_FOUND_BODY {
                return AttemptOutcome::Resolved(RpcResponse::result(id.clone(), Value::Null));
            }
            match RpcResponse::parse(body) {
                Ok(envelope) => AttemptOutcome::Resolved(envelope),
                Err(err) => AttemptOutcome::Retry {
                    reason: format!(
                        "malformed JSON-RPC body (HTTP {}): {err}",
                        status.as_u16()
                    ),
                },
            }
        }
    }
}

/// Classifies a request that never produced an HTTP reply. Timeouts and
/// connection resets are transient; a request that cannot even be built is
/// deterministic and fails without burning the budget.
pub(crate) fn classify_send_error(err: &reqwest::Error) -> AttemptOutcome {
    if err.is_builder() {
        return AttemptOutcome::Terminal(TransportError::MalformedRequest(err.to_string()));
    }

    let reason = if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        format!("transport error: {err}")
    };
    AttemptOutcome::Retry { reason }
}

/// Capped exponential backoff: `initial`, then doubling each attempt up to
/// `max_backoff`.
pub(crate) fn backoff_delay(options: &TransportOptions, attempt: usize) -> Duration {
    if attempt <= 1 {
        return options.initial_backoff;
    }

    let exponent = attempt.saturating_sub(1) as u32;
    let multiplier = 1u32.checked_shl(exponent).unwrap_or(u32::MAX);
    let mut delay = options.initial_backoff.saturating_mul(multiplier);

    if delay > options.max_backoff {
        delay = options.max_backoff;
    }

    delay
}

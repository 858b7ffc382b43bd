use std::{
    collections::{HashMap, VecDeque},
    convert::Infallible,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use anyhow::{Context, Result};
use hyper::service::{make_service_fn, service_fn};
use hyper::{body, Body, Method, Request, Response, Server, StatusCode};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// One pre-scripted HTTP reply consumed in FIFO order ahead of the default
/// JSON-RPC answering path.
#[derive(Clone)]
struct Scripted {
    status: u16,
    body: String,
    delay: Option<Duration>,
}

/// Shared state behind the mock endpoint: a script queue, per-method request
/// counters, and the block height reported by `eth_blockNumber`.
#[derive(Clone)]
pub struct MockBackend {
    scripted: Arc<Mutex<VecDeque<Scripted>>>,
    counts: Arc<Mutex<HashMap<String, u64>>>,
    total: Arc<AtomicU64>,
    height: Arc<AtomicU64>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            scripted: Arc::new(Mutex::new(VecDeque::new())),
            counts: Arc::new(Mutex::new(HashMap::new())),
            total: Arc::new(AtomicU64::new(0)),
            height: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Queues a raw reply returned for the next request regardless of method.
    pub fn script(&self, status: u16, body: impl Into<String>) {
        self.scripted
            .lock()
            .expect("mock script queue poisoned")
            .push_back(Scripted {
                status,
                body: body.into(),
                delay: None,
            });
    }

    /// Queues a reply that is written only after `delay`, for timeout tests.
    pub fn script_delayed(&self, status: u16, body: impl Into<String>, delay: Duration) {
        self.scripted
            .lock()
            .expect("mock script queue poisoned")
            .push_back(Scripted {
                status,
                body: body.into(),
                delay: Some(delay),
            });
    }

    /// Queues a well-formed success envelope.
    pub fn script_result(&self, result: Value) {
        self.script(
            200,
            json!({"jsonrpc": "2.0", "id": 1, "result": result}).to_string(),
        );
    }

    pub fn set_height(&self, height: u64) {
        self.height.store(height, Ordering::SeqCst);
    }

    pub fn requests_total(&self) -> u64 {
        self.total.load(Ordering::SeqCst)
    }

    pub fn requests_for(&self, method: &str) -> u64 {
        self.counts
            .lock()
            .expect("mock counters poisoned")
            .get(method)
            .copied()
            .unwrap_or(0)
    }

    fn record(&self, method: &str) {
        self.total.fetch_add(1, Ordering::SeqCst);
        *self
            .counts
            .lock()
            .expect("mock counters poisoned")
            .entry(method.to_owned())
            .or_insert(0) += 1;
    }

    fn pop_script(&self) -> Option<Scripted> {
        self.scripted
            .lock()
            .expect("mock script queue poisoned")
            .pop_front()
    }
}

pub struct MockRpcServer {
    url: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl MockRpcServer {
    pub async fn start(backend: MockBackend) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind mock RPC listener")?;
        let addr = listener
            .local_addr()
            .context("failed to read mock listener address")?;
        let std_listener = listener
            .into_std()
            .context("failed to convert mock listener")?;
        std_listener
            .set_nonblocking(true)
            .context("failed to set mock listener non-blocking")?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let make_service = make_service_fn(move |_| {
            let backend = backend.clone();
            async move {
                Ok::<_, Infallible>(service_fn(move |req| serve_request(backend.clone(), req)))
            }
        });

        let server = Server::from_tcp(std_listener)
            .context("failed to build mock HTTP server")?
            .serve(make_service);
        let graceful = server.with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        });

        let handle = tokio::spawn(async move {
            if let Err(err) = graceful.await {
                eprintln!("mock RPC server stopped: {err}");
            }
        });

        Ok(Self {
            url: format!("http://{}", addr),
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

/// Raw TCP endpoint that accepts and immediately drops its first `resets`
/// connections, then answers every later one with a fixed JSON-RPC success
/// envelope. Exercises the connection-reset path the hyper server cannot.
pub struct FlakyTcpServer {
    url: String,
    handle: JoinHandle<()>,
}

impl FlakyTcpServer {
    pub async fn start(resets: usize, result: Value) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind flaky TCP listener")?;
        let addr = listener
            .local_addr()
            .context("failed to read flaky listener address")?;
        let body = json!({"jsonrpc": "2.0", "id": 1, "result": result}).to_string();

        let handle = tokio::spawn(async move {
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let mut remaining = resets;

            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                if remaining > 0 {
                    remaining -= 1;
                    drop(stream);
                    continue;
                }
                answer_raw(stream, response.as_bytes()).await;
            }
        });

        Ok(Self {
            url: format!("http://{}", addr),
            handle,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }
}

/// Reads one full HTTP request off `stream`, then writes `response` and
/// closes the connection.
async fn answer_raw(mut stream: TcpStream, response: &[u8]) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        match stream.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if request_complete(&buf) {
                    break;
                }
            }
            Err(_) => return,
        }
    }

    let _ = stream.write_all(response).await;
    let _ = stream.shutdown().await;
}

fn request_complete(buf: &[u8]) -> bool {
    let Some(split) = buf.windows(4).position(|window| window == b"\r\n\r\n") else {
        return false;
    };
    let headers = String::from_utf8_lossy(&buf[..split]);
    let content_length = headers
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.eq_ignore_ascii_case("content-length") {
                value.trim().parse::<usize>().ok()
            } else {
                None
            }
        })
        .unwrap_or(0);
    buf.len() >= split + 4 + content_length
}

async fn serve_request(
    backend: MockBackend,
    req: Request<Body>,
) -> Result<Response<Body>, Infallible> {
    if req.method() != Method::POST {
        let mut response = Response::new(Body::from("Unsupported method"));
        *response.status_mut() = StatusCode::METHOD_NOT_ALLOWED;
        return Ok(response);
    }

    let bytes = match body::to_bytes(req.into_body()).await {
        Ok(bytes) => bytes,
        Err(err) => {
            let mut response = Response::new(Body::from(format!("failed to read body: {err}")));
            *response.status_mut() = StatusCode::BAD_REQUEST;
            return Ok(response);
        }
    };

    let payload: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    let method = payload
        .get("method")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    backend.record(&method);

    if let Some(scripted) = backend.pop_script() {
        if let Some(delay) = scripted.delay {
            tokio::time::sleep(delay).await;
        }
        let mut response = Response::new(Body::from(scripted.body));
        *response.status_mut() =
            StatusCode::from_u16(scripted.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return Ok(response);
    }

    let id = payload.get("id").cloned().unwrap_or(Value::Null);
    let result = match method.as_str() {
        "eth_blockNumber" => {
            json!(format!("{:#x}", backend.height.load(Ordering::SeqCst)))
        }
        _ => json!("0x1"),
    };

    let envelope = json!({
        "jsonrpc": "2.0",
        "result": result,
        "id": id,
    });

    let mut response = Response::new(Body::from(envelope.to_string()));
    response.headers_mut().insert(
        hyper::header::CONTENT_TYPE,
        hyper::header::HeaderValue::from_static("application/json"),
    );
    Ok(response)
}

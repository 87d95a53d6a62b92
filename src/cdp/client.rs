//! CDP WebSocket client and shared command wire.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::stream::SplitStream;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, trace, warn};

use super::error::CdpError;
use super::page::Page;
use super::protocol::{BrowserVersion, CdpMessage, CdpRequest, TargetSummary};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = futures::stream::SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared command channel over one browser WebSocket.
///
/// Owned jointly by the client and every attached [`Page`]; commands
/// from all of them are multiplexed by request id.
pub(crate) struct Wire {
    ws_tx: tokio::sync::Mutex<WsSink>,
    pending: Mutex<HashMap<u64, oneshot::Sender<Result<Value, CdpError>>>>,
    next_id: AtomicU64,
}

impl Wire {
    /// Send a command, optionally scoped to a target session, and wait
    /// for the matching response.
    pub(crate) async fn call(
        &self,
        method: &str,
        params: Option<Value>,
        session_id: Option<&str>,
    ) -> Result<Value, CdpError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = CdpRequest {
            id,
            method: method.to_string(),
            params,
            session_id: session_id.map(|s| s.to_string()),
        };

        let text = serde_json::to_string(&request)?;
        trace!("CDP send: {}", text);

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);

        {
            let mut ws = self.ws_tx.lock().await;
            if let Err(e) = ws.send(Message::Text(text.into())).await {
                self.pending.lock().remove(&id);
                return Err(e.into());
            }
        }

        match tokio::time::timeout(COMMAND_TIMEOUT, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(CdpError::TargetClosed),
            Err(_) => {
                self.pending.lock().remove(&id);
                Err(CdpError::Timeout(format!("Request {} timed out", method)))
            }
        }
    }

    /// Route incoming messages to their pending callers until the
    /// socket closes. Events are traced and dropped: every operation
    /// in this crate polls rather than subscribes.
    async fn receive_loop(self: Arc<Self>, mut ws_source: WsSource) {
        while let Some(msg) = ws_source.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    trace!("CDP recv: {}", text);
                    match serde_json::from_str::<CdpMessage>(&text) {
                        Ok(message) => {
                            if let Some(id) = message.id {
                                if let Some(tx) = self.pending.lock().remove(&id) {
                                    let result = match message.error {
                                        Some(e) => Err(CdpError::Protocol {
                                            code: e.code,
                                            message: e.message,
                                        }),
                                        None => Ok(message.result.unwrap_or(Value::Null)),
                                    };
                                    let _ = tx.send(result);
                                }
                            } else if let Some(method) = message.method {
                                trace!("CDP event: {}", method);
                            }
                        }
                        Err(e) => warn!("Unparseable CDP message: {}", e),
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("CDP WebSocket closed");
                    break;
                }
                Err(e) => {
                    error!("CDP WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }

        // Fail anything still waiting so callers see TargetClosed, not a hang.
        for (_, tx) in self.pending.lock().drain() {
            let _ = tx.send(Err(CdpError::TargetClosed));
        }
    }
}

/// Client connected to a browser's DevTools endpoint.
pub struct CdpClient {
    http_endpoint: String,
    wire: Arc<Wire>,
    recv_task: tokio::task::JoinHandle<()>,
}

impl CdpClient {
    /// Connect to a browser at the given debugging endpoint
    /// (e.g. `http://localhost:9222`).
    pub async fn connect(endpoint: &str) -> Result<Self, CdpError> {
        let http_endpoint = endpoint.trim_end_matches('/').to_string();

        let version_url = format!("{}/json/version", http_endpoint);
        debug!("Discovering browser at {}", version_url);
        let version: BrowserVersion = reqwest::get(&version_url)
            .await
            .map_err(|e| CdpError::BrowserUnavailable(format!("{}: {}", endpoint, e)))?
            .json()
            .await
            .map_err(|e| CdpError::BrowserUnavailable(format!("{}: {}", endpoint, e)))?;
        debug!("Found browser: {}", version.browser);

        let (ws_stream, _) = tokio_tungstenite::connect_async(&version.web_socket_debugger_url)
            .await
            .map_err(|e| CdpError::ConnectionFailed(format!("WebSocket: {}", e)))?;
        let (ws_sink, ws_source) = ws_stream.split();

        let wire = Arc::new(Wire {
            ws_tx: tokio::sync::Mutex::new(ws_sink),
            pending: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        });
        let recv_task = tokio::spawn(wire.clone().receive_loop(ws_source));

        debug!("CDP client connected to {}", version.web_socket_debugger_url);
        Ok(Self {
            http_endpoint,
            wire,
            recv_task,
        })
    }

    /// Send a browser-level command (no target session).
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.wire.call(method, params, None).await
    }

    /// List open page targets via the HTTP endpoint.
    pub async fn list_targets(&self) -> Result<Vec<TargetSummary>, CdpError> {
        let url = format!("{}/json/list", self.http_endpoint);
        let targets: Vec<TargetSummary> = reqwest::get(&url).await?.json().await?;
        Ok(targets.into_iter().filter(|t| t.target_type == "page").collect())
    }

    /// Open a new page, optionally at a URL, and attach to it.
    pub async fn open_page(&self, url: Option<&str>) -> Result<Page, CdpError> {
        let result = self
            .call(
                "Target.createTarget",
                Some(json!({"url": url.unwrap_or("about:blank")})),
            )
            .await?;
        let target_id = result["targetId"]
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("Missing targetId".to_string()))?
            .to_string();
        debug!("Created page target {}", target_id);
        self.attach(&target_id).await
    }

    /// Attach to an existing page target.
    pub async fn attach(&self, target_id: &str) -> Result<Page, CdpError> {
        let result = self
            .call(
                "Target.attachToTarget",
                Some(json!({"targetId": target_id, "flatten": true})),
            )
            .await?;
        let session_id = result["sessionId"]
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("Missing sessionId".to_string()))?
            .to_string();

        let page = Page::new(target_id.to_string(), session_id, self.wire.clone());
        page.enable_domains().await?;
        Ok(page)
    }

    /// Close a page target.
    pub async fn close_target(&self, target_id: &str) -> Result<(), CdpError> {
        self.call("Target.closeTarget", Some(json!({"targetId": target_id})))
            .await?;
        Ok(())
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self.recv_task.abort();
    }
}

//! WebSocket client for the Chrome DevTools Protocol: connect-with-retry
//! against a running driver, JSON-RPC command/response correlation by
//! message id, and a background reader task that demuxes command
//! responses from unsolicited events.

use crate::config::Config;
use crate::error::{CharlotteError, Result};
use futures::{SinkExt, StreamExt};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::{oneshot, Mutex};
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};

type WsSink = futures::stream::SplitSink<
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
    WsMessage,
>;

/// A connected CDP session against one page target.
pub struct CdpClient {
    ws_tx: Arc<Mutex<WsSink>>,
    pending: Arc<Mutex<HashMap<u32, oneshot::Sender<serde_json::Value>>>>,
    msg_id: AtomicU32,
    request_timeout_ms: u64,
}

impl CdpClient {
    /// Poll `/json/list` on the driver until a page target appears, then
    /// open its WebSocket and enable the domains the render pipeline needs.
    pub async fn connect(config: &Config) -> Result<Self> {
        let deadline = std::time::Instant::now()
            + std::time::Duration::from_millis(config.cdp_connect_timeout_ms);
        let list_url = format!("http://{}:{}/json/list", config.driver_host, config.driver_port);

        let mut last_error = String::new();
        loop {
            match Self::find_page_target(&list_url).await {
                Ok(ws_url) => {
                    let client = Self::from_ws_url(&ws_url, config.cdp_request_timeout_ms).await?;
                    client.send_command("Accessibility.enable", json!({})).await?;
                    client.send_command("DOM.enable", json!({})).await?;
                    client.send_command("Page.enable", json!({})).await?;
                    return Ok(client);
                }
                Err(e) => last_error = e,
            }

            if std::time::Instant::now() >= deadline {
                return Err(CharlotteError::SessionError(format!(
                    "no CDP page target at {} after {}ms: {}",
                    list_url, config.cdp_connect_timeout_ms, last_error
                )));
            }
            tokio::time::sleep(std::time::Duration::from_millis(250)).await;
        }
    }

    async fn find_page_target(list_url: &str) -> std::result::Result<String, String> {
        let response = reqwest::get(list_url).await.map_err(|e| e.to_string())?;
        let targets: serde_json::Value = response.json().await.map_err(|e| e.to_string())?;
        targets
            .as_array()
            .and_then(|arr| arr.iter().find(|t| t.get("type").and_then(|v| v.as_str()) == Some("page")))
            .and_then(|t| t.get("webSocketDebuggerUrl"))
            .and_then(|v| v.as_str())
            .map(String::from)
            .ok_or_else(|| "no page target with a webSocketDebuggerUrl".to_string())
    }

    async fn from_ws_url(ws_url: &str, request_timeout_ms: u64) -> Result<Self> {
        let (ws_stream, _) = connect_async(ws_url)
            .await
            .map_err(|e| CharlotteError::SessionError(format!("websocket connect failed: {}", e)))?;
        let (tx, mut rx) = StreamExt::split(ws_stream);

        let pending: Arc<Mutex<HashMap<u32, oneshot::Sender<serde_json::Value>>>> =
            Arc::new(Mutex::new(HashMap::new()));
        let pending_reader = pending.clone();

        tokio::spawn(async move {
            while let Some(msg) = StreamExt::next(&mut rx).await {
                let text = match msg {
                    Ok(WsMessage::Text(text)) => text,
                    Ok(WsMessage::Close(_)) => break,
                    Ok(_) => continue,
                    Err(_) => break,
                };
                let Ok(json) = serde_json::from_str::<serde_json::Value>(&text) else {
                    continue;
                };
                if let Some(id) = json.get("id").and_then(|i| i.as_u64()) {
                    if let Some(sender) = pending_reader.lock().await.remove(&(id as u32)) {
                        let _ = sender.send(json);
                    }
                }
                // Events (messages with "method" but no "id") are not
                // currently consumed by the render pipeline, which polls
                // state synchronously rather than subscribing.
            }
        });

        Ok(Self {
            ws_tx: Arc::new(Mutex::new(tx)),
            pending,
            msg_id: AtomicU32::new(1),
            request_timeout_ms,
        })
    }

    /// Send a CDP command and await its correlated response, bounded by
    /// the client's request timeout.
    pub async fn send_command(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
        let id = self.msg_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id, tx);

        let command = json!({ "id": id, "method": method, "params": params });
        {
            let mut sink = self.ws_tx.lock().await;
            sink.send(WsMessage::Text(command.to_string()))
                .await
                .map_err(|e| CharlotteError::SessionError(format!("failed to send {}: {}", method, e)))?;
        }

        let response = tokio::time::timeout(
            std::time::Duration::from_millis(self.request_timeout_ms),
            rx,
        )
        .await
        .map_err(|_| CharlotteError::Timeout(format!("{} did not respond in time", method)))?
        .map_err(|_| CharlotteError::SessionError(format!("{} response channel closed", method)))?;

        if let Some(error) = response.get("error") {
            let message = error.get("message").and_then(|m| m.as_str()).unwrap_or("unknown CDP error");
            return Err(CharlotteError::EvaluationError(format!("{}: {}", method, message)));
        }

        Ok(response.get("result").cloned().unwrap_or(serde_json::Value::Null))
    }

    /// `Accessibility.getFullAXTree`, raw node array.
    pub async fn get_full_ax_tree(&self) -> Result<Vec<serde_json::Value>> {
        let result = self.send_command("Accessibility.getFullAXTree", json!({})).await?;
        Ok(result
            .get("nodes")
            .and_then(|n| n.as_array())
            .cloned()
            .unwrap_or_default())
    }

    /// `DOM.getBoxModel` for a single backend node id.
    pub async fn get_box_model(&self, backend_node_id: i64) -> Result<serde_json::Value> {
        self.send_command("DOM.getBoxModel", json!({ "backendNodeId": backend_node_id })).await
    }

    pub async fn navigate(&self, url: &str) -> Result<()> {
        self.send_command("Page.navigate", json!({ "url": url })).await?;
        Ok(())
    }

    pub async fn current_url(&self) -> Result<String> {
        let result = self
            .send_command(
                "Runtime.evaluate",
                json!({ "expression": "window.location.href", "returnByValue": true }),
            )
            .await?;
        Ok(result
            .get("result")
            .and_then(|r| r.get("value"))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string())
    }

    pub async fn current_title(&self) -> Result<String> {
        let result = self
            .send_command(
                "Runtime.evaluate",
                json!({ "expression": "document.title", "returnByValue": true }),
            )
            .await?;
        Ok(result
            .get("result")
            .and_then(|r| r.get("value"))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string())
    }

    /// Resolve a CSS selector to the backend DOM node id of its first match,
    /// for scoping a render to a subtree. `None` when nothing matches.
    pub async fn query_selector_backend_id(&self, selector: &str) -> Result<Option<i64>> {
        let document = self.send_command("DOM.getDocument", json!({ "depth": 0 })).await?;
        let Some(root_node_id) = document.get("root").and_then(|r| r.get("nodeId")).and_then(|v| v.as_i64()) else {
            return Ok(None);
        };

        let found = self
            .send_command("DOM.querySelector", json!({ "nodeId": root_node_id, "selector": selector }))
            .await?;
        let node_id = found.get("nodeId").and_then(|v| v.as_i64()).unwrap_or(0);
        if node_id == 0 {
            return Ok(None);
        }

        let described = self
            .send_command("DOM.describeNode", json!({ "nodeId": node_id }))
            .await?;
        Ok(described
            .get("node")
            .and_then(|n| n.get("backendNodeId"))
            .and_then(|v| v.as_i64()))
    }

    /// Current viewport in CSS pixels, or `None` if the driver reports
    /// nothing usable.
    pub async fn get_viewport(&self) -> Result<Option<(u32, u32)>> {
        let metrics = self.send_command("Page.getLayoutMetrics", json!({})).await?;
        let viewport = metrics.get("cssVisualViewport").or_else(|| metrics.get("visualViewport"));
        let Some(viewport) = viewport else { return Ok(None) };
        let width = viewport.get("clientWidth").and_then(|v| v.as_f64());
        let height = viewport.get("clientHeight").and_then(|v| v.as_f64());
        match (width, height) {
            (Some(w), Some(h)) if w > 0.0 && h > 0.0 => Ok(Some((w.round() as u32, h.round() as u32))),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msg_id_increments_from_one() {
        let counter = AtomicU32::new(1);
        assert_eq!(counter.fetch_add(1, Ordering::SeqCst), 1);
        assert_eq!(counter.fetch_add(1, Ordering::SeqCst), 2);
    }
}

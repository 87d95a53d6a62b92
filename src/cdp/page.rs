//! Page handle: one attached browser tab.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Value, json};
use tracing::debug;

use super::client::Wire;
use super::error::CdpError;
use super::protocol::{
    BoxModel, DomNode, KeyEventType, MouseButton, MouseEventType, ScreenshotFormat,
};

const LOAD_TIMEOUT: Duration = Duration::from_secs(30);
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Handle to a single open tab.
///
/// Exposes the operations the grounding core and the tool surface
/// need: navigation, evaluation, screenshot capture, input, and
/// selector waits. All calls are scoped to this page's CDP session.
pub struct Page {
    target_id: String,
    session_id: String,
    wire: Arc<Wire>,
}

impl Page {
    pub(crate) fn new(target_id: String, session_id: String, wire: Arc<Wire>) -> Self {
        Self {
            target_id,
            session_id,
            wire,
        }
    }

    /// Target ID of this page.
    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    /// Send a command scoped to this page's session.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.wire.call(method, params, Some(&self.session_id)).await
    }

    pub(crate) async fn enable_domains(&self) -> Result<(), CdpError> {
        self.call("Page.enable", None).await?;
        self.call("DOM.enable", None).await?;
        self.call("Runtime.enable", None).await?;
        debug!("Enabled CDP domains for target {}", self.target_id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Navigate to a URL and wait for the document to become ready.
    pub async fn navigate(&self, url: &str) -> Result<(), CdpError> {
        let result = self.call("Page.navigate", Some(json!({"url": url}))).await?;
        if let Some(error) = result.get("errorText").and_then(Value::as_str) {
            if !error.is_empty() {
                return Err(CdpError::NavigationFailed(error.to_string()));
            }
        }
        self.wait_for_ready().await?;
        debug!("Navigated to {}", url);
        Ok(())
    }

    /// Poll `document.readyState` until the page is interactive.
    pub async fn wait_for_ready(&self) -> Result<(), CdpError> {
        let start = std::time::Instant::now();
        loop {
            let state = self.evaluate("document.readyState").await?;
            if matches!(state.as_str(), Some("complete") | Some("interactive")) {
                return Ok(());
            }
            if start.elapsed() > LOAD_TIMEOUT {
                return Err(CdpError::Timeout("Page load timed out".to_string()));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Current URL.
    pub async fn url(&self) -> Result<String, CdpError> {
        let value = self.evaluate("window.location.href").await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    // ------------------------------------------------------------------
    // Content and evaluation
    // ------------------------------------------------------------------

    /// Full serialized HTML of the current document.
    pub async fn content(&self) -> Result<String, CdpError> {
        let value = self.evaluate("document.documentElement.outerHTML").await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    /// Evaluate a JavaScript expression, returning its value.
    pub async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;
        if let Some(exception) = result.get("exceptionDetails") {
            let text = exception["text"].as_str().unwrap_or("Unknown error");
            return Err(CdpError::JavaScript(text.to_string()));
        }
        Ok(result["result"]["value"].clone())
    }

    /// Invoke a JavaScript function source with a single JSON argument.
    ///
    /// This is the injection point for the grounding script: the
    /// function text is wrapped as `(fn)(args)` and evaluated in the
    /// page with the argument serialized inline.
    pub async fn evaluate_call(&self, function: &str, args: &Value) -> Result<Value, CdpError> {
        let expression = format!("({})({})", function, serde_json::to_string(args)?);
        self.evaluate(&expression).await
    }

    /// Capture a PNG screenshot of the visible viewport.
    pub async fn screenshot(&self) -> Result<Vec<u8>, CdpError> {
        let result = self
            .call(
                "Page.captureScreenshot",
                Some(json!({"format": ScreenshotFormat::Png})),
            )
            .await?;
        let data = result["data"]
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("Missing screenshot data".to_string()))?;
        BASE64
            .decode(data)
            .map_err(|e| CdpError::InvalidResponse(format!("Bad screenshot encoding: {}", e)))
    }

    // ------------------------------------------------------------------
    // DOM queries
    // ------------------------------------------------------------------

    async fn document(&self) -> Result<DomNode, CdpError> {
        let result = self.call("DOM.getDocument", Some(json!({"depth": 0}))).await?;
        let root: DomNode = serde_json::from_value(result["root"].clone())?;
        Ok(root)
    }

    /// Resolve a CSS selector to a node id, if present.
    pub async fn query_selector(&self, selector: &str) -> Result<Option<i64>, CdpError> {
        let doc = self.document().await?;
        let result = self
            .call(
                "DOM.querySelector",
                Some(json!({"nodeId": doc.node_id, "selector": selector})),
            )
            .await?;
        match result["nodeId"].as_i64() {
            Some(0) | None => Ok(None),
            Some(id) => Ok(Some(id)),
        }
    }

    /// Poll for a selector until it appears or the timeout elapses.
    pub async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<i64, CdpError> {
        let start = std::time::Instant::now();
        loop {
            if let Some(node_id) = self.query_selector(selector).await? {
                return Ok(node_id);
            }
            if start.elapsed() > timeout {
                return Err(CdpError::Timeout(format!(
                    "Waiting for selector '{}' timed out",
                    selector
                )));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn box_model(&self, node_id: i64) -> Result<Option<BoxModel>, CdpError> {
        match self
            .call("DOM.getBoxModel", Some(json!({"nodeId": node_id})))
            .await
        {
            Ok(result) => {
                let model: BoxModel = serde_json::from_value(result["model"].clone())?;
                Ok(Some(model))
            }
            // -32000: node has no layout (hidden or detached).
            Err(CdpError::Protocol { code: -32000, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    /// Click the center of the element matching a selector.
    pub async fn click(&self, selector: &str) -> Result<(), CdpError> {
        let node_id = self
            .query_selector(selector)
            .await?
            .ok_or_else(|| CdpError::ElementNotFound(selector.to_string()))?;
        let model = self
            .box_model(node_id)
            .await?
            .ok_or_else(|| CdpError::ElementNotFound(format!("{} (not visible)", selector)))?;
        let (x, y) = model.content_center();
        self.click_at(x, y).await
    }

    /// Dispatch a left click at viewport coordinates.
    pub async fn click_at(&self, x: f64, y: f64) -> Result<(), CdpError> {
        for event_type in [MouseEventType::MousePressed, MouseEventType::MouseReleased] {
            self.call(
                "Input.dispatchMouseEvent",
                Some(json!({
                    "type": event_type,
                    "x": x,
                    "y": y,
                    "button": MouseButton::Left,
                    "clickCount": 1,
                })),
            )
            .await?;
        }
        debug!("Clicked at ({}, {})", x, y);
        Ok(())
    }

    /// Focus the element matching a selector and replace its value.
    pub async fn fill(&self, selector: &str, text: &str) -> Result<(), CdpError> {
        let node_id = self
            .query_selector(selector)
            .await?
            .ok_or_else(|| CdpError::ElementNotFound(selector.to_string()))?;
        self.call("DOM.focus", Some(json!({"nodeId": node_id})))
            .await?;
        // Select existing content so the insert replaces it.
        self.evaluate("document.activeElement && document.activeElement.select && document.activeElement.select()")
            .await?;
        self.call("Input.insertText", Some(json!({"text": text})))
            .await?;
        debug!("Filled {} ({} chars)", selector, text.len());
        Ok(())
    }

    /// Press and release a key by name ("Enter", "Tab", "Escape", ...).
    pub async fn press_key(&self, key: &str) -> Result<(), CdpError> {
        for event_type in [KeyEventType::KeyDown, KeyEventType::KeyUp] {
            self.call(
                "Input.dispatchKeyEvent",
                Some(json!({"type": event_type, "key": key})),
            )
            .await?;
        }
        Ok(())
    }

    /// Scroll the document by a pixel delta.
    pub async fn scroll_by(&self, dx: f64, dy: f64) -> Result<(), CdpError> {
        self.evaluate(&format!("window.scrollBy({}, {})", dx, dy))
            .await?;
        Ok(())
    }
}

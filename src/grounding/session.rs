//! Grounding session: scan, render, capture, build, clear.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::GroundablePage;
use super::error::GroundingError;
use super::inventory::InventoryBuilder;
use super::overlay::OverlayRenderer;
use super::scanner::ElementScanner;
use super::types::{GroundingConfig, GroundingResult};

/// Orchestrates one grounding call against a page.
///
/// Calls against the same session are serialized: a call in progress,
/// including its cleanup, completes before the next begins. Overlay
/// cleanup runs on every exit path, and if the caller abandons the
/// call mid-flight a best-effort clear is still dispatched. No
/// retries are performed here; transient failures surface to the
/// caller, who may re-invoke.
pub struct GroundingSession {
    scanner: ElementScanner,
    overlay: OverlayRenderer,
    in_flight: Mutex<()>,
}

/// Issues a best-effort overlay clear if the owning call is dropped
/// before it finishes (upstream timeout or cancellation).
struct AbandonGuard {
    page: Option<Arc<dyn GroundablePage>>,
}

impl AbandonGuard {
    fn arm(page: Arc<dyn GroundablePage>) -> Self {
        Self { page: Some(page) }
    }

    fn disarm(&mut self) {
        self.page = None;
    }
}

impl Drop for AbandonGuard {
    fn drop(&mut self) {
        if let Some(page) = self.page.take() {
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(async move {
                    if let Err(e) = OverlayRenderer::new().clear(page.as_ref()).await {
                        warn!("Overlay cleanup after abandoned call failed: {}", e);
                    }
                });
            }
        }
    }
}

impl GroundingSession {
    pub fn new() -> Self {
        Self {
            scanner: ElementScanner::new(),
            overlay: OverlayRenderer::new(),
            in_flight: Mutex::new(()),
        }
    }

    /// Produce an indexed element inventory correlated with a
    /// screenshot of the page.
    pub async fn ground(
        &self,
        page: Arc<dyn GroundablePage>,
        config: &GroundingConfig,
    ) -> Result<GroundingResult, GroundingError> {
        let _guard = self.in_flight.lock().await;

        let mut abandon = AbandonGuard::arm(page.clone());
        let outcome = self.run(page.as_ref(), config).await;
        abandon.disarm();

        match outcome {
            Ok(result) => {
                // A cleanup failure on the success path is the first
                // failure of the call and is propagated as such.
                self.overlay.clear(page.as_ref()).await?;
                Ok(result)
            }
            Err(e) => {
                if let Err(cleanup) = self.overlay.clear(page.as_ref()).await {
                    // Page already gone; stale boxes cannot outlive it.
                    warn!("Overlay cleanup failed after {}: {}", e, cleanup);
                }
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        page: &dyn GroundablePage,
        config: &GroundingConfig,
    ) -> Result<GroundingResult, GroundingError> {
        let candidates = self.scanner.scan(page, config.viewport_expansion).await?;

        if config.highlight {
            self.overlay
                .render(page, &candidates, config.focus_index)
                .await?;
        }

        let screenshot = page
            .screenshot()
            .await
            .map_err(GroundingError::from_capture)?;

        let elements = InventoryBuilder::build(candidates);
        debug!(
            "Grounded {} elements ({} screenshot bytes)",
            elements.len(),
            screenshot.len()
        );
        Ok(GroundingResult {
            elements,
            screenshot,
        })
    }
}

impl Default for GroundingSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdp::CdpError;
    use async_trait::async_trait;
    use serde_json::{Value, json};

    /// Scripted page handle: answers scan/render/clear calls from
    /// canned data and records every evaluation argument.
    struct MockPage {
        calls: parking_lot::Mutex<Vec<Value>>,
        scan_response: Value,
        screenshot: Result<Vec<u8>, ()>,
        hang_screenshot: bool,
        closed: bool,
    }

    impl MockPage {
        fn with_elements(elements: Value) -> Self {
            Self {
                calls: parking_lot::Mutex::new(Vec::new()),
                scan_response: json!({ "elementsData": elements }),
                screenshot: Ok(vec![0x89, b'P', b'N', b'G']),
                hang_screenshot: false,
                closed: false,
            }
        }

        fn recorded(&self) -> Vec<Value> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl GroundablePage for MockPage {
        async fn evaluate_call(&self, _function: &str, args: &Value) -> Result<Value, CdpError> {
            self.calls.lock().push(args.clone());
            if self.closed {
                return Err(CdpError::TargetClosed);
            }
            if let Some(boxes) = args.get("boxes").and_then(Value::as_array) {
                let focus = args.get("focusIndex").and_then(Value::as_u64);
                let drawn = match focus {
                    Some(_) => boxes.len().min(1),
                    None => boxes.len(),
                };
                return Ok(json!({ "highlightCount": drawn }));
            }
            if args.is_null() {
                // Clear call.
                return Ok(json!(true));
            }
            Ok(self.scan_response.clone())
        }

        async fn screenshot(&self) -> Result<Vec<u8>, CdpError> {
            if self.hang_screenshot {
                futures::future::pending::<()>().await;
            }
            match &self.screenshot {
                Ok(bytes) => Ok(bytes.clone()),
                Err(()) => Err(CdpError::Timeout("screenshot".to_string())),
            }
        }
    }

    fn two_elements() -> Value {
        json!([
            {
                "index": 0,
                "tag": "button",
                "rect": {"x": 10.0, "y": 10.0, "width": 60.0, "height": 20.0},
                "isInteractive": true,
                "text": "Submit",
                "selector": "#submit",
            },
            {
                "index": 1,
                "tag": "p",
                "rect": {"x": 10.0, "y": 50.0, "width": 200.0, "height": 18.0},
                "isInteractive": false,
                "text": "Some paragraph text",
                "selector": "body > p:nth-child(2)",
            },
        ])
    }

    #[tokio::test]
    async fn ground_returns_indexed_inventory_and_screenshot() {
        let page = Arc::new(MockPage::with_elements(two_elements()));
        let session = GroundingSession::new();

        let result = session
            .ground(page.clone(), &GroundingConfig::default())
            .await
            .unwrap();

        assert_eq!(result.elements.len(), 2);
        assert_eq!(result.elements[0].index, 0);
        assert_eq!(result.elements[0].tag, "button");
        assert!(result.elements[0].is_interactive);
        assert_eq!(result.elements[0].text, "Submit");
        assert_eq!(result.elements[1].index, 1);
        assert!(!result.elements[1].is_interactive);
        assert!(!result.elements[1].text.is_empty());
        assert!(!result.screenshot.is_empty());
    }

    #[tokio::test]
    async fn indices_are_unique_and_sequential() {
        let page = Arc::new(MockPage::with_elements(two_elements()));
        let session = GroundingSession::new();

        let result = session
            .ground(page.clone(), &GroundingConfig::default())
            .await
            .unwrap();

        let indices: Vec<u32> = result.elements.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[tokio::test]
    async fn repeated_calls_yield_identical_assignment() {
        let page = Arc::new(MockPage::with_elements(two_elements()));
        let session = GroundingSession::new();
        let config = GroundingConfig::default();

        let first = session.ground(page.clone(), &config).await.unwrap();
        let second = session.ground(page.clone(), &config).await.unwrap();

        let a: Vec<(u32, String)> = first
            .elements
            .iter()
            .map(|e| (e.index, e.selector.clone()))
            .collect();
        let b: Vec<(u32, String)> = second
            .elements
            .iter()
            .map(|e| (e.index, e.selector.clone()))
            .collect();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn cleanup_runs_after_success() {
        let page = Arc::new(MockPage::with_elements(two_elements()));
        let session = GroundingSession::new();

        session
            .ground(page.clone(), &GroundingConfig::default())
            .await
            .unwrap();

        let calls = page.recorded();
        // scan, render, clear
        assert_eq!(calls.len(), 3);
        assert!(calls.last().unwrap().is_null());
    }

    #[tokio::test]
    async fn cleanup_runs_after_capture_failure() {
        let mut page = MockPage::with_elements(two_elements());
        page.screenshot = Err(());
        let page = Arc::new(page);
        let session = GroundingSession::new();

        let err = session
            .ground(page.clone(), &GroundingConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GroundingError::Capture(_)));

        // The overlay clear still ran after the failed capture.
        assert!(page.recorded().last().unwrap().is_null());
    }

    #[tokio::test]
    async fn closed_page_surfaces_page_unavailable() {
        let mut page = MockPage::with_elements(two_elements());
        page.closed = true;
        let page = Arc::new(page);
        let session = GroundingSession::new();

        let err = session
            .ground(page.clone(), &GroundingConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GroundingError::PageUnavailable(_)));
    }

    #[tokio::test]
    async fn viewport_expansion_is_forwarded() {
        let page = Arc::new(MockPage::with_elements(json!([])));
        let session = GroundingSession::new();
        let config = GroundingConfig {
            viewport_expansion: -1,
            ..Default::default()
        };

        session.ground(page.clone(), &config).await.unwrap();

        let calls = page.recorded();
        assert_eq!(calls[0]["viewportExpansion"], -1);
    }

    #[tokio::test]
    async fn highlight_disabled_skips_render() {
        let page = Arc::new(MockPage::with_elements(two_elements()));
        let session = GroundingSession::new();
        let config = GroundingConfig {
            highlight: false,
            ..Default::default()
        };

        session.ground(page.clone(), &config).await.unwrap();

        let calls = page.recorded();
        // Just scan and clear; no boxes payload anywhere.
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|c| c.get("boxes").is_none()));
    }

    #[tokio::test]
    async fn focus_index_is_forwarded_to_render() {
        let page = Arc::new(MockPage::with_elements(two_elements()));
        let session = GroundingSession::new();
        let config = GroundingConfig {
            focus_index: Some(1),
            ..Default::default()
        };

        session.ground(page.clone(), &config).await.unwrap();

        let calls = page.recorded();
        let render = calls
            .iter()
            .find(|c| c.get("boxes").is_some())
            .expect("render call present");
        assert_eq!(render["focusIndex"], 1);
    }

    #[tokio::test]
    async fn abandoned_call_still_clears_the_overlay() {
        let mut page = MockPage::with_elements(two_elements());
        page.hang_screenshot = true;
        let page = Arc::new(page);
        let session = GroundingSession::new();

        // The capture never resolves, so the caller's timeout drops
        // the ground future after the overlay has been rendered.
        let outcome = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            session.ground(page.clone(), &GroundingConfig::default()),
        )
        .await;
        assert!(outcome.is_err());

        // Give the dispatched cleanup a chance to run.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let calls = page.recorded();
        assert!(calls.iter().any(|c| c.get("boxes").is_some()));
        assert!(calls.last().unwrap().is_null());
    }

    #[tokio::test]
    async fn malformed_element_data_is_rejected() {
        let page = Arc::new(MockPage::with_elements(json!([{"index": "not a number"}])));
        let session = GroundingSession::new();

        let err = session
            .ground(page.clone(), &GroundingConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GroundingError::ElementData(_)));
    }
}

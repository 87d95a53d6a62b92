//! Grounding tool: indexed element inventory plus screenshot.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::json;
use tracing::debug;

use crate::grounding::GroundingConfig;

use super::{BrowserTools, ToolError, ToolReply};

impl BrowserTools {
    /// Highlight the page's interactable/text elements, capture a
    /// screenshot, and return both the image (base64) and the indexed
    /// element inventory.
    pub async fn ground_and_screenshot(&self) -> ToolReply {
        self.ground_with(&self.grounding_config.clone()).await
    }

    /// Same as [`Self::ground_and_screenshot`] with explicit options.
    pub async fn ground_with(&self, config: &GroundingConfig) -> ToolReply {
        match self.grounding.ground(self.page().clone(), config).await {
            Ok(result) => {
                let count = result.elements.len();
                debug!("Grounding produced {} elements", count);
                let elements = match serde_json::to_value(&result.elements) {
                    Ok(v) => v,
                    Err(e) => return ToolReply::failure(&ToolError::Action(e.to_string())),
                };
                ToolReply::success_with(
                    format!("Highlighted {} elements", count),
                    json!({
                        "screenshot": BASE64.encode(&result.screenshot),
                        "elements": elements,
                    }),
                )
            }
            Err(e) => ToolReply::failure(&ToolError::Grounding(e)),
        }
    }
}

//! Content tool: read the serialized DOM.

use serde_json::json;

use super::{BrowserTools, ToolError, ToolReply};

impl BrowserTools {
    /// Retrieve the full serialized HTML of the current document.
    pub async fn read_dom(&self) -> ToolReply {
        match self.page().content().await {
            Ok(html) => {
                let length = html.len();
                ToolReply::success_with(
                    format!("Retrieved DOM content ({} bytes)", length),
                    json!({ "dom_content": html }),
                )
            }
            Err(e) => ToolReply::failure(&ToolError::Action(e.to_string())),
        }
    }
}

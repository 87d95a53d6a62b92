//! Interaction tools: type, click, press key, scroll.

use tracing::debug;

use crate::cdp::CdpError;

use super::{BrowserTools, ToolError, ToolReply};

fn map_wait_error(e: CdpError, selector: &str) -> ToolError {
    match e {
        CdpError::Timeout(_) => ToolError::SelectorTimeout(selector.to_string()),
        other => ToolError::Action(other.to_string()),
    }
}

impl BrowserTools {
    /// Type text into the element matching a CSS selector, replacing
    /// its current value.
    pub async fn type_into(&self, selector: &str, text: &str) -> ToolReply {
        let result: Result<(), ToolError> = async {
            self.page()
                .wait_for_selector(selector, self.wait_timeout)
                .await
                .map_err(|e| map_wait_error(e, selector))?;
            self.page()
                .fill(selector, text)
                .await
                .map_err(|e| ToolError::Action(e.to_string()))?;
            Ok(())
        }
        .await;

        match result {
            Ok(()) => {
                debug!("Typed into {}", selector);
                ToolReply::success(format!(
                    "Successfully typed '{}' into element with selector '{}'",
                    text, selector
                ))
            }
            Err(e) => ToolReply::failure(&e),
        }
    }

    /// Click the element matching a CSS selector.
    pub async fn click(&self, selector: &str) -> ToolReply {
        let result: Result<(), ToolError> = async {
            self.page()
                .wait_for_selector(selector, self.wait_timeout)
                .await
                .map_err(|e| map_wait_error(e, selector))?;
            self.page()
                .click(selector)
                .await
                .map_err(|e| ToolError::Action(e.to_string()))?;
            Ok(())
        }
        .await;

        match result {
            Ok(()) => {
                debug!("Clicked {}", selector);
                ToolReply::success(format!("Successfully clicked '{}'", selector))
            }
            Err(e) => ToolReply::failure(&e),
        }
    }

    /// Press a keyboard key by name ("Enter", "Tab", "Escape", ...).
    pub async fn press_key(&self, key: &str) -> ToolReply {
        match self.page().press_key(key).await {
            Ok(()) => ToolReply::success(format!("Pressed {}", key)),
            Err(e) => ToolReply::failure(&ToolError::Action(e.to_string())),
        }
    }

    /// Press Enter.
    pub async fn press_enter(&self) -> ToolReply {
        self.press_key("Enter").await
    }

    /// Scroll the page by a pixel delta.
    pub async fn scroll(&self, dx: f64, dy: f64) -> ToolReply {
        match self.page().scroll_by(dx, dy).await {
            Ok(()) => ToolReply::success(format!("Scrolled by ({}, {})", dx, dy)),
            Err(e) => ToolReply::failure(&ToolError::Action(e.to_string())),
        }
    }
}

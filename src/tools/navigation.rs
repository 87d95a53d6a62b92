//! Navigation tool.

use tracing::debug;
use url::Url;

use super::{BrowserTools, ToolError, ToolReply};

impl BrowserTools {
    /// Navigate to a URL.
    ///
    /// Bare hostnames are promoted to `https://` before validation.
    pub async fn navigate(&self, url: &str) -> ToolReply {
        match self.try_navigate(url).await {
            Ok(normalized) => {
                ToolReply::success(format!("Successfully navigated to {}", normalized))
            }
            Err(e) => ToolReply::failure(&e),
        }
    }

    async fn try_navigate(&self, url: &str) -> Result<String, ToolError> {
        let normalized = normalize_url(url);
        Url::parse(&normalized).map_err(|e| ToolError::Navigation(format!("{}: {}", url, e)))?;

        self.page()
            .navigate(&normalized)
            .await
            .map_err(|e| ToolError::Navigation(e.to_string()))?;

        debug!("Navigated to {}", normalized);
        Ok(normalized)
    }
}

/// Prefix `https://` when no scheme is present.
pub(super) fn normalize_url(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

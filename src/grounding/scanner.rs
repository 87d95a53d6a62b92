//! Element scanner: runs the injected script in scan mode.

use serde_json::json;
use tracing::debug;

use super::GroundablePage;
use super::error::GroundingError;
use super::types::RawElement;

/// The injectable grounding script, loaded at call time.
pub(crate) const GROUNDING_SCRIPT: &str = include_str!("grounding.js");

/// Walks the rendered DOM inside the page and returns the qualifying
/// candidates in document order.
///
/// Indices are assigned by the script in a single depth-first
/// pre-order traversal, so repeated scans of an unchanged page yield
/// identical indices. The scan is best-effort on a page that is not
/// in a stable ready state; readiness is the caller's concern.
pub struct ElementScanner;

impl ElementScanner {
    pub fn new() -> Self {
        Self
    }

    /// Enumerate candidates within the expanded viewport.
    ///
    /// `viewport_expansion` is in pixels beyond the visible viewport;
    /// `-1` means unbounded.
    pub async fn scan(
        &self,
        page: &dyn GroundablePage,
        viewport_expansion: i32,
    ) -> Result<Vec<RawElement>, GroundingError> {
        let args = json!({ "viewportExpansion": viewport_expansion });
        let value = page
            .evaluate_call(GROUNDING_SCRIPT, &args)
            .await
            .map_err(GroundingError::from_injection)?;

        let data = value
            .get("elementsData")
            .cloned()
            .ok_or_else(|| {
                GroundingError::ElementData("script result missing elementsData".to_string())
            })?;
        let candidates: Vec<RawElement> = serde_json::from_value(data)
            .map_err(|e| GroundingError::ElementData(e.to_string()))?;

        debug!(
            "Scanned {} candidates (viewport_expansion={})",
            candidates.len(),
            viewport_expansion
        );
        Ok(candidates)
    }
}

impl Default for ElementScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_asset_is_embedded() {
        assert!(GROUNDING_SCRIPT.contains("pageground-overlay"));
        assert!(GROUNDING_SCRIPT.contains("elementsData"));
        assert!(GROUNDING_SCRIPT.contains("viewportExpansion"));
        // Render mode is keyed off the boxes payload.
        assert!(GROUNDING_SCRIPT.contains("config.boxes"));
    }

    #[test]
    fn script_is_a_callable_expression() {
        // The page handle wraps the asset as `(script)(args)`, so it
        // must be a single arrow function expression.
        assert!(GROUNDING_SCRIPT.trim_start().starts_with("(config) =>"));
    }
}

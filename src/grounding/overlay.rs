//! Overlay renderer: labeled boxes over candidate elements.

use serde_json::json;
use tracing::{debug, warn};

use super::GroundablePage;
use super::error::GroundingError;
use super::scanner::GROUNDING_SCRIPT;
use super::types::RawElement;

/// Removes the overlay container; safe to run when none exists.
const CLEAR_SCRIPT: &str = r#"() => {
  const container = document.getElementById("pageground-overlay");
  if (container) container.remove();
  return true;
}"#;

/// Draws index-labeled boxes in a dedicated fixed-position layer.
///
/// Boxes are rendered from the candidates' serialized geometry, never
/// by re-walking the DOM, so the drawn labels match the returned
/// indices one-to-one by construction. The layer sits outside normal
/// flow and ignores pointer events; target elements themselves are
/// never mutated.
pub struct OverlayRenderer;

impl OverlayRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Draw boxes for the candidates, or only `focus` when set.
    pub async fn render(
        &self,
        page: &dyn GroundablePage,
        candidates: &[RawElement],
        focus: Option<u32>,
    ) -> Result<(), GroundingError> {
        let boxes: Vec<_> = candidates
            .iter()
            .map(|c| {
                json!({
                    "index": c.index,
                    "x": c.rect.x,
                    "y": c.rect.y,
                    "width": c.rect.width,
                    "height": c.rect.height,
                })
            })
            .collect();
        let args = json!({ "boxes": boxes, "focusIndex": focus });

        let value = page
            .evaluate_call(GROUNDING_SCRIPT, &args)
            .await
            .map_err(GroundingError::from_injection)?;

        let drawn = value["highlightCount"].as_u64().unwrap_or(0);
        let expected = match focus {
            Some(_) => 1.min(candidates.len()) as u64,
            None => candidates.len() as u64,
        };
        if drawn != expected {
            warn!("Overlay drew {} boxes, expected {}", drawn, expected);
        }
        debug!("Rendered {} overlay boxes", drawn);
        Ok(())
    }

    /// Remove every box and label from the most recent render.
    /// Idempotent.
    pub async fn clear(&self, page: &dyn GroundablePage) -> Result<(), GroundingError> {
        page.evaluate_call(CLEAR_SCRIPT, &json!(null))
            .await
            .map_err(GroundingError::from_injection)?;
        Ok(())
    }
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_script_targets_the_container() {
        assert!(CLEAR_SCRIPT.contains("pageground-overlay"));
        assert!(CLEAR_SCRIPT.contains("remove()"));
    }
}

//! Grounding error types.

use thiserror::Error;

use crate::cdp::CdpError;

/// Failures of the composite grounding flow.
///
/// Every variant is scoped to one call; none is fatal to the session.
#[derive(Debug, Error)]
pub enum GroundingError {
    /// The page handle is unavailable or closed.
    #[error("Page unavailable: {0}")]
    PageUnavailable(String),

    /// The overlay/scan script could not be injected or executed.
    #[error("Script injection failed: {0}")]
    ScriptInjection(String),

    /// Screenshot capture failed.
    #[error("Screenshot capture failed: {0}")]
    Capture(String),

    /// The script returned element data that does not match the
    /// expected record shape.
    #[error("Malformed element data: {0}")]
    ElementData(String),
}

// Chrome answers commands on a detached session with this code.
const SESSION_NOT_FOUND: i64 = -32001;

fn page_gone(e: &CdpError) -> bool {
    matches!(
        e,
        CdpError::TargetClosed
            | CdpError::Protocol {
                code: SESSION_NOT_FOUND,
                ..
            }
    )
}

impl GroundingError {
    /// Classify a page-handle failure during script evaluation.
    pub(crate) fn from_injection(e: CdpError) -> Self {
        if page_gone(&e) {
            GroundingError::PageUnavailable(e.to_string())
        } else {
            GroundingError::ScriptInjection(e.to_string())
        }
    }

    /// Classify a page-handle failure during screenshot capture.
    pub(crate) fn from_capture(e: CdpError) -> Self {
        if page_gone(&e) {
            GroundingError::PageUnavailable(e.to_string())
        } else {
            GroundingError::Capture(e.to_string())
        }
    }
}

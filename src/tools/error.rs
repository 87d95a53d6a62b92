//! Tool error taxonomy.

use thiserror::Error;

use crate::grounding::GroundingError;

/// Failures of the leaf tool operations.
///
/// Tools never surface these to callers directly: every tool catches
/// locally and folds the error into a [`super::ToolReply`], so the
/// agent loop branches on status, not on error types.
#[derive(Debug, Error)]
pub enum ToolError {
    /// URL unreachable or invalid.
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// Element not found within the wait budget.
    #[error("Selector timed out: {0}")]
    SelectorTimeout(String),

    /// Overlay script failed to load or execute.
    #[error("Script injection failed: {0}")]
    ScriptInjection(String),

    /// Screenshot capture failed.
    #[error("Screenshot capture failed: {0}")]
    Capture(String),

    /// Failure inside the composite grounding flow.
    #[error("Grounding failed: {0}")]
    Grounding(#[from] GroundingError),

    /// Any other page action failure.
    #[error("Action failed: {0}")]
    Action(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grounding_errors_wrap() {
        let err: ToolError = GroundingError::Capture("page crashed".to_string()).into();
        assert!(matches!(err, ToolError::Grounding(_)));
        assert!(err.to_string().contains("page crashed"));
    }

    #[test]
    fn display_strings_name_the_failure() {
        assert!(
            ToolError::SelectorTimeout("#missing".to_string())
                .to_string()
                .contains("#missing")
        );
        assert!(
            ToolError::Navigation("bad url".to_string())
                .to_string()
                .starts_with("Navigation failed")
        );
    }
}

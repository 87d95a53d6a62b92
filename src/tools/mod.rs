//! Caller-facing tool surface.
//!
//! Thin synchronous-feeling wrappers over the page handle, each
//! returning the uniform `{status, message?, data?}` reply shape the
//! agent loop expects. No tool raises; failures are folded into the
//! reply.

mod content;
mod error;
mod grounding;
mod interaction;
mod navigation;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cdp::Page;
use crate::grounding::{GroundingConfig, GroundingSession};

pub use error::ToolError;

/// Outcome tag of a tool reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Success,
    Error,
}

/// Uniform result of every tool operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolReply {
    pub status: ToolStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ToolReply {
    /// Successful reply with a human-readable message.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: ToolStatus::Success,
            message: Some(message.into()),
            data: None,
        }
    }

    /// Successful reply carrying structured data.
    pub fn success_with(message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            status: ToolStatus::Success,
            message: Some(message.into()),
            data: Some(data),
        }
    }

    /// Error reply from a tool failure.
    pub fn failure(error: &ToolError) -> Self {
        Self {
            status: ToolStatus::Error,
            message: Some(error.to_string()),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ToolStatus::Success
    }
}

/// The tool surface for one page.
///
/// Holds the page handle and a [`GroundingSession`]; grounding calls
/// against this page are serialized through the session.
pub struct BrowserTools {
    page: Arc<Page>,
    grounding: GroundingSession,
    grounding_config: GroundingConfig,
    wait_timeout: Duration,
}

impl BrowserTools {
    pub fn new(page: Arc<Page>, wait_timeout: Duration, grounding_config: GroundingConfig) -> Self {
        Self {
            page,
            grounding: GroundingSession::new(),
            grounding_config,
            wait_timeout,
        }
    }

    /// The underlying page handle.
    pub fn page(&self) -> &Arc<Page> {
        &self.page
    }
}

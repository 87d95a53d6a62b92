//! Element grounding: indexed element inventories correlated with
//! screenshots.
//!
//! A grounding call walks the rendered DOM, assigns each qualifying
//! element a small integer index in document order, draws labeled
//! boxes over them, captures a screenshot, and returns the inventory
//! alongside it. The calling agent can then refer to elements by
//! index instead of fragile selectors.
//!
//! The core touches the page only through [`GroundablePage`]
//! (`evaluate_call` + `screenshot`), which keeps it independent of
//! the transport and mockable in tests.

mod error;
mod inventory;
mod overlay;
mod scanner;
mod session;
mod types;

use async_trait::async_trait;
use serde_json::Value;

use crate::cdp::{CdpError, Page};

pub use error::GroundingError;
pub use inventory::InventoryBuilder;
pub use overlay::OverlayRenderer;
pub use scanner::ElementScanner;
pub use session::GroundingSession;
pub use types::{
    BoundingBox, ElementAttributes, ElementRecord, GroundingConfig, GroundingResult, RawElement,
    UNBOUNDED_VIEWPORT,
};

/// The slice of the page handle the grounding core consumes.
#[async_trait]
pub trait GroundablePage: Send + Sync {
    /// Invoke a JavaScript function source with a single JSON argument.
    async fn evaluate_call(&self, function: &str, args: &Value) -> Result<Value, CdpError>;

    /// Capture the visible viewport as encoded image bytes.
    async fn screenshot(&self) -> Result<Vec<u8>, CdpError>;
}

#[async_trait]
impl GroundablePage for Page {
    async fn evaluate_call(&self, function: &str, args: &Value) -> Result<Value, CdpError> {
        Page::evaluate_call(self, function, args).await
    }

    async fn screenshot(&self) -> Result<Vec<u8>, CdpError> {
        Page::screenshot(self).await
    }
}

//! Data model for grounding results.

use serde::{Deserialize, Serialize};

/// Viewport expansion value meaning "include everything".
pub const UNBOUNDED_VIEWPORT: i32 = -1;

/// Axis-aligned rectangle in viewport pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Whether a point lies inside this box.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    /// Center point.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether this box intersects another.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}

/// Allowlisted attributes carried per element, for disambiguating
/// selector construction on the agent side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementAttributes {
    pub id: Option<String>,
    pub class: Option<String>,
    pub role: Option<String>,
    #[serde(rename = "aria-label")]
    pub aria_label: Option<String>,
    pub placeholder: Option<String>,
    pub name: Option<String>,
    pub value: Option<String>,
    pub href: Option<String>,
}

/// Raw per-element data as emitted by the injected scan script.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawElement {
    pub index: u32,
    pub tag: String,
    pub rect: BoundingBox,
    pub is_interactive: bool,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub selector: String,
    #[serde(default)]
    pub attributes: ElementAttributes,
}

/// One indexed element in a grounding inventory.
///
/// Indices are unique within a single grounding call and are not
/// stable across navigations or re-scans; each call is an independent
/// indexing pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementRecord {
    pub index: u32,
    pub tag: String,
    pub bounding_box: BoundingBox,
    pub is_interactive: bool,
    pub text: String,
    pub attributes: ElementAttributes,
    /// Best-effort unique CSS selector for acting on this element.
    pub selector: String,
}

/// Output of one grounding call: the indexed inventory plus the
/// screenshot in which those indices are drawn.
#[derive(Debug, Clone)]
pub struct GroundingResult {
    pub elements: Vec<ElementRecord>,
    pub screenshot: Vec<u8>,
}

/// Options for a grounding call.
#[derive(Debug, Clone)]
pub struct GroundingConfig {
    /// Draw the overlay before capturing. Disabled, the call still
    /// produces the inventory and a clean screenshot.
    pub highlight: bool,
    /// Restrict overlay rendering to a single index.
    pub focus_index: Option<u32>,
    /// Pixels beyond the viewport to include; [`UNBOUNDED_VIEWPORT`]
    /// includes all elements regardless of position.
    pub viewport_expansion: i32,
}

impl Default for GroundingConfig {
    fn default() -> Self {
        Self {
            highlight: true,
            focus_index: None,
            viewport_expansion: 0,
        }
    }
}

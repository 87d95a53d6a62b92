//! Inventory builder: raw candidates to element records.

use super::types::{ElementRecord, RawElement};

const MAX_TEXT_LEN: usize = 150;

/// Pure transformation from scanned candidates to the caller-facing
/// inventory shape. Runs after the overlay render so records reflect
/// capture-time geometry (the overlay itself causes no layout shift).
pub struct InventoryBuilder;

impl InventoryBuilder {
    /// Convert candidates in order, preserving their indices.
    pub fn build(candidates: Vec<RawElement>) -> Vec<ElementRecord> {
        candidates
            .into_iter()
            .map(|c| ElementRecord {
                index: c.index,
                tag: c.tag.to_lowercase(),
                bounding_box: c.rect,
                is_interactive: c.is_interactive,
                text: normalize_text(&c.text),
                attributes: c.attributes,
                selector: c.selector,
            })
            .collect()
    }
}

/// Collapse whitespace runs, trim, and cap the length.
fn normalize_text(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.len() > MAX_TEXT_LEN {
        let mut cut = MAX_TEXT_LEN;
        while !collapsed.is_char_boundary(cut) {
            cut -= 1;
        }
        collapsed[..cut].to_string()
    } else {
        collapsed
    }
}

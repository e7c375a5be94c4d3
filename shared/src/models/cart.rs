//! Cart line model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Size label → quantity
pub type SizeQuantities = BTreeMap<String, u32>;

/// Color code → size quantities
pub type ColorSelections = BTreeMap<String, SizeQuantities>;

/// One style's accumulated selections across colors and sizes
///
/// Invariant (upheld by the cart engine): every stored quantity is > 0, no
/// color maps to an empty size map, and a line in a cart has at least one color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Style code
    #[serde(rename = "name")]
    pub style: String,
    #[serde(default)]
    pub colors: ColorSelections,
}

impl CartLine {
    pub fn new(style: impl Into<String>) -> Self {
        Self {
            style: style.into(),
            colors: BTreeMap::new(),
        }
    }

    /// Sum of all quantities on this line
    pub fn total_quantity(&self) -> u64 {
        self.colors
            .values()
            .map(|sizes| sizes.values().map(|&q| u64::from(q)).sum::<u64>())
            .sum()
    }

    /// Sum of the quantities for one color
    pub fn color_total(&self, color: &str) -> u64 {
        self.colors
            .get(color)
            .map(|sizes| sizes.values().map(|&q| u64::from(q)).sum())
            .unwrap_or(0)
    }

    pub fn quantity(&self, color: &str, size: &str) -> Option<u32> {
        self.colors.get(color)?.get(size).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

//! Cart engine
//!
//! The cart is the single source of truth for the selections of one ordering
//! session. Callers push intents (add, edit, delete) and render from
//! [`Cart::summary_rows`].
//!
//! Invariants held after every operation:
//! - every stored quantity is > 0
//! - no color maps to an empty size map
//! - no line is empty, and at most one line exists per style

use crate::catalog::sizes::compare_sizes;
use shared::models::{ColorSelections, SizeQuantities};
use shared::{AppError, CartLine, ErrorCode};
use thiserror::Error;

/// Cart errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("Please select at least one size and quantity")]
    NothingSelected,

    #[error("Cart line {0} not found")]
    LineNotFound(usize),

    #[error("Color {color} not found on cart line {line}")]
    ColorNotFound { line: usize, color: String },
}

impl CartError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CartError::NothingSelected => ErrorCode::NothingSelected,
            CartError::LineNotFound(_) => ErrorCode::CartLineNotFound,
            CartError::ColorNotFound { .. } => ErrorCode::CartColorNotFound,
        }
    }
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        AppError::with_message(err.code(), err.to_string())
    }
}

/// What an edit or delete did to the targeted line
///
/// After `LineRemoved` the indices of every later line have shifted down by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineChange {
    Updated,
    ColorRemoved,
    LineRemoved,
}

/// One row of the cart summary: a (line, color) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub line_index: usize,
    pub style: String,
    pub color: String,
    /// (size, quantity) in size-table order
    pub sizes: Vec<(String, u32)>,
    pub total: u64,
}

impl SummaryRow {
    /// `"32B/2, 34B/1"`
    pub fn sizes_label(&self) -> String {
        self.sizes
            .iter()
            .map(|(size, qty)| format!("{}/{}", size, qty))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&CartLine> {
        self.lines.get(index)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn position(&self, style: &str) -> Option<usize> {
        self.lines.iter().position(|line| line.style == style)
    }

    /// Add a selection for a style, merging into its existing line
    ///
    /// Zero quantities are ignored. Fails without touching the cart when no
    /// quantity is positive.
    pub fn add_to_cart(&mut self, style: &str, selection: &ColorSelections) -> Result<(), CartError> {
        let mut added = ColorSelections::new();
        for (color, sizes) in selection {
            let positive: SizeQuantities = sizes
                .iter()
                .filter(|&(_, &qty)| qty > 0)
                .map(|(size, &qty)| (size.clone(), qty))
                .collect();
            if !positive.is_empty() {
                added.insert(color.clone(), positive);
            }
        }

        if added.is_empty() {
            return Err(CartError::NothingSelected);
        }

        match self.position(style) {
            Some(index) => {
                let line = &mut self.lines[index];
                for (color, sizes) in added {
                    let entry = line.colors.entry(color).or_default();
                    for (size, qty) in sizes {
                        let stored = entry.entry(size).or_insert(0);
                        *stored = stored.saturating_add(qty);
                    }
                }
            }
            None => self.lines.push(CartLine {
                style: style.to_string(),
                colors: added,
            }),
        }

        tracing::debug!(style = %style, total = self.total_quantity(), "Added to cart");
        Ok(())
    }

    /// Replace the size quantities of one color on a line
    ///
    /// Zero quantities drop the size; an empty color drops the color; an
    /// empty line is removed from the cart.
    pub fn edit_line(
        &mut self,
        index: usize,
        color: &str,
        sizes: &SizeQuantities,
    ) -> Result<LineChange, CartError> {
        let line = self
            .lines
            .get_mut(index)
            .ok_or(CartError::LineNotFound(index))?;
        let stored = line
            .colors
            .get_mut(color)
            .ok_or_else(|| CartError::ColorNotFound {
                line: index,
                color: color.to_string(),
            })?;

        *stored = sizes
            .iter()
            .filter(|&(_, &qty)| qty > 0)
            .map(|(size, &qty)| (size.clone(), qty))
            .collect();

        if !stored.is_empty() {
            return Ok(LineChange::Updated);
        }
        Ok(self.remove_color(index, color))
    }

    /// Remove a color from a line, removing the line when it empties
    pub fn delete_color_from_line(&mut self, index: usize, color: &str) -> Result<LineChange, CartError> {
        let line = self.lines.get(index).ok_or(CartError::LineNotFound(index))?;
        if !line.colors.contains_key(color) {
            return Err(CartError::ColorNotFound {
                line: index,
                color: color.to_string(),
            });
        }
        Ok(self.remove_color(index, color))
    }

    fn remove_color(&mut self, index: usize, color: &str) -> LineChange {
        let line = &mut self.lines[index];
        line.colors.remove(color);
        if line.colors.is_empty() {
            let removed = self.lines.remove(index);
            tracing::debug!(style = %removed.style, index, "Removed empty cart line");
            LineChange::LineRemoved
        } else {
            LineChange::ColorRemoved
        }
    }

    /// Sum of every stored quantity
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(CartLine::total_quantity).sum()
    }

    /// Discard every line
    pub fn empty(&mut self) {
        self.lines.clear();
    }

    /// Snapshot of the lines for an order record
    pub fn snapshot(&self) -> Vec<CartLine> {
        self.lines.clone()
    }

    /// One row per (line, color), in cart order
    pub fn summary_rows(&self) -> Vec<SummaryRow> {
        let mut rows = Vec::new();
        for (line_index, line) in self.lines.iter().enumerate() {
            for (color, sizes) in &line.colors {
                let mut pairs: Vec<(String, u32)> =
                    sizes.iter().map(|(size, &qty)| (size.clone(), qty)).collect();
                pairs.sort_by(|a, b| compare_sizes(&a.0, &b.0));

                rows.push(SummaryRow {
                    line_index,
                    style: line.style.clone(),
                    color: color.clone(),
                    total: line.color_total(color),
                    sizes: pairs,
                });
            }
        }
        rows
    }
}

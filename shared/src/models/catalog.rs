//! Catalog Model

use crate::serde_helpers::opt_string_or_number;
use serde::{Deserialize, Serialize};

/// One SKU row as exported to `catalog/items`
///
/// Every column is optional; rows without a style are dropped by the
/// transform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuRow {
    #[serde(rename = "Style", default, deserialize_with = "opt_string_or_number")]
    pub style: Option<String>,
    #[serde(rename = "Size", default, deserialize_with = "opt_string_or_number")]
    pub size: Option<String>,
    #[serde(rename = "Color", default, deserialize_with = "opt_string_or_number")]
    pub color: Option<String>,
    #[serde(
        rename = "Color Name",
        default,
        deserialize_with = "opt_string_or_number"
    )]
    pub color_name: Option<String>,
    #[serde(rename = "MRP", default, deserialize_with = "opt_string_or_number")]
    pub mrp: Option<String>,
}

impl SkuRow {
    pub fn new(style: impl Into<String>, size: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            style: Some(style.into()),
            size: Some(size.into()),
            color: Some(color.into()),
            color_name: None,
            mrp: None,
        }
    }

    pub fn with_color_name(mut self, name: impl Into<String>) -> Self {
        self.color_name = Some(name.into());
        self
    }

    pub fn with_mrp(mut self, mrp: impl Into<String>) -> Self {
        self.mrp = Some(mrp.into());
        self
    }
}

/// A style with every size and color it is sold in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Style code, e.g. `A039`
    pub name: String,
    /// Size labels, unique, in size-table order
    #[serde(default)]
    pub sizes: Vec<String>,
    /// Color codes, unique, first-seen order
    #[serde(default)]
    pub colors: Vec<String>,
    /// One `"{code} : {name}, {mrp}"` entry per color
    #[serde(rename = "colorname", default)]
    pub color_meta: Vec<String>,
}

impl CatalogItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sizes: Vec::new(),
            colors: Vec::new(),
            color_meta: Vec::new(),
        }
    }

    pub fn has_color(&self, color: &str) -> bool {
        self.colors.iter().any(|c| c == color)
    }

    pub fn has_size(&self, size: &str) -> bool {
        self.sizes.iter().any(|s| s == size)
    }

    /// The stored description entry for a color
    pub fn color_entry(&self, color: &str) -> Option<&str> {
        let prefix = format!("{} :", color);
        self.color_meta
            .iter()
            .find(|entry| entry.starts_with(&prefix))
            .map(String::as_str)
    }

    /// Color display name and MRP parsed back out of the description entry
    pub fn color_details(&self, color: &str) -> Option<(&str, &str)> {
        let entry = self.color_entry(color)?;
        let rest = entry.split_once(" : ")?.1;
        match rest.rsplit_once(", ") {
            Some((name, mrp)) => Some((name, mrp)),
            None => Some((rest.trim_end_matches(',').trim(), "")),
        }
    }
}

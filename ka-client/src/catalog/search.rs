//! Item list ordering and style search

use shared::CatalogItem;
use std::cmp::Ordering;

fn priority_rank<S: AsRef<str>>(name: &str, priority: &[S]) -> Option<usize> {
    priority.iter().position(|p| p.as_ref() == name)
}

fn compare_priority<S: AsRef<str>>(a: &str, b: &str, priority: &[S]) -> Ordering {
    match (priority_rank(a, priority), priority_rank(b, priority)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Full list order: priority styles in list order, then the rest by name
pub fn sort_for_display<'a, S: AsRef<str>>(
    items: &'a [CatalogItem],
    priority: &[S],
) -> Vec<&'a CatalogItem> {
    let mut sorted: Vec<&CatalogItem> = items.iter().collect();
    sorted.sort_by(|a, b| {
        compare_priority(&a.name, &b.name, priority).then_with(|| a.name.cmp(&b.name))
    });
    sorted
}

/// Case-insensitive substring search on the style name
///
/// Prefix matches come first, then priority styles in list order; otherwise
/// the catalog order is kept. An empty query returns every item.
pub fn filter_items<'a, S: AsRef<str>>(
    items: &'a [CatalogItem],
    query: &str,
    priority: &[S],
) -> Vec<&'a CatalogItem> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return items.iter().collect();
    }

    let mut matches: Vec<&CatalogItem> = items
        .iter()
        .filter(|item| item.name.to_lowercase().contains(&query))
        .collect();

    // Stable sort keeps catalog order for ties
    matches.sort_by(|a, b| {
        let a_prefix = a.name.to_lowercase().starts_with(&query);
        let b_prefix = b.name.to_lowercase().starts_with(&query);
        b_prefix
            .cmp(&a_prefix)
            .then_with(|| compare_priority(&a.name, &b.name, priority))
    });
    matches
}

/// The preferred style when present, else the first item
pub fn default_item<'a>(items: &'a [CatalogItem], preferred: &str) -> Option<&'a CatalogItem> {
    items
        .iter()
        .find(|item| item.name == preferred)
        .or_else(|| items.first())
}

//! Size ordering
//!
//! Sizes sort by their position in [`SIZE_ORDER`]: bra sizes first, then alpha
//! sizes, then numeric waist sizes. Labels missing from the table trail the
//! known ones and sort lexicographically among themselves.

use std::cmp::Ordering;

pub const SIZE_ORDER: &[&str] = &[
    "30A", "30B", "30C", "30D", "30DD", "30E", //
    "32A", "32B", "32C", "32D", "32DD", "32E", "32Z", //
    "34A", "34B", "34C", "34D", "34DD", "34E", "34Z", //
    "36A", "36B", "36C", "36D", "36DD", "36E", "36Z", //
    "38A", "38B", "38C", "38D", "38DD", "38E", "38Z", //
    "40A", "40B", "40C", "40D", "40DD", "40E", "40Z", //
    "42A", "42B", "42C", "42D", "42DD", "42E", "42Z", //
    "44A", "44B", "44C", "44D", "44DD", "44E", "44Z", //
    "XS", "S", "M", "L", "XL", "XXL", "3XL", "4XL", "5XL", //
    "28", "30", "32", "34", "36", "38", "40", "42", "44",
];

/// Position of a size label in the table
pub fn size_rank(size: &str) -> Option<usize> {
    SIZE_ORDER.iter().position(|s| *s == size)
}

/// Comparator for size labels
pub fn compare_sizes(a: &str, b: &str) -> Ordering {
    match (size_rank(a), size_rank(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Sort size labels in place
pub fn sort_sizes<S: AsRef<str>>(sizes: &mut [S]) {
    sizes.sort_by(|a, b| compare_sizes(a.as_ref(), b.as_ref()));
}

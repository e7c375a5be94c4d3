//! Order Model

use super::cart::CartLine;
use crate::sizes::compare_sizes;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Minimum width of a formatted reference number
///
/// Numbers are zero-padded up to this width and grow past it unpadded
/// (`7` → `"007"`, `1042` → `"1042"`).
pub const REFERENCE_NUMBER_WIDTH: usize = 3;

/// Order status as written by the ordering client
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "Approval Pending")]
    ApprovalPending,
}

/// Order record stored under `pendingOrders/<referenceNumber>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub reference_number: String,
    pub party_name: String,
    /// ISO-8601 UTC timestamp with milliseconds
    pub date_time: String,
    pub items: Vec<CartLine>,
    pub status: OrderStatus,
    pub total_quantity: u64,
    #[serde(default)]
    pub order_note: String,
}

impl Order {
    /// Format a counter value as a reference number
    pub fn format_reference(counter: u64) -> String {
        format!("{:0width$}", counter, width = REFERENCE_NUMBER_WIDTH)
    }

    /// Plain-text order summary for sharing through a messaging app
    pub fn share_message(&self) -> String {
        let mut msg = format!("Kindly find the attached order of {}\n\n", self.party_name);

        for line in &self.items {
            let _ = writeln!(msg, "{}", line.style);
            for (color, sizes) in &line.colors {
                let mut entries: Vec<_> = sizes.iter().filter(|&(_, &qty)| qty > 0).collect();
                entries.sort_by(|a, b| compare_sizes(a.0, b.0));
                for (size, qty) in entries {
                    let _ = writeln!(msg, "{} - {} / {}", color, size, qty);
                }
            }
            msg.push('\n');
        }

        let _ = write!(msg, "TOTAL: {}", self.total_quantity);
        msg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn order() -> Order {
        let mut line = CartLine::new("A039");
        line.colors.insert(
            "BLK".into(),
            BTreeMap::from([("32B".to_string(), 2), ("34B".to_string(), 1)]),
        );
        Order {
            reference_number: "007".into(),
            party_name: "Mehta Stores".into(),
            date_time: "2024-05-01T09:30:00.000Z".into(),
            items: vec![line],
            status: OrderStatus::ApprovalPending,
            total_quantity: 3,
            order_note: String::new(),
        }
    }

    #[test]
    fn test_format_reference() {
        assert_eq!(Order::format_reference(1), "001");
        assert_eq!(Order::format_reference(42), "042");
        assert_eq!(Order::format_reference(999), "999");
        assert_eq!(Order::format_reference(1000), "1000");
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(order()).unwrap();
        assert_eq!(json["referenceNumber"], "007");
        assert_eq!(json["partyName"], "Mehta Stores");
        assert_eq!(json["status"], "Approval Pending");
        assert_eq!(json["totalQuantity"], 3);
        assert_eq!(json["orderNote"], "");
        assert_eq!(json["items"][0]["name"], "A039");
    }

    #[test]
    fn test_share_message() {
        let expected = "Kindly find the attached order of Mehta Stores\n\n\
                        A039\n\
                        BLK - 32B / 2\n\
                        BLK - 34B / 1\n\
                        \n\
                        TOTAL: 3";
        assert_eq!(order().share_message(), expected);
    }

    #[test]
    fn test_share_message_lists_sizes_in_size_order() {
        let mut order = order();
        order.items[0].colors.insert(
            "SKN".into(),
            BTreeMap::from([
                ("L".to_string(), 1),
                ("M".to_string(), 2),
                ("S".to_string(), 0),
                ("XS".to_string(), 3),
            ]),
        );
        let msg = order.share_message();
        let expected = "SKN - XS / 3\n\
                        SKN - M / 2\n\
                        SKN - L / 1\n";
        assert!(msg.contains(expected), "{}", msg);
        assert!(!msg.contains("SKN - S /"));
    }
}

//! Orders as recorded by the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::Product;
use super::id::OrderId;
use super::price::Price;
use super::user::Principal;

/// Status value the backend uses for paid orders.
pub const ORDER_STATUS_COMPLETED: &str = "completed";

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderId,
    pub status: String,
    pub total_amount: Price,
    /// Nanoseconds since the Unix epoch.
    pub timestamp: i64,
    pub customer_id: Principal,
    pub ordered_products: Vec<Product>,
}

impl OrderItem {
    /// Whether the order has been paid.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == ORDER_STATUS_COMPLETED
    }

    /// Placement time in UTC.
    #[must_use]
    pub fn placed_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.timestamp)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_wire_format() {
        let json = r#"{
            "id": 9,
            "status": "completed",
            "totalAmount": 120,
            "timestamp": 1700000000000000000,
            "customerId": "2vxsx-fae",
            "orderedProducts": []
        }"#;
        let order: OrderItem = serde_json::from_str(json).unwrap();
        assert_eq!(order.id, OrderId::new(9));
        assert!(order.is_completed());
        assert_eq!(order.total_amount, Price::new(120));
        assert_eq!(order.placed_at().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_pending_order_is_not_completed() {
        let order = OrderItem {
            id: OrderId::new(1),
            status: "pending".to_string(),
            total_amount: Price::new(0),
            timestamp: 0,
            customer_id: Principal::new("2vxsx-fae"),
            ordered_products: Vec::new(),
        };
        assert!(!order.is_completed());
    }
}

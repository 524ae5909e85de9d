//! Order types: stored rows, creation payloads, and validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cortado_core::{OrderId, OrderStatus, UserId};

/// One line entry of an order.
///
/// `name` references a catalog product by free-form name (matched
/// case-insensitively for capacity counting); `size` is whatever the app
/// sent, typically a cup size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub size: String,
    pub quantity: u32,
}

/// A stored customer pickup request.
///
/// `user_id` and `order_items` never change after insert; baristas move
/// `status` along, nothing else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_name: String,
    #[serde(default)]
    pub customer_avatar: Option<String>,
    pub pickup_time: DateTime<Utc>,
    pub status: OrderStatus,
    #[serde(default = "default_total_items")]
    pub total_items: u32,
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

const fn default_total_items() -> u32 {
    1
}

/// `POST /orders` request body.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_avatar: Option<String>,
    #[serde(default)]
    pub pickup_time: String,
    #[serde(default)]
    pub total_items: Option<u32>,
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
}

/// A validated order, ready to be priced against a slot and inserted.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_avatar: Option<String>,
    pub pickup_time: DateTime<Utc>,
    pub total_items: u32,
    pub order_items: Vec<OrderItem>,
}

impl CreateOrderRequest {
    /// Validate the payload shape and parse the pickup timestamp.
    ///
    /// # Errors
    ///
    /// Returns a client-repairable message when a field is missing or out of
    /// range, or when `pickup_time` is not a valid instant.
    pub fn validate(self) -> Result<NewOrder, String> {
        if self.customer_name.trim().is_empty() {
            return Err("customer_name is required".to_owned());
        }
        if let Some(avatar) = &self.customer_avatar
            && avatar.is_empty()
        {
            return Err("customer_avatar cannot be empty".to_owned());
        }

        let total_items = self.total_items.unwrap_or(1);
        if total_items < 1 {
            return Err("total_items must be at least 1".to_owned());
        }

        for item in &self.order_items {
            if item.name.is_empty() || item.size.is_empty() || item.quantity < 1 {
                return Err(
                    "each order item needs a name, a size, and a quantity of at least 1"
                        .to_owned(),
                );
            }
        }

        let pickup_time = parse_pickup_time(&self.pickup_time)?;

        Ok(NewOrder {
            customer_name: self.customer_name,
            customer_avatar: self.customer_avatar,
            pickup_time,
            total_items,
            order_items: self.order_items,
        })
    }
}

/// Parse an ISO 8601 pickup timestamp into an instant.
///
/// # Errors
///
/// Returns the message the apps display verbatim when the string does not
/// parse.
pub fn parse_pickup_time(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| "Invalid pickup_time".to_owned())
}

/// Insert body for the `orders` table. `id` and `created_at` are assigned
/// by the store.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrderRow {
    pub customer_name: String,
    pub customer_avatar: Option<String>,
    pub pickup_time: DateTime<Utc>,
    pub total_items: u32,
    pub order_items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub user_id: UserId,
}

impl NewOrderRow {
    /// Bind a validated order to its creator. Every order starts `new`.
    #[must_use]
    pub fn new(order: NewOrder, user_id: UserId) -> Self {
        Self {
            customer_name: order.customer_name,
            customer_avatar: order.customer_avatar,
            pickup_time: order.pickup_time,
            total_items: order.total_items,
            order_items: order.order_items,
            status: OrderStatus::new_order(),
            user_id,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request() -> CreateOrderRequest {
        CreateOrderRequest {
            customer_name: "Mika".to_owned(),
            customer_avatar: None,
            pickup_time: "2026-08-07T10:15:00.000Z".to_owned(),
            total_items: None,
            order_items: vec![],
        }
    }

    #[test]
    fn test_validate_applies_defaults() {
        let order = request().validate().unwrap();
        assert_eq!(order.total_items, 1);
        assert!(order.order_items.is_empty());
        assert_eq!(
            order.pickup_time,
            parse_pickup_time("2026-08-07T10:15:00Z").unwrap()
        );
    }

    #[test]
    fn test_validate_requires_customer_name() {
        let mut req = request();
        req.customer_name = "  ".to_owned();
        assert_eq!(req.validate().unwrap_err(), "customer_name is required");
    }

    #[test]
    fn test_validate_rejects_zero_total_items() {
        let mut req = request();
        req.total_items = Some(0);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_pickup_time() {
        let mut req = request();
        req.pickup_time = "next tuesday".to_owned();
        assert_eq!(req.validate().unwrap_err(), "Invalid pickup_time");

        let mut req = request();
        req.pickup_time = String::new();
        assert_eq!(req.validate().unwrap_err(), "Invalid pickup_time");
    }

    #[test]
    fn test_validate_rejects_malformed_items() {
        let mut req = request();
        req.order_items = vec![OrderItem {
            name: "Latte".to_owned(),
            size: "Small".to_owned(),
            quantity: 0,
        }];
        assert!(req.validate().is_err());

        let mut req = request();
        req.order_items = vec![OrderItem {
            name: String::new(),
            size: "Small".to_owned(),
            quantity: 1,
        }];
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_pickup_time_accepts_offsets() {
        let utc = parse_pickup_time("2026-08-07T10:15:00Z").unwrap();
        let offset = parse_pickup_time("2026-08-07T12:15:00+02:00").unwrap();
        assert_eq!(utc, offset);
    }

    #[test]
    fn test_new_row_starts_new_with_owner() {
        let order = request().validate().unwrap();
        let owner = UserId::new(uuid::Uuid::new_v4());
        let row = NewOrderRow::new(order, owner);

        assert_eq!(row.status, OrderStatus::new_order());
        assert_eq!(row.user_id, owner);
    }

    #[test]
    fn test_order_deserializes_store_row() {
        let json = serde_json::json!({
            "id": "3e9a4f7b-1c2d-4e5f-8a9b-0c1d2e3f4a5b",
            "customer_name": "Mika",
            "customer_avatar": null,
            "pickup_time": "2026-08-07T10:15:00+00:00",
            "status": "new",
            "total_items": 2,
            "order_items": [{"name": "Latte", "size": "Large", "quantity": 2}],
            "user_id": "11111111-2222-4333-8444-555555555555",
            "created_at": "2026-08-07T09:58:41.123456+00:00"
        });

        let order: Order = serde_json::from_value(json).unwrap();
        assert_eq!(order.total_items, 2);
        assert_eq!(order.order_items.len(), 1);
        assert_eq!(order.status.as_str(), "new");
    }

    #[test]
    fn test_order_tolerates_missing_item_columns() {
        // Rows written before the order_items column existed.
        let json = serde_json::json!({
            "id": "3e9a4f7b-1c2d-4e5f-8a9b-0c1d2e3f4a5b",
            "customer_name": "Mika",
            "pickup_time": "2026-08-07T10:15:00+00:00",
            "status": "ready",
            "user_id": "11111111-2222-4333-8444-555555555555",
            "created_at": "2026-08-07T09:58:41+00:00"
        });

        let order: Order = serde_json::from_value(json).unwrap();
        assert_eq!(order.total_items, 1);
        assert!(order.order_items.is_empty());
    }
}

//! Order status and input validation

use std::fmt;
use std::str::FromStr;

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::{EmailAddress, ValidationError};

/// Maximum number of line items on one order
const MAX_ORDER_ITEMS: usize = 100;

/// Order lifecycle state, stored as a lowercase string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(ValidationError::InvalidVariant {
                field: "status",
                value: other.to_owned(),
            }),
        }
    }
}

/// One validated order line item
#[derive(Debug, Clone)]
pub struct OrderItemDraft {
    pub product_id: ObjectId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: f64,
}

impl OrderItemDraft {
    pub fn new(
        product_id: ObjectId,
        name: &str,
        quantity: u32,
        unit_price: f64,
    ) -> Result<Self, ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::Empty { field: "item name" });
        }

        if quantity == 0 {
            return Err(ValidationError::OutOfRange {
                field: "quantity",
                reason: "must be at least 1",
            });
        }

        if !unit_price.is_finite() || unit_price < 0.0 {
            return Err(ValidationError::OutOfRange {
                field: "unit_price",
                reason: "must be a non-negative number",
            });
        }

        Ok(Self {
            product_id,
            name: name.trim().to_owned(),
            quantity,
            unit_price,
        })
    }

    /// Line total for this item.
    pub fn subtotal(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }
}

/// Validated order input. The total is always computed here, never
/// taken from the client.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub email: EmailAddress,
    pub items: Vec<OrderItemDraft>,
    pub total: f64,
}

impl OrderDraft {
    pub fn new(email: EmailAddress, items: Vec<OrderItemDraft>) -> Result<Self, ValidationError> {
        if items.is_empty() {
            return Err(ValidationError::Empty { field: "items" });
        }

        if items.len() > MAX_ORDER_ITEMS {
            return Err(ValidationError::TooLong {
                field: "items",
                max: MAX_ORDER_ITEMS,
            });
        }

        let total = items.iter().map(OrderItemDraft::subtotal).sum();

        Ok(Self {
            email,
            items,
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: u32, unit_price: f64) -> OrderItemDraft {
        OrderItemDraft::new(ObjectId::new(), "Chips", quantity, unit_price).unwrap()
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Paid,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!("Shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
    }

    #[test]
    fn status_rejects_unknown_value() {
        assert!("refunded".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn item_rejects_zero_quantity() {
        assert!(OrderItemDraft::new(ObjectId::new(), "Chips", 0, 1.0).is_err());
    }

    #[test]
    fn draft_rejects_empty_items() {
        let email = EmailAddress::new("sam@example.com").unwrap();
        assert!(OrderDraft::new(email, vec![]).is_err());
    }

    #[test]
    fn draft_computes_total() {
        let email = EmailAddress::new("sam@example.com").unwrap();
        let draft = OrderDraft::new(email, vec![item(2, 2.50), item(1, 1.25)]).unwrap();
        assert!((draft.total - 6.25).abs() < f64::EPSILON);
    }
}

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::checkout::errors::CheckoutError;
use crate::domain::user::models::UserId;

/// Largest unit price accepted for a cart line (999,999.99).
pub const MAX_UNIT_AMOUNT_CENTS: i64 = 99_999_999;

/// One product line of a cart, priced in integer cents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub product_id: String,
    pub name: String,
    pub image: Option<String>,
    pub unit_amount_cents: i64,
    pub quantity: u32,
}

impl LineItem {
    /// Validate a cart line.
    ///
    /// # Errors
    /// * `InvalidItem` - Missing product id or name, zero quantity, or a price
    ///   outside `0..=MAX_UNIT_AMOUNT_CENTS`
    pub fn new(
        product_id: String,
        name: String,
        image: Option<String>,
        unit_amount_cents: i64,
        quantity: u32,
    ) -> Result<Self, CheckoutError> {
        if product_id.trim().is_empty() {
            return Err(CheckoutError::InvalidItem("product id is required".to_string()));
        }
        if name.trim().is_empty() {
            return Err(CheckoutError::InvalidItem(format!(
                "product {} has no name",
                product_id
            )));
        }
        if quantity == 0 {
            return Err(CheckoutError::InvalidItem(format!(
                "product {} has zero quantity",
                product_id
            )));
        }
        if unit_amount_cents < 0 {
            return Err(CheckoutError::InvalidItem(format!(
                "product {} has a negative price",
                product_id
            )));
        }
        if unit_amount_cents > MAX_UNIT_AMOUNT_CENTS {
            return Err(CheckoutError::InvalidItem(format!(
                "product {} exceeds the maximum price",
                product_id
            )));
        }

        Ok(Self {
            product_id,
            name,
            image,
            unit_amount_cents,
            quantity,
        })
    }

    /// # Errors
    /// * `AmountOutOfRange` - Price times quantity does not fit in cents
    pub fn subtotal_cents(&self) -> Result<i64, CheckoutError> {
        self.unit_amount_cents
            .checked_mul(i64::from(self.quantity))
            .ok_or(CheckoutError::AmountOutOfRange)
    }
}

/// Convert a price in major currency units to integer cents.
///
/// # Errors
/// * `InvalidItem` - Not a finite number, negative, or above `MAX_UNIT_AMOUNT_CENTS`
pub fn to_cents(amount: f64) -> Result<i64, CheckoutError> {
    let cents = (amount * 100.0).round();
    if !cents.is_finite() || cents < 0.0 || cents > MAX_UNIT_AMOUNT_CENTS as f64 {
        return Err(CheckoutError::InvalidItem(format!(
            "price {} is out of range",
            amount
        )));
    }

    Ok(cents as i64)
}

/// Convert integer cents back to major currency units.
pub fn from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Validated request to open a hosted checkout.
#[derive(Debug, Clone)]
pub struct CheckoutCommand {
    pub items: Vec<LineItem>,
    pub coupon_code: Option<String>,
}

impl CheckoutCommand {
    /// # Errors
    /// * `EmptyCart` - No items
    pub fn new(items: Vec<LineItem>, coupon_code: Option<String>) -> Result<Self, CheckoutError> {
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let coupon_code = coupon_code
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty());

        Ok(Self { items, coupon_code })
    }

    /// # Errors
    /// * `AmountOutOfRange` - Cart total does not fit in cents
    pub fn total_cents(&self) -> Result<i64, CheckoutError> {
        self.items.iter().try_fold(0i64, |total, item| {
            total
                .checked_add(item.subtotal_cents()?)
                .ok_or(CheckoutError::AmountOutOfRange)
        })
    }
}

/// Line of a recorded order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(rename = "id")]
    pub product_id: String,
    pub quantity: u32,
    #[serde(rename = "price")]
    pub unit_amount_cents: i64,
}

impl From<&LineItem> for OrderItem {
    fn from(item: &LineItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            quantity: item.quantity,
            unit_amount_cents: item.unit_amount_cents,
        }
    }
}

/// Data carried through the payment provider and read back on completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutMetadata {
    pub user_id: UserId,
    pub coupon_code: Option<String>,
    pub items: Vec<OrderItem>,
}

/// Percentage discount applied to a whole checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discount {
    pub code: String,
    pub percentage: u8,
}

/// What the payment gateway needs to open a hosted checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSessionRequest {
    pub line_items: Vec<LineItem>,
    pub discount: Option<Discount>,
    pub metadata: CheckoutMetadata,
}

/// A hosted checkout as reported by the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSession {
    pub id: String,
    pub url: Option<String>,
    pub amount_total_cents: Option<i64>,
    pub paid: bool,
    pub metadata: Option<CheckoutMetadata>,
}

/// Result of opening a checkout, returned to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
    pub total_amount_cents: i64,
}

/// A completed purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: Uuid,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub total_amount_cents: i64,
    pub payment_session_id: String,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a checkout completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedCheckout {
    pub order: Order,
    /// False when the order had already been recorded by an earlier call.
    pub newly_created: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price_cents: i64, quantity: u32) -> LineItem {
        LineItem::new(
            "p1".to_string(),
            "Jeans".to_string(),
            None,
            price_cents,
            quantity,
        )
        .unwrap()
    }

    #[test]
    fn test_to_cents_rounds() {
        assert_eq!(to_cents(19.99), Ok(1999));
        assert_eq!(to_cents(0.1 + 0.2), Ok(30));
        assert_eq!(from_cents(1999), 19.99);
    }

    #[test]
    fn test_total_sums_quantities() {
        let command = CheckoutCommand::new(vec![item(1999, 2), item(500, 1)], None).unwrap();
        assert_eq!(command.total_cents(), Ok(4498));
    }

    #[test]
    fn test_to_cents_rejects_unusable_prices() {
        assert!(matches!(to_cents(1e17), Err(CheckoutError::InvalidItem(_))));
        assert!(matches!(to_cents(f64::INFINITY), Err(CheckoutError::InvalidItem(_))));
        assert!(matches!(to_cents(f64::NAN), Err(CheckoutError::InvalidItem(_))));
        assert!(matches!(to_cents(-0.5), Err(CheckoutError::InvalidItem(_))));
        assert_eq!(to_cents(999_999.99), Ok(MAX_UNIT_AMOUNT_CENTS));
    }

    #[test]
    fn test_total_reports_overflow_instead_of_wrapping() {
        let huge = LineItem {
            product_id: "p1".to_string(),
            name: "Yacht".to_string(),
            image: None,
            unit_amount_cents: i64::MAX / 2,
            quantity: 2,
        };
        let command = CheckoutCommand::new(vec![huge.clone(), huge], None).unwrap();

        assert_eq!(command.total_cents(), Err(CheckoutError::AmountOutOfRange));
        assert_eq!(
            command.items[0].subtotal_cents(),
            Ok(i64::MAX / 2 * 2)
        );
    }

    #[test]
    fn test_empty_cart_rejected() {
        assert_eq!(
            CheckoutCommand::new(vec![], None).unwrap_err(),
            CheckoutError::EmptyCart
        );
    }

    #[test]
    fn test_blank_coupon_code_is_dropped() {
        let command = CheckoutCommand::new(vec![item(100, 1)], Some("  ".to_string())).unwrap();
        assert_eq!(command.coupon_code, None);
    }

    #[test]
    fn test_line_item_validation() {
        assert!(LineItem::new("p1".into(), "Jeans".into(), None, 100, 0).is_err());
        assert!(LineItem::new("p1".into(), "Jeans".into(), None, -1, 1).is_err());
        assert!(LineItem::new(" ".into(), "Jeans".into(), None, 100, 1).is_err());
        assert!(LineItem::new(
            "p1".into(),
            "Jeans".into(),
            None,
            MAX_UNIT_AMOUNT_CENTS + 1,
            1
        )
        .is_err());
    }

    #[test]
    fn test_order_item_wire_names() {
        let json = serde_json::to_value(OrderItem::from(&item(1999, 2))).unwrap();
        assert_eq!(json, serde_json::json!({"id": "p1", "quantity": 2, "price": 1999}));
    }
}

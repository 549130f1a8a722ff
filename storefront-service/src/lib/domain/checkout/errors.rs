use thiserror::Error;

use crate::coupon::errors::CouponError;

/// Errors for checkout session creation and completion
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Invalid or empty products array")]
    EmptyCart,

    #[error("Invalid product: {0}")]
    InvalidItem(String),

    #[error("Order total is out of range")]
    AmountOutOfRange,

    #[error("Checkout session not found")]
    SessionNotFound,

    #[error("Payment not completed")]
    PaymentNotCompleted,

    #[error("Order already recorded for payment session {0}")]
    DuplicateOrder(String),

    #[error("Checkout session metadata is unreadable: {0}")]
    MalformedMetadata(String),

    #[error("Payment gateway error: {0}")]
    Gateway(String),

    #[error(transparent)]
    Coupon(#[from] CouponError),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

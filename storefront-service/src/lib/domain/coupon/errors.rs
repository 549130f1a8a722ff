use thiserror::Error;

/// Errors for coupon lookup and validation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CouponError {
    #[error("Coupon code is required")]
    MissingCode,

    #[error("Coupon not found")]
    NotFound,

    #[error("Coupon expired")]
    Expired,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

pub mod checkout;
pub mod coupon;
pub mod session;
pub mod user;

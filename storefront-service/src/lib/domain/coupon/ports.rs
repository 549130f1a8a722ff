use async_trait::async_trait;

use crate::domain::coupon::errors::CouponError;
use crate::domain::coupon::models::Coupon;
use crate::domain::user::models::UserId;

/// Port for coupon desk operations.
#[async_trait]
pub trait CouponServicePort: Send + Sync + 'static {
    /// The caller's active coupon, if they have one.
    async fn get_active_coupon(&self, user_id: &UserId) -> Result<Option<Coupon>, CouponError>;

    /// Check that `code` names an active, unexpired coupon of the caller.
    ///
    /// # Errors
    /// * `MissingCode` - Empty code
    /// * `NotFound` - No active coupon of this user has that code
    /// * `Expired` - Coupon is past its expiration (it is deactivated as a side effect)
    async fn validate_coupon(&self, user_id: &UserId, code: &str) -> Result<Coupon, CouponError>;
}

/// Persistence operations for coupons.
#[async_trait]
pub trait CouponRepository: Send + Sync + 'static {
    async fn find_active_for_user(&self, user_id: &UserId) -> Result<Option<Coupon>, CouponError>;

    async fn find_active_by_code(
        &self,
        user_id: &UserId,
        code: &str,
    ) -> Result<Option<Coupon>, CouponError>;

    /// Store `coupon` as the user's only coupon, dropping any previous one.
    async fn replace_for_user(&self, coupon: Coupon) -> Result<Coupon, CouponError>;

    /// Mark the user's coupon with `code` inactive. Unknown codes are ignored.
    async fn deactivate(&self, user_id: &UserId, code: &str) -> Result<(), CouponError>;
}

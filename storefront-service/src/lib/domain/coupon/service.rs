use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::coupon::errors::CouponError;
use crate::domain::coupon::models::Coupon;
use crate::domain::coupon::ports::CouponRepository;
use crate::domain::coupon::ports::CouponServicePort;
use crate::domain::user::models::UserId;

/// Domain service for coupon lookup and validation.
pub struct CouponService<CR>
where
    CR: CouponRepository,
{
    repository: Arc<CR>,
}

impl<CR> CouponService<CR>
where
    CR: CouponRepository,
{
    pub fn new(repository: Arc<CR>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<CR> CouponServicePort for CouponService<CR>
where
    CR: CouponRepository,
{
    async fn get_active_coupon(&self, user_id: &UserId) -> Result<Option<Coupon>, CouponError> {
        self.repository.find_active_for_user(user_id).await
    }

    async fn validate_coupon(&self, user_id: &UserId, code: &str) -> Result<Coupon, CouponError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(CouponError::MissingCode);
        }

        let coupon = self
            .repository
            .find_active_by_code(user_id, code)
            .await?
            .ok_or(CouponError::NotFound)?;

        if coupon.is_expired(Utc::now()) {
            self.repository.deactivate(user_id, &coupon.code).await?;
            tracing::info!(user_id = %user_id, code = %coupon.code, "Expired coupon deactivated");
            return Err(CouponError::Expired);
        }

        Ok(coupon)
    }
}

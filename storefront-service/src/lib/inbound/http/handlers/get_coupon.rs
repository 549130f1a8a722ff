use axum::extract::State;
use axum::Extension;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use super::ApiSuccess;
use crate::domain::coupon::models::Coupon;
use crate::domain::coupon::ports::CouponServicePort;
use crate::inbound::http::errors::ApiError;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn get_coupon(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Result<ApiSuccess<Option<CouponResponse>>, ApiError> {
    let coupon = state.coupon_service.get_active_coupon(&user.id).await?;
    Ok(ApiSuccess::ok(coupon.as_ref().map(CouponResponse::from)))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub code: String,
    pub discount_percentage: u8,
    pub expiration_date: DateTime<Utc>,
    pub is_active: bool,
    pub user_id: String,
}

impl From<&Coupon> for CouponResponse {
    fn from(coupon: &Coupon) -> Self {
        Self {
            id: coupon.id.to_string(),
            code: coupon.code.clone(),
            discount_percentage: coupon.discount_percentage,
            expiration_date: coupon.expiration_date,
            is_active: coupon.is_active,
            user_id: coupon.user_id.to_string(),
        }
    }
}

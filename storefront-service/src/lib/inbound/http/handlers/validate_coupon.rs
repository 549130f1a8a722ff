use axum::extract::State;
use axum::Extension;
use axum::Json;
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use serde::Serialize;

use super::ApiSuccess;
use crate::domain::coupon::ports::CouponServicePort;
use crate::inbound::http::errors::ApiError;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn validate_coupon(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    WithRejection(Json(body), _): WithRejection<Json<ValidateCouponRequest>, ApiError>,
) -> Result<ApiSuccess<ValidateCouponResponse>, ApiError> {
    let coupon = state
        .coupon_service
        .validate_coupon(&user.id, &body.code)
        .await?;

    Ok(ApiSuccess::ok(ValidateCouponResponse {
        message: "Coupon is valid".to_string(),
        code: coupon.code,
        discount_percentage: coupon.discount_percentage,
    }))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ValidateCouponRequest {
    #[serde(default)]
    code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCouponResponse {
    pub message: String,
    pub code: String,
    pub discount_percentage: u8,
}

use axum::extract::State;
use axum::Extension;
use axum::Json;
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use serde::Serialize;

use super::ApiSuccess;
use crate::domain::checkout::ports::CheckoutServicePort;
use crate::inbound::http::errors::ApiError;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn checkout_success(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    WithRejection(Json(body), _): WithRejection<Json<CheckoutSuccessRequest>, ApiError>,
) -> Result<ApiSuccess<CheckoutSuccessResponse>, ApiError> {
    let session_id = body.session_id.trim();
    if session_id.is_empty() {
        return Err(ApiError::bad_request("Session id is required"));
    }

    let completed = state
        .checkout_service
        .complete_checkout(&user.id, session_id)
        .await?;

    let message = if completed.newly_created {
        "Payment successful, order created, and coupon deactivated if used."
    } else {
        "Order already recorded for this checkout session."
    };

    Ok(ApiSuccess::ok(CheckoutSuccessResponse {
        success: true,
        message: message.to_string(),
        order_id: completed.order.id.to_string(),
    }))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSuccessRequest {
    #[serde(default)]
    session_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSuccessResponse {
    pub success: bool,
    pub message: String,
    pub order_id: String,
}

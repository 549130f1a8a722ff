use axum::extract::State;
use axum::Extension;
use axum::Json;
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use serde::Serialize;

use super::ApiSuccess;
use crate::checkout::errors::CheckoutError;
use crate::domain::checkout::models::from_cents;
use crate::domain::checkout::models::to_cents;
use crate::domain::checkout::models::CheckoutCommand;
use crate::domain::checkout::models::LineItem;
use crate::domain::checkout::ports::CheckoutServicePort;
use crate::inbound::http::errors::ApiError;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn create_checkout_session(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    WithRejection(Json(body), _): WithRejection<Json<CreateCheckoutSessionRequest>, ApiError>,
) -> Result<ApiSuccess<CreateCheckoutSessionResponse>, ApiError> {
    let session = state
        .checkout_service
        .create_checkout_session(&user.id, body.try_into_command()?)
        .await?;

    Ok(ApiSuccess::ok(CreateCheckoutSessionResponse {
        id: session.id,
        url: session.url,
        total_amount: from_cents(session.total_amount_cents),
    }))
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutSessionRequest {
    #[serde(default)]
    products: Vec<ProductRequest>,
    #[serde(default)]
    coupon_code: Option<String>,
}

/// Cart line as sent by the storefront, price in major currency units.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductRequest {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    #[serde(default)]
    image: Option<String>,
    price: f64,
    #[serde(default = "default_quantity")]
    quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl CreateCheckoutSessionRequest {
    fn try_into_command(self) -> Result<CheckoutCommand, CheckoutError> {
        let items = self
            .products
            .into_iter()
            .map(|product| {
                let unit_amount_cents = to_cents(product.price)?;
                LineItem::new(
                    product.id,
                    product.name,
                    product.image,
                    unit_amount_cents,
                    product.quantity,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        CheckoutCommand::new(items, self.coupon_code)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutSessionResponse {
    pub id: String,
    pub url: Option<String>,
    pub total_amount: f64,
}

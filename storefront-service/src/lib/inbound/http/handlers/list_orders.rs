use axum::extract::Query;
use axum::extract::State;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::ApiSuccess;
use crate::domain::checkout::models::from_cents;
use crate::domain::checkout::models::Order;
use crate::domain::checkout::models::OrderItem;
use crate::domain::checkout::ports::CheckoutServicePort;
use crate::inbound::http::errors::ApiError;
use crate::inbound::http::router::AppState;

const DEFAULT_LIMIT: u32 = 50;
const MAX_LIMIT: u32 = 200;

pub async fn list_orders(
    State(state): State<AppState>,
    Query(params): Query<ListOrdersParams>,
) -> Result<ApiSuccess<Vec<OrderResponse>>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let orders = state.checkout_service.list_orders(limit).await?;

    Ok(ApiSuccess::ok(orders.iter().map(OrderResponse::from).collect()))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListOrdersParams {
    limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "user")]
    pub user_id: String,
    pub products: Vec<OrderLineResponse>,
    pub total_amount: f64,
    pub stripe_session_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            user_id: order.user_id.to_string(),
            products: order.items.iter().map(OrderLineResponse::from).collect(),
            total_amount: from_cents(order.total_amount_cents),
            stripe_session_id: order.payment_session_id.clone(),
            created_at: order.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLineResponse {
    #[serde(rename = "product")]
    pub product_id: String,
    pub quantity: u32,
    pub price: f64,
}

impl From<&OrderItem> for OrderLineResponse {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            quantity: item.quantity,
            price: from_cents(item.unit_amount_cents),
        }
    }
}

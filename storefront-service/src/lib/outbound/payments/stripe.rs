use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::checkout::errors::CheckoutError;
use crate::config::PaymentsConfig;
use crate::domain::checkout::models::CheckoutMetadata;
use crate::domain::checkout::models::Discount;
use crate::domain::checkout::models::OrderItem;
use crate::domain::checkout::models::PaymentSession;
use crate::domain::checkout::models::PaymentSessionRequest;
use crate::domain::checkout::ports::PaymentGateway;
use crate::domain::user::models::UserId;

const USER_ID_KEY: &str = "userId";
const COUPON_CODE_KEY: &str = "couponCode";
const PRODUCTS_KEY: &str = "products";

/// Stripe Checkout adapter.
pub struct StripeGateway {
    client: reqwest::Client,
    api_base: String,
    secret_key: String,
    client_url: String,
    currency: String,
}

impl StripeGateway {
    pub fn new(config: &PaymentsConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
            client_url: config.client_url.trim_end_matches('/').to_string(),
            currency: config.currency.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// One-off Stripe coupon mirroring a storefront discount.
    async fn create_coupon(&self, discount: &Discount) -> Result<String, CheckoutError> {
        let form = [
            ("percent_off".to_string(), discount.percentage.to_string()),
            ("duration".to_string(), "once".to_string()),
            ("name".to_string(), discount.code.clone()),
        ];

        let response = self
            .client
            .post(self.url("/v1/coupons"))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(gateway_error)?;

        let coupon: StripeObject = parse(response).await?;
        Ok(coupon.id)
    }

    fn session_form(
        &self,
        request: &PaymentSessionRequest,
        stripe_coupon: Option<String>,
    ) -> Result<Vec<(String, String)>, CheckoutError> {
        let mut form = vec![
            ("mode".to_string(), "payment".to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            (
                "success_url".to_string(),
                format!(
                    "{}/purchase-success?session_id={{CHECKOUT_SESSION_ID}}",
                    self.client_url
                ),
            ),
            (
                "cancel_url".to_string(),
                format!("{}/purchase-cancel", self.client_url),
            ),
        ];

        for (i, item) in request.line_items.iter().enumerate() {
            let prefix = format!("line_items[{}]", i);
            form.push((
                format!("{}[price_data][currency]", prefix),
                self.currency.clone(),
            ));
            form.push((
                format!("{}[price_data][product_data][name]", prefix),
                item.name.clone(),
            ));
            if let Some(image) = &item.image {
                form.push((
                    format!("{}[price_data][product_data][images][0]", prefix),
                    image.clone(),
                ));
            }
            form.push((
                format!("{}[price_data][unit_amount]", prefix),
                item.unit_amount_cents.to_string(),
            ));
            form.push((format!("{}[quantity]", prefix), item.quantity.to_string()));
        }

        if let Some(coupon) = stripe_coupon {
            form.push(("discounts[0][coupon]".to_string(), coupon));
        }

        for (key, value) in encode_metadata(&request.metadata)? {
            form.push((format!("metadata[{}]", key), value));
        }

        Ok(form)
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_session(
        &self,
        request: &PaymentSessionRequest,
    ) -> Result<PaymentSession, CheckoutError> {
        let stripe_coupon = match &request.discount {
            Some(discount) => Some(self.create_coupon(discount).await?),
            None => None,
        };
        let form = self.session_form(request, stripe_coupon)?;

        let response = self
            .client
            .post(self.url("/v1/checkout/sessions"))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(gateway_error)?;

        let session: StripeCheckoutSession = parse(response).await?;
        session.try_into()
    }

    async fn retrieve_session(
        &self,
        session_id: &str,
    ) -> Result<Option<PaymentSession>, CheckoutError> {
        if !is_checkout_session_id(session_id) {
            tracing::warn!(session_id, "Rejected malformed checkout session id");
            return Ok(None);
        }

        let response = self
            .client
            .get(self.url(&format!("/v1/checkout/sessions/{}", session_id)))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(gateway_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let session: StripeCheckoutSession = parse(response).await?;
        session.try_into().map(Some)
    }
}

/// Stripe Checkout ids look like `cs_test_a1B2...`; anything else never
/// reaches the URL path.
fn is_checkout_session_id(id: &str) -> bool {
    id.strip_prefix("cs_").is_some_and(|rest| {
        !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}

fn gateway_error(e: reqwest::Error) -> CheckoutError {
    CheckoutError::Gateway(e.to_string())
}

async fn parse<T>(response: reqwest::Response) -> Result<T, CheckoutError>
where
    T: for<'de> Deserialize<'de>,
{
    let status = response.status();
    if !status.is_success() {
        let message = response
            .json::<StripeErrorEnvelope>()
            .await
            .map(|envelope| envelope.error.message)
            .unwrap_or_else(|_| format!("unexpected status {}", status));
        tracing::error!(status = status.as_u16(), error = %message, "Stripe request failed");
        return Err(CheckoutError::Gateway(message));
    }

    response.json::<T>().await.map_err(gateway_error)
}

#[derive(Debug, Deserialize)]
struct StripeObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct StripeCheckoutSession {
    id: String,
    url: Option<String>,
    amount_total: Option<i64>,
    payment_status: Option<String>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

impl TryFrom<StripeCheckoutSession> for PaymentSession {
    type Error = CheckoutError;

    fn try_from(session: StripeCheckoutSession) -> Result<Self, Self::Error> {
        let metadata = if session.metadata.is_empty() {
            None
        } else {
            Some(decode_metadata(&session.metadata)?)
        };

        Ok(PaymentSession {
            id: session.id,
            url: session.url,
            amount_total_cents: session.amount_total,
            paid: session.payment_status.as_deref() == Some("paid"),
            metadata,
        })
    }
}

fn encode_metadata(metadata: &CheckoutMetadata) -> Result<Vec<(String, String)>, CheckoutError> {
    let products = serde_json::to_string(&metadata.items)
        .map_err(|e| CheckoutError::MalformedMetadata(e.to_string()))?;

    Ok(vec![
        (USER_ID_KEY.to_string(), metadata.user_id.to_string()),
        (
            COUPON_CODE_KEY.to_string(),
            metadata.coupon_code.clone().unwrap_or_default(),
        ),
        (PRODUCTS_KEY.to_string(), products),
    ])
}

fn decode_metadata(fields: &HashMap<String, String>) -> Result<CheckoutMetadata, CheckoutError> {
    let user_id = fields
        .get(USER_ID_KEY)
        .ok_or_else(|| CheckoutError::MalformedMetadata("missing userId".to_string()))
        .and_then(|raw| {
            UserId::from_string(raw).map_err(|e| CheckoutError::MalformedMetadata(e.to_string()))
        })?;

    let items = match fields.get(PRODUCTS_KEY) {
        Some(raw) => serde_json::from_str::<Vec<OrderItem>>(raw)
            .map_err(|e| CheckoutError::MalformedMetadata(e.to_string()))?,
        None => Vec::new(),
    };

    let coupon_code = fields
        .get(COUPON_CODE_KEY)
        .filter(|code| !code.is_empty())
        .cloned();

    Ok(CheckoutMetadata {
        user_id,
        coupon_code,
        items,
    })
}

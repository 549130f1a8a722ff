use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::checkout::errors::CheckoutError;
use crate::domain::checkout::models::CheckoutCommand;
use crate::domain::checkout::models::CheckoutMetadata;
use crate::domain::checkout::models::CheckoutSession;
use crate::domain::checkout::models::CompletedCheckout;
use crate::domain::checkout::models::Discount;
use crate::domain::checkout::models::Order;
use crate::domain::checkout::models::OrderItem;
use crate::domain::checkout::models::PaymentSessionRequest;
use crate::domain::checkout::ports::CheckoutServicePort;
use crate::domain::checkout::ports::OrderRepository;
use crate::domain::checkout::ports::PaymentGateway;
use crate::domain::coupon::models::Coupon;
use crate::domain::coupon::ports::CouponRepository;
use crate::domain::user::models::UserId;

/// Purchases at or above this amount (after discount) earn a gift coupon.
pub const GIFT_COUPON_THRESHOLD_CENTS: i64 = 20_000;

/// Domain service for checkout and order recording.
pub struct CheckoutService<CR, OR, PG>
where
    CR: CouponRepository,
    OR: OrderRepository,
    PG: PaymentGateway,
{
    coupons: Arc<CR>,
    orders: Arc<OR>,
    gateway: Arc<PG>,
}

impl<CR, OR, PG> CheckoutService<CR, OR, PG>
where
    CR: CouponRepository,
    OR: OrderRepository,
    PG: PaymentGateway,
{
    pub fn new(coupons: Arc<CR>, orders: Arc<OR>, gateway: Arc<PG>) -> Self {
        Self {
            coupons,
            orders,
            gateway,
        }
    }

    async fn applicable_coupon(
        &self,
        user_id: &UserId,
        code: Option<&str>,
    ) -> Result<Option<Coupon>, CheckoutError> {
        let Some(code) = code else {
            return Ok(None);
        };

        let coupon = self.coupons.find_active_by_code(user_id, code).await?;
        Ok(coupon.filter(|coupon| !coupon.is_expired(Utc::now())))
    }

    async fn existing_order(
        &self,
        user_id: &UserId,
        session_id: &str,
    ) -> Result<Option<Order>, CheckoutError> {
        match self.orders.find_by_payment_session(session_id).await? {
            Some(order) if order.user_id == *user_id => Ok(Some(order)),
            Some(_) => Err(CheckoutError::SessionNotFound),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl<CR, OR, PG> CheckoutServicePort for CheckoutService<CR, OR, PG>
where
    CR: CouponRepository,
    OR: OrderRepository,
    PG: PaymentGateway,
{
    async fn create_checkout_session(
        &self,
        user_id: &UserId,
        command: CheckoutCommand,
    ) -> Result<CheckoutSession, CheckoutError> {
        let mut total_cents = command.total_cents()?;

        let coupon = self
            .applicable_coupon(user_id, command.coupon_code.as_deref())
            .await?;
        if let Some(coupon) = &coupon {
            total_cents -= coupon
                .discount_on(total_cents)
                .ok_or(CheckoutError::AmountOutOfRange)?;
        }

        let request = PaymentSessionRequest {
            metadata: CheckoutMetadata {
                user_id: *user_id,
                coupon_code: coupon.as_ref().map(|c| c.code.clone()),
                items: command.items.iter().map(OrderItem::from).collect(),
            },
            discount: coupon.map(|c| Discount {
                code: c.code,
                percentage: c.discount_percentage,
            }),
            line_items: command.items,
        };

        let session = self.gateway.create_session(&request).await?;

        if total_cents >= GIFT_COUPON_THRESHOLD_CENTS {
            let gift = self
                .coupons
                .replace_for_user(Coupon::gift(*user_id, Utc::now()))
                .await?;
            tracing::info!(user_id = %user_id, code = %gift.code, "Gift coupon granted");
        }

        tracing::info!(
            user_id = %user_id,
            session_id = %session.id,
            total_cents,
            "Checkout session created"
        );

        Ok(CheckoutSession {
            id: session.id,
            url: session.url,
            total_amount_cents: total_cents,
        })
    }

    async fn complete_checkout(
        &self,
        user_id: &UserId,
        session_id: &str,
    ) -> Result<CompletedCheckout, CheckoutError> {
        if let Some(order) = self.existing_order(user_id, session_id).await? {
            return Ok(CompletedCheckout {
                order,
                newly_created: false,
            });
        }

        let session = self
            .gateway
            .retrieve_session(session_id)
            .await?
            .ok_or(CheckoutError::SessionNotFound)?;

        let metadata = match session.metadata {
            Some(metadata) if metadata.user_id == *user_id => metadata,
            _ => {
                tracing::warn!(user_id = %user_id, session_id, "Checkout session not owned by caller");
                return Err(CheckoutError::SessionNotFound);
            }
        };

        if !session.paid {
            return Err(CheckoutError::PaymentNotCompleted);
        }

        if let Some(code) = &metadata.coupon_code {
            self.coupons.deactivate(user_id, code).await?;
        }

        let total_amount_cents = match session.amount_total_cents {
            Some(amount) => amount,
            None => metadata.items.iter().try_fold(0i64, |total, item| {
                item.unit_amount_cents
                    .checked_mul(i64::from(item.quantity))
                    .and_then(|subtotal| total.checked_add(subtotal))
                    .ok_or(CheckoutError::AmountOutOfRange)
            })?,
        };

        let order = Order {
            id: Uuid::new_v4(),
            user_id: *user_id,
            items: metadata.items,
            total_amount_cents,
            payment_session_id: session.id,
            created_at: Utc::now(),
        };

        match self.orders.create(order).await {
            Ok(order) => {
                tracing::info!(user_id = %user_id, order_id = %order.id, "Order recorded");
                Ok(CompletedCheckout {
                    order,
                    newly_created: true,
                })
            }
            Err(CheckoutError::DuplicateOrder(_)) => {
                // Lost a race with a concurrent completion of the same session.
                let order = self
                    .existing_order(user_id, session_id)
                    .await?
                    .ok_or_else(|| CheckoutError::DuplicateOrder(session_id.to_string()))?;
                Ok(CompletedCheckout {
                    order,
                    newly_created: false,
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn list_orders(&self, limit: u32) -> Result<Vec<Order>, CheckoutError> {
        self.orders.list_recent(limit).await
    }
}

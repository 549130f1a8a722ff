use async_trait::async_trait;

use crate::domain::checkout::errors::CheckoutError;
use crate::domain::checkout::models::CheckoutCommand;
use crate::domain::checkout::models::CheckoutSession;
use crate::domain::checkout::models::CompletedCheckout;
use crate::domain::checkout::models::Order;
use crate::domain::checkout::models::PaymentSession;
use crate::domain::checkout::models::PaymentSessionRequest;
use crate::domain::user::models::UserId;

/// Port for checkout operations.
#[async_trait]
pub trait CheckoutServicePort: Send + Sync + 'static {
    /// Price the cart, apply the caller's coupon, and open a hosted checkout.
    ///
    /// A large enough purchase also grants the caller a new gift coupon.
    ///
    /// # Errors
    /// * `Gateway` - Payment provider rejected or could not be reached
    /// * `Coupon` - Coupon store failure
    async fn create_checkout_session(
        &self,
        user_id: &UserId,
        command: CheckoutCommand,
    ) -> Result<CheckoutSession, CheckoutError>;

    /// Record the order for a paid checkout. Repeat calls return the same order.
    ///
    /// # Errors
    /// * `SessionNotFound` - Unknown session, or one opened by another user
    /// * `PaymentNotCompleted` - Session exists but is unpaid
    async fn complete_checkout(
        &self,
        user_id: &UserId,
        session_id: &str,
    ) -> Result<CompletedCheckout, CheckoutError>;

    /// Most recent orders across all users.
    async fn list_orders(&self, limit: u32) -> Result<Vec<Order>, CheckoutError>;
}

/// Hosted checkout provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    async fn create_session(
        &self,
        request: &PaymentSessionRequest,
    ) -> Result<PaymentSession, CheckoutError>;

    /// # Returns
    /// None if the provider does not know the session
    async fn retrieve_session(&self, session_id: &str)
        -> Result<Option<PaymentSession>, CheckoutError>;
}

/// Persistence operations for orders.
#[async_trait]
pub trait OrderRepository: Send + Sync + 'static {
    /// # Errors
    /// * `DuplicateOrder` - An order already exists for this payment session
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, order: Order) -> Result<Order, CheckoutError>;

    async fn find_by_payment_session(
        &self,
        payment_session_id: &str,
    ) -> Result<Option<Order>, CheckoutError>;

    async fn list_recent(&self, limit: u32) -> Result<Vec<Order>, CheckoutError>;
}

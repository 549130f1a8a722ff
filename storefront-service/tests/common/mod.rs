#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use auth::Claims;
use auth::JwtHandler;
use auth::TokenIssuer;
use auth::TokenLifetimes;
use chrono::Utc;
use reqwest::header::COOKIE;
use reqwest::header::SET_COOKIE;
use storefront_service::checkout::errors::CheckoutError;
use storefront_service::checkout::models::Order;
use storefront_service::checkout::models::PaymentSession;
use storefront_service::checkout::models::PaymentSessionRequest;
use storefront_service::checkout::ports::OrderRepository;
use storefront_service::checkout::ports::PaymentGateway;
use storefront_service::checkout::service::CheckoutService;
use storefront_service::config::RuntimeEnvironment;
use storefront_service::coupon::errors::CouponError;
use storefront_service::coupon::models::Coupon;
use storefront_service::coupon::ports::CouponRepository;
use storefront_service::coupon::service::CouponService;
use storefront_service::inbound::http::router::create_router;
use storefront_service::inbound::http::router::AppState;
use storefront_service::inbound::http::router::HttpSettings;
use storefront_service::session::errors::SessionStoreError;
use storefront_service::session::ports::SessionStore;
use storefront_service::session::service::SessionService;
use storefront_service::user::errors::UserError;
use storefront_service::user::models::EmailAddress;
use storefront_service::user::models::Role;
use storefront_service::user::models::User;
use storefront_service::user::models::UserId;
use storefront_service::user::ports::UserRepository;

pub const ACCESS_SECRET: &[u8] = b"test-access-secret-for-jwt-signing-32-bytes";
pub const REFRESH_SECRET: &[u8] = b"test-refresh-secret-for-jwt-signing-32-bytes";

/// Test application that spawns the real router over in-memory adapters
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub users: Arc<InMemoryUserRepository>,
    pub sessions: Arc<InMemorySessionStore>,
    pub coupons: Arc<InMemoryCouponRepository>,
    pub orders: Arc<InMemoryOrderRepository>,
    pub payments: Arc<FakePaymentGateway>,
}

/// Cookies captured from a response, replayed by hand on later requests
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl Session {
    pub fn cookie_header(&self) -> String {
        let mut pairs = Vec::new();
        if let Some(token) = &self.access_token {
            pairs.push(format!("accessToken={}", token));
        }
        if let Some(token) = &self.refresh_token {
            pairs.push(format!("refreshToken={}", token));
        }
        pairs.join("; ")
    }
}

/// Raw `Set-Cookie` headers of a response
pub fn set_cookies(response: &reqwest::Response) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

/// Value of the named cookie in a response, if it was set to a non-empty value
pub fn cookie_value(response: &reqwest::Response, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    set_cookies(response).into_iter().find_map(|header| {
        header
            .strip_prefix(&prefix)
            .and_then(|rest| rest.split(';').next())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    })
}

pub fn session_from(response: &reqwest::Response) -> Session {
    Session {
        access_token: cookie_value(response, "accessToken"),
        refresh_token: cookie_value(response, "refreshToken"),
    }
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        Self::spawn_in(RuntimeEnvironment::Development).await
    }

    pub async fn spawn_in(environment: RuntimeEnvironment) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let users = Arc::new(InMemoryUserRepository::default());
        let sessions = Arc::new(InMemorySessionStore::default());
        let coupons = Arc::new(InMemoryCouponRepository::default());
        let orders = Arc::new(InMemoryOrderRepository::default());
        let payments = Arc::new(FakePaymentGateway::default());

        let tokens = Arc::new(TokenIssuer::new(
            ACCESS_SECRET,
            REFRESH_SECRET,
            TokenLifetimes::default(),
        ));

        let state = AppState {
            session_service: Arc::new(SessionService::new(
                Arc::clone(&users),
                Arc::clone(&sessions),
                tokens,
            )),
            coupon_service: Arc::new(CouponService::new(Arc::clone(&coupons))),
            checkout_service: Arc::new(CheckoutService::new(
                Arc::clone(&coupons),
                Arc::clone(&orders),
                Arc::clone(&payments),
            )),
            settings: HttpSettings {
                environment,
                request_timeout: Duration::from_secs(10),
            },
        };

        let router = create_router(state);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            users,
            sessions,
            coupons,
            orders,
            payments,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// GET with the session cookies attached
    pub fn get_as(&self, path: &str, session: &Session) -> reqwest::RequestBuilder {
        self.get(path).header(COOKIE, session.cookie_header())
    }

    /// POST with the session cookies attached
    pub fn post_as(&self, path: &str, session: &Session) -> reqwest::RequestBuilder {
        self.post(path).header(COOKIE, session.cookie_header())
    }

    pub async fn signup(&self, name: &str, email: &str, password: &str) -> reqwest::Response {
        self.post("/api/auth/signup")
            .json(&serde_json::json!({
                "name": name,
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn signin(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/api/auth/signin")
            .json(&serde_json::json!({
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Sign up a fresh customer and return their session
    pub async fn signed_up(&self, email: &str) -> (UserId, Session) {
        let response = self.signup("Test User", email, "pass_word!").await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        let session = session_from(&response);
        let body: serde_json::Value = response.json().await.unwrap();
        let id = UserId::from_string(body["_id"].as_str().unwrap()).unwrap();
        (id, session)
    }

    /// Access token signed with the real secret but already past its expiry
    pub fn expired_access_token(&self, user_id: &UserId) -> String {
        let claims = Claims::issued_at(
            user_id,
            Utc::now() - chrono::Duration::hours(1),
            chrono::Duration::minutes(15),
        );
        JwtHandler::new(ACCESS_SECRET).encode(&claims).unwrap()
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn set_role(&self, user_id: &UserId, role: Role) {
        if let Some(user) = self.users.lock().unwrap().get_mut(user_id) {
            user.role = role;
        }
    }

    pub fn remove(&self, user_id: &UserId) {
        self.users.lock().unwrap().remove(user_id);
    }

    pub fn get(&self, user_id: &UserId) -> Option<User> {
        self.users.lock().unwrap().get(user_id).cloned()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|existing| existing.email == user.email) {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.lock().unwrap().get(id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|user| user.email == *email)
            .cloned())
    }
}

#[derive(Default)]
pub struct InMemorySessionStore {
    entries: Mutex<HashMap<UserId, String>>,
}

impl InMemorySessionStore {
    pub fn current(&self, user_id: &UserId) -> Option<String> {
        self.entries.lock().unwrap().get(user_id).cloned()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn store(
        &self,
        user_id: &UserId,
        token: &str,
        _ttl: Duration,
    ) -> Result<(), SessionStoreError> {
        self.entries
            .lock()
            .unwrap()
            .insert(*user_id, token.to_string());
        Ok(())
    }

    async fn get(&self, user_id: &UserId) -> Result<Option<String>, SessionStoreError> {
        Ok(self.current(user_id))
    }

    async fn delete(&self, user_id: &UserId) -> Result<(), SessionStoreError> {
        self.entries.lock().unwrap().remove(user_id);
        Ok(())
    }

    async fn rotate(
        &self,
        user_id: &UserId,
        expected: &str,
        replacement: &str,
        _ttl: Duration,
    ) -> Result<bool, SessionStoreError> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get_mut(user_id) {
            Some(current) if current == expected => {
                *current = replacement.to_string();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct InMemoryCouponRepository {
    coupons: Mutex<Vec<Coupon>>,
}

impl InMemoryCouponRepository {
    pub fn insert(&self, coupon: Coupon) {
        self.coupons.lock().unwrap().push(coupon);
    }

    pub fn all_for(&self, user_id: &UserId) -> Vec<Coupon> {
        self.coupons
            .lock()
            .unwrap()
            .iter()
            .filter(|coupon| coupon.user_id == *user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CouponRepository for InMemoryCouponRepository {
    async fn find_active_for_user(&self, user_id: &UserId) -> Result<Option<Coupon>, CouponError> {
        Ok(self
            .all_for(user_id)
            .into_iter()
            .find(|coupon| coupon.is_active))
    }

    async fn find_active_by_code(
        &self,
        user_id: &UserId,
        code: &str,
    ) -> Result<Option<Coupon>, CouponError> {
        Ok(self
            .all_for(user_id)
            .into_iter()
            .find(|coupon| coupon.is_active && coupon.code == code))
    }

    async fn replace_for_user(&self, coupon: Coupon) -> Result<Coupon, CouponError> {
        let mut coupons = self.coupons.lock().unwrap();
        coupons.retain(|existing| existing.user_id != coupon.user_id);
        coupons.push(coupon.clone());
        Ok(coupon)
    }

    async fn deactivate(&self, user_id: &UserId, code: &str) -> Result<(), CouponError> {
        for coupon in self.coupons.lock().unwrap().iter_mut() {
            if coupon.user_id == *user_id && coupon.code == code {
                coupon.is_active = false;
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: Mutex<Vec<Order>>,
}

impl InMemoryOrderRepository {
    pub fn count(&self) -> usize {
        self.orders.lock().unwrap().len()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: Order) -> Result<Order, CheckoutError> {
        let mut orders = self.orders.lock().unwrap();
        if orders
            .iter()
            .any(|existing| existing.payment_session_id == order.payment_session_id)
        {
            return Err(CheckoutError::DuplicateOrder(order.payment_session_id));
        }
        orders.push(order.clone());
        Ok(order)
    }

    async fn find_by_payment_session(
        &self,
        payment_session_id: &str,
    ) -> Result<Option<Order>, CheckoutError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .find(|order| order.payment_session_id == payment_session_id)
            .cloned())
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<Order>, CheckoutError> {
        let mut orders = self.orders.lock().unwrap().clone();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders.truncate(limit as usize);
        Ok(orders)
    }
}

/// Payment provider stand-in: sessions start unpaid until `mark_paid`
#[derive(Default)]
pub struct FakePaymentGateway {
    sessions: Mutex<HashMap<String, PaymentSession>>,
    requests: Mutex<Vec<PaymentSessionRequest>>,
    next_id: AtomicUsize,
}

impl FakePaymentGateway {
    pub fn mark_paid(&self, session_id: &str) {
        if let Some(session) = self.sessions.lock().unwrap().get_mut(session_id) {
            session.paid = true;
        }
    }

    pub fn last_request(&self) -> Option<PaymentSessionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl PaymentGateway for FakePaymentGateway {
    async fn create_session(
        &self,
        request: &PaymentSessionRequest,
    ) -> Result<PaymentSession, CheckoutError> {
        let id = format!("cs_test_{}", self.next_id.fetch_add(1, Ordering::SeqCst));

        let gross: i64 = request.line_items.iter().map(|item| item.subtotal_cents().unwrap()).sum();
        let discount = request
            .discount
            .as_ref()
            .map(|d| (gross * i64::from(d.percentage) + 50) / 100)
            .unwrap_or(0);

        let session = PaymentSession {
            id: id.clone(),
            url: Some(format!("https://checkout.test/{}", id)),
            amount_total_cents: Some(gross - discount),
            paid: false,
            metadata: Some(request.metadata.clone()),
        };

        self.sessions
            .lock()
            .unwrap()
            .insert(id, session.clone());
        self.requests.lock().unwrap().push(request.clone());
        Ok(session)
    }

    async fn retrieve_session(
        &self,
        session_id: &str,
    ) -> Result<Option<PaymentSession>, CheckoutError> {
        Ok(self.sessions.lock().unwrap().get(session_id).cloned())
    }
}

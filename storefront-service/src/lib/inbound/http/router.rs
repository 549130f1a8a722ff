use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::checkout_success::checkout_success;
use super::handlers::create_checkout_session::create_checkout_session;
use super::handlers::get_coupon::get_coupon;
use super::handlers::get_profile::get_profile;
use super::handlers::health::health;
use super::handlers::list_orders::list_orders;
use super::handlers::not_found::not_found;
use super::handlers::refresh_token::refresh_token;
use super::handlers::signin::signin;
use super::handlers::signout::signout;
use super::handlers::signup::signup;
use super::handlers::validate_coupon::validate_coupon;
use super::middleware::authenticate;
use super::middleware::normalize_errors;
use super::middleware::require_role;
use crate::config::RuntimeEnvironment;
use crate::domain::checkout::ports::CheckoutServicePort;
use crate::domain::coupon::ports::CouponServicePort;
use crate::domain::session::ports::SessionServicePort;
use crate::domain::user::models::Role;

/// Request handling settings shared by handlers and middleware.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub environment: RuntimeEnvironment,
    pub request_timeout: Duration,
}

impl HttpSettings {
    pub fn secure_cookies(&self) -> bool {
        self.environment.is_production()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub session_service: Arc<dyn SessionServicePort>,
    pub coupon_service: Arc<dyn CouponServicePort>,
    pub checkout_service: Arc<dyn CheckoutServicePort>,
    pub settings: HttpSettings,
}

pub fn create_router(state: AppState) -> Router {
    let settings = state.settings.clone();

    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/signin", post(signin))
        .route("/api/auth/signout", post(signout))
        .route("/api/auth/refresh-token", post(refresh_token));

    let protected_routes = Router::new()
        .route("/api/auth/profile", get(get_profile))
        .route("/api/coupons", get(get_coupon))
        .route("/api/coupons/validate", post(validate_coupon))
        .route(
            "/api/payments/create-checkout-session",
            post(create_checkout_session),
        )
        .route("/api/payments/checkout-success", post(checkout_success))
        .merge(
            Router::new()
                .route("/api/payments/orders", get(list_orders))
                .route_layer(middleware::from_fn_with_state(Role::Admin, require_role)),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            settings.clone(),
            normalize_errors,
        ))
        .layer(TimeoutLayer::new(settings.request_timeout))
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

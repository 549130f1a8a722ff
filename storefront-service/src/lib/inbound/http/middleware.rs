use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header::CONTENT_LENGTH;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use axum_extra::extract::CookieJar;

use super::cookies::access_token;
use super::errors::ApiError;
use super::errors::ApiErrorKind;
use super::errors::ErrorReport;
use super::router::AppState;
use super::router::HttpSettings;
use crate::domain::session::errors::AuthError;
use crate::domain::session::models::UserProfile;
use crate::domain::session::ports::SessionServicePort;
use crate::domain::user::models::Role;

/// Request extension holding the user behind a verified access token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub UserProfile);

/// Middleware that resolves the `accessToken` cookie to a user and stores it
/// in the request extensions
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let jar = CookieJar::from_headers(req.headers());
    let token = access_token(&jar);

    let user = state
        .session_service
        .authenticate(token.as_deref())
        .await
        .map_err(|e| {
            tracing::debug!(error = %e, "Request rejected by gatekeeper");
            ApiError::from(e)
        })?;

    req.extensions_mut().insert(AuthenticatedUser(user));

    Ok(next.run(req).await)
}

/// Middleware that lets only users of the given role through. Must run after
/// `authenticate`.
pub async fn require_role(
    State(role): State<Role>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = req
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or(AuthError::MissingAccessToken)?;

    if user.0.role != role {
        tracing::warn!(user_id = %user.0.id, required = %role, "Role check failed");
        return Err(AuthError::Forbidden(role_label(role).to_string()).into());
    }

    Ok(next.run(req).await)
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::Admin => "Admin",
        Role::Customer => "Customer",
    }
}

/// Log every error response and, outside production, re-render its body with
/// the internal stack.
pub async fn normalize_errors(
    State(settings): State<HttpSettings>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let client = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let mut response = next.run(req).await;
    let Some(report) = response.extensions_mut().remove::<ErrorReport>() else {
        return response;
    };

    if report.kind == ApiErrorKind::Internal {
        tracing::error!(
            status = report.status.as_u16(),
            method = %method,
            path = %path,
            client = %client,
            stack = %report.stack,
            "{}",
            report.message
        );
    } else {
        tracing::warn!(
            status = report.status.as_u16(),
            method = %method,
            path = %path,
            client = %client,
            "{}",
            report.message
        );
    }

    if settings.environment.is_production() {
        return response;
    }

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(CONTENT_LENGTH);
    (parts, Json(report.body(true))).into_response()
}

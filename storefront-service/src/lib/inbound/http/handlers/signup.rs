use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::CookieJar;
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use super::ApiSuccess;
use super::UserResponse;
use crate::domain::session::models::SignupCommand;
use crate::domain::session::ports::SessionServicePort;
use crate::inbound::http::cookies::set_session_cookies;
use crate::inbound::http::errors::ApiError;
use crate::inbound::http::router::AppState;

pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(body), _): WithRejection<Json<SignupRequest>, ApiError>,
) -> Result<(CookieJar, ApiSuccess<UserResponse>), ApiError> {
    let command = SignupCommand::parse(body.name, body.email, body.password)?;
    let session = state.session_service.signup(command).await?;

    Ok((
        set_session_cookies(jar, &session.tokens, state.settings.secure_cookies()),
        ApiSuccess::new(StatusCode::CREATED, UserResponse::from(&session.user)),
    ))
}

/// Missing fields are read as empty so each one is reported by validation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

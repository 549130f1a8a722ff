use axum::extract::State;
use axum::Json;
use axum_extra::extract::CookieJar;
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use super::ApiSuccess;
use super::UserResponse;
use crate::domain::session::models::SigninCommand;
use crate::domain::session::ports::SessionServicePort;
use crate::inbound::http::cookies::set_session_cookies;
use crate::inbound::http::errors::ApiError;
use crate::inbound::http::router::AppState;

pub async fn signin(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(body), _): WithRejection<Json<SigninRequest>, ApiError>,
) -> Result<(CookieJar, ApiSuccess<UserResponse>), ApiError> {
    let session = state
        .session_service
        .signin(SigninCommand {
            email: body.email,
            password: body.password,
        })
        .await?;

    Ok((
        set_session_cookies(jar, &session.tokens, state.settings.secure_cookies()),
        ApiSuccess::ok(UserResponse::from(&session.user)),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SigninRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

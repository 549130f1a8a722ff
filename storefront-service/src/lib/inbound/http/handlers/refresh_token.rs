use axum::extract::State;
use axum_extra::extract::CookieJar;

use super::ApiSuccess;
use super::MessageResponse;
use crate::domain::session::ports::SessionServicePort;
use crate::inbound::http::cookies::refresh_token as refresh_cookie;
use crate::inbound::http::cookies::set_session_cookies;
use crate::inbound::http::errors::ApiError;
use crate::inbound::http::router::AppState;

pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiSuccess<MessageResponse>), ApiError> {
    let presented = refresh_cookie(&jar);
    let tokens = state.session_service.refresh(presented.as_deref()).await?;

    Ok((
        set_session_cookies(jar, &tokens, state.settings.secure_cookies()),
        ApiSuccess::ok(MessageResponse::new("Token refreshed successfully")),
    ))
}

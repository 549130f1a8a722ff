use axum::extract::State;
use axum_extra::extract::CookieJar;

use super::ApiSuccess;
use super::MessageResponse;
use crate::domain::session::ports::SessionServicePort;
use crate::inbound::http::cookies::clear_session_cookies;
use crate::inbound::http::cookies::refresh_token;
use crate::inbound::http::router::AppState;

pub async fn signout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, ApiSuccess<MessageResponse>) {
    let token = refresh_token(&jar);
    state.session_service.signout(token.as_deref()).await;

    (
        clear_session_cookies(jar, state.settings.secure_cookies()),
        ApiSuccess::ok(MessageResponse::new("Logged out successfully")),
    )
}

use axum::Extension;

use super::ApiSuccess;
use super::UserResponse;
use crate::inbound::http::middleware::AuthenticatedUser;

pub async fn get_profile(
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> ApiSuccess<UserResponse> {
    ApiSuccess::ok(UserResponse::from(&user))
}

use serde::Serialize;

use super::ApiSuccess;

pub async fn health() -> ApiSuccess<HealthResponse> {
    ApiSuccess::ok(HealthResponse { status: "ok" })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

use axum::http::Uri;

use crate::inbound::http::errors::ApiError;

/// Fallback for every unrouted request.
pub async fn not_found(uri: Uri) -> ApiError {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    ApiError::not_found(format!("Not found - {}", target))
}

use axum::http::Uri;
use service_core::error::AppError;

/// Answers paths no route matches with the usual `{ "message" }` body.
pub async fn route_not_found(uri: Uri) -> AppError {
    tracing::debug!(path = %uri.path(), "No route matched");
    AppError::NotFound(format!("Route not found: {}", uri.path()))
}

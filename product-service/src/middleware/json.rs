use axum::async_trait;
use axum::extract::{rejection::JsonRejection, FromRequest, Request};
use axum::Json;
use service_core::error::AppError;

/// JSON body extractor whose rejections render as `400 {"message": ...}`
/// instead of axum's plain-text 415/422 responses.
#[derive(Debug, Clone)]
pub struct ProductJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ProductJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection, "Rejected request body");
                Err(AppError::BadRequest(rejection.body_text()))
            }
        }
    }
}

//! JSON body extractor with the API failure envelope
//!
//! Axum's `Json` rejects bodies it cannot deserialize with a plain-text
//! 400/415/422. The API endpoints answer every bad body with the same
//! `{ "success": false, "message": .. }` envelope as their own validation
//! errors, so `ApiJson` maps any rejection to [`AppError::ClientInput`].

use crate::error::AppError;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;

/// JSON extractor whose rejection is an [`AppError`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => {
                tracing::debug!(
                    status = rejection.status().as_u16(),
                    reason = %rejection.body_text(),
                    "Rejecting request body"
                );
                Err(AppError::ClientInput(rejection.body_text()))
            }
        }
    }
}

//! Lenient JSON body extraction.
//!
//! Endpoints accept an empty body (deserialized as the default value) and
//! malformed JSON still yields the uniform error envelope instead of the
//! framework's rejection format.

use {
    axum::{
        body::Bytes,
        extract::{FromRequest, Request},
    },
    serde::de::DeserializeOwned,
};

use crate::error::ApiError;

pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("failed to read request body: {e}")))?;

        if bytes.is_empty() {
            return Ok(Self(T::default()));
        }

        serde_json::from_slice(&bytes)
            .map(Self)
            .map_err(|e| ApiError::bad_request(format!("invalid JSON body: {e}")))
    }
}

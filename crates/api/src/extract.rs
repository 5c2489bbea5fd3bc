//! Body extractors whose rejections use the `{ error, code }` envelope.

use axum::extract::FromRequest;

use crate::error::AppError;

/// [`axum::Json`] that rejects malformed or mistyped bodies with
/// [`AppError::BadRequest`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

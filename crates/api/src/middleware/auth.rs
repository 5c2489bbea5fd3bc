//! Bearer-token authentication extractor.
//!
//! Every bid mutation is attributed to the email carried by the caller's
//! token, so a token without one is rejected here rather than producing an
//! audit event with a blank actor.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use bidtrack_core::error::CoreError;
use bidtrack_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated caller.
///
/// ```ignore
/// async fn handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(actor = %user.email, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    /// Recorded as the actor of audited changes.
    pub email: String,
    pub role: String,
}

/// Extract the token from `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Result<&str, CoreError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| CoreError::Unauthorized("Missing Authorization header".into()))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            )
        })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;

        let claims = validate_token(token, &state.config.jwt)
            .map_err(|_| CoreError::Unauthorized("Invalid or expired token".into()))?;

        let email = claims.email.trim();
        if email.is_empty() {
            return Err(CoreError::Unauthorized("Token does not identify a user".into()).into());
        }

        Ok(AuthUser {
            user_id: claims.sub,
            email: email.to_string(),
            role: claims.role,
        })
    }
}

//! Role check for the destructive and bulk bid operations.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use bidtrack_core::error::CoreError;
use bidtrack_core::roles::ROLE_ADMIN;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// An [`AuthUser`] holding the `admin` role. Rejects with 403 otherwise.
///
/// Guards delete, import, both exports and reset.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN {
            tracing::warn!(actor = %user.email, role = %user.role, "Admin route refused");
            return Err(CoreError::Forbidden("Admin role required".into()).into());
        }
        Ok(RequireAdmin(user))
    }
}

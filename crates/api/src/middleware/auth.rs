//! Identity extractor for Axum handlers.
//!
//! Authentication happens upstream: the reverse proxy authenticates the
//! browser session and injects `X-User-Id` (required) and `X-User-Admin`
//! (optional, `1`/`true`) into every forwarded request. This service trusts
//! those headers; it must never be reachable except through the proxy.

use apportal_core::auth::RequestUser;
use apportal_core::types::DbId;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

/// Authenticated caller extracted from the proxy-injected identity headers.
///
/// Use as an extractor parameter in any handler that requires a caller:
///
/// ```ignore
/// async fn my_handler(AuthUser(user): AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub RequestUser);

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw_id = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing X-User-Id header".into()))?;

        let id: DbId = raw_id
            .trim()
            .parse()
            .map_err(|_| AppError::Unauthorized(format!("Invalid X-User-Id header: {raw_id}")))?;

        let is_admin = parts
            .headers
            .get("x-user-admin")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| {
                let v = v.trim();
                v == "1" || v.eq_ignore_ascii_case("true")
            });

        Ok(AuthUser(RequestUser { id, is_admin }))
    }
}

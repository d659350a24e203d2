//! Request extractors for caller identity.
//!
//! - [`auth::AuthUser`] -- Extracts the proxy-asserted user from the
//!   `X-User-Id` / `X-User-Admin` headers.

pub mod auth;

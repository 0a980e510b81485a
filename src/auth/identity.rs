//! Per-request identity resolution
//!
//! Runs once for every inbound GraphQL operation, before schema
//! execution. The outcomes are deliberately asymmetric:
//!
//! - no header, or a non-bearer scheme: anonymous
//! - bearer token that fails verification: the request fails outright
//!   with an authentication error, it does not fall back to anonymous
//! - validly signed token whose subject no longer exists: anonymous

use crate::error::{ApiError, ApiResult};
use crate::models::User;
use crate::store::Store;

use super::TokenService;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use uuid::Uuid;

const INVALID_TOKEN: &str = "Invalid authentication token";

/// Request-scoped identity, `None` for anonymous callers.
#[derive(Debug, Clone)]
pub struct Identity(pub Option<User>);

impl Identity {
    pub fn anonymous() -> Self {
        Identity(None)
    }

    /// Authorization guard for ownership-scoped operations.
    ///
    /// Returns the authenticated user or fails with the given fixed
    /// login prompt. Callers must scope queries by the returned user's
    /// id, never by a client-supplied one.
    pub fn require(&self, login_prompt: &str) -> ApiResult<&User> {
        self.0
            .as_ref()
            .ok_or_else(|| ApiError::authentication(login_prompt))
    }
}

/// Resolve the caller's identity from the `Authorization` header.
pub async fn resolve_identity(
    store: &dyn Store,
    tokens: &TokenService,
    headers: &HeaderMap,
) -> ApiResult<Identity> {
    let Some(raw) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) else {
        return Ok(Identity::anonymous());
    };

    let Some(token) = bearer_token(raw) else {
        return Ok(Identity::anonymous());
    };

    let claims = tokens
        .verify(token)
        .map_err(|_| ApiError::authentication(INVALID_TOKEN))?;
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| ApiError::authentication(INVALID_TOKEN))?;

    // A verified token whose user has since vanished downgrades to
    // anonymous instead of erroring.
    let user = store.find_user_by_id(user_id).await?;
    Ok(Identity(user))
}

/// Extract the token from a `Bearer <token>` header value,
/// case-insensitively on the scheme.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, rest) = value.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") {
        Some(rest.trim_start())
    } else {
        None
    }
}

//! Application error handling
//!
//! Every failure a resolver can hit is converted to one of the kinds
//! below before crossing the API boundary; nothing surfaces as an
//! unclassified internal error. The GraphQL representation follows the
//! Apollo extension-code convention so existing clients keep working.

use crate::store::StoreError;
use async_graphql::ErrorExtensions;
use thiserror::Error;
use tracing::error;

/// API error taxonomy.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or invalid credentials, or a missing identity for an
    /// ownership-scoped operation. The message is surfaced verbatim.
    #[error("{0}")]
    Authentication(String),

    /// Validation or uniqueness violation on a write operation.
    /// `invalid_args` echoes the offending arguments so clients can
    /// drive form correction.
    #[error("{message}")]
    UserInput {
        message: String,
        invalid_args: serde_json::Value,
    },

    /// Referential integrity failure, e.g. an authenticated id that no
    /// longer resolves to a user.
    #[error("{0}")]
    NotFound(String),

    /// Anything unexpected. Logged server-side, never detailed to clients.
    #[error("An internal error occurred")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn authentication(message: impl Into<String>) -> Self {
        ApiError::Authentication(message.into())
    }

    pub fn user_input(message: impl Into<String>, invalid_args: serde_json::Value) -> Self {
        ApiError::UserInput {
            message: message.into(),
            invalid_args,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateUsername => ApiError::UserInput {
                message: err.to_string(),
                invalid_args: serde_json::Value::Null,
            },
            StoreError::UserNotFound => ApiError::NotFound("User not found".to_string()),
            StoreError::Backend(inner) => ApiError::Internal(inner),
        }
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> async_graphql::Error {
        match self {
            ApiError::Authentication(_) => async_graphql::Error::new(self.to_string())
                .extend_with(|_, e| e.set("code", "UNAUTHENTICATED")),
            ApiError::UserInput { invalid_args, .. } => {
                let args = invalid_args.clone();
                async_graphql::Error::new(self.to_string()).extend_with(move |_, e| {
                    e.set("code", "BAD_USER_INPUT");
                    if !args.is_null() {
                        if let Ok(value) = async_graphql::Value::from_json(args.clone()) {
                            e.set("invalidArgs", value);
                        }
                    }
                })
            }
            ApiError::NotFound(_) => async_graphql::Error::new(self.to_string())
                .extend_with(|_, e| e.set("code", "NOT_FOUND")),
            ApiError::Internal(inner) => {
                error!("internal error: {inner:?}");
                async_graphql::Error::new("An internal error occurred")
                    .extend_with(|_, e| e.set("code", "INTERNAL_SERVER_ERROR"))
            }
        }
    }
}

/// Result type alias for service and resolver code.
pub type ApiResult<T> = Result<T, ApiError>;

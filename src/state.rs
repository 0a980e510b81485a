//! Shared application state
//!
//! Explicitly constructed at startup and passed to handlers via Axum's
//! state extraction; nothing here is ambient global state, so tests can
//! build an `AppState` around an isolated in-memory store.
//!
//! All fields are cheap to clone: the store and config are `Arc`s, the
//! token service holds pre-computed keys behind `Arc`s, and the schema
//! is internally reference-counted.

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::graphql::{build_schema, AppSchema};
use crate::store::Store;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
    pub tokens: TokenService,
    pub schema: AppSchema,
}

impl AppState {
    /// Build the state, pre-computing token keys and the schema once.
    pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Self {
        let tokens = TokenService::new(&config.jwt.secret, config.jwt.token_expiry_secs);
        let schema = build_schema(store.clone(), tokens.clone());

        Self {
            store,
            config: Arc::new(config),
            tokens,
            schema,
        }
    }
}

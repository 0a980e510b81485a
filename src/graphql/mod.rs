//! GraphQL schema
//!
//! The schema carries the store and the token service as context data;
//! the per-request identity is attached to each request by the HTTP
//! layer before execution (`ctx.data::<Identity>()` in resolvers).

mod mutation;
mod query;
mod types;

pub use mutation::MutationRoot;
pub use query::QueryRoot;
pub use types::{EntryObject, Token, UserObject};

use crate::auth::{Identity, TokenService};
use crate::store::Store;
use async_graphql::{Context, EmptySubscription, Schema};
use std::sync::Arc;

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema with its shared context data.
pub fn build_schema(store: Arc<dyn Store>, tokens: TokenService) -> AppSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(store)
        .data(tokens)
        .finish()
}

/// The caller's identity for this request, anonymous when the HTTP
/// layer attached none (e.g. schema-only tests).
pub(crate) fn current_identity(ctx: &Context<'_>) -> Identity {
    ctx.data_opt::<Identity>()
        .cloned()
        .unwrap_or_else(Identity::anonymous)
}

pub(crate) fn store_from<'a>(ctx: &'a Context<'a>) -> &'a Arc<dyn Store> {
    ctx.data_unchecked::<Arc<dyn Store>>()
}

//! GraphQL endpoint
//!
//! Identity is resolved from the `Authorization` header before the
//! operation executes. A bearer token that fails verification fails the
//! whole request; a missing header just leaves the caller anonymous.

use crate::auth::resolve_identity;
use crate::state::AppState;
use async_graphql::{http::GraphiQLSource, ErrorExtensions, Pos};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse},
};

/// Execute a GraphQL operation.
pub async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let request = req.into_inner();

    match resolve_identity(state.store.as_ref(), &state.tokens, &headers).await {
        Ok(identity) => state.schema.execute(request.data(identity)).await.into(),
        Err(err) => {
            let server_error = err.extend().into_server_error(Pos { line: 0, column: 0 });
            async_graphql::Response::from_errors(vec![server_error]).into()
        }
    }
}

/// GraphiQL IDE, served on GET for interactive use.
pub async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

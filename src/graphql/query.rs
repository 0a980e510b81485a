//! Query resolvers

use super::types::{EntryObject, UserObject};
use super::{current_identity, store_from};
use crate::error::ApiError;
use crate::services::{EntryService, UserService};
use async_graphql::{Context, ErrorExtensions, Object, Result};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// All registered users.
    #[graphql(name = "allUsers")]
    async fn all_users(&self, ctx: &Context<'_>) -> Result<Vec<UserObject>> {
        let store = store_from(ctx);
        let users = store
            .list_users()
            .await
            .map_err(|e| ApiError::from(e).extend())?;
        Ok(users.into_iter().map(UserObject).collect())
    }

    /// Number of registered users.
    #[graphql(name = "userCount")]
    async fn user_count(&self, ctx: &Context<'_>) -> Result<i64> {
        let store = store_from(ctx);
        store
            .count_users()
            .await
            .map_err(|e| ApiError::from(e).extend())
    }

    /// The authenticated caller's profile.
    #[graphql(name = "myUser")]
    async fn my_user(&self, ctx: &Context<'_>) -> Result<UserObject> {
        let store = store_from(ctx);
        let identity = current_identity(ctx);
        let user = UserService::my_user(store.as_ref(), &identity)
            .await
            .map_err(|e| e.extend())?;
        Ok(UserObject(user))
    }

    /// The authenticated caller's entries.
    #[graphql(name = "myEntries")]
    async fn my_entries(&self, ctx: &Context<'_>) -> Result<Vec<EntryObject>> {
        let store = store_from(ctx);
        let identity = current_identity(ctx);
        let entries = EntryService::my_entries(store.as_ref(), &identity)
            .await
            .map_err(|e| e.extend())?;
        Ok(entries.into_iter().map(EntryObject).collect())
    }
}

//! Mutation resolvers
//!
//! Arguments stay flat to match the original schema surface; each
//! resolver gathers them into a typed service input before any domain
//! logic runs.

use super::types::{EntryObject, Token, UserObject};
use super::{current_identity, store_from};
use crate::auth::TokenService;
use crate::models::{ActivityLevel, Gender, Objective};
use crate::services::{CreateEntry, EntryService, RegisterUser, UserService};
use async_graphql::{Context, ErrorExtensions, Object, Result};
use chrono::NaiveDate;

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Register a new user.
    #[graphql(name = "AddUser")]
    #[allow(clippy::too_many_arguments)]
    async fn add_user(
        &self,
        ctx: &Context<'_>,
        firstname: String,
        lastname: Option<String>,
        username: String,
        password: String,
        gender: Gender,
        objective: Option<Objective>,
        height: Option<f64>,
        weight: Option<f64>,
        effort: Option<ActivityLevel>,
    ) -> Result<UserObject> {
        let store = store_from(ctx);
        let user = UserService::register(
            store.as_ref(),
            RegisterUser {
                firstname,
                lastname,
                username,
                password,
                gender,
                objective,
                height_cm: height,
                initial_weight_kg: weight,
                effort,
            },
        )
        .await
        .map_err(|e| e.extend())?;
        Ok(UserObject(user))
    }

    /// Log a food entry owned by the authenticated caller.
    #[graphql(name = "AddEntry")]
    async fn add_entry(
        &self,
        ctx: &Context<'_>,
        description: String,
        date: NaiveDate,
        time: i32,
        calories: i32,
    ) -> Result<EntryObject> {
        let store = store_from(ctx);
        let identity = current_identity(ctx);
        let entry = EntryService::add_entry(
            store.as_ref(),
            &identity,
            CreateEntry {
                description,
                date,
                time,
                calories,
            },
        )
        .await
        .map_err(|e| e.extend())?;
        Ok(EntryObject(entry))
    }

    /// Verify credentials and return an opaque bearer token.
    #[graphql(name = "Login")]
    async fn login(
        &self,
        ctx: &Context<'_>,
        username: String,
        password: String,
    ) -> Result<Token> {
        let store = store_from(ctx);
        let tokens = ctx.data_unchecked::<TokenService>();
        let value = UserService::login(store.as_ref(), tokens, &username, &password)
            .await
            .map_err(|e| e.extend())?;
        Ok(Token { value })
    }
}

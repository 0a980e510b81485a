//! GraphQL object types
//!
//! Thin wrappers over the domain models. The password hash has no
//! field here, so it can never be selected. Relations (`User.entries`,
//! `Entry.user`) are populated on demand from the store.

use super::store_from;
use crate::error::{ApiError, ApiResult};
use crate::models::{self, ActivityLevel, Gender, Objective, WeightSample};
use async_graphql::{Context, ErrorExtensions, Object, Result, SimpleObject, ID};
use chrono::NaiveDate;

/// Opaque bearer token envelope returned by `Login`.
#[derive(Debug, Clone, SimpleObject)]
pub struct Token {
    pub value: String,
}

/// GraphQL view of a user.
pub struct UserObject(pub models::User);

#[Object(name = "User")]
impl UserObject {
    async fn id(&self) -> ID {
        ID::from(self.0.id.to_string())
    }

    async fn firstname(&self) -> &str {
        &self.0.firstname
    }

    async fn lastname(&self) -> Option<&str> {
        self.0.lastname.as_deref()
    }

    /// Display name derived from first and last name.
    async fn fullname(&self) -> String {
        models::full_name(&self.0)
    }

    async fn username(&self) -> &str {
        &self.0.username
    }

    async fn gender(&self) -> Gender {
        self.0.gender
    }

    async fn objective(&self) -> Option<Objective> {
        self.0.objective
    }

    /// Height in centimeters.
    async fn height(&self) -> Option<f64> {
        self.0.height_cm
    }

    async fn weights(&self) -> &[WeightSample] {
        &self.0.weights
    }

    async fn effort(&self) -> Option<ActivityLevel> {
        self.0.effort
    }

    /// The user's entries, populated on demand.
    async fn entries(&self, ctx: &Context<'_>) -> Result<Vec<EntryObject>> {
        let store = store_from(ctx);
        let entries = store
            .entries_for_user(self.0.id)
            .await
            .map_err(|e| ApiError::from(e).extend())?;
        Ok(entries.into_iter().map(EntryObject).collect())
    }
}

/// GraphQL view of a food entry.
pub struct EntryObject(pub models::Entry);

#[Object(name = "Entry")]
impl EntryObject {
    async fn id(&self) -> ID {
        ID::from(self.0.id.to_string())
    }

    async fn description(&self) -> &str {
        &self.0.description
    }

    async fn date(&self) -> NaiveDate {
        self.0.date
    }

    /// Seconds since midnight.
    async fn time(&self) -> i32 {
        self.0.time
    }

    /// Time of day rendered as "H:MM".
    #[graphql(name = "clockTime")]
    async fn clock_time(&self) -> String {
        models::clock_time(self.0.time)
    }

    async fn calories(&self) -> i32 {
        self.0.calories
    }

    /// The owning user, populated on demand.
    async fn user(&self, ctx: &Context<'_>) -> Result<UserObject> {
        let store = store_from(ctx);
        let user: ApiResult<_> = store
            .find_user_by_id(self.0.user_id)
            .await
            .map_err(ApiError::from)
            .and_then(|user| user.ok_or_else(|| ApiError::not_found("User not found")));
        Ok(UserObject(user.map_err(|e| e.extend())?))
    }
}

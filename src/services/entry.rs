//! Entry creation and ownership-scoped reads

use crate::auth::Identity;
use crate::error::{ApiError, ApiResult};
use crate::models::{Entry, NewEntry, SECONDS_PER_DAY};
use crate::store::Store;
use chrono::NaiveDate;
use serde_json::json;

pub const LOGIN_TO_ADD_ENTRIES: &str = "Please login to add entries";
pub const LOGIN_TO_VIEW_ENTRIES: &str = "Please login to view your entries";

/// Entry creation input, validated at the boundary.
#[derive(Debug, Clone)]
pub struct CreateEntry {
    pub description: String,
    pub date: NaiveDate,
    pub time: i32,
    pub calories: i32,
}

/// Entry service.
pub struct EntryService;

impl EntryService {
    /// Create an entry owned by the authenticated caller.
    ///
    /// The owner is re-fetched by the authenticated id rather than
    /// trusted from the request context, which may be stale. The insert
    /// itself links entry and owner atomically.
    pub async fn add_entry(
        store: &dyn Store,
        identity: &Identity,
        input: CreateEntry,
    ) -> ApiResult<Entry> {
        let current = identity.require(LOGIN_TO_ADD_ENTRIES)?;

        if input.description.trim().is_empty() {
            return Err(ApiError::user_input(
                "description must not be empty",
                json!({ "description": input.description }),
            ));
        }
        if !(0..SECONDS_PER_DAY).contains(&input.time) {
            return Err(ApiError::user_input(
                format!("time must be between 0 and {} seconds", SECONDS_PER_DAY - 1),
                json!({ "time": input.time }),
            ));
        }
        if input.calories < 0 {
            return Err(ApiError::user_input(
                "calories must not be negative",
                json!({ "calories": input.calories }),
            ));
        }

        let owner = store
            .find_user_by_id(current.id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        let entry = store
            .insert_entry(NewEntry {
                description: input.description,
                date: input.date,
                time: input.time,
                calories: input.calories,
                user_id: owner.id,
            })
            .await?;
        Ok(entry)
    }

    /// All entries owned by the authenticated caller.
    pub async fn my_entries(store: &dyn Store, identity: &Identity) -> ApiResult<Vec<Entry>> {
        let current = identity.require(LOGIN_TO_VIEW_ENTRIES)?;
        Ok(store.entries_for_user(current.id).await?)
    }
}

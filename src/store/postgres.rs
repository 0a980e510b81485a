//! PostgreSQL-backed store
//!
//! Connection pooling and migrations follow production settings:
//! health-checked connections, acquire timeouts and bounded lifetimes.
//! Uniqueness of usernames is enforced by the database constraint;
//! entry ownership is a foreign key, so an entry and its back-reference
//! are a single atomic write.

use super::{Store, StoreError};
use crate::models::{
    ActivityLevel, Entry, Gender, NewEntry, NewUser, Objective, User, WeightSample,
};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

// Postgres error codes for constraint violations
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// PostgreSQL store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    firstname: String,
    lastname: Option<String>,
    username: String,
    password_hash: String,
    gender: i16,
    objective: Option<i16>,
    height_cm: Option<f64>,
    effort: Option<i16>,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct WeightRow {
    user_id: Uuid,
    date: NaiveDate,
    weight_kg: f64,
}

#[derive(sqlx::FromRow)]
struct EntryRow {
    id: Uuid,
    description: String,
    date: NaiveDate,
    time_of_day: i32,
    calories: i32,
    user_id: Uuid,
    created_at: DateTime<Utc>,
}

const SELECT_USER: &str = r#"
    SELECT id, firstname, lastname, username, password_hash,
           gender, objective, height_cm, effort, created_at
    FROM users
"#;

impl PgStore {
    /// Connect with pool settings suitable for production use.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = PgConnectOptions::from_str(database_url)?.application_name("nutrigraph");

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .test_before_acquire(true)
            .connect_with(options)
            .await?;

        info!(max = max_connections, "Database pool created");
        Ok(Self { pool })
    }

    /// Run pending migrations from `./migrations`.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations completed");
        Ok(())
    }

    async fn load_weights(
        &self,
        user_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<WeightSample>>, StoreError> {
        let rows = sqlx::query_as::<_, WeightRow>(
            r#"
            SELECT user_id, date, weight_kg
            FROM weight_samples
            WHERE user_id = ANY($1)
            ORDER BY date, created_at
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let mut weights: HashMap<Uuid, Vec<WeightSample>> = HashMap::new();
        for row in rows {
            weights.entry(row.user_id).or_default().push(WeightSample {
                date: row.date,
                weight_kg: row.weight_kg,
            });
        }
        Ok(weights)
    }

    async fn hydrate_user(&self, row: Option<UserRow>) -> Result<Option<User>, StoreError> {
        let Some(row) = row else { return Ok(None) };
        let mut weights = self.load_weights(&[row.id]).await?;
        let samples = weights.remove(&row.id).unwrap_or_default();
        user_from_row(row, samples).map(Some)
    }
}

fn user_from_row(row: UserRow, weights: Vec<WeightSample>) -> Result<User, StoreError> {
    let gender = Gender::from_code(row.gender)
        .ok_or_else(|| anyhow!("invalid gender code {} for user {}", row.gender, row.id))?;
    let objective = row
        .objective
        .map(|code| {
            Objective::from_code(code)
                .ok_or_else(|| anyhow!("invalid objective code {} for user {}", code, row.id))
        })
        .transpose()?;
    let effort = row
        .effort
        .map(|code| {
            ActivityLevel::from_code(code)
                .ok_or_else(|| anyhow!("invalid effort code {} for user {}", code, row.id))
        })
        .transpose()?;

    Ok(User {
        id: row.id,
        firstname: row.firstname,
        lastname: row.lastname,
        username: row.username,
        password_hash: row.password_hash,
        gender,
        objective,
        height_cm: row.height_cm,
        effort,
        weights,
        created_at: row.created_at,
    })
}

fn entry_from_row(row: EntryRow) -> Entry {
    Entry {
        id: row.id,
        description: row.description,
        date: row.date,
        time: row.time_of_day,
        calories: row.calories,
        user_id: row.user_id,
        created_at: row.created_at,
    }
}

fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => return StoreError::DuplicateUsername,
            Some(FOREIGN_KEY_VIOLATION) => return StoreError::UserNotFound,
            _ => {}
        }
    }
    StoreError::Backend(err.into())
}

#[async_trait]
impl Store for PgStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (firstname, lastname, username, password_hash,
                               gender, objective, height_cm, effort)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, firstname, lastname, username, password_hash,
                      gender, objective, height_cm, effort, created_at
            "#,
        )
        .bind(&user.firstname)
        .bind(&user.lastname)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.gender.code())
        .bind(user.objective.map(Objective::code))
        .bind(user.height_cm)
        .bind(user.effort.map(ActivityLevel::code))
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let mut weights = Vec::new();
        if let Some(sample) = user.initial_weight {
            sqlx::query(
                r#"
                INSERT INTO weight_samples (user_id, date, weight_kg)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(row.id)
            .bind(sample.date)
            .bind(sample.weight_kg)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
            weights.push(sample);
        }

        tx.commit().await.map_err(map_sqlx_error)?;

        user_from_row(row, weights)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        self.hydrate_user(row).await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE username = $1"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        self.hydrate_user(row).await
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} ORDER BY created_at, id"))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut weights = self.load_weights(&ids).await?;
        rows.into_iter()
            .map(|row| {
                let samples = weights.remove(&row.id).unwrap_or_default();
                user_from_row(row, samples)
            })
            .collect()
    }

    async fn count_users(&self) -> Result<i64, StoreError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn insert_entry(&self, entry: NewEntry) -> Result<Entry, StoreError> {
        // Single insert: the foreign key both validates the owner and
        // establishes the back-reference atomically.
        let row = sqlx::query_as::<_, EntryRow>(
            r#"
            INSERT INTO entries (description, date, time_of_day, calories, user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, description, date, time_of_day, calories, user_id, created_at
            "#,
        )
        .bind(&entry.description)
        .bind(entry.date)
        .bind(entry.time)
        .bind(entry.calories)
        .bind(entry.user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(entry_from_row(row))
    }

    async fn entries_for_user(&self, user_id: Uuid) -> Result<Vec<Entry>, StoreError> {
        let rows = sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT id, description, date, time_of_day, calories, user_id, created_at
            FROM entries
            WHERE user_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(entry_from_row).collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(map_sqlx_error)
    }
}

//! Domain models for users and food entries
//!
//! Display values that the original schema attached to records
//! (`fullname`, `clockTime`) live here as pure functions so they stay
//! independent of the storage layer.

use async_graphql::{Enum, SimpleObject};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Upper bound (exclusive) for an entry's time-of-day in seconds.
pub const SECONDS_PER_DAY: i32 = 86_400;

/// Biological gender, stored as a numeric code (female = 0, male = 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Enum)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    pub fn code(self) -> i16 {
        match self {
            Gender::Female => 0,
            Gender::Male => 1,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(Gender::Female),
            1 => Some(Gender::Male),
            _ => None,
        }
    }
}

/// Weight objective, scaling the user's calorie budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Enum)]
#[serde(rename_all = "lowercase")]
pub enum Objective {
    Loss,
    Neutral,
    Gain,
}

impl Objective {
    /// Multiplier applied to maintenance calories.
    pub fn calorie_factor(self) -> f64 {
        match self {
            Objective::Loss => 0.8,
            Objective::Neutral => 1.0,
            Objective::Gain => 1.3,
        }
    }

    pub fn code(self) -> i16 {
        match self {
            Objective::Loss => 0,
            Objective::Neutral => 1,
            Objective::Gain => 2,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(Objective::Loss),
            1 => Some(Objective::Neutral),
            2 => Some(Objective::Gain),
            _ => None,
        }
    }
}

/// Activity level used to estimate daily energy expenditure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Enum)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    /// Standard activity multiplier over basal metabolic rate.
    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }

    pub fn code(self) -> i16 {
        match self {
            ActivityLevel::Sedentary => 0,
            ActivityLevel::Light => 1,
            ActivityLevel::Moderate => 2,
            ActivityLevel::Active => 3,
            ActivityLevel::VeryActive => 4,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(ActivityLevel::Sedentary),
            1 => Some(ActivityLevel::Light),
            2 => Some(ActivityLevel::Moderate),
            3 => Some(ActivityLevel::Active),
            4 => Some(ActivityLevel::VeryActive),
            _ => None,
        }
    }
}

/// A dated body-weight measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, SimpleObject)]
pub struct WeightSample {
    pub date: NaiveDate,
    pub weight_kg: f64,
}

/// User account with profile metrics.
///
/// `weights` is kept ordered by date. The user's entries are not stored
/// on the record; they are derived from the entries' back-references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub firstname: String,
    pub lastname: Option<String>,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub gender: Gender,
    pub objective: Option<Objective>,
    pub height_cm: Option<f64>,
    pub effort: Option<ActivityLevel>,
    pub weights: Vec<WeightSample>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a user. The password must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub firstname: String,
    pub lastname: Option<String>,
    pub username: String,
    pub password_hash: String,
    pub gender: Gender,
    pub objective: Option<Objective>,
    pub height_cm: Option<f64>,
    pub effort: Option<ActivityLevel>,
    pub initial_weight: Option<WeightSample>,
}

/// A logged food entry, always owned by exactly one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: Uuid,
    pub description: String,
    pub date: NaiveDate,
    /// Seconds since midnight, in `0..SECONDS_PER_DAY`.
    pub time: i32,
    pub calories: i32,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an entry.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub description: String,
    pub date: NaiveDate,
    pub time: i32,
    pub calories: i32,
    pub user_id: Uuid,
}

/// Display name, "First Last" or just the first name.
pub fn full_name(user: &User) -> String {
    match &user.lastname {
        Some(lastname) => format!("{} {}", user.firstname, lastname),
        None => user.firstname.clone(),
    }
}

/// Render a time-of-day in seconds as "H:MM".
pub fn clock_time(seconds: i32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    format!("{}:{:02}", hours, minutes)
}

//! User registration, login and profile access
//!
//! # Performance
//!
//! Password hashing and verification run on the blocking thread pool;
//! they are the only CPU-heavy suspension points in these flows.

use crate::auth::{Identity, PasswordService, TokenService};
use crate::error::{ApiError, ApiResult};
use crate::models::{ActivityLevel, Gender, NewUser, Objective, User, WeightSample};
use crate::store::{Store, StoreError};
use chrono::Utc;
use serde_json::json;
use validator::ValidateLength;

/// Single rejection message for both unknown-username and wrong-password,
/// so login reveals nothing about which check failed.
pub const BAD_CREDENTIALS: &str = "Incorrect username or password";

pub const LOGIN_TO_VIEW_PROFILE: &str = "Please login to view your profile";

const MIN_USERNAME_LEN: u64 = 3;
const MAX_USERNAME_LEN: u64 = 64;
const MIN_PASSWORD_LEN: u64 = 8;

/// Registration input, validated here before it reaches the store.
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub firstname: String,
    pub lastname: Option<String>,
    pub username: String,
    pub password: String,
    pub gender: Gender,
    pub objective: Option<Objective>,
    pub height_cm: Option<f64>,
    pub initial_weight_kg: Option<f64>,
    pub effort: Option<ActivityLevel>,
}

/// User service.
pub struct UserService;

impl UserService {
    /// Register a new user. The username is case-normalized before the
    /// uniqueness check, and the password is hashed before persistence.
    pub async fn register(store: &dyn Store, input: RegisterUser) -> ApiResult<User> {
        let username = input.username.trim().to_lowercase();

        if !username.validate_length(Some(MIN_USERNAME_LEN), Some(MAX_USERNAME_LEN), None) {
            return Err(ApiError::user_input(
                format!("username must be {MIN_USERNAME_LEN} to {MAX_USERNAME_LEN} characters"),
                json!({ "username": username }),
            ));
        }
        if input.firstname.trim().is_empty() {
            return Err(ApiError::user_input(
                "firstname must not be empty",
                json!({ "firstname": input.firstname }),
            ));
        }
        if !input
            .password
            .validate_length(Some(MIN_PASSWORD_LEN), None, None)
        {
            // no argument echo: never reflect the plaintext back
            return Err(ApiError::user_input(
                format!("password must be at least {MIN_PASSWORD_LEN} characters"),
                serde_json::Value::Null,
            ));
        }

        let password_hash = PasswordService::hash_async(input.password).await?;

        let new_user = NewUser {
            firstname: input.firstname.trim().to_string(),
            lastname: input.lastname,
            username: username.clone(),
            password_hash,
            gender: input.gender,
            objective: input.objective,
            height_cm: input.height_cm,
            effort: input.effort,
            initial_weight: input.initial_weight_kg.map(|weight_kg| WeightSample {
                date: Utc::now().date_naive(),
                weight_kg,
            }),
        };

        // The store's unique constraint is the authority; its failure
        // message becomes the developer-facing detail.
        match store.insert_user(new_user).await {
            Ok(user) => Ok(user),
            Err(err @ StoreError::DuplicateUsername) => Err(ApiError::user_input(
                err.to_string(),
                json!({ "username": username }),
            )),
            Err(err) => Err(err.into()),
        }
    }

    /// Verify credentials and issue a bearer token.
    pub async fn login(
        store: &dyn Store,
        tokens: &TokenService,
        username: &str,
        password: &str,
    ) -> ApiResult<String> {
        let username = username.trim().to_lowercase();

        let Some(user) = store.find_user_by_username(&username).await? else {
            return Err(ApiError::authentication(BAD_CREDENTIALS));
        };

        let valid =
            PasswordService::verify_async(password.to_string(), user.password_hash.clone())
                .await?;
        if !valid {
            return Err(ApiError::authentication(BAD_CREDENTIALS));
        }

        tokens
            .issue(user.id, &user.username)
            .map_err(ApiError::Internal)
    }

    /// The authenticated caller's own profile.
    pub async fn my_user(store: &dyn Store, identity: &Identity) -> ApiResult<User> {
        let current = identity.require(LOGIN_TO_VIEW_PROFILE)?;
        store
            .find_user_by_id(current.id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    fn registration(username: &str) -> RegisterUser {
        RegisterUser {
            firstname: "Mike".to_string(),
            lastname: Some("Lewis".to_string()),
            username: username.to_string(),
            password: "secret123".to_string(),
            gender: Gender::Male,
            objective: Some(Objective::Loss),
            height_cm: Some(180.0),
            initial_weight_kg: Some(82.5),
            effort: Some(ActivityLevel::Moderate),
        }
    }

    #[tokio::test]
    async fn register_normalizes_username_and_hashes_password() {
        let store = InMemoryStore::new();
        let user = UserService::register(&store, registration("MLewis"))
            .await
            .unwrap();

        assert_eq!(user.username, "mlewis");
        assert_ne!(user.password_hash, "secret123");
        assert!(PasswordService::verify("secret123", &user.password_hash).unwrap());
        assert_eq!(user.weights.len(), 1);
        assert_eq!(user.weights[0].weight_kg, 82.5);
    }

    #[tokio::test]
    async fn register_rejects_short_username() {
        let store = InMemoryStore::new();
        let err = UserService::register(&store, registration("ml"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::UserInput { .. }));
        assert_eq!(store.count_users().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn register_rejects_short_password() {
        let store = InMemoryStore::new();
        let mut input = registration("mlewis");
        input.password = "short".to_string();

        let err = UserService::register(&store, input).await.unwrap_err();
        match err {
            ApiError::UserInput { invalid_args, .. } => {
                // the plaintext must not be echoed back
                assert!(invalid_args.is_null());
            }
            other => panic!("unexpected error kind: {other:?}"),
        }
    }

    #[tokio::test]
    async fn duplicate_username_is_case_insensitive() {
        let store = InMemoryStore::new();
        UserService::register(&store, registration("mlewis"))
            .await
            .unwrap();

        let err = UserService::register(&store, registration("MLEWIS"))
            .await
            .unwrap_err();
        match err {
            ApiError::UserInput { invalid_args, .. } => {
                assert_eq!(invalid_args["username"], "mlewis");
            }
            other => panic!("unexpected error kind: {other:?}"),
        }
        assert_eq!(store.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn login_rejections_are_indistinguishable() {
        let store = InMemoryStore::new();
        let tokens = TokenService::new("test-secret", 3600);
        UserService::register(&store, registration("mlewis"))
            .await
            .unwrap();

        let unknown_user = UserService::login(&store, &tokens, "nobody", "secret123")
            .await
            .unwrap_err();
        let wrong_password = UserService::login(&store, &tokens, "mlewis", "wrong")
            .await
            .unwrap_err();

        assert_eq!(unknown_user.to_string(), BAD_CREDENTIALS);
        assert_eq!(wrong_password.to_string(), BAD_CREDENTIALS);
    }

    #[tokio::test]
    async fn login_issues_token_for_the_right_user() {
        let store = InMemoryStore::new();
        let tokens = TokenService::new("test-secret", 3600);
        let user = UserService::register(&store, registration("mlewis"))
            .await
            .unwrap();

        let token = UserService::login(&store, &tokens, "mlewis", "secret123")
            .await
            .unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.username, "mlewis");
    }

    #[tokio::test]
    async fn my_user_requires_identity() {
        let store = InMemoryStore::new();
        let err = UserService::my_user(&store, &Identity::anonymous())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), LOGIN_TO_VIEW_PROFILE);
    }
}

//! End-to-end tests for the GraphQL schema
//!
//! Drives the full register -> login -> add entry -> read entries flow
//! against an isolated in-memory store, with identity resolved from
//! real `Authorization` headers.

use async_graphql::Request;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use nutrigraph::auth::{resolve_identity, Identity, TokenService};
use nutrigraph::graphql::{build_schema, AppSchema};
use nutrigraph::store::{InMemoryStore, Store};
use std::sync::Arc;

struct TestApp {
    schema: AppSchema,
    store: Arc<InMemoryStore>,
    tokens: TokenService,
}

impl TestApp {
    fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let tokens = TokenService::new("test-secret", 3600);
        let schema = build_schema(store.clone() as Arc<dyn Store>, tokens.clone());
        Self {
            schema,
            store,
            tokens,
        }
    }

    /// Execute an operation as an anonymous caller.
    async fn execute(&self, query: &str) -> async_graphql::Response {
        self.schema
            .execute(Request::new(query).data(Identity::anonymous()))
            .await
    }

    /// Execute an operation with a bearer token, resolving identity the
    /// way the HTTP layer does.
    async fn execute_with_token(&self, token: &str, query: &str) -> async_graphql::Response {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            format!("Bearer {token}").parse().expect("header value"),
        );
        let identity = resolve_identity(self.store.as_ref(), &self.tokens, &headers)
            .await
            .expect("identity resolution");
        self.schema
            .execute(Request::new(query).data(identity))
            .await
    }

    async fn register_mlewis(&self) -> String {
        let response = self
            .execute(
                r#"mutation {
                    AddUser(firstname: "Mike", lastname: "Lewis",
                            username: "mlewis", password: "secret123",
                            gender: MALE) {
                        id
                        username
                        fullname
                    }
                }"#,
            )
            .await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let data = response.data.into_json().unwrap();
        assert_eq!(data["AddUser"]["username"], "mlewis");
        assert_eq!(data["AddUser"]["fullname"], "Mike Lewis");
        data["AddUser"]["id"].as_str().unwrap().to_string()
    }

    async fn login(&self, username: &str, password: &str) -> async_graphql::Response {
        self.execute(&format!(
            r#"mutation {{ Login(username: "{username}", password: "{password}") {{ value }} }}"#
        ))
        .await
    }
}

fn error_json(response: &async_graphql::Response) -> serde_json::Value {
    serde_json::to_value(&response.errors[0]).unwrap()
}

#[tokio::test]
async fn register_login_add_entry_read_back() {
    let app = TestApp::new();

    // register
    let user_id = app.register_mlewis().await;

    // login with the wrong password
    let rejected = app.login("mlewis", "wrong").await;
    assert_eq!(rejected.errors.len(), 1);
    let err = error_json(&rejected);
    assert_eq!(err["message"], "Incorrect username or password");
    assert_eq!(err["extensions"]["code"], "UNAUTHENTICATED");

    // login with the right password
    let accepted = app.login("mlewis", "secret123").await;
    assert!(accepted.errors.is_empty(), "{:?}", accepted.errors);
    let data = accepted.data.into_json().unwrap();
    let token = data["Login"]["value"].as_str().unwrap().to_string();
    assert!(!token.is_empty());

    // add an entry with the token
    let added = app
        .execute_with_token(
            &token,
            r#"mutation {
                AddEntry(description: "Hash Browns", date: "2020-04-26",
                         time: 50400, calories: 500) {
                    id
                    description
                    clockTime
                    calories
                    user { id username }
                }
            }"#,
        )
        .await;
    assert!(added.errors.is_empty(), "{:?}", added.errors);
    let data = added.data.into_json().unwrap();
    assert_eq!(data["AddEntry"]["description"], "Hash Browns");
    assert_eq!(data["AddEntry"]["clockTime"], "14:00");
    assert_eq!(data["AddEntry"]["calories"], 500);
    assert_eq!(data["AddEntry"]["user"]["id"], user_id);

    // the entry shows up in myEntries and in the user's entries
    let mine = app
        .execute_with_token(
            &token,
            r#"{ myEntries { description } myUser { entries { description } } }"#,
        )
        .await;
    assert!(mine.errors.is_empty(), "{:?}", mine.errors);
    let data = mine.data.into_json().unwrap();
    assert_eq!(data["myEntries"][0]["description"], "Hash Browns");
    assert_eq!(data["myUser"]["entries"][0]["description"], "Hash Browns");
}

#[tokio::test]
async fn unknown_username_and_wrong_password_reject_identically() {
    let app = TestApp::new();
    app.register_mlewis().await;

    let unknown = app.login("nobody", "secret123").await;
    let wrong = app.login("mlewis", "wrong").await;

    assert_eq!(
        error_json(&unknown)["message"],
        error_json(&wrong)["message"]
    );
}

#[tokio::test]
async fn add_entry_without_token_fails_and_writes_nothing() {
    let app = TestApp::new();
    app.register_mlewis().await;

    let response = app
        .execute(
            r#"mutation {
                AddEntry(description: "Hash Browns", date: "2020-04-26",
                         time: 50400, calories: 500) { id }
            }"#,
        )
        .await;

    let err = error_json(&response);
    assert_eq!(err["message"], "Please login to add entries");
    assert_eq!(err["extensions"]["code"], "UNAUTHENTICATED");
    assert_eq!(app.store.entry_count().await, 0);
}

#[tokio::test]
async fn my_entries_without_token_fails() {
    let app = TestApp::new();

    let response = app.execute("{ myEntries { id } }").await;
    assert_eq!(
        error_json(&response)["message"],
        "Please login to view your entries"
    );
}

#[tokio::test]
async fn duplicate_registration_is_rejected_case_insensitively() {
    let app = TestApp::new();
    app.register_mlewis().await;

    let response = app
        .execute(
            r#"mutation {
                AddUser(firstname: "Mara", username: "MLewis",
                        password: "another123", gender: FEMALE) { id }
            }"#,
        )
        .await;

    let err = error_json(&response);
    assert_eq!(err["extensions"]["code"], "BAD_USER_INPUT");
    assert_eq!(err["extensions"]["invalidArgs"]["username"], "mlewis");

    // the first registration is unaffected
    let count = app.execute("{ userCount }").await;
    assert_eq!(count.data.into_json().unwrap()["userCount"], 1);
}

#[tokio::test]
async fn password_is_not_part_of_the_schema() {
    let app = TestApp::new();
    app.register_mlewis().await;

    // selecting a password field is a query validation error
    let response = app.execute("{ allUsers { username password } }").await;
    assert!(!response.errors.is_empty());

    // and the serialized user carries no password-like field
    let users = app.execute("{ allUsers { id firstname lastname fullname username gender } }").await;
    assert!(users.errors.is_empty(), "{:?}", users.errors);
    let json = users.data.into_json().unwrap();
    assert!(json["allUsers"][0].get("password").is_none());
    assert!(json["allUsers"][0].get("passwordHash").is_none());
    assert_eq!(json["allUsers"][0]["gender"], "MALE");
}

#[tokio::test]
async fn tampered_token_fails_identity_resolution() {
    let app = TestApp::new();
    app.register_mlewis().await;

    let accepted = app.login("mlewis", "secret123").await;
    let data = accepted.data.into_json().unwrap();
    let mut token = data["Login"]["value"].as_str().unwrap().to_string();
    token.push('x');

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        format!("Bearer {token}").parse().expect("header value"),
    );
    let result = resolve_identity(app.store.as_ref(), &app.tokens, &headers).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn token_for_vanished_user_executes_as_anonymous() {
    let app = TestApp::new();
    app.register_mlewis().await;

    // validly signed, but the subject was never stored
    let ghost_token = app.tokens.issue(uuid::Uuid::new_v4(), "ghost").unwrap();

    let response = app
        .execute_with_token(&ghost_token, "{ myEntries { id } }")
        .await;
    assert_eq!(
        error_json(&response)["message"],
        "Please login to view your entries"
    );
}

#[tokio::test]
async fn profile_fields_round_trip_through_registration() {
    let app = TestApp::new();

    let response = app
        .execute(
            r#"mutation {
                AddUser(firstname: "Karen", lastname: "Lou", username: "klou",
                        password: "secret123", gender: FEMALE,
                        objective: LOSS, height: 168.5, weight: 61.2,
                        effort: MODERATE) {
                    username
                    objective
                    height
                    effort
                    weights { weightKg }
                }
            }"#,
        )
        .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    let data = response.data.into_json().unwrap();
    assert_eq!(data["AddUser"]["username"], "klou");
    assert_eq!(data["AddUser"]["objective"], "LOSS");
    assert_eq!(data["AddUser"]["height"], 168.5);
    assert_eq!(data["AddUser"]["effort"], "MODERATE");
    assert_eq!(data["AddUser"]["weights"][0]["weightKg"], 61.2);
}

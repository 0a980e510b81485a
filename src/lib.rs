//! Nutrigraph backend library
//!
//! GraphQL API for a personal nutrition and fitness tracker.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! - Routes: HTTP request handling, identity resolution and the GraphQL endpoint
//! - GraphQL: schema, object types and resolvers
//! - Services: business logic (registration, login, entry ownership)
//! - Store: data access behind a trait (PostgreSQL in production,
//!   in-memory for tests)

pub mod auth;
pub mod config;
pub mod error;
pub mod graphql;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

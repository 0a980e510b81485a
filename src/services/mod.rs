//! Business logic services
//!
//! Services own the authorization guards and the validation that sits
//! between the GraphQL resolvers and the store.

mod entry;
mod user;

pub use entry::{CreateEntry, EntryService, LOGIN_TO_ADD_ENTRIES, LOGIN_TO_VIEW_ENTRIES};
pub use user::{RegisterUser, UserService, BAD_CREDENTIALS, LOGIN_TO_VIEW_PROFILE};

//! Authentication module
//!
//! JWT-based bearer tokens with bcrypt password hashing, plus the
//! per-request identity resolver that turns an `Authorization` header
//! into a request-scoped identity.

mod identity;
mod password;
mod token;

pub use identity::{resolve_identity, Identity};
pub use password::PasswordService;
pub use token::{Claims, TokenService};

//! `stockroom-auth` — pure credential boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it issues and
//! verifies bearer tokens, hashes and compares passwords, and defines the
//! role tier. Loading the user behind a token is the caller's concern.

pub mod claims;
pub mod password;
pub mod roles;
pub mod token;

pub use claims::{AccessClaims, TOKEN_TTL_HOURS};
pub use password::{hash_password, verify_password, PasswordError};
pub use roles::Role;
pub use token::{TokenError, TokenService};

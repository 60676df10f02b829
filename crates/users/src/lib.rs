//! `stockroom-users` — user accounts: record shape and input validation.

pub mod user;

pub use user::{validate_password, NewUser, User, UserUpdate, PASSWORD_SYMBOLS};

//! Types stored in the cookie session.

pub mod session;

pub use session::{CurrentSession, keys as session_keys};

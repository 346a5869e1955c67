//! Backend seams used by the route handlers.
//!
//! - [`identity`] - Sign-in, sign-up, token validation, session events
//! - [`profiles`] - Read access to student profile rows
//! - [`content`] - Video and success story CRUD

pub mod content;
pub mod identity;
pub mod profiles;

pub use content::{ContentCollection, ContentError, ContentService, EntityStore, InMemoryStore};
pub use identity::{AuthSession, IdentityProvider, SessionChange, SignUpOutcome};
pub use profiles::{ProfileStore, load_profile, load_users_with_fallback};

//! Access policy: who is an admin, and where each navigation lands.
//!
//! The admin check is an exact email comparison against one configured
//! address. It is done here and nowhere else; every other component asks
//! [`AccessPolicy`] for a [`Role`] or a [`RouteDecision`].
//!
//! # Route state machine
//!
//! | path       | unauthenticated    | student            | admin              |
//! |------------|--------------------|--------------------|--------------------|
//! | `/`        | Landing            | Landing            | Landing            |
//! | `/auth`    | `AuthForm`         | redirect `/student`| redirect `/admin`  |
//! | `/admin`   | redirect `/auth`   | redirect `/auth`   | `AdminDashboard`   |
//! | `/student` | redirect `/auth`   | `StudentDashboard` | redirect `/auth`   |
//!
//! Decisions are recomputed on every request; nothing is cached between
//! navigations.

use crate::identity::Identity;
use crate::types::{Email, Role};

/// Default administrator address.
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@themarketsecret.com";

/// The four logical paths of the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortalPath {
    Landing,
    Auth,
    Admin,
    Student,
}

impl PortalPath {
    /// URL path for redirects.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Landing => "/",
            Self::Auth => "/auth",
            Self::Admin => "/admin",
            Self::Student => "/student",
        }
    }

    /// Map a request path to the logical path whose gate applies.
    ///
    /// Nested paths inherit their section's gate, so `/admin/videos/new` is
    /// guarded like `/admin`. Unknown paths return `None`.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let section = path.trim_start_matches('/').split('/').next().unwrap_or("");
        match section {
            "" => Some(Self::Landing),
            "auth" => Some(Self::Auth),
            "admin" => Some(Self::Admin),
            "student" => Some(Self::Student),
            _ => None,
        }
    }
}

/// A page the portal can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Landing,
    AuthForm,
    AdminDashboard,
    StudentDashboard,
}

/// Outcome of a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Show this view.
    Render(View),
    /// Send the browser elsewhere.
    Redirect(PortalPath),
}

/// Role classification and route gating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    admin_email: Email,
}

impl AccessPolicy {
    /// Create a policy for the given administrator address.
    #[must_use]
    pub const fn new(admin_email: Email) -> Self {
        Self { admin_email }
    }

    /// The configured administrator address.
    #[must_use]
    pub const fn admin_email(&self) -> &Email {
        &self.admin_email
    }

    /// Classify an identity.
    ///
    /// Returns `None` when nobody is signed in, [`Role::Admin`] when the email
    /// is exactly the administrator address (case-sensitive), and
    /// [`Role::Student`] otherwise.
    #[must_use]
    pub fn classify(&self, identity: Option<&Identity>) -> Option<Role> {
        identity.map(|identity| {
            if identity.email == self.admin_email {
                Role::Admin
            } else {
                Role::Student
            }
        })
    }

    /// Decide where a navigation to `path` lands for `identity`.
    #[must_use]
    pub fn route(&self, path: PortalPath, identity: Option<&Identity>) -> RouteDecision {
        route(path, self.classify(identity))
    }
}

/// The route state machine over an already classified role.
#[must_use]
pub const fn route(path: PortalPath, role: Option<Role>) -> RouteDecision {
    match (path, role) {
        (PortalPath::Landing, _) => RouteDecision::Render(View::Landing),
        (PortalPath::Auth, None) => RouteDecision::Render(View::AuthForm),
        (PortalPath::Auth, Some(Role::Admin)) => RouteDecision::Redirect(PortalPath::Admin),
        (PortalPath::Auth, Some(Role::Student)) => RouteDecision::Redirect(PortalPath::Student),
        (PortalPath::Admin, Some(Role::Admin)) => RouteDecision::Render(View::AdminDashboard),
        (PortalPath::Student, Some(Role::Student)) => {
            RouteDecision::Render(View::StudentDashboard)
        }
        (PortalPath::Admin | PortalPath::Student, _) => RouteDecision::Redirect(PortalPath::Auth),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::DateTime;

    use super::*;
    use crate::types::UserId;

    fn policy() -> AccessPolicy {
        AccessPolicy::new(Email::parse(DEFAULT_ADMIN_EMAIL).unwrap())
    }

    fn identity(email: &str) -> Identity {
        Identity {
            id: UserId::generate(),
            email: Email::parse(email).unwrap(),
            display_name: None,
            created_at: DateTime::UNIX_EPOCH,
            last_login: None,
        }
    }

    #[test]
    fn test_classify_exact_admin_match() {
        let admin = identity("admin@themarketsecret.com");
        assert_eq!(policy().classify(Some(&admin)), Some(Role::Admin));
    }

    #[test]
    fn test_classify_is_case_sensitive() {
        for email in [
            "Admin@themarketsecret.com",
            "admin@TheMarketSecret.com",
            "admin@themarketsecret.co",
            "admin+1@themarketsecret.com",
            "student@example.com",
        ] {
            assert_eq!(
                policy().classify(Some(&identity(email))),
                Some(Role::Student),
                "{email} must not be admin"
            );
        }
    }

    #[test]
    fn test_classify_without_identity() {
        assert_eq!(policy().classify(None), None);
    }

    #[test]
    fn test_landing_always_renders() {
        for role in [None, Some(Role::Admin), Some(Role::Student)] {
            assert_eq!(
                route(PortalPath::Landing, role),
                RouteDecision::Render(View::Landing)
            );
        }
    }

    #[test]
    fn test_unauthenticated_dashboards_redirect_to_auth() {
        for path in [PortalPath::Admin, PortalPath::Student] {
            assert_eq!(
                route(path, None),
                RouteDecision::Redirect(PortalPath::Auth)
            );
        }
        assert_eq!(
            route(PortalPath::Auth, None),
            RouteDecision::Render(View::AuthForm)
        );
    }

    #[test]
    fn test_signed_in_admin_at_auth_goes_to_admin() {
        let admin = identity("admin@themarketsecret.com");
        assert_eq!(
            policy().route(PortalPath::Auth, Some(&admin)),
            RouteDecision::Redirect(PortalPath::Admin)
        );
    }

    #[test]
    fn test_signed_in_student_at_auth_goes_to_student() {
        let student = identity("sarah@example.com");
        assert_eq!(
            policy().route(PortalPath::Auth, Some(&student)),
            RouteDecision::Redirect(PortalPath::Student)
        );
    }

    #[test]
    fn test_dashboards_are_role_exclusive() {
        let admin = identity("admin@themarketsecret.com");
        let student = identity("sarah@example.com");
        let policy = policy();

        assert_eq!(
            policy.route(PortalPath::Admin, Some(&admin)),
            RouteDecision::Render(View::AdminDashboard)
        );
        assert_eq!(
            policy.route(PortalPath::Student, Some(&admin)),
            RouteDecision::Redirect(PortalPath::Auth)
        );
        assert_eq!(
            policy.route(PortalPath::Student, Some(&student)),
            RouteDecision::Render(View::StudentDashboard)
        );
        assert_eq!(
            policy.route(PortalPath::Admin, Some(&student)),
            RouteDecision::Redirect(PortalPath::Auth)
        );
    }

    #[test]
    fn test_from_path_uses_section() {
        assert_eq!(PortalPath::from_path("/"), Some(PortalPath::Landing));
        assert_eq!(PortalPath::from_path("/auth"), Some(PortalPath::Auth));
        assert_eq!(
            PortalPath::from_path("/admin/videos/new"),
            Some(PortalPath::Admin)
        );
        assert_eq!(PortalPath::from_path("/student"), Some(PortalPath::Student));
        assert_eq!(PortalPath::from_path("/pricing"), None);
    }
}

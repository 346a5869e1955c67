//! Subscription tiers, video package types and roles.

use serde::{Deserialize, Serialize};

/// Error returned when a tier, package or role string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct ParseLabelError {
    kind: &'static str,
    value: String,
}

impl ParseLabelError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// Access level purchased by a student.
///
/// Stored on the profile row as `subscription_status`. A profile without a
/// value is treated as [`SubscriptionTier::Unpaid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    #[default]
    Unpaid,
    Starter,
    Advanced,
}

impl SubscriptionTier {
    /// Whether the student has bought either package.
    #[must_use]
    pub const fn is_paid(self) -> bool {
        !matches!(self, Self::Unpaid)
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unpaid => "Unpaid",
            Self::Starter => "Starter",
            Self::Advanced => "Advanced",
        }
    }

    /// Value as stored in the `subscription_status` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Starter => "starter",
            Self::Advanced => "advanced",
        }
    }
}

impl std::fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubscriptionTier {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unpaid" => Ok(Self::Unpaid),
            "starter" => Ok(Self::Starter),
            "advanced" => Ok(Self::Advanced),
            _ => Err(ParseLabelError::new("subscription tier", s)),
        }
    }
}

/// Which package(s) a video belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PackageType {
    Starter,
    Advanced,
    #[default]
    Both,
}

impl PackageType {
    /// All package types in the order the admin form offers them.
    pub const ALL: [Self; 3] = [Self::Both, Self::Starter, Self::Advanced];

    /// Value as stored in the `package_type` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Starter => "starter",
            Self::Advanced => "advanced",
            Self::Both => "both",
        }
    }

    /// Label used on admin cards and in the package select.
    #[must_use]
    pub const fn admin_label(self) -> &'static str {
        match self {
            Self::Starter => "Starter Only",
            Self::Advanced => "Advanced Only",
            Self::Both => "Both Packages",
        }
    }

    /// Short badge shown on student cards.
    #[must_use]
    pub const fn badge(self) -> &'static str {
        match self {
            Self::Starter => "Starter",
            Self::Advanced => "Advanced",
            Self::Both => "All",
        }
    }

    /// The tier that unlocks this package on its own, if any.
    #[must_use]
    pub const fn tier(self) -> Option<SubscriptionTier> {
        match self {
            Self::Starter => Some(SubscriptionTier::Starter),
            Self::Advanced => Some(SubscriptionTier::Advanced),
            Self::Both => None,
        }
    }
}

impl std::fmt::Display for PackageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PackageType {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "starter" => Ok(Self::Starter),
            "advanced" => Ok(Self::Advanced),
            "both" => Ok(Self::Both),
            _ => Err(ParseLabelError::new("package type", s)),
        }
    }
}

/// Role derived from an identity. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The single administrator account.
    Admin,
    /// Everyone else.
    Student,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Student => write!(f, "student"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_parse_and_display() {
        for tier in [
            SubscriptionTier::Unpaid,
            SubscriptionTier::Starter,
            SubscriptionTier::Advanced,
        ] {
            assert_eq!(tier.to_string().parse::<SubscriptionTier>().unwrap(), tier);
        }
        assert!("gold".parse::<SubscriptionTier>().is_err());
    }

    #[test]
    fn test_only_unpaid_is_unpaid() {
        assert!(!SubscriptionTier::Unpaid.is_paid());
        assert!(SubscriptionTier::Starter.is_paid());
        assert!(SubscriptionTier::Advanced.is_paid());
    }

    #[test]
    fn test_package_defaults_to_both() {
        assert_eq!(PackageType::default(), PackageType::Both);
        assert_eq!(PackageType::Both.tier(), None);
        assert_eq!(
            PackageType::Advanced.tier(),
            Some(SubscriptionTier::Advanced)
        );
    }

    #[test]
    fn test_package_serde_uses_column_values() {
        let json = serde_json::to_string(&PackageType::Advanced).unwrap();
        assert_eq!(json, "\"advanced\"");
        let parsed: PackageType = serde_json::from_str("\"both\"").unwrap();
        assert_eq!(parsed, PackageType::Both);
    }

    #[test]
    fn test_parse_error_message() {
        let err = "platinum".parse::<PackageType>().unwrap_err();
        assert_eq!(err.to_string(), "invalid package type: platinum");
    }
}

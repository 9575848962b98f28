use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Privilege tier of an admin account. Variants are declared in ascending
/// privilege order so `Ord` compares tiers directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "super")]
    SuperAdmin,
    #[serde(rename = "founder")]
    Founder,
}

impl Role {
    /// Storage / wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::SuperAdmin => "super",
            Self::Founder => "founder",
        }
    }

    /// Human-facing label stamped on chat messages.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::SuperAdmin => "Baş Admin",
            Self::Founder => "Kurucu",
        }
    }

    pub fn is_founder(self) -> bool {
        self == Self::Founder
    }

    /// SuperAdmin or Founder.
    pub fn is_elevated(self) -> bool {
        self >= Self::SuperAdmin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role '{}'", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "super" => Ok(Self::SuperAdmin),
            "founder" => Ok(Self::Founder),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Public view of an admin account. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginAttempt {
    pub id: i64,
    pub username: String,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    pub id: i64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    pub id: i64,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub admin_id: Option<i64>,
    pub username: String,
    pub role: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AboutBox {
    pub id: i64,
    pub title: Option<String>,
    pub content: Option<String>,
}

/// How a fixture's two rosters were reconstructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterSource {
    /// Every player was matched to a side by its stored team name.
    Tagged,
    /// Team-name tagging was missing or incomplete; players were split by
    /// position using the caller-supplied player count. Not authoritative.
    Positional,
}

/// One fixture as shown on the feed and dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureGroup {
    pub group_no: usize,
    pub match_id: i64,
    pub date: String,
    pub time: String,
    pub team1: String,
    pub team2: String,
    pub t1_players: Vec<String>,
    pub t2_players: Vec<String>,
    pub roster_source: RosterSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_order_by_privilege() {
        assert!(Role::Founder > Role::SuperAdmin);
        assert!(Role::SuperAdmin > Role::Admin);
        assert!(Role::Founder.is_elevated());
        assert!(Role::SuperAdmin.is_elevated());
        assert!(!Role::Admin.is_elevated());
    }

    #[test]
    fn role_parses_wire_names() {
        for role in [Role::Admin, Role::SuperAdmin, Role::Founder] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn role_serializes_as_wire_name() {
        let json = serde_json::to_string(&Role::SuperAdmin).unwrap();
        assert_eq!(json, "\"super\"");
        let role: Role = serde_json::from_str("\"founder\"").unwrap();
        assert_eq!(role, Role::Founder);
    }

    #[test]
    fn chat_labels() {
        assert_eq!(Role::Founder.label(), "Kurucu");
        assert_eq!(Role::SuperAdmin.label(), "Baş Admin");
        assert_eq!(Role::Admin.label(), "Admin");
    }
}

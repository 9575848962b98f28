//! Database row types. These map directly to SQLite rows and convert into
//! the kura-types models that leave the service.

use chrono::{DateTime, Utc};
use kura_types::models::{AboutBox, Admin, Announcement, ChatMessage, LoginAttempt, Photo, Role};

#[derive(Debug, Clone)]
pub struct AdminRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl AdminRow {
    /// Public view without the password hash.
    pub fn to_admin(&self) -> Admin {
        Admin {
            id: self.id,
            username: self.username.clone(),
            role: self.role,
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// Insert payload for an admin account. The password must already be hashed.
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ContactUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// What the startup bootstrap did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub founder_created: bool,
    /// No founder existed but the founder username was held by another account.
    pub founder_username_taken: bool,
    pub super_admin_created: bool,
}

#[derive(Debug, Clone)]
pub struct LoginAttemptRow {
    pub id: i64,
    pub username: String,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

impl From<LoginAttemptRow> for LoginAttempt {
    fn from(row: LoginAttemptRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            success: row.success,
            timestamp: row.timestamp,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MatchRow {
    pub id: i64,
    pub team1: String,
    pub team2: String,
    pub date: String,
    pub time: String,
}

#[derive(Debug, Clone)]
pub struct PlayerRow {
    pub id: i64,
    pub name: String,
    pub match_id: i64,
    /// `None` for legacy rows written before team tagging existed.
    pub team_name: Option<String>,
}

/// One fixture and both rosters, as written by the fixture manager.
#[derive(Debug, Clone)]
pub struct NewFixture {
    pub date: String,
    pub time: String,
    pub team1: String,
    pub team2: String,
    pub t1_players: Vec<String>,
    pub t2_players: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AnnouncementRow {
    pub id: i64,
    pub text: String,
}

impl From<AnnouncementRow> for Announcement {
    fn from(row: AnnouncementRow) -> Self {
        Self { id: row.id, text: row.text }
    }
}

#[derive(Debug, Clone)]
pub struct PhotoRow {
    pub id: i64,
    pub url: String,
}

impl From<PhotoRow> for Photo {
    fn from(row: PhotoRow) -> Self {
        Self { id: row.id, url: row.url }
    }
}

#[derive(Debug, Clone)]
pub struct ChatRow {
    pub id: i64,
    pub admin_id: Option<i64>,
    pub username: String,
    pub role: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl From<ChatRow> for ChatMessage {
    fn from(row: ChatRow) -> Self {
        Self {
            id: row.id,
            admin_id: row.admin_id,
            username: row.username,
            role: row.role,
            message: row.message,
            timestamp: row.timestamp,
        }
    }
}

pub struct NewChatMessage<'a> {
    pub admin_id: i64,
    pub username: &'a str,
    pub role_label: &'a str,
    pub message: &'a str,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct AboutRow {
    pub id: i64,
    pub title: Option<String>,
    pub content: Option<String>,
}

impl From<AboutRow> for AboutBox {
    fn from(row: AboutRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
        }
    }
}

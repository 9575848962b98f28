use serde::{Deserialize, Serialize};

use crate::models::{
    AboutBox, Admin, Announcement, ChatMessage, FixtureGroup, LoginAttempt, Photo, Role,
};

// -- JWT Claims --

/// Token claims. `sub` is the admin's row id; the role is deliberately not
/// embedded because it is re-read from the store on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub exp: usize,
}

// -- Generic --

/// Transient user-facing message returned by every mutating endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub notice: String,
}

impl Notice {
    pub fn new(notice: impl Into<String>) -> Self {
        Self { notice: notice.into() }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewQuery {
    pub photo_page: Option<i64>,
    pub player_count: Option<usize>,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub admin_id: i64,
    pub username: String,
    pub role: Role,
    pub token: String,
    pub notice: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

// -- Fixtures --

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamSpec {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub players: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddFixturesRequest {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub teams: Vec<TeamSpec>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddFixturesResponse {
    pub notice: String,
    pub match_ids: Vec<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFixtureRequest {
    #[serde(default, alias = "edit_date")]
    pub date: String,
    #[serde(default, alias = "edit_time")]
    pub time: String,
    #[serde(default, alias = "edit_team1")]
    pub team1: String,
    #[serde(default, alias = "edit_team2")]
    pub team2: String,
    #[serde(default, alias = "edit_t1_players")]
    pub t1_players: Vec<String>,
    #[serde(default, alias = "edit_t2_players")]
    pub t2_players: Vec<String>,
}

// -- Admin management --

/// Body of `POST /admin/manage`, discriminated by `action`.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ManageRequest {
    SetRole {
        admin_id: i64,
        role: Role,
    },
    Add {
        #[serde(default)]
        username: String,
        #[serde(default)]
        password: String,
        name: Option<String>,
        email: Option<String>,
        phone: Option<String>,
    },
    Delete {
        admin_id: i64,
    },
    Edit {
        admin_id: i64,
        #[serde(alias = "edit_name")]
        name: Option<String>,
        #[serde(alias = "edit_email")]
        email: Option<String>,
        #[serde(alias = "edit_phone")]
        phone: Option<String>,
        #[serde(alias = "edit_password")]
        password: Option<String>,
    },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminList {
    pub admins: Vec<Admin>,
    pub is_founder: bool,
    pub is_super: bool,
}

// -- Content --

#[derive(Debug, Default, Deserialize)]
pub struct AnnouncementRequest {
    #[serde(default, alias = "announcement")]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PhotoPage {
    pub photos: Vec<Photo>,
    pub page: i64,
    pub total_pages: i64,
    pub total: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddPhotosResponse {
    pub notice: String,
    pub photos: Vec<Photo>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatSendRequest {
    #[serde(default, alias = "chat_message")]
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct AboutRequest {
    #[serde(alias = "about_title")]
    pub title: Option<String>,
    #[serde(alias = "about_content")]
    pub content: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AboutResponse {
    pub about: Option<AboutBox>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginLog {
    pub attempts: Vec<LoginAttempt>,
}

// -- Views --

#[derive(Debug, Serialize, Deserialize)]
pub struct HomeFeed {
    pub groups: Vec<FixtureGroup>,
    pub announcements: Vec<Announcement>,
    pub photos: PhotoPage,
    pub about: Option<AboutBox>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Dashboard {
    pub me: Admin,
    pub player_count: usize,
    pub groups: Vec<FixtureGroup>,
    pub announcements: Vec<Announcement>,
    pub photos: PhotoPage,
    pub chat_messages: Vec<ChatMessage>,
}

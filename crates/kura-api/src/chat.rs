//! Admin-only chat shown on the dashboard.

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use chrono::Utc;
use tracing::info;

use kura_db::Database;
use kura_db::models::NewChatMessage;
use kura_types::api::{ChatSendRequest, Notice};
use kura_types::models::ChatMessage;

use crate::auth::AppState;
use crate::blocking;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath};
use crate::policy::{self, Action, Caller};

pub const MAX_MESSAGE_CHARS: usize = 512;

pub fn send(db: &Database, caller: &Caller, message: &str) -> ApiResult<i64> {
    policy::authorize(caller, Action::SendChat)?;

    let message = message.trim();
    if message.is_empty() {
        return Err(ApiError::validation("Message cannot be empty."));
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ApiError::validation(format!(
            "Messages are limited to {MAX_MESSAGE_CHARS} characters."
        )));
    }

    let id = db.insert_chat_message(&NewChatMessage {
        admin_id: caller.id,
        username: &caller.username,
        role_label: caller.role.label(),
        message,
        timestamp: Utc::now(),
    })?;
    info!("{} posted chat message {}", caller.username, id);
    Ok(id)
}

pub fn list(db: &Database) -> ApiResult<Vec<ChatMessage>> {
    Ok(db.list_chat_messages()?.into_iter().map(Into::into).collect())
}

pub fn delete(db: &Database, caller: &Caller, id: i64) -> ApiResult<()> {
    let msg = db
        .get_chat_message(id)?
        .ok_or_else(|| ApiError::not_found("Message not found."))?;
    policy::authorize(caller, Action::DeleteChatMessage { author_id: msg.admin_id })?;

    db.delete_chat_message(id)?;
    info!("{} deleted chat message {}", caller.username, id);
    Ok(())
}

pub fn delete_all(db: &Database, caller: &Caller) -> ApiResult<usize> {
    policy::authorize(caller, Action::DeleteAllChat)?;

    let n = db.delete_all_chat_messages()?;
    info!("{} cleared the chat ({} message(s))", caller.username, n);
    Ok(n)
}

// -- Handlers --

/// POST /admin/chat/send
pub async fn send_message(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiJson(req): ApiJson<ChatSendRequest>,
) -> ApiResult<(StatusCode, Json<Notice>)> {
    blocking(&state, move |s| send(&s.db, &caller, &req.message)).await?;
    Ok((StatusCode::CREATED, Json(Notice::new("Message sent."))))
}

/// POST /admin/chat/delete/{id}
pub async fn delete_message(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Notice>> {
    blocking(&state, move |s| delete(&s.db, &caller, id)).await?;
    Ok(Json(Notice::new("Message deleted.")))
}

/// POST /admin/chat/delete_all
pub async fn delete_all_messages(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Json<Notice>> {
    blocking(&state, move |s| delete_all(&s.db, &caller)).await?;
    Ok(Json(Notice::new("All messages deleted.")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::seeded_db;

    #[test]
    fn send_stamps_role_label() {
        let (db, c) = seeded_db();
        send(&db, &c.founder, "Toplantı 20:00").unwrap();
        send(&db, &c.super_admin, "tamam").unwrap();
        send(&db, &c.admin, " geliyorum ").unwrap();

        let msgs = list(&db).unwrap();
        let labels: Vec<_> = msgs.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(labels, vec!["Kurucu", "Baş Admin", "Admin"]);
        assert_eq!(msgs[2].message, "geliyorum");
        assert_eq!(msgs[2].admin_id, Some(c.admin.id));
    }

    #[test]
    fn blank_and_oversized_messages_are_rejected() {
        let (db, c) = seeded_db();
        assert!(matches!(send(&db, &c.admin, "  "), Err(ApiError::Validation(_))));

        let long = "ş".repeat(MAX_MESSAGE_CHARS + 1);
        assert!(matches!(send(&db, &c.admin, &long), Err(ApiError::Validation(_))));

        let exact = "ş".repeat(MAX_MESSAGE_CHARS);
        assert!(send(&db, &c.admin, &exact).is_ok());
    }

    #[test]
    fn only_author_or_founder_deletes() {
        let (db, c) = seeded_db();
        let id = send(&db, &c.admin, "selam").unwrap();

        assert!(matches!(delete(&db, &c.super_admin, id), Err(ApiError::Forbidden(_))));
        delete(&db, &c.admin, id).unwrap();
        assert!(matches!(delete(&db, &c.admin, id), Err(ApiError::NotFound(_))));

        let id = send(&db, &c.super_admin, "selam").unwrap();
        delete(&db, &c.founder, id).unwrap();
        assert!(list(&db).unwrap().is_empty());
    }

    #[test]
    fn delete_all_by_non_founder_is_a_denied_no_op() {
        let (db, c) = seeded_db();
        send(&db, &c.admin, "bir").unwrap();
        send(&db, &c.super_admin, "iki").unwrap();

        for caller in [&c.admin, &c.super_admin] {
            assert!(matches!(delete_all(&db, caller), Err(ApiError::Forbidden(_))));
        }
        assert_eq!(list(&db).unwrap().len(), 2);

        assert_eq!(delete_all(&db, &c.founder).unwrap(), 2);
        assert!(list(&db).unwrap().is_empty());
    }

    #[test]
    fn messages_outlive_their_author() {
        let (db, c) = seeded_db();
        let id = send(&db, &c.admin, "hoşça kalın").unwrap();
        db.delete_admin(c.admin.id).unwrap();

        let msg = db.get_chat_message(id).unwrap().unwrap();
        assert_eq!(msg.admin_id, None);
        assert_eq!(msg.username, "ali");
        // Orphaned messages can only be removed by the founder.
        assert!(matches!(delete(&db, &c.super_admin, id), Err(ApiError::Forbidden(_))));
        delete(&db, &c.founder, id).unwrap();
    }
}

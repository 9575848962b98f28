use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use tracing::info;

use kura_db::Database;
use kura_types::api::{AnnouncementRequest, Notice};

use crate::auth::AppState;
use crate::blocking;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath};
use crate::policy::{self, Action, Caller};

pub fn add(db: &Database, caller: &Caller, text: &str) -> ApiResult<i64> {
    policy::authorize(caller, Action::AddAnnouncement)?;

    let text = text.trim();
    if text.is_empty() {
        return Err(ApiError::validation("Announcement text is required."));
    }
    let id = db.insert_announcement(text)?;
    info!("{} posted announcement {}", caller.username, id);
    Ok(id)
}

pub fn delete(db: &Database, caller: &Caller, id: i64) -> ApiResult<()> {
    policy::authorize(caller, Action::DeleteAnnouncement)?;

    if !db.delete_announcement(id)? {
        return Err(ApiError::not_found("Announcement not found."));
    }
    info!("{} deleted announcement {}", caller.username, id);
    Ok(())
}

pub fn delete_all(db: &Database, caller: &Caller) -> ApiResult<usize> {
    policy::authorize(caller, Action::DeleteAllAnnouncements)?;

    let n = db.delete_all_announcements()?;
    info!("{} deleted all {} announcement(s)", caller.username, n);
    Ok(n)
}

// -- Handlers --

/// POST /admin/add_announcement
pub async fn add_announcement(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiJson(req): ApiJson<AnnouncementRequest>,
) -> ApiResult<(StatusCode, Json<Notice>)> {
    blocking(&state, move |s| add(&s.db, &caller, &req.text)).await?;
    Ok((StatusCode::CREATED, Json(Notice::new("Announcement added."))))
}

/// POST /admin/delete_announcement/{id}
pub async fn delete_announcement(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Notice>> {
    blocking(&state, move |s| delete(&s.db, &caller, id)).await?;
    Ok(Json(Notice::new("Announcement deleted.")))
}

/// POST /admin/delete_all_announcements
pub async fn delete_all_announcements(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Json<Notice>> {
    blocking(&state, move |s| delete_all(&s.db, &caller)).await?;
    Ok(Json(Notice::new("All announcements deleted.")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::seeded_db;

    #[test]
    fn blank_text_is_rejected() {
        let (db, c) = seeded_db();
        assert!(matches!(add(&db, &c.super_admin, "   "), Err(ApiError::Validation(_))));
        assert!(db.list_announcements().unwrap().is_empty());
    }

    #[test]
    fn plain_admin_cannot_post() {
        let (db, c) = seeded_db();
        assert!(matches!(add(&db, &c.admin, "Maç iptal"), Err(ApiError::Forbidden(_))));
    }

    #[test]
    fn newest_first_and_trimmed() {
        let (db, c) = seeded_db();
        add(&db, &c.super_admin, " ilk ").unwrap();
        add(&db, &c.founder, "ikinci").unwrap();

        let texts: Vec<_> = db.list_announcements().unwrap().into_iter().map(|a| a.text).collect();
        assert_eq!(texts, vec!["ikinci", "ilk"]);
    }

    #[test]
    fn delete_missing_is_not_found() {
        let (db, c) = seeded_db();
        assert!(matches!(delete(&db, &c.super_admin, 42), Err(ApiError::NotFound(_))));
    }

    #[test]
    fn delete_all_is_founder_only() {
        let (db, c) = seeded_db();
        add(&db, &c.super_admin, "a").unwrap();
        add(&db, &c.super_admin, "b").unwrap();

        assert!(matches!(delete_all(&db, &c.super_admin), Err(ApiError::Forbidden(_))));
        assert_eq!(db.list_announcements().unwrap().len(), 2);

        assert_eq!(delete_all(&db, &c.founder).unwrap(), 2);
        assert!(db.list_announcements().unwrap().is_empty());
    }
}

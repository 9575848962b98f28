//! Read-only views: the public home feed and the admin dashboard.

use axum::{
    Extension, Json,
    extract::State,
};

use kura_db::Database;
use kura_types::api::{Dashboard, HomeFeed, ViewQuery};
use kura_types::models::Announcement;

use crate::auth::AppState;
use crate::blocking;
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiQuery;
use crate::fixtures::{self, DEFAULT_PLAYER_COUNT};
use crate::policy::{self, Action, Caller};
use crate::{about, chat, photos};

fn announcements(db: &Database) -> ApiResult<Vec<Announcement>> {
    Ok(db.list_announcements()?.into_iter().map(Into::into).collect())
}

pub fn feed(db: &Database, query: &ViewQuery) -> ApiResult<HomeFeed> {
    let player_count = query.player_count.unwrap_or(DEFAULT_PLAYER_COUNT);
    Ok(HomeFeed {
        groups: fixtures::groups(db, player_count)?,
        announcements: announcements(db)?,
        photos: photos::page(db, query.photo_page)?,
        about: about::get(db)?,
    })
}

pub fn dashboard(db: &Database, caller: &Caller, query: &ViewQuery) -> ApiResult<Dashboard> {
    policy::authorize(caller, Action::ViewDashboard)?;

    let me = db
        .get_admin_by_id(caller.id)?
        .ok_or_else(|| ApiError::Unauthorized("This account no longer exists.".into()))?
        .to_admin();
    let player_count = query.player_count.unwrap_or(DEFAULT_PLAYER_COUNT);

    Ok(Dashboard {
        me,
        player_count,
        groups: fixtures::groups(db, player_count)?,
        announcements: announcements(db)?,
        photos: photos::page(db, query.photo_page)?,
        chat_messages: chat::list(db)?,
    })
}

// -- Handlers --

/// GET /
pub async fn home(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ViewQuery>,
) -> ApiResult<Json<HomeFeed>> {
    let feed = blocking(&state, move |s| feed(&s.db, &query)).await?;
    Ok(Json(feed))
}

/// GET /admin
pub async fn admin_dashboard(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiQuery(query): ApiQuery<ViewQuery>,
) -> ApiResult<Json<Dashboard>> {
    let view = blocking(&state, move |s| dashboard(&s.db, &caller, &query)).await?;
    Ok(Json(view))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::seeded_db;
    use kura_types::api::{AboutRequest, AddFixturesRequest, TeamSpec};

    #[test]
    fn feed_collects_every_section() {
        let (db, c) = seeded_db();
        fixtures::add(
            &db,
            &c.admin,
            &AddFixturesRequest {
                date: "2024-05-01".into(),
                time: "20:00".into(),
                teams: vec![
                    TeamSpec { name: "A".into(), players: vec!["a".into()] },
                    TeamSpec { name: "B".into(), players: vec!["b".into()] },
                ],
            },
        )
        .unwrap();
        crate::announcements::add(&db, &c.super_admin, "Sezon başlıyor").unwrap();
        photos::add(&db, &c.super_admin, Some("https://img.example/1.jpg"), &[]).unwrap();
        about::upsert(
            &db,
            &c.founder,
            AboutRequest { title: Some("Kulüp".into()), content: None },
        )
        .unwrap();

        let view = feed(&db, &ViewQuery::default()).unwrap();
        assert_eq!(view.groups.len(), 1);
        assert_eq!(view.announcements[0].text, "Sezon başlıyor");
        assert_eq!(view.photos.total, 1);
        assert_eq!(view.photos.page, 1);
        assert_eq!(view.about.unwrap().title.as_deref(), Some("Kulüp"));
    }

    #[test]
    fn empty_store_gives_an_empty_feed() {
        let (db, _) = seeded_db();
        let view = feed(&db, &ViewQuery { photo_page: Some(-3), player_count: None }).unwrap();
        assert!(view.groups.is_empty());
        assert!(view.announcements.is_empty());
        assert_eq!(view.photos.page, 1);
        assert_eq!(view.photos.total_pages, 0);
        assert!(view.about.is_none());
    }

    #[test]
    fn dashboard_adds_chat_and_profile() {
        let (db, c) = seeded_db();
        chat::send(&db, &c.admin, "ilk").unwrap();
        chat::send(&db, &c.founder, "ikinci").unwrap();

        let view = dashboard(
            &db,
            &c.admin,
            &ViewQuery { photo_page: None, player_count: Some(3) },
        )
        .unwrap();
        assert_eq!(view.me.username, "ali");
        assert_eq!(view.player_count, 3);
        let texts: Vec<_> = view.chat_messages.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(texts, vec!["ilk", "ikinci"]);
    }
}

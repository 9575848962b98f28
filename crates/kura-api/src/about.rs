use axum::{Extension, Json, extract::State};
use tracing::info;

use kura_db::Database;
use kura_types::api::{AboutRequest, AboutResponse};
use kura_types::models::AboutBox;

use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::policy::{self, Action, Caller};

/// Blank strings are stored as NULL.
fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub fn get(db: &Database) -> ApiResult<Option<AboutBox>> {
    Ok(db.get_about()?.map(Into::into))
}

pub fn get_for_editing(db: &Database, caller: &Caller) -> ApiResult<Option<AboutBox>> {
    policy::authorize(caller, Action::EditAbout)?;
    get(db)
}

pub fn upsert(db: &Database, caller: &Caller, req: AboutRequest) -> ApiResult<AboutBox> {
    policy::authorize(caller, Action::EditAbout)?;

    let title = non_blank(req.title);
    let content = non_blank(req.content);
    let row = db.upsert_about(title.as_deref(), content.as_deref())?;
    info!("{} updated the about box", caller.username);
    Ok(row.into())
}

// -- Handlers --

/// GET /admin/about
pub async fn show(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Json<AboutResponse>> {
    let about = blocking(&state, move |s| get_for_editing(&s.db, &caller)).await?;
    Ok(Json(AboutResponse { about }))
}

/// POST /admin/about
pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiJson(req): ApiJson<AboutRequest>,
) -> ApiResult<Json<AboutResponse>> {
    let about = blocking(&state, move |s| upsert(&s.db, &caller, req)).await?;
    Ok(Json(AboutResponse { about: Some(about) }))
}

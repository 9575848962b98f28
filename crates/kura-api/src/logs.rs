//! Founder-only view over recorded login attempts.

use axum::{
    Extension, Json,
    extract::State,
};
use tracing::info;

use kura_db::Database;
use kura_types::api::{LoginLog, Notice};

use crate::auth::AppState;
use crate::blocking;
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiPath;
use crate::policy::{self, Action, Caller};

pub fn list(db: &Database, caller: &Caller) -> ApiResult<LoginLog> {
    policy::authorize(caller, Action::ViewLoginLogs)?;

    let attempts = db.list_login_attempts()?.into_iter().map(Into::into).collect();
    Ok(LoginLog { attempts })
}

pub fn delete(db: &Database, caller: &Caller, id: i64) -> ApiResult<()> {
    policy::authorize(caller, Action::DeleteLoginLogs)?;

    if !db.delete_login_attempt(id)? {
        return Err(ApiError::not_found("Log entry not found."));
    }
    info!("{} deleted login log entry {}", caller.username, id);
    Ok(())
}

pub fn delete_all(db: &Database, caller: &Caller) -> ApiResult<usize> {
    policy::authorize(caller, Action::DeleteLoginLogs)?;

    let n = db.delete_all_login_attempts()?;
    info!("{} cleared the login log ({} entries)", caller.username, n);
    Ok(n)
}

// -- Handlers --

/// GET /logs
pub async fn show(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Json<LoginLog>> {
    let log = blocking(&state, move |s| list(&s.db, &caller)).await?;
    Ok(Json(log))
}

/// POST /logs/delete/{id}
pub async fn delete_entry(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Notice>> {
    blocking(&state, move |s| delete(&s.db, &caller, id)).await?;
    Ok(Json(Notice::new("Log entry deleted.")))
}

/// POST /logs/delete_all
pub async fn delete_all_entries(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Json<Notice>> {
    blocking(&state, move |s| delete_all(&s.db, &caller)).await?;
    Ok(Json(Notice::new("All log entries deleted.")))
}

pub mod about;
pub mod admins;
pub mod announcements;
pub mod auth;
pub mod bootstrap;
pub mod chat;
pub mod error;
pub mod extract;
pub mod fixtures;
pub mod home;
pub mod logs;
pub mod middleware;
pub mod photos;
pub mod policy;
pub mod routes;
pub mod uploads;

#[cfg(test)]
mod test_utils;

use tracing::error;

use crate::auth::{AppState, AppStateInner};
use crate::error::{ApiError, ApiResult};

/// Run blocking store work off the async runtime.
pub(crate) async fn blocking<F, T>(state: &AppState, f: F) -> ApiResult<T>
where
    F: FnOnce(&AppStateInner) -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow::anyhow!("blocking task failed: {}", e))
        })?
}

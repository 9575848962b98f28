use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::auth::{self, AppState};
use crate::middleware::require_auth;
use crate::{about, admins, announcements, chat, fixtures, home, logs, photos};

/// The full HTTP surface. Cross-cutting layers (CORS, tracing) are added by
/// the binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(home::home))
        .route("/login", post(auth::login));

    let protected_routes = Router::new()
        .route("/logout", get(auth::logout))
        .route("/admin", get(home::admin_dashboard).post(fixtures::add_fixtures))
        .route("/admin/profile", post(admins::profile))
        .route("/admin/manage", get(admins::list_admins).post(admins::manage_admins))
        .route("/delete/{id}", get(fixtures::delete_match))
        .route("/admin/update_match/{id}", post(fixtures::update_match))
        .route("/admin/add_announcement", post(announcements::add_announcement))
        .route("/admin/delete_announcement/{id}", post(announcements::delete_announcement))
        .route(
            "/admin/delete_all_announcements",
            post(announcements::delete_all_announcements),
        )
        .route(
            "/admin/add_photo",
            post(photos::add_photo).layer(DefaultBodyLimit::max(state.max_upload_bytes)),
        )
        .route("/admin/delete_photo/{id}", post(photos::delete_photo))
        .route("/admin/delete_all_photos", post(photos::delete_all_photos))
        .route("/admin/chat/send", post(chat::send_message))
        .route("/admin/chat/delete/{id}", post(chat::delete_message))
        .route("/admin/chat/delete_all", post(chat::delete_all_messages))
        .route("/admin/about", get(about::show).post(about::update))
        .route("/logs", get(logs::show))
        .route("/logs/delete/{id}", post(logs::delete_entry))
        .route("/logs/delete_all", post(logs::delete_all_entries))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let uploads = ServeDir::new(state.uploads.dir());
    let router = Router::new().merge(public_routes).merge(protected_routes);
    let router = match state.uploads.url_prefix() {
        "/" => router.fallback_service(uploads),
        prefix => router.nest_service(prefix, uploads),
    };

    router.with_state(state)
}

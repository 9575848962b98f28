//! Admin accounts: the management console and each admin's own profile.

use axum::{Extension, Json, extract::State};
use tracing::info;

use kura_db::Database;
use kura_db::models::{AdminRow, ContactUpdate, NewAdmin};
use kura_types::api::{AdminList, ManageRequest, Notice, ProfileRequest};
use kura_types::models::Role;

use crate::auth::{AppState, hash_password};
use crate::blocking;
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::policy::{self, Action, Caller};

/// Accounts visible to the caller. Only the founder sees the founder's row.
pub fn list(db: &Database, caller: &Caller) -> ApiResult<AdminList> {
    policy::authorize(caller, Action::OpenAdminConsole)?;

    let admins = db
        .list_admins(policy::sees_founder(caller))?
        .iter()
        .map(AdminRow::to_admin)
        .collect();

    Ok(AdminList {
        admins,
        is_founder: caller.role.is_founder(),
        is_super: caller.role == Role::SuperAdmin,
    })
}

fn load_target(db: &Database, admin_id: i64) -> ApiResult<AdminRow> {
    db.get_admin_by_id(admin_id)?
        .ok_or_else(|| ApiError::not_found("Admin not found."))
}

/// Apply one console action. Returns the notice to show.
pub fn manage(db: &Database, caller: &Caller, req: ManageRequest) -> ApiResult<Notice> {
    policy::authorize(caller, Action::OpenAdminConsole)?;

    match req {
        ManageRequest::SetRole { admin_id, role } => {
            policy::authorize(caller, Action::SetRole)?;
            if !db.set_role(admin_id, role)? {
                return Err(ApiError::not_found("Admin not found."));
            }
            info!("{} set role of admin {} to {}", caller.username, admin_id, role);
            Ok(Notice::new("Role updated."))
        }

        ManageRequest::Add { username, password, name, email, phone } => {
            policy::authorize(caller, Action::AddAdmin)?;
            let username = username.trim().to_string();
            if username.is_empty() || password.is_empty() {
                return Err(ApiError::validation("Username and password are required."));
            }
            if db.get_admin_by_username(&username)?.is_some() {
                return Err(ApiError::Conflict("This username is already taken.".into()));
            }

            let id = db.create_admin(&NewAdmin {
                username: username.clone(),
                password_hash: hash_password(&password)?,
                role: Role::Admin,
                name,
                email,
                phone,
            })?;
            info!("{} added admin {} ({})", caller.username, username, id);
            Ok(Notice::new("Admin added."))
        }

        ManageRequest::Delete { admin_id } => {
            let target = load_target(db, admin_id)?;
            policy::authorize(
                caller,
                Action::DeleteAdmin { target_id: target.id, target_role: target.role },
            )?;
            if !db.delete_admin(target.id)? {
                return Err(ApiError::not_found("Admin not found."));
            }
            info!("{} deleted admin {} ({})", caller.username, target.username, target.id);
            Ok(Notice::new("Admin deleted."))
        }

        ManageRequest::Edit { admin_id, name, email, phone, password } => {
            let target = load_target(db, admin_id)?;
            policy::authorize(
                caller,
                Action::EditAdmin { target_id: target.id, target_role: target.role },
            )?;

            let password_hash = match password.as_deref() {
                Some(p) if !p.is_empty() => Some(hash_password(p)?),
                _ => None,
            };
            db.update_admin_contact(
                target.id,
                &ContactUpdate { name, email, phone },
                password_hash.as_deref(),
            )?;
            info!("{} edited admin {} ({})", caller.username, target.username, target.id);
            Ok(Notice::new("Admin details updated."))
        }
    }
}

pub fn update_profile(db: &Database, caller: &Caller, req: ProfileRequest) -> ApiResult<()> {
    policy::authorize(caller, Action::UpdateOwnProfile)?;

    let contact = ContactUpdate { name: req.name, email: req.email, phone: req.phone };
    if !db.update_admin_contact(caller.id, &contact, None)? {
        return Err(ApiError::Unauthorized("This account no longer exists.".into()));
    }
    Ok(())
}

// -- Handlers --

/// GET /admin/manage
pub async fn list_admins(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Json<AdminList>> {
    let list = blocking(&state, move |s| list(&s.db, &caller)).await?;
    Ok(Json(list))
}

/// POST /admin/manage
pub async fn manage_admins(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiJson(req): ApiJson<ManageRequest>,
) -> ApiResult<Json<Notice>> {
    let notice = blocking(&state, move |s| manage(&s.db, &caller, req)).await?;
    Ok(Json(notice))
}

/// POST /admin/profile
pub async fn profile(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiJson(req): ApiJson<ProfileRequest>,
) -> ApiResult<Json<Notice>> {
    blocking(&state, move |s| update_profile(&s.db, &caller, req)).await?;
    Ok(Json(Notice::new("Profile updated.")))
}

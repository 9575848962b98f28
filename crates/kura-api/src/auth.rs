use std::sync::{Arc, LazyLock};

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use axum::{Extension, Json, extract::State};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use rand_core::OsRng;
use tracing::{info, warn};

use kura_db::Database;
use kura_db::models::AdminRow;
use kura_types::api::{Claims, LoginRequest, LoginResponse, Notice};

use crate::blocking;
use crate::bootstrap::{self, BootstrapAccounts};
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::policy::Caller;
use crate::uploads::UploadStore;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub uploads: UploadStore,
    pub max_upload_bytes: usize,
    pub bootstrap: BootstrapAccounts,
    /// Re-create the bootstrap super-admin when someone tries to log in as it.
    pub legacy_login_provisioning: bool,
}

/// Argon2id hash in PHC string form.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Stored password hash is unreadable: {}", e);
            return false;
        }
    };
    Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
}

/// Hash checked for unknown usernames so a miss costs the same Argon2 work
/// as a wrong password.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("kura-dummy-password").ok());

/// Verify against the account's hash, or against [`DUMMY_HASH`] when there is
/// no account. A missing account never succeeds.
fn check_credentials(password: &str, stored_hash: Option<&str>) -> bool {
    match stored_hash {
        Some(hash) => verify_password(password, hash),
        None => {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                verify_password(password, dummy);
            }
            false
        }
    }
}

pub fn create_token(
    secret: &str,
    admin_id: i64,
    username: &str,
    ttl: chrono::Duration,
) -> anyhow::Result<String> {
    let claims = Claims {
        sub: admin_id,
        username: username.to_string(),
        exp: (Utc::now() + ttl).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Checks credentials and records the attempt, whatever its outcome.
pub fn authenticate(state: &AppStateInner, req: &LoginRequest) -> ApiResult<AdminRow> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(ApiError::validation("Username and password are required."));
    }

    if state.legacy_login_provisioning && req.username == state.bootstrap.super_username {
        bootstrap::ensure_super_admin(&state.db, &state.bootstrap)?;
    }

    let admin = state.db.get_admin_by_username(&req.username)?;
    let success = check_credentials(
        &req.password,
        admin.as_ref().map(|a| a.password_hash.as_str()),
    );

    state.db.insert_login_attempt(&req.username, success, Utc::now())?;

    match admin {
        Some(admin) if success => {
            info!("{} ({}) logged in", admin.username, admin.id);
            Ok(admin)
        }
        _ => {
            warn!("Failed login attempt for '{}'", req.username);
            Err(ApiError::Unauthorized("Invalid username or password.".into()))
        }
    }
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let response = blocking(&state, move |s| {
        let admin = authenticate(s, &req)?;
        let token = create_token(&s.jwt_secret, admin.id, &admin.username, s.token_ttl)?;
        Ok(LoginResponse {
            admin_id: admin.id,
            username: admin.username,
            role: admin.role,
            token,
            notice: "Login successful.".into(),
        })
    })
    .await?;

    Ok(Json(response))
}

/// GET /logout. Tokens are stateless; the client drops its copy.
pub async fn logout(Extension(caller): Extension<Caller>) -> Json<Notice> {
    info!("{} ({}) logged out", caller.username, caller.id);
    Json(Notice::new("Logged out."))
}

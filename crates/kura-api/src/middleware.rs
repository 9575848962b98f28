use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};

use kura_types::api::Claims;

use crate::auth::AppState;
use crate::blocking;
use crate::error::{ApiError, ApiResult};
use crate::policy::Caller;

pub fn decode_token(token: &str, secret: &str) -> ApiResult<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::Unauthorized("Your session is invalid or has expired.".into()))?;
    Ok(data.claims)
}

/// Validate the bearer token and attach the caller's current identity.
///
/// The admin row is re-read on every request so role changes and account
/// deletions take effect immediately.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Unauthorized("Please log in.".into()))?;

    let claims = decode_token(token, &state.jwt_secret)?;

    let admin = blocking(&state, move |s| Ok(s.db.get_admin_by_id(claims.sub)?))
        .await?
        .ok_or_else(|| ApiError::Unauthorized("This account no longer exists.".into()))?;

    req.extensions_mut().insert(Caller {
        id: admin.id,
        username: admin.username,
        role: admin.role,
    });
    Ok(next.run(req).await)
}

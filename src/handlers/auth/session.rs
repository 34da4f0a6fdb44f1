use axum::{extract::State, response::Json, Extension};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde_json::{json, Value};

use crate::auth::verify_token;
use crate::config::SessionConfig;
use crate::error::ApiError;
use crate::logging::{log_activity, RequestMeta};
use crate::middleware::{AuthUser, SESSION_COOKIE};
use crate::state::AppState;

/// Builds the session cookie carrying `token`. HttpOnly and SameSite=Lax
/// always; Secure follows the environment preset.
pub(super) fn session_cookie(
    token: &str,
    session: &SessionConfig,
) -> Result<Cookie<'static>, ApiError> {
    let max_age_secs = session.expires_in_ms / 1000;
    let secure = if session.cookie_secure { "; Secure" } else { "" };

    let cookie_str = format!(
        "{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age_secs}{secure}"
    );

    Cookie::parse(cookie_str)
        .map_err(|_| ApiError::internal_server_error("An error occurred while processing your request"))
}

fn clear_session_cookie(session: &SessionConfig) -> Result<Cookie<'static>, ApiError> {
    let secure = if session.cookie_secure { "; Secure" } else { "" };

    let cookie_str =
        format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0{secure}");

    Cookie::parse(cookie_str)
        .map_err(|_| ApiError::internal_server_error("An error occurred while processing your request"))
}

/// POST /auth/logout
///
/// Clears the session cookie. Succeeds whether or not a valid session was
/// presented; the activity log records the actor when one can be recovered
/// from the cookie.
pub async fn logout(
    State(state): State<AppState>,
    meta: RequestMeta,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let session = state.auth.session_config();

    let actor = jar
        .get(SESSION_COOKIE)
        .and_then(|c| verify_token(c.value(), &session.jwt_secret).ok());

    log_activity(
        "user_logout",
        &json!({}),
        actor.as_ref().map(|claims| (claims.uid, claims.email.as_str())),
        &meta,
    );

    let jar = jar.add(clear_session_cookie(session)?);

    Ok((jar, Json(json!({ "success": true }))))
}

/// GET /auth/me
pub async fn me(Extension(auth): Extension<AuthUser>) -> Json<Value> {
    Json(json!({
        "uid": auth.uid,
        "email": auth.email,
        "name": auth.name,
    }))
}

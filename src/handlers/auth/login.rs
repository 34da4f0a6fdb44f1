use axum::{extract::State, response::Json};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::handlers::{note_validation_failure, sanitize_body};

use super::session::session_cookie;
use crate::logging::RequestMeta;
use crate::state::AppState;
use crate::validation::validate_login;

/// POST /auth/login
///
/// Verifies credentials and establishes the session cookie. The token is
/// also returned in the body for clients that cannot read Set-Cookie.
pub async fn login(
    State(state): State<AppState>,
    meta: RequestMeta,
    jar: CookieJar,
    Json(mut body): Json<Value>,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    sanitize_body(&mut body, &meta);

    let data = validate_login(&body)
        .map_err(|e| note_validation_failure(e, "Login payload failed validation", &meta))?;

    let (user, token) = state.auth.login(data, &meta).await?;

    let jar = jar.add(session_cookie(&token, state.auth.session_config())?);

    let mut body = user.public_identity();
    body["token"] = json!(token);

    Ok((jar, Json(body)))
}

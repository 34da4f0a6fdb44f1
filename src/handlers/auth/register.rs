use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::handlers::{note_validation_failure, sanitize_body};
use crate::logging::RequestMeta;
use crate::state::AppState;
use crate::validation::validate_register;

/// POST /auth/register
///
/// Creates an account and returns the public identity. No session is
/// established here; the client logs in separately.
pub async fn register(
    State(state): State<AppState>,
    meta: RequestMeta,
    Json(mut body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    sanitize_body(&mut body, &meta);

    let data = validate_register(&body)
        .map_err(|e| note_validation_failure(e, "Registration payload failed validation", &meta))?;

    let user = state.auth.register(data, &meta).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "uid": user.id,
            "email": user.email,
        })),
    ))
}

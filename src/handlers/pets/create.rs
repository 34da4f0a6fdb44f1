use axum::{extract::State, http::StatusCode, response::Json, Extension};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::handlers::{note_validation_failure, sanitize_body};
use crate::logging::RequestMeta;
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::validation::validate_pet_create;

/// POST /pets
///
/// Creates a pet owned by the caller. Any owner field in the body is
/// ignored; ownership always comes from the session.
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    meta: RequestMeta,
    Json(mut body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    sanitize_body(&mut body, &meta);

    let data = validate_pet_create(&body)
        .map_err(|e| note_validation_failure(e, "Pet payload failed validation", &meta))?;

    let pet = state
        .pets
        .create(auth.uid, &auth.email, data, &meta)
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": pet.id }))))
}

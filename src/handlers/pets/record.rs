use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::Pet;
use crate::error::ApiError;
use crate::handlers::{note_validation_failure, sanitize_body};
use crate::logging::RequestMeta;
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::validation::validate_pet_update;

/// PUT /pets/:id
///
/// Partial update of a pet the caller owns. Returns the record as stored
/// after the update.
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
    Json(mut body): Json<Value>,
) -> Result<Json<Pet>, ApiError> {
    sanitize_body(&mut body, &meta);

    let data = validate_pet_update(&body)
        .map_err(|e| note_validation_failure(e, "Pet update payload failed validation", &meta))?;

    let pet = state
        .pets
        .update(id, auth.uid, &auth.email, data, &meta)
        .await?;

    Ok(Json(pet))
}

/// DELETE /pets/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    state.pets.delete(id, auth.uid, &auth.email, &meta).await?;

    Ok(Json(json!({ "success": true })))
}

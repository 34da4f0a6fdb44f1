use axum::{extract::State, response::Json, Extension};

use crate::database::models::Pet;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// GET /pets - the caller's pets, newest first.
pub async fn list_mine(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<Pet>>, ApiError> {
    let pets = state.pets.list_own(auth.uid).await?;
    Ok(Json(pets))
}

/// GET /pets/all - every pet, for any signed-in user.
pub async fn list_all(State(state): State<AppState>) -> Result<Json<Vec<Pet>>, ApiError> {
    let pets = state.pets.list_all().await?;
    Ok(Json(pets))
}

pub mod manager;
pub mod models;
pub mod pets;
pub mod users;

use thiserror::Error;

/// Errors surfaced by the store implementations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub use manager::{create_pool, ensure_schema};
pub use pets::{PetStore, PgPetStore};
pub use users::{PgUserStore, UserStore};

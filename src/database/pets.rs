use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::Pet;
use crate::database::StoreError;

/// Pet collection with document-style CRUD semantics. Ownership checks live
/// in the service layer; the store only filters and mutates by id/owner.
#[async_trait]
pub trait PetStore: Send + Sync {
    async fn insert_one(&self, pet: &Pet) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Pet>, StoreError>;

    /// All pets for one owner, newest-first.
    async fn find_by_owner(&self, owner_uid: Uuid) -> Result<Vec<Pet>, StoreError>;

    /// Unfiltered listing, newest-first.
    async fn find_all(&self) -> Result<Vec<Pet>, StoreError>;

    /// Apply the supplied fields to one record, stamping `updated_at`.
    /// `None` fields are left unchanged. Fails with `RowNotFound` if the
    /// record vanished between fetch and update.
    async fn update_one(
        &self,
        id: Uuid,
        update: &crate::validation::PetUpdateData,
        updated_at: DateTime<Utc>,
    ) -> Result<Pet, StoreError>;

    /// Returns `true` if a record was deleted.
    async fn delete_one(&self, id: Uuid) -> Result<bool, StoreError>;
}

pub struct PgPetStore {
    pool: PgPool,
}

impl PgPetStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const PET_COLUMNS: &str =
    "id, owner_uid, name, breed, species, age, description, created_at, updated_at";

#[async_trait]
impl PetStore for PgPetStore {
    async fn insert_one(&self, pet: &Pet) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO pets (id, owner_uid, name, breed, species, age, description, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(pet.id)
        .bind(pet.owner_uid)
        .bind(&pet.name)
        .bind(&pet.breed)
        .bind(&pet.species)
        .bind(pet.age)
        .bind(&pet.description)
        .bind(pet.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Pet>, StoreError> {
        let pet = sqlx::query_as::<_, Pet>(&format!(
            "SELECT {} FROM pets WHERE id = $1",
            PET_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(pet)
    }

    async fn find_by_owner(&self, owner_uid: Uuid) -> Result<Vec<Pet>, StoreError> {
        let pets = sqlx::query_as::<_, Pet>(&format!(
            "SELECT {} FROM pets WHERE owner_uid = $1 ORDER BY created_at DESC",
            PET_COLUMNS
        ))
        .bind(owner_uid)
        .fetch_all(&self.pool)
        .await?;
        Ok(pets)
    }

    async fn find_all(&self) -> Result<Vec<Pet>, StoreError> {
        let pets = sqlx::query_as::<_, Pet>(&format!(
            "SELECT {} FROM pets ORDER BY created_at DESC",
            PET_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(pets)
    }

    async fn update_one(
        &self,
        id: Uuid,
        update: &crate::validation::PetUpdateData,
        updated_at: DateTime<Utc>,
    ) -> Result<Pet, StoreError> {
        let pet = sqlx::query_as::<_, Pet>(&format!(
            "UPDATE pets SET
                name = COALESCE($2, name),
                breed = COALESCE($3, breed),
                species = COALESCE($4, species),
                age = COALESCE($5, age),
                description = COALESCE($6, description),
                updated_at = $7
             WHERE id = $1
             RETURNING {}",
            PET_COLUMNS
        ))
        .bind(id)
        .bind(&update.name)
        .bind(&update.breed)
        .bind(&update.species)
        .bind(update.age)
        .bind(&update.description)
        .bind(updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(pet)
    }

    async fn delete_one(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM pets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

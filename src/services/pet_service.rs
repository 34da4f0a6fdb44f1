use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::models::Pet;
use crate::database::PetStore;
use crate::error::ApiError;
use crate::logging::{log_activity, log_security_event, RequestMeta};
use crate::validation::{PetData, PetUpdateData};

/// Owner-scoped CRUD over pet records. Every mutation re-verifies that the
/// record's `owner_uid` matches the caller before it takes effect.
pub struct PetService {
    pets: Arc<dyn PetStore>,
}

impl PetService {
    pub fn new(pets: Arc<dyn PetStore>) -> Self {
        Self { pets }
    }

    /// Insert a pet with the owner forced from the verified caller identity.
    /// Any owner field in the request body has already been discarded by
    /// validation.
    pub async fn create(
        &self,
        owner_uid: Uuid,
        owner_email: &str,
        data: PetData,
        meta: &RequestMeta,
    ) -> Result<Pet, ApiError> {
        let pet = Pet {
            id: Uuid::new_v4(),
            owner_uid,
            name: data.name,
            breed: data.breed,
            species: data.species,
            age: data.age,
            description: data.description,
            created_at: Utc::now(),
            updated_at: None,
        };

        self.pets.insert_one(&pet).await?;

        log_activity(
            "pet_created",
            &json!({ "id": pet.id, "name": pet.name }),
            Some((owner_uid, owner_email)),
            meta,
        );

        Ok(pet)
    }

    pub async fn list_own(&self, owner_uid: Uuid) -> Result<Vec<Pet>, ApiError> {
        Ok(self.pets.find_by_owner(owner_uid).await?)
    }

    /// Unfiltered listing. Not owner-scoped; the route decides who may call.
    pub async fn list_all(&self) -> Result<Vec<Pet>, ApiError> {
        Ok(self.pets.find_all().await?)
    }

    pub async fn update(
        &self,
        id: Uuid,
        caller_uid: Uuid,
        caller_email: &str,
        data: PetUpdateData,
        meta: &RequestMeta,
    ) -> Result<Pet, ApiError> {
        let existing = self
            .pets
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Pet not found"))?;

        if existing.owner_uid != caller_uid {
            log_security_event(
                "unauthorized_access",
                &format!("Cross-owner update attempt on pet {}", id),
                meta,
            );
            return Err(ApiError::forbidden("Not authorized"));
        }

        let updated = self.pets.update_one(id, &data, Utc::now()).await?;

        log_activity(
            "pet_updated",
            &json!({ "id": id }),
            Some((caller_uid, caller_email)),
            meta,
        );

        Ok(updated)
    }

    pub async fn delete(
        &self,
        id: Uuid,
        caller_uid: Uuid,
        caller_email: &str,
        meta: &RequestMeta,
    ) -> Result<(), ApiError> {
        let existing = self
            .pets
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Pet not found"))?;

        if existing.owner_uid != caller_uid {
            log_security_event(
                "unauthorized_access",
                &format!("Cross-owner delete attempt on pet {}", id),
                meta,
            );
            return Err(ApiError::forbidden("Not authorized"));
        }

        if !self.pets.delete_one(id).await? {
            return Err(ApiError::not_found("Pet not found"));
        }

        log_activity(
            "pet_deleted",
            &json!({ "id": id }),
            Some((caller_uid, caller_email)),
            meta,
        );

        Ok(())
    }
}

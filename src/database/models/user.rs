use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Persisted credential record. The password hash never leaves the server;
/// responses use [`User::public_identity`].
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn public_identity(&self) -> serde_json::Value {
        serde_json::json!({
            "uid": self.id,
            "email": self.email,
            "name": self.display_name,
        })
    }
}

use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::{issue_token, Claims};
use crate::config::SessionConfig;
use crate::database::models::User;
use crate::database::UserStore;
use crate::error::ApiError;
use crate::logging::{log_activity, log_security_event, RequestMeta};
use crate::validation::{LoginData, RegisterData};

/// Orchestrates register/login against the credential store. Stateless
/// between calls; per-request state lives in the arguments.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    session: SessionConfig,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, session: SessionConfig) -> Self {
        Self { users, session }
    }

    pub fn session_config(&self) -> &SessionConfig {
        &self.session
    }

    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.users
    }

    /// Create a new user. The plaintext password and the resulting hash are
    /// never logged or returned.
    pub async fn register(
        &self,
        data: RegisterData,
        meta: &RequestMeta,
    ) -> Result<User, ApiError> {
        if self.users.find_by_email(&data.email).await?.is_some() {
            log_security_event(
                "duplicate_registration",
                "Attempt to register an existing email",
                meta,
            );
            return Err(ApiError::DuplicateEmail);
        }

        let password_hash = hash_password(&data.password).map_err(|e| {
            tracing::error!("password hashing failed: {}", e);
            ApiError::internal_server_error("An error occurred while processing your request")
        })?;

        let user = User {
            id: Uuid::new_v4(),
            email: data.email,
            password_hash,
            display_name: data.display_name,
            created_at: Utc::now(),
        };

        // The unique index is the backstop for a concurrent register racing
        // the duplicate check above.
        self.users.insert_one(&user).await?;

        log_activity(
            "user_registered",
            &json!({ "uid": user.id }),
            Some((user.id, &user.email)),
            meta,
        );

        Ok(user)
    }

    /// Authenticate and issue a session token.
    ///
    /// Unknown email and wrong password fail identically so the endpoint
    /// cannot be used to enumerate accounts.
    pub async fn login(
        &self,
        data: LoginData,
        meta: &RequestMeta,
    ) -> Result<(User, String), ApiError> {
        let user = match self.users.find_by_email(&data.email).await? {
            Some(user) => user,
            None => {
                log_security_event("failed_login", "Unknown email", meta);
                return Err(ApiError::InvalidCredentials);
            }
        };

        if !verify_password(&data.password, &user.password_hash) {
            log_security_event("failed_login", "Password mismatch", meta);
            return Err(ApiError::InvalidCredentials);
        }

        let claims = Claims::new(&user, self.session.expires_in_ms);
        let token = issue_token(&claims, &self.session.jwt_secret)?;

        log_activity(
            "user_login",
            &json!({ "uid": user.id }),
            Some((user.id, &user.email)),
            meta,
        );

        Ok((user, token))
    }
}

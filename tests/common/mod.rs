//! Shared harness for the HTTP integration tests.
//!
//! The router is exercised in-process with `tower::ServiceExt::oneshot`
//! against in-memory store fakes, so the suite needs no database.

// Each test binary compiles this module; not every binary uses every helper.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use pawprint_api::config::{
    AppConfig, DatabaseConfig, Environment, RateLimitConfig, ServerConfig, SessionConfig,
};
use pawprint_api::database::models::{Pet, User};
use pawprint_api::database::{PetStore, StoreError, UserStore};
use pawprint_api::handlers::build_router;
use pawprint_api::state::AppState;
use pawprint_api::validation::PetUpdateData;

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_one(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate(user.email.clone()));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryPetStore {
    pets: Mutex<Vec<Pet>>,
}

#[async_trait]
impl PetStore for MemoryPetStore {
    async fn insert_one(&self, pet: &Pet) -> Result<(), StoreError> {
        self.pets.lock().unwrap().push(pet.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Pet>, StoreError> {
        let pets = self.pets.lock().unwrap();
        Ok(pets.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_owner(&self, owner_uid: Uuid) -> Result<Vec<Pet>, StoreError> {
        let pets = self.pets.lock().unwrap();
        // Newest-first; insertion order stands in for created_at here
        Ok(pets
            .iter()
            .rev()
            .filter(|p| p.owner_uid == owner_uid)
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<Pet>, StoreError> {
        let pets = self.pets.lock().unwrap();
        Ok(pets.iter().rev().cloned().collect())
    }

    async fn update_one(
        &self,
        id: Uuid,
        update: &PetUpdateData,
        updated_at: DateTime<Utc>,
    ) -> Result<Pet, StoreError> {
        let mut pets = self.pets.lock().unwrap();
        let pet = pets
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::Sqlx(sqlx::Error::RowNotFound))?;

        if let Some(name) = &update.name {
            pet.name = name.clone();
        }
        if let Some(breed) = &update.breed {
            pet.breed = Some(breed.clone());
        }
        if let Some(species) = &update.species {
            pet.species = Some(species.clone());
        }
        if let Some(age) = update.age {
            pet.age = Some(age);
        }
        if let Some(description) = &update.description {
            pet.description = Some(description.clone());
        }
        pet.updated_at = Some(updated_at);

        Ok(pet.clone())
    }

    async fn delete_one(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut pets = self.pets.lock().unwrap();
        let before = pets.len();
        pets.retain(|p| p.id != id);
        Ok(pets.len() < before)
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        environment: Environment::Development,
        server: ServerConfig { port: 0 },
        database: DatabaseConfig {
            url: String::new(),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout_secs: 1,
            idle_timeout_secs: 1,
        },
        session: SessionConfig {
            jwt_secret: "test-signing-secret".to_string(),
            expires_in_ms: 7 * 24 * 60 * 60 * 1000,
            cookie_secure: false,
        },
        rate_limit: RateLimitConfig {
            window_ms: 15 * 60 * 1000,
            max_attempts: 5,
        },
    }
}

pub const TEST_JWT_SECRET: &str = "test-signing-secret";

/// A fresh router over empty in-memory stores.
pub struct TestApp {
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let state = AppState::new(
            config,
            Arc::new(MemoryUserStore::default()),
            Arc::new(MemoryPetStore::default()),
        );
        Self {
            router: build_router(state),
        }
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            json,
        }
    }

    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request(Method::POST, path, Some(body), None).await
    }

    /// POST with a spoofed client ip, for exercising the per-ip throttle.
    pub async fn post_from(&self, path: &str, body: Value, client_ip: &str) -> TestResponse {
        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", client_ip)
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            json,
        }
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> TestResponse {
        self.request(Method::GET, path, None, cookie).await
    }

    /// Register and login one user; returns `(uid, cookie_pair)` where the
    /// pair is ready for a Cookie header.
    pub async fn signup(&self, email: &str, password: &str, name: &str) -> (Uuid, String) {
        let res = self
            .post(
                "/auth/register",
                json!({ "email": email, "password": password, "displayName": name }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "register: {:?}", res.json);
        let uid: Uuid = serde_json::from_value(res.json["uid"].clone()).unwrap();

        let res = self
            .post(
                "/auth/login",
                json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "login: {:?}", res.json);

        (uid, res.session_cookie_pair())
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub json: Value,
}

impl TestResponse {
    pub fn set_cookie(&self) -> &str {
        self.headers
            .get(header::SET_COOKIE)
            .expect("missing Set-Cookie")
            .to_str()
            .unwrap()
    }

    /// The `session=<token>` pair from Set-Cookie, without attributes.
    pub fn session_cookie_pair(&self) -> String {
        self.set_cookie()
            .split(';')
            .next()
            .unwrap()
            .trim()
            .to_string()
    }
}

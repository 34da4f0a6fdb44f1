pub mod auth;
pub mod pets;

use axum::{
    extract::State,
    middleware,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::ApiError;
use crate::logging::{log_security_event, RequestMeta};
use crate::middleware::{auth_rate_limit_middleware, session_auth_middleware};
use crate::state::AppState;
use crate::validation::sanitize_document;

pub fn build_router(state: AppState) -> Router {
    // Register/login are the only throttled routes
    let rate_limited = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_rate_limit_middleware,
        ));

    // Everything ownership-sensitive sits behind the session gate
    let session_required = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/pets", post(pets::create).get(pets::list_mine))
        .route("/pets/all", get(pets::list_all))
        .route("/pets/:id", put(pets::update).delete(pets::delete))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session_auth_middleware,
        ));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/auth/logout", post(auth::logout))
        .merge(rate_limited)
        .merge(session_required)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Rewrite operator-like keys in an inbound body, raising a security event
/// when anything had to be neutralized. Runs before validation on every body
/// that can reach a store filter or update.
pub(crate) fn sanitize_body(body: &mut Value, meta: &RequestMeta) {
    let flagged = sanitize_document(body);
    if !flagged.is_empty() {
        log_security_event(
            "sanitized_input",
            &format!("Rewrote operator-like keys: {}", flagged.join(", ")),
            meta,
        );
    }
}

/// Validation failures are security events as well as 400s.
pub(crate) fn note_validation_failure(
    err: ApiError,
    context: &str,
    meta: &RequestMeta,
) -> ApiError {
    if matches!(err, ApiError::ValidationError { .. }) {
        log_security_event("validation_failure", context, meta);
    }
    err
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Pawprint API",
        "version": version,
        "description": "Pet care backend API built with Rust (Axum)",
        "endpoints": {
            "auth": "/auth/register, /auth/login, /auth/logout (public), /auth/me (session)",
            "pets": "/pets, /pets/all, /pets/:id (session)",
            "health": "/health (public)"
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match state.auth.store().health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}

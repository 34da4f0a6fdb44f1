//! Security and activity event emission.
//!
//! Events are fire-and-forget structured `tracing` records on the `security`
//! and `activity` targets; emitting one never fails and never blocks the
//! response being built.

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts, Request},
    http::request::Parts,
};
use serde_json::Value;
use std::convert::Infallible;
use std::net::SocketAddr;
use uuid::Uuid;

/// Per-request client metadata attached to every security/activity event.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub client_ip: String,
    pub user_agent: String,
    pub method: String,
    pub path: String,
}

impl RequestMeta {
    pub fn from_parts(parts: &Parts) -> Self {
        let client_ip = client_ip_from(
            parts.headers.get("x-forwarded-for"),
            parts.extensions.get::<ConnectInfo<SocketAddr>>(),
        );
        let user_agent = parts
            .headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        Self {
            client_ip,
            user_agent,
            method: parts.method.to_string(),
            path: parts.uri.path().to_string(),
        }
    }

    pub fn from_request(request: &Request) -> Self {
        let client_ip = client_ip_from(
            request.headers().get("x-forwarded-for"),
            request.extensions().get::<ConnectInfo<SocketAddr>>(),
        );
        let user_agent = request
            .headers()
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        Self {
            client_ip,
            user_agent,
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
        }
    }
}

fn client_ip_from(
    forwarded: Option<&axum::http::HeaderValue>,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
) -> String {
    // First x-forwarded-for entry wins, then the peer address
    forwarded
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .or_else(|| connect_info.map(|ConnectInfo(addr)| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for RequestMeta {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(RequestMeta::from_parts(parts))
    }
}

/// Emit a security event (auth failure, rate limit, injection attempt, ...).
pub fn log_security_event(kind: &str, message: &str, meta: &RequestMeta) {
    tracing::warn!(
        target: "security",
        kind,
        message,
        client_ip = %meta.client_ip,
        user_agent = %meta.user_agent,
        method = %meta.method,
        path = %meta.path,
    );
}

/// Emit an activity record for a state-changing action.
pub fn log_activity(
    action: &str,
    details: &Value,
    actor: Option<(Uuid, &str)>,
    meta: &RequestMeta,
) {
    let (actor_id, actor_email) = match actor {
        Some((id, email)) => (Some(id), Some(email)),
        None => (None, None),
    };
    tracing::info!(
        target: "activity",
        action,
        details = %details,
        actor_id = ?actor_id,
        actor_email = ?actor_email,
        client_ip = %meta.client_ip,
        method = %meta.method,
        path = %meta.path,
    );
}

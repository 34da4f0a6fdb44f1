use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::auth::{verify_token, Claims};
use crate::error::ApiError;
use crate::logging::{log_security_event, RequestMeta};
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "session";

/// Authenticated caller identity extracted from the session cookie
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub uid: Uuid,
    pub email: String,
    pub name: Option<String>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            uid: claims.uid,
            email: claims.email,
            name: claims.name,
        }
    }
}

/// Session gate for ownership-sensitive routes: verifies the cookie's token
/// and attaches a typed [`AuthUser`] to the request for downstream handlers.
///
/// Verification failures are security-logged with the error detail; the
/// token itself is never logged.
pub async fn session_auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let meta = RequestMeta::from_request(&request);

    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        log_security_event("auth_failure", "Missing session cookie", &meta);
        return Err(ApiError::unauthenticated("Not authenticated"));
    };

    match verify_token(cookie.value(), &state.config.session.jwt_secret) {
        Ok(claims) => {
            request.extensions_mut().insert(AuthUser::from(claims));
            Ok(next.run(request).await)
        }
        Err(err) => {
            log_security_event(
                "auth_failure",
                &format!("Session verification failed: {}", err),
                &meta,
            );
            Err(ApiError::unauthenticated("Invalid or expired session"))
        }
    }
}

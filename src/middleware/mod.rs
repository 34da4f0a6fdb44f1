pub mod rate_limit;
pub mod session;

pub use rate_limit::{auth_rate_limit_middleware, RateLimiter};
pub use session::{session_auth_middleware, AuthUser, SESSION_COOKIE};

//! Rate Limiting Module
//!
//! Fixed-window request counters stored in a CacheStore, a static policy
//! table, and the axum middleware that applies them.

mod limiter;
mod middleware;
mod policy;
mod window;

pub use limiter::{RateLimitDecision, RateLimiter};
pub use middleware::{client_identity, normalize_route, rate_limit_middleware, RateLimitGuard};
pub use policy::{PolicyKind, RateLimitPolicies, RateLimitPolicy};
pub use window::RateWindow;

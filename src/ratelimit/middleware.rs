//! Rate Limit Middleware
//!
//! Axum glue that runs a `RateLimiter` check before a route's handler.
//!
//! ```ignore
//! Router::new()
//!     .route("/products", post(create_product))
//!     .route_layer(middleware::from_fn_with_state(
//!         RateLimitGuard::new(limiter, PolicyKind::Strict),
//!         rate_limit_middleware,
//!     ));
//! ```

use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::{ConnectInfo, MatchedPath, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};

use crate::error::RateLimitError;
use crate::ratelimit::{PolicyKind, RateLimiter};

/// Client identity used when neither trusted proxy headers nor the socket
/// say who is calling.
const UNKNOWN_CLIENT: &str = "unknown";

// == Guard State ==
/// Middleware state: which limiter and which policy protect a group of routes.
#[derive(Debug, Clone)]
pub struct RateLimitGuard {
    limiter: RateLimiter,
    kind: PolicyKind,
    enabled: bool,
    trust_proxy: bool,
}

impl RateLimitGuard {
    pub fn new(limiter: RateLimiter, kind: PolicyKind) -> Self {
        Self {
            limiter,
            kind,
            enabled: true,
            trust_proxy: false,
        }
    }

    /// Turns the guard into a pass-through when `enabled` is false.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Identifies callers by `x-forwarded-for` / `x-real-ip` when the server
    /// sits behind a proxy that sets them.
    pub fn trust_proxy(mut self, trust_proxy: bool) -> Self {
        self.trust_proxy = trust_proxy;
        self
    }
}

// == Client Identity ==
/// Resolves the caller's address.
///
/// With `trust_proxy` set, the first `x-forwarded-for` hop and then
/// `x-real-ip` are consulted; a value that does not parse as an IP address
/// is ignored. Otherwise, or when no header yields an address, the
/// connection's peer address is used.
pub fn client_identity(request: &Request, trust_proxy: bool) -> String {
    if trust_proxy {
        let forwarded = header_ip(request, "x-forwarded-for")
            .or_else(|| header_ip(request, "x-real-ip"));
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// First comma-separated entry of header `name`, parsed as an IP address.
fn header_ip(request: &Request, name: &str) -> Option<IpAddr> {
    let value = request.headers().get(name)?.to_str().ok()?;
    value.split(',').next()?.trim().parse().ok()
}

// == Route Normalization ==
/// Lowercases the path and strips trailing slashes; an empty path is `/`.
pub fn normalize_route(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_ascii_lowercase()
    }
}

/// Route component of the window key: method plus the matched route
/// template when available, so `/products/1` and `/products/2` share a
/// quota while `GET` and `POST` on one path do not.
fn route_identity(request: &Request) -> String {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    format!(
        "{}:{}",
        request.method().as_str().to_ascii_lowercase(),
        normalize_route(&path)
    )
}

// == Middleware ==
/// Rejects the request with 429 when its window is over quota; otherwise
/// runs the handler and annotates the response with the remaining quota.
pub async fn rate_limit_middleware(
    State(guard): State<RateLimitGuard>,
    request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    if !guard.enabled {
        return Ok(next.run(request).await);
    }

    let client = client_identity(&request, guard.trust_proxy);
    let route = route_identity(&request);
    let decision = guard.limiter.check(guard.kind, &client, &route).await?;

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert("x-ratelimit-limit", HeaderValue::from(decision.limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(decision.remaining));

    Ok(response)
}

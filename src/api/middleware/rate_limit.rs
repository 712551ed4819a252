//! Rate limiting middleware using Redis cache.
//!
//! Without Redis there are no counters and requests pass through.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;

use crate::api::AppState;
use crate::config::{
    RATE_LIMIT_AUTH_REQUESTS, RATE_LIMIT_AUTH_WINDOW_SECONDS, RATE_LIMIT_REQUESTS,
    RATE_LIMIT_WINDOW_SECONDS,
};
use crate::errors::ErrorResponse;

/// Rate limit error response
#[derive(Debug)]
pub struct RateLimitError {
    pub retry_after: u64,
}

impl IntoResponse for RateLimitError {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert("Retry-After", HeaderValue::from(self.retry_after));
        headers.insert("X-RateLimit-Remaining", HeaderValue::from_static("0"));

        let body = ErrorResponse {
            message: "Too many requests. Please try again later.".to_string(),
            code: "RATE_LIMITED",
        };

        (StatusCode::TOO_MANY_REQUESTS, headers, axum::Json(body)).into_response()
    }
}

/// A fixed-window budget for one group of routes.
#[derive(Debug, Clone, Copy)]
struct Budget {
    scope: &'static str,
    max_requests: u64,
    window_seconds: u64,
}

const GENERAL: Budget = Budget {
    scope: "general",
    max_requests: RATE_LIMIT_REQUESTS,
    window_seconds: RATE_LIMIT_WINDOW_SECONDS,
};

const AUTH: Budget = Budget {
    scope: "auth",
    max_requests: RATE_LIMIT_AUTH_REQUESTS,
    window_seconds: RATE_LIMIT_AUTH_WINDOW_SECONDS,
};

/// Key for the rate limit counters. Forwarding headers are client
/// controlled, so they only count when a trusted proxy sets them; the
/// proxy appends the peer it saw, which makes the last hop the real client.
fn client_identifier(request: &Request, trust_proxy: bool) -> String {
    if trust_proxy {
        if let Some(ip) = request
            .headers()
            .get("X-Forwarded-For")
            .and_then(|h| h.to_str().ok())
            .and_then(|forwarded| forwarded.rsplit(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
        {
            return ip.to_string();
        }

        if let Some(real_ip) = request
            .headers()
            .get("X-Real-IP")
            .and_then(|h| h.to_str().ok())
        {
            return real_ip.trim().to_string();
        }
    }

    if let Some(connect_info) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return connect_info.0.ip().to_string();
    }

    "unknown".to_string()
}

async fn enforce(
    state: &AppState,
    budget: Budget,
    request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    let Some(cache) = state.cache.as_ref() else {
        return Ok(next.run(request).await);
    };

    let client_id = client_identifier(&request, state.trust_proxy);
    let key = format!("{}:{}", budget.scope, client_id);

    let status = match cache
        .check_rate_limit(&key, budget.max_requests, budget.window_seconds)
        .await
    {
        Ok(status) => status,
        Err(e) => {
            // Fail closed: a broken counter must not lift the limit.
            tracing::error!(error = %e, scope = budget.scope, "rate limit check failed, denying request");
            return Err(RateLimitError {
                retry_after: budget.window_seconds,
            });
        }
    };

    if !status.allowed {
        tracing::warn!(
            client = %client_id,
            scope = budget.scope,
            count = status.count,
            "rate limit exceeded"
        );
        return Err(RateLimitError {
            retry_after: budget.window_seconds,
        });
    }

    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert("X-RateLimit-Limit", HeaderValue::from(status.limit));
    headers.insert("X-RateLimit-Remaining", HeaderValue::from(status.remaining()));

    Ok(response)
}

/// General rate limiting middleware.
/// Limits requests to RATE_LIMIT_REQUESTS per RATE_LIMIT_WINDOW_SECONDS.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    enforce(&state, GENERAL, request, next).await
}

/// Stricter rate limiting for authentication endpoints.
/// Limits requests to RATE_LIMIT_AUTH_REQUESTS per RATE_LIMIT_AUTH_WINDOW_SECONDS.
pub async fn rate_limit_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    enforce(&state, AUTH, request, next).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn rate_limit_error_response() {
        let error = RateLimitError { retry_after: 60 };
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["Retry-After"], "60");
    }

    #[test]
    fn forwarded_for_is_ignored_without_trusted_proxy() {
        let mut request = axum::http::Request::builder()
            .header("X-Forwarded-For", "203.0.113.7")
            .header("X-Real-IP", "203.0.113.8")
            .body(Body::empty())
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([198, 51, 100, 4], 40123))));
        assert_eq!(client_identifier(&request, false), "198.51.100.4");
    }

    #[test]
    fn trusted_proxy_hop_identifies_client() {
        let request = axum::http::Request::builder()
            .header("X-Forwarded-For", "203.0.113.7, 192.0.2.55")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_identifier(&request, true), "192.0.2.55");
    }

    #[test]
    fn trusted_proxy_falls_back_to_real_ip_header() {
        let request = axum::http::Request::builder()
            .header("X-Real-IP", "192.0.2.56")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_identifier(&request, true), "192.0.2.56");
    }

    #[test]
    fn unknown_client_without_headers_or_connect_info() {
        let request = axum::http::Request::builder().body(Body::empty()).unwrap();
        assert_eq!(client_identifier(&request, false), "unknown");
    }
}

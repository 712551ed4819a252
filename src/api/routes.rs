//! Application route configuration.

use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    admin_routes, auth_routes, booking_routes, host_routes, notification_routes, review_routes,
    thread_routes, user_routes, villa_routes,
};
use super::middleware::{
    admin_middleware, auth_middleware, optional_auth_middleware, rate_limit_auth_middleware,
    rate_limit_middleware,
};
use super::openapi::ApiDoc;
use super::AppState;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    // Routers that need a valid JWT
    let protected = Router::new()
        .nest("/users", user_routes())
        .nest("/host", host_routes())
        .nest("/bookings", booking_routes())
        .nest("/threads", thread_routes())
        .nest("/reviews", review_routes())
        .nest("/notifications", notification_routes())
        .nest(
            "/admin",
            admin_routes().route_layer(middleware::from_fn(admin_middleware)),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Public reads, authenticated writes
    let villas = villa_routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        optional_auth_middleware,
    ));

    let api = Router::new()
        .nest("/villas", villas)
        .merge(protected)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    Router::new()
        // Health check endpoints (no rate limiting)
        .route("/", get(root))
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public authentication routes (stricter rate limiting)
        .nest(
            "/auth",
            auth_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                rate_limit_auth_middleware,
            )),
        )
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the browser client. `*` allows any origin; anything else is
/// matched exactly.
pub fn cors_layer(origin: &str) -> CorsLayer {
    let allow_origin = if origin == "*" {
        AllowOrigin::any()
    } else {
        match origin.parse::<HeaderValue>() {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                tracing::warn!(origin, "invalid CORS origin, cross-origin requests disabled");
                AllowOrigin::list(Vec::<HeaderValue>::new())
            }
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Root endpoint
async fn root() -> &'static str {
    "Villa Market API"
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    services: ServiceHealth,
}

/// Individual service health status
#[derive(Serialize)]
struct ServiceHealth {
    database: ServiceStatus,
    redis: ServiceStatus,
}

#[derive(Serialize)]
struct ServiceStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ServiceStatus {
    fn from_check<E: std::fmt::Display>(result: Option<Result<(), E>>) -> Self {
        match result {
            None => Self {
                status: "disabled",
                error: None,
            },
            Some(Ok(())) => Self {
                status: "healthy",
                error: None,
            },
            Some(Err(e)) => Self {
                status: "unhealthy",
                error: Some(e.to_string()),
            },
        }
    }

    fn is_unhealthy(&self) -> bool {
        self.status == "unhealthy"
    }
}

/// Health check endpoint with database and Redis connectivity check.
/// A service that is not configured counts as healthy.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = match &state.database {
        Some(db) => Some(db.ping().await),
        None => None,
    };
    let redis = match &state.cache {
        Some(cache) => Some(cache.ping().await),
        None => None,
    };

    let services = ServiceHealth {
        database: ServiceStatus::from_check(database),
        redis: ServiceStatus::from_check(redis),
    };
    let degraded = services.database.is_unhealthy() || services.redis.is_unhealthy();

    let response = HealthResponse {
        status: if degraded { "degraded" } else { "healthy" },
        services,
    };
    let status_code = if degraded {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (status_code, Json(response))
}

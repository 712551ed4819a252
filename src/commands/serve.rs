//! Serve command - starts the HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::{cors_layer, create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Cache, Database};

pub async fn execute(args: ServeArgs, config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    let db = Database::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    // Redis is optional: without it the villa cache and rate limits are off.
    let cache = match config.redis_url.as_deref() {
        Some(url) => match Cache::connect(url).await {
            Ok(cache) => Some(Arc::new(cache)),
            Err(e) => {
                tracing::warn!("Redis unavailable, continuing without cache: {}", e);
                None
            }
        },
        None => {
            tracing::info!("REDIS_URL not set, cache and rate limiting disabled");
            None
        }
    };

    let cors = cors_layer(&config.cors_origin);
    let app_state = AppState::from_config(Arc::new(db), cache, config);
    let app = create_router(app_state).layer(cors);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);
    tracing::info!("API docs at http://{}/swagger-ui", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}

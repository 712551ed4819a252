//! Villa Market - backend for a villa booking marketplace.
//!
//! Guests search villas and book stays, hosts list and manage villas,
//! administrators moderate users, listings and reviews.
//!
//! # Layers
//!
//! - **api**: HTTP handlers, middleware, routes and OpenAPI document
//! - **services**: use cases (booking, messaging, reviews, moderation)
//! - **domain**: entities and pure business rules
//! - **infra**: PostgreSQL through SeaORM, Redis cache
//! - **cli** / **commands**: `serve`, `migrate`, `create-admin`
//! - **config**, **errors**, **types**: shared plumbing
//!
//! ```bash
//! villa-market migrate up
//! villa-market create-admin --email admin@example.com --password '...'
//! villa-market serve
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

pub use api::AppState;
pub use config::Config;
pub use errors::{AppError, AppResult};

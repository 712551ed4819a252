//! Command-line interface.
//!
//! - `serve` - start the HTTP server
//! - `migrate` - manage database migrations
//! - `create-admin` - bootstrap an administrator account

pub mod args;

pub use args::{Cli, Commands};

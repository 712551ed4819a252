//! CLI command implementations, one module per command.

pub mod create_admin;
pub mod migrate;
pub mod serve;

//! CLI command implementations.

pub mod common;
pub mod config;
pub mod endpoint;
pub mod fetch;
pub mod resolve;

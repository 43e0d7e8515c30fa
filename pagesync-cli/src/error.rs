//! CLI error type.

use std::fmt;

use pagesync::config::ConfigError;
use pagesync::fetch::FetchError;
use pagesync::geo::TenantIdError;
use pagesync::http::HttpError;

/// Errors surfaced to the user by the CLI.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be read, written or understood.
    Config(String),
    /// A command-line argument was rejected.
    InvalidArgument(String),
    /// The async runtime could not be started.
    Runtime(String),
    Http(HttpError),
    Fetch(FetchError),
    /// No cluster discovery probe succeeded.
    Unresolved(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::Runtime(msg) => write!(f, "Runtime error: {}", msg),
            CliError::Http(e) => write!(f, "HTTP error: {}", e),
            CliError::Fetch(e) => write!(f, "Fetch failed: {}", e),
            CliError::Unresolved(tenant) => {
                write!(f, "Could not resolve a cluster for tenant {}", tenant)
            }
        }
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<HttpError> for CliError {
    fn from(e: HttpError) -> Self {
        CliError::Http(e)
    }
}

impl From<FetchError> for CliError {
    fn from(e: FetchError) -> Self {
        CliError::Fetch(e)
    }
}

impl From<TenantIdError> for CliError {
    fn from(e: TenantIdError) -> Self {
        CliError::InvalidArgument(e.to_string())
    }
}

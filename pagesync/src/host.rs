//! Interfaces to the host application.
//!
//! The sync core calls these; it never implements them beyond simple
//! defaults. A host (editor extension, CLI) supplies token acquisition, user
//! notifications and the save provider that later pushes edits back.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;

use crate::save::{SaveMap, SiteContext};
use crate::vfs::VirtualPath;

/// User-facing messages. Localization is the host's concern.
pub mod messages {
    pub const FETCHING_FILE: &str = "Fetching your file ...";
    pub const EMPTY_RESPONSE: &str = "The server returned no records for this request";
    pub const UNAUTHORIZED: &str = "Authorization Failed. Please run again to authorize it";
    pub const UNAUTHORIZED_DETAIL: &str = "There was a permissions problem with the server";
    pub const INVALID_PARAMETERS: &str = "One or more commands are invalid or malformed";
    pub const INVALID_PARAMETERS_DETAIL: &str = "Check the parameters and try again";
    pub const FILE_NOT_AVAILABLE: &str = "That file is not available";
    pub const FILE_NOT_AVAILABLE_DETAIL: &str =
        "The metadata may have changed on the Dataverse side. Contact your admin.";
}

/// Failure acquiring an access token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("token acquisition failed for {resource}: {reason}")]
pub struct AuthError {
    pub resource: String,
    pub reason: String,
}

/// Supplies bearer tokens for remote resources.
pub trait TokenProvider: Send + Sync {
    /// Acquire a token for the given resource root URL.
    fn access_token(&self, resource: &str) -> impl Future<Output = Result<String, AuthError>> + Send;
}

impl<T: TokenProvider> TokenProvider for Arc<T> {
    fn access_token(&self, resource: &str) -> impl Future<Output = Result<String, AuthError>> + Send {
        (**self).access_token(resource)
    }
}

/// A token obtained out of band and used for every resource.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl TokenProvider for StaticToken {
    async fn access_token(&self, resource: &str) -> Result<String, AuthError> {
        if self.0.is_empty() {
            return Err(AuthError {
                resource: resource.to_string(),
                reason: "no token configured".to_string(),
            });
        }
        Ok(self.0.clone())
    }
}

/// User-facing notifications and document focus.
pub trait Notifier: Send + Sync {
    fn show_info(&self, message: &str);

    fn show_error(&self, message: &str, detail: &str);

    /// Bring a materialized file to the user's attention.
    fn open_document(&self, path: &VirtualPath);
}

/// Notifier that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show_info(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn show_error(&self, message: &str, detail: &str) {
        tracing::error!(detail, "{}", message);
    }

    fn open_document(&self, path: &VirtualPath) {
        tracing::info!(path = %path, "Opened document");
    }
}

/// Receives the save-back map after each projection pass.
pub trait SaveProvider: Send + Sync {
    fn register(&self, entries: SaveMap, site: &SiteContext);
}

/// Save provider that ignores registrations.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSaveProvider;

impl SaveProvider for NoopSaveProvider {
    fn register(&self, entries: SaveMap, site: &SiteContext) {
        tracing::debug!(entries = entries.len(), org = %site.org_url, "Save map registered");
    }
}

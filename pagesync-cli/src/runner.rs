//! Shared setup for commands that talk to remote services.

use std::future::Future;
use std::sync::Arc;

use pagesync::config::ConfigFile;
use pagesync::http::ReqwestClient;
use tracing::debug;

use crate::error::CliError;

/// Loaded configuration, a tokio runtime and an HTTP client.
pub struct CliRunner {
    config: ConfigFile,
    runtime: tokio::runtime::Runtime,
    http: Arc<ReqwestClient>,
}

impl CliRunner {
    pub fn new() -> Result<Self, CliError> {
        let config = ConfigFile::load()?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| CliError::Runtime(e.to_string()))?;
        let http = Arc::new(ReqwestClient::with_timeout(config.request_timeout())?);

        Ok(Self {
            config,
            runtime,
            http,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn http(&self) -> Arc<ReqwestClient> {
        Arc::clone(&self.http)
    }

    /// Log the command and the settings it runs with.
    pub fn log_startup(&self, command: &str) {
        debug!(
            command,
            probe_timeout_secs = self.config.network.probe_timeout_secs,
            request_timeout_secs = self.config.network.request_timeout_secs,
            "Starting"
        );
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

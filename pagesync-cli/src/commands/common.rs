//! Common types and utilities shared across CLI commands.

use std::sync::Arc;
use std::time::Duration;

use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use pagesync::host::{Notifier, SaveProvider};
use pagesync::save::{SaveMap, SiteContext};
use pagesync::schema::SchemaVersion;
use pagesync::vfs::{DiskFs, VirtualPath};

use crate::error::CliError;

/// Environment variable consulted when `--token` is not given.
pub const TOKEN_ENV: &str = "PAGESYNC_TOKEN";

/// Schema version selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum SchemaArg {
    /// Per-type tables (adx_webpages, adx_webtemplates, ...)
    V1,
    /// Power Pages component table
    V2,
}

impl From<SchemaArg> for SchemaVersion {
    fn from(arg: SchemaArg) -> Self {
        match arg {
            SchemaArg::V1 => SchemaVersion::V1,
            SchemaArg::V2 => SchemaVersion::V2,
        }
    }
}

/// Bearer token from the argument or the environment.
pub fn require_token(cli_token: Option<String>) -> Result<String, CliError> {
    cli_token
        .or_else(|| std::env::var(TOKEN_ENV).ok())
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| {
            CliError::InvalidArgument(format!(
                "An access token is required. Use --token or set {}",
                TOKEN_ENV
            ))
        })
}

/// Spinner shown while waiting on the network.
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    bar.set_style(style);
    bar.set_message(message.into());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Prints notifications and reports opened files by their local path.
pub struct CliNotifier {
    fs: Arc<DiskFs>,
}

impl CliNotifier {
    pub fn new(fs: Arc<DiskFs>) -> Self {
        Self { fs }
    }
}

impl Notifier for CliNotifier {
    fn show_info(&self, message: &str) {
        println!("{}", message);
    }

    fn show_error(&self, message: &str, detail: &str) {
        eprintln!("Error: {}", message);
        eprintln!("  {}", detail);
    }

    fn open_document(&self, path: &VirtualPath) {
        println!("Open: {}", self.fs.local_path(path).display());
    }
}

/// Prints the save-back map after each projection pass.
pub struct PrintSaveProvider;

impl SaveProvider for PrintSaveProvider {
    fn register(&self, entries: SaveMap, site: &SiteContext) {
        println!();
        println!("Tracked files ({}) for {}", entries.len(), site.org_url);
        for (path, details) in &entries {
            println!(
                "  {}  ->  {}({}).{} [{}]",
                path, details.entity_type, details.entity_id, details.attribute, details.schema_version
            );
        }
    }
}

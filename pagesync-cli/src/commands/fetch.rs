//! Fetch command - materialize one entity as local files.

use std::path::PathBuf;
use std::sync::Arc;

use pagesync::host::StaticToken;
use pagesync::save::SiteContext;
use pagesync::schema::SchemaVersion;
use pagesync::vfs::DiskFs;
use pagesync::{EntityRequest, Session};

use super::common::{require_token, CliNotifier, PrintSaveProvider, SchemaArg};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the fetch command.
pub struct FetchArgs {
    pub org_url: String,
    pub entity: String,
    pub entity_id: String,
    pub website_name: String,
    pub website_id: String,
    pub schema: SchemaArg,
    pub language: Option<String>,
    pub output: Option<PathBuf>,
    pub token: Option<String>,
}

fn default_output_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pagesync-sites")
}

/// Run the fetch command.
pub fn run(args: FetchArgs) -> Result<(), CliError> {
    if !args.org_url.starts_with("https://") {
        return Err(CliError::InvalidArgument(format!(
            "organization URL must start with https:// (got '{}')",
            args.org_url
        )));
    }
    let token = require_token(args.token)?;

    let runner = CliRunner::new()?;
    runner.log_startup("fetch");

    let output = args.output.unwrap_or_else(default_output_dir);
    let fs = Arc::new(DiskFs::new(&output));
    let version = SchemaVersion::from(args.schema);

    let mut languages = runner.config().language_map();
    if let Some(code) = args.language {
        languages = languages.with_default_code(code);
    }

    let session = Session::builder(runner.http(), Arc::new(StaticToken::new(token)), Arc::clone(&fs))
        .with_config(runner.config())
        .with_languages(languages)
        .with_schema_version(version)
        .with_notifier(Arc::new(CliNotifier::new(Arc::clone(&fs))))
        .with_save_provider(Arc::new(PrintSaveProvider))
        .build();

    let request = EntityRequest {
        entity: args.entity,
        entity_id: args.entity_id,
        site: SiteContext::new(args.org_url, args.website_name, args.website_id),
    };

    let report = runner.block_on(session.open_entity(&request))?;

    println!();
    println!(
        "Wrote {} file(s) from {} record(s) under {} using schema {}",
        report.written.len(),
        report.records,
        output.display(),
        version
    );
    if !report.failures.is_empty() {
        println!("{} record(s) could not be written", report.failures.len());
    }

    Ok(())
}

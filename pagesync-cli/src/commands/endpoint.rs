//! Endpoint command - resolve the intelligence endpoint under cross-geo policy.

use std::sync::Arc;

use pagesync::geo::TenantId;
use pagesync::host::StaticToken;
use pagesync::policy::Endpoint;
use pagesync::vfs::MemoryFs;
use pagesync::Session;

use super::common::{require_token, spinner};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the endpoint command.
pub struct EndpointArgs {
    pub tenant: String,
    pub environment: String,
    pub token: Option<String>,
}

/// Run the endpoint command.
pub fn run(args: EndpointArgs) -> Result<(), CliError> {
    let tenant = TenantId::parse(&args.tenant)?;
    let token = require_token(args.token)?;

    let runner = CliRunner::new()?;
    runner.log_startup("endpoint");

    // No files are written by this command.
    let session = Session::builder(runner.http(), Arc::new(StaticToken::new(token)), Arc::new(MemoryFs::new()))
        .with_config(runner.config())
        .build();

    let progress = spinner("Resolving endpoint");
    let result = runner.block_on(session.intelligence_endpoint(&tenant, &args.environment));
    progress.finish_and_clear();

    println!("Geo:       {}", result.geo_name.as_deref().unwrap_or("(unknown)"));
    println!("Cross-geo: {}", if result.cross_geo_enabled { "enabled" } else { "disabled" });

    match result.endpoint {
        Endpoint::Available(url) => {
            println!("Endpoint:  {}", url);
            Ok(())
        }
        Endpoint::Unavailable => {
            println!("Endpoint:  unavailable for this geo");
            Ok(())
        }
        Endpoint::NotResolved => Err(CliError::Unresolved(tenant.to_string())),
    }
}

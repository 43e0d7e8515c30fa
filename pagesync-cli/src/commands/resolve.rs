//! Resolve command - discover the cluster serving a tenant.

use std::sync::Arc;

use pagesync::geo::{candidate_urls, GeoResolver, TenantId};
use pagesync::telemetry::TracingSink;

use super::common::spinner;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the resolve command.
pub struct ResolveArgs {
    pub tenant: String,
    pub show_candidates: bool,
}

/// Run the resolve command.
pub fn run(args: ResolveArgs) -> Result<(), CliError> {
    let tenant = TenantId::parse(&args.tenant)?;

    if args.show_candidates {
        println!("Candidates:");
        for candidate in candidate_urls(&tenant) {
            println!("  {:<8} {}", candidate.stamp, candidate.url);
        }
        println!();
    }

    let runner = CliRunner::new()?;
    runner.log_startup("resolve");

    let resolver = GeoResolver::with_config(runner.http(), Arc::new(TracingSink), runner.config().resolver_config());
    let progress = spinner(format!("Probing clusters for {}", tenant));
    let resolution = runner.block_on(resolver.resolve(&tenant));
    progress.finish_and_clear();

    let resolution = resolution.ok_or_else(|| CliError::Unresolved(tenant.to_string()))?;

    println!("Tenant:      {}", tenant);
    println!("Stamp:       {}", resolution.stamp);
    println!("Geo:         {}", resolution.geo_name);
    println!("Environment: {}", resolution.environment);
    println!("Cluster:     {}", resolution.cluster_number);

    Ok(())
}

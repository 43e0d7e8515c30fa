//! PageSync CLI - Command-line interface
//!
//! Resolves tenant clusters and intelligence endpoints, and mirrors Power
//! Pages records into local files.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::common::SchemaArg;
use commands::config::ConfigCommands;
use commands::endpoint::EndpointArgs;
use commands::fetch::FetchArgs;
use commands::resolve::ResolveArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "pagesync")]
#[command(version, about = "Power Pages site records as local files", long_about = None)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover the regional cluster serving a tenant
    Resolve {
        /// Tenant id (32 hex characters, hyphens optional)
        #[arg(long)]
        tenant: String,

        /// Print every probed candidate URL
        #[arg(long)]
        candidates: bool,
    },

    /// Resolve the intelligence endpoint and apply the cross-geo policy
    Endpoint {
        /// Tenant id (32 hex characters, hyphens optional)
        #[arg(long)]
        tenant: String,

        /// Power Platform environment id
        #[arg(long)]
        environment: String,

        /// Bearer token for the admin API (or PAGESYNC_TOKEN)
        #[arg(long)]
        token: Option<String>,
    },

    /// Fetch one entity and write its files locally
    Fetch {
        /// Dataverse organization URL (https://<org>.crm.dynamics.com)
        #[arg(long)]
        org_url: String,

        /// Entity type (webpages, webtemplates, contentsnippets)
        #[arg(long)]
        entity: String,

        /// Record id
        #[arg(long)]
        entity_id: String,

        /// Site folder name
        #[arg(long)]
        website_name: String,

        /// Website record id
        #[arg(long, default_value = "")]
        website_id: String,

        /// Portal schema version
        #[arg(long, value_enum, default_value = "v1")]
        schema: SchemaArg,

        /// Language code for localized file names
        #[arg(long)]
        language: Option<String>,

        /// Output directory (default: ~/pagesync-sites)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Bearer token for Dataverse (or PAGESYNC_TOKEN)
        #[arg(long)]
        token: Option<String>,
    },

    /// View or change configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Resolve { tenant, candidates } => commands::resolve::run(ResolveArgs {
            tenant,
            show_candidates: candidates,
        }),
        Commands::Endpoint {
            tenant,
            environment,
            token,
        } => commands::endpoint::run(EndpointArgs {
            tenant,
            environment,
            token,
        }),
        Commands::Fetch {
            org_url,
            entity,
            entity_id,
            website_name,
            website_id,
            schema,
            language,
            output,
            token,
        } => commands::fetch::run(FetchArgs {
            org_url,
            entity,
            entity_id,
            website_name,
            website_id,
            schema,
            language,
            output,
            token,
        }),
        Commands::Config { command } => commands::config::run(command),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

//! jobscout CLI
//!
//! Local execution entry point.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use jobscout::{
    Discovery,
    error::{AppError, Result},
    location::{LocationKind, LocationRegistry},
    models::{CandidateProfile, Config, Query, SourceKind},
};

/// jobscout - Job Discovery and Matching
#[derive(Parser, Debug)]
#[command(
    name = "jobscout",
    version,
    about = "Discovers and ranks job postings from South African and remote job boards"
)]
struct Cli {
    /// Path to storage directory containing config files
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search the job boards and rank postings against a profile
    Discover {
        /// Search keyword (repeatable)
        #[arg(short, long = "keyword", required = true)]
        keywords: Vec<String>,

        /// Location to search (repeatable; default: anywhere)
        #[arg(short, long = "location")]
        locations: Vec<String>,

        /// Board to query (repeatable; default: every enabled board)
        #[arg(long = "source")]
        sources: Vec<SourceKind>,

        /// Keep only remote-capable postings
        #[arg(long)]
        remote_only: bool,

        /// Number of results to keep
        #[arg(long)]
        top_k: Option<usize>,

        /// Candidate profile (default: {storage_dir}/profile.toml)
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Write the JSON report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Look up the province of a place
    Province {
        /// Place name (case-sensitive)
        name: String,
    },

    /// Add a place to the location table for this run
    AddLocation {
        name: String,

        /// city, town or village
        #[arg(long, default_value = "town")]
        kind: LocationKind,
    },

    /// List every known place
    Locations,

    /// Validate configuration files
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.storage_dir.join("config.toml");
    let config = Arc::new(Config::load_or_default(&config_path));
    let registry = Arc::new(LocationRegistry::south_africa(&config.locations)?);

    match cli.command {
        Command::Discover {
            keywords,
            locations,
            sources,
            remote_only,
            top_k,
            profile,
            output,
        } => {
            let profile_path = profile.unwrap_or_else(|| cli.storage_dir.join("profile.toml"));
            let profile = CandidateProfile::load(&profile_path)?;
            log::info!("Loaded profile from {}", profile_path.display());

            let mut query = Query::new(keywords)
                .with_locations(locations)
                .with_sources(sources)
                .remote_only(remote_only);
            if let Some(top_k) = top_k {
                query = query.with_top_k(top_k);
            }

            let discovery = Discovery::new(Arc::clone(&config), Arc::clone(&registry))?;
            log::info!(
                "Enabled sources: {}",
                discovery
                    .source_kinds()
                    .iter()
                    .map(|k| k.name())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            let report = discovery.discover(&query, &profile).await?;

            let json = serde_json::to_string_pretty(&report)?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, json).await?;
                    log::info!(
                        "Wrote {} results to {}",
                        report.results.len(),
                        path.display()
                    );
                }
                None => println!("{json}"),
            }
        }

        Command::Province { name } => match registry.find_province(&name) {
            Some((code, province)) => println!("{name}: {code} ({province})"),
            None => {
                return Err(AppError::location(format!("'{name}' is not a known place")));
            }
        },

        Command::AddLocation { name, kind } => {
            let added = registry.add_custom_location(&name, kind)?;
            if added.inserted {
                println!(
                    "Added {} '{}' to {} ({})",
                    added.kind, added.location, added.province_code, added.province_name
                );
            } else {
                println!(
                    "'{}' is already known in {} ({})",
                    added.location, added.province_code, added.province_name
                );
            }
        }

        Command::Locations => {
            for location in registry.all_locations() {
                println!("{location}");
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("Config OK ({} boards)", config.boards.len());

            let profile_path = cli.storage_dir.join("profile.toml");
            if profile_path.exists() {
                CandidateProfile::load(&profile_path)?;
                log::info!("Profile OK");
            }

            log::info!("All validations passed!");
        }
    }

    Ok(())
}

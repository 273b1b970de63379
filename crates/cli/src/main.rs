//! Instance Coverage CLI
//!
//! A command-line tool that reconciles monitoring-agent presence against
//! cloud provider inventory and renders the result as tables, JSON, or CSV.

mod commands;
mod config;
mod output;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use recon_lib::client::HttpInventorySource;
use recon_lib::fargate::DEFAULT_AGENT_IMAGE;
use recon_lib::models::Provider;
use recon_lib::run::RunOptions;
use recon_lib::search::DEFAULT_LOOKBACK_HOURS;
use tracing_subscriber::EnvFilter;

/// Instance Coverage CLI
#[derive(Parser)]
#[command(name = "icov")]
#[command(author, version, about = "Instance coverage reconciler", long_about = None)]
pub struct Cli {
    /// Profile name from ~/.config/icov/config.json
    #[arg(long, short, env = "ICOV_PROFILE", default_value = "default")]
    pub profile: String,

    /// Inventory API base URL (overrides the profile)
    #[arg(long, env = "ICOV_API_URL")]
    pub api_url: Option<String>,

    /// Inventory API token (overrides the profile)
    #[arg(long, env = "ICOV_API_TOKEN")]
    pub api_token: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Collection window lookback in hours (1 hour to 7 days)
    #[arg(long, default_value_t = DEFAULT_LOOKBACK_HOURS)]
    pub lookback_hours: u64,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reconcile agents against inventory and print the three result sets
    Report {
        /// Restrict to kubernetes-flagged instances
        #[arg(long)]
        kubernetes_only: bool,

        /// Providers to reconcile (comma separated)
        #[arg(long, default_value = "Aws,Gcp,Azure")]
        providers: String,

        /// Subaccount label stamped onto records
        #[arg(long)]
        subaccount: Option<String>,

        /// Include the Fargate task partition
        #[arg(long)]
        fargate: bool,

        /// Print coverage statistics after the report
        #[arg(long)]
        statistics: bool,
    },

    /// Print agent coverage statistics only
    Coverage {
        /// Restrict to kubernetes-flagged instances
        #[arg(long)]
        kubernetes_only: bool,

        /// Providers to reconcile (comma separated)
        #[arg(long, default_value = "Aws,Gcp,Azure")]
        providers: String,
    },

    /// Partition Fargate tasks by agent container presence
    Fargate {
        /// Image fragment identifying the agent container
        #[arg(long, default_value = DEFAULT_AGENT_IMAGE)]
        agent_image: String,

        /// Subaccount label stamped onto records
        #[arg(long)]
        subaccount: Option<String>,
    },

    /// List subaccounts visible to the API token
    Subaccounts,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let profile = config::Config::load()?.profile(&cli.profile);
    let api_url = cli
        .api_url
        .clone()
        .or(profile.api_url)
        .context("no API URL configured; set --api-url, ICOV_API_URL, or the profile")?;
    let api_token = cli
        .api_token
        .clone()
        .or(profile.api_token)
        .context("no API token configured; set --api-token, ICOV_API_TOKEN, or the profile")?;
    let profile_subaccount = profile.subaccount;

    let source = HttpInventorySource::new(&api_url, &api_token)?;

    match cli.command {
        Commands::Report {
            kubernetes_only,
            providers,
            subaccount,
            fargate,
            statistics,
        } => {
            let options = RunOptions {
                lookback_hours: cli.lookback_hours,
                providers: parse_providers(&providers)?,
                kubernetes_only,
                subaccount: subaccount.or(profile_subaccount),
                include_fargate: fargate,
                agent_image: DEFAULT_AGENT_IMAGE.to_string(),
            };
            commands::report::report(&source, &options, statistics, cli.format).await
        }
        Commands::Coverage {
            kubernetes_only,
            providers,
        } => {
            let options = RunOptions {
                lookback_hours: cli.lookback_hours,
                providers: parse_providers(&providers)?,
                kubernetes_only,
                subaccount: profile_subaccount,
                include_fargate: false,
                agent_image: DEFAULT_AGENT_IMAGE.to_string(),
            };
            commands::coverage::coverage(&source, &options, cli.format).await
        }
        Commands::Fargate {
            agent_image,
            subaccount,
        } => {
            let subaccount = subaccount
                .or(profile_subaccount)
                .unwrap_or_else(|| "default".to_string());
            commands::fargate::fargate(
                &source,
                cli.lookback_hours,
                &subaccount,
                &agent_image,
                cli.format,
            )
            .await
        }
        Commands::Subaccounts => commands::accounts::subaccounts(&source, cli.format).await,
    }
}

fn parse_providers(value: &str) -> Result<Vec<Provider>> {
    let mut providers = Vec::new();
    for name in value.split(',') {
        match Provider::from_name(name) {
            Some(provider) => providers.push(provider),
            None => bail!("unknown provider: {name:?}"),
        }
    }
    if providers.is_empty() {
        bail!("at least one provider is required");
    }
    Ok(providers)
}

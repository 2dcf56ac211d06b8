//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for a finished review
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary with violations and stage timings
    Text,
    /// The full review status as JSON
    Json,
}

/// CLI arguments for listing-vetting
#[derive(Parser, Debug)]
#[command(name = "listing-vetting")]
#[command(
    author,
    version,
    about = "Marketplace listing compliance review with a council of policy agents"
)]
#[command(long_about = r#"
listing-vetting checks a marketplace listing against a tenant's policies.

Each configured policy agent reads the listing together with the policy
passages most similar to it and returns a verdict. The verdicts are
aggregated into approved, rejected or escalated, and a short explanation
is written for the decision.

Configuration files are loaded from (in priority order):
1. VETTING_* environment variables   (VETTING_LLM__MODEL=...)
2. --config <path>                   Explicit config file
3. ./vetting.toml                    Project-level config
4. ~/.config/listing-vetting/config.toml   Global config

Example:
  listing-vetting review demos/listing.json --agents demos/agents.toml --policies demos/policies
  listing-vetting -vv review listing.json --agents agents.toml --policies policies/ --output json
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Review one listing end-to-end
    Review(ReviewArgs),

    /// Show configuration file locations and the effective configuration
    Config,
}

#[derive(clap::Args, Debug)]
pub struct ReviewArgs {
    /// Listing JSON file (title, description, category, optional imageUrls)
    #[arg(value_name = "LISTING")]
    pub listing: PathBuf,

    /// Agents file declaring the policy agents
    #[arg(long, value_name = "PATH")]
    pub agents: PathBuf,

    /// Directory of markdown policy documents
    #[arg(long, value_name = "DIR")]
    pub policies: PathBuf,

    /// Tenant the listing, agents and policies belong to
    #[arg(long, default_value = "default")]
    pub tenant: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Give up waiting for a decision after this many seconds
    #[arg(long, default_value_t = 300)]
    pub timeout_secs: u64,
}

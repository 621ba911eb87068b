use axonapi::ResourceKind;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "axonctl")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Declarative AxonOps alerting, checks and backups", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: ~/.config/axonctl/config.toml)
    #[arg(short, long, global = true, env = "AXONCTL_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub api: ApiOverrides,

    #[command(subcommand)]
    pub command: Command,
}

/// Connection settings that take precedence over the `[api]` table
#[derive(Args, Debug, Default, Clone)]
pub struct ApiOverrides {
    /// AxonOps API base URL
    #[arg(long = "url", global = true, env = "AXONOPS_URL")]
    pub url: Option<String>,

    /// API key sent as X-API-Key
    #[arg(long, global = true, env = "AXONOPS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Organization sent as X-Organization
    #[arg(long = "org", global = true, env = "AXONOPS_ORG")]
    pub org: Option<String>,

    /// Pre-issued bearer token, used instead of any credential in the config file
    #[arg(long, global = true, env = "AXONOPS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Username for /api/login
    #[arg(long, global = true, env = "AXONOPS_USERNAME")]
    pub username: Option<String>,

    /// Password for /api/login
    #[arg(long, global = true, env = "AXONOPS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Converge every declared resource
    Apply(ApplyArgs),

    /// Show what apply would change
    Diff(DiffArgs),

    /// List remote entities of one kind
    List {
        /// endpoints, routes, alert_rules, log_rules, service_checks, backups
        kind: ResourceKind,
    },

    /// Delete one remote entity by name
    Delete {
        /// Entity kind
        kind: ResourceKind,

        /// Entity name
        name: String,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Load and validate the configuration without contacting the API
    Check,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Only apply a kind or one entity, e.g. `alert_rules` or `alert_rules.high_cpu`
    #[arg(short, long)]
    pub target: Option<String>,

    /// Dry run - show what would change
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Keep applying after a failure instead of stopping
    #[arg(long)]
    pub keep_going: bool,
}

#[derive(Args)]
pub struct DiffArgs {
    /// Only diff a kind or one entity, e.g. `alert_rules` or `alert_rules.high_cpu`
    #[arg(short, long)]
    pub target: Option<String>,
}

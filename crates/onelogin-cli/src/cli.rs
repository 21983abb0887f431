use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "onelogin")]
#[command(about = "Drive OneLogin resource controllers from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API base URL (overrides the subdomain)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Account subdomain, used as https://<subdomain>.onelogin.com
    #[arg(long, global = true)]
    pub subdomain: Option<String>,

    /// OAuth2 client ID
    #[arg(long, global = true)]
    pub client_id: Option<String>,

    /// OAuth2 client secret
    #[arg(long, global = true)]
    pub client_secret: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Provider configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Profile from ~/.onelogin/config.toml
    #[arg(short, long, global = true, env = "ONELOGIN_PROFILE", default_value = "default")]
    pub profile: String,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Log controller activity (repeat for more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List registered resource types
    Resources,
    /// Show the attributes of a resource type
    Schema(TypeArgs),
    /// Print the API payload a configuration inflates to, without calling the API
    Inflate(ConfigArgs),
    /// Create a resource from a configuration
    Create(ConfigArgs),
    /// Read a resource into state
    Read(IdArgs),
    /// Update a resource from a configuration
    Update(IdArgs),
    /// Delete a resource
    Delete(IdArgs),
    /// Import an existing resource (app rules take <app_id>/<rule_id>)
    Import(ImportArgs),
    /// Read a data source (onelogin_user or onelogin_users)
    Data(DataArgs),
}

#[derive(clap::Args)]
pub struct TypeArgs {
    /// Resource type (e.g. onelogin_users or users)
    pub resource_type: String,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    /// Resource type (e.g. onelogin_users or users)
    pub resource_type: String,
    /// Path to a JSON configuration (reads from stdin if omitted)
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct IdArgs {
    /// Resource type (e.g. onelogin_users or users)
    pub resource_type: String,
    /// Resource ID
    pub id: String,
    /// Path to a JSON configuration
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct ImportArgs {
    /// Resource type (e.g. onelogin_app_rules or app_rules)
    pub resource_type: String,
    /// Import ID
    pub import_id: String,
}

#[derive(clap::Args)]
pub struct DataArgs {
    /// Data source type (e.g. onelogin_user or user)
    pub source_type: String,
    /// Path to a JSON query configuration
    #[arg(long)]
    pub file: Option<PathBuf>,
}

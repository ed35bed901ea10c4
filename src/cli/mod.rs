//! CLI module for modelgate
//!
//! # Commands
//!
//! - `serve` - Start the gateway
//! - `models` - Fetch every backend's catalog once and show the merged result
//! - `backends` - Show the configured backends
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Start with two backends, the second one authenticated
//! modelgate serve -b http://localhost:11434/v1 -b "https://api.example.com/v1|sk-..."
//!
//! # See which backend serves which model
//! modelgate models -c modelgate.toml
//!
//! # Generate shell completions
//! modelgate completions bash > ~/.bash_completion.d/modelgate
//! ```

pub mod backends;
pub mod completions;
pub mod config;
pub mod models;
pub mod output;
pub mod serve;

pub use completions::handle_completions;
pub use config::handle_config_init;

use crate::config::GatewayConfig;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "modelgate.toml";

/// modelgate - one endpoint in front of many LLM backends
#[derive(Parser, Debug)]
#[command(
    name = "modelgate",
    version,
    about = "OpenAI-compatible gateway routing requests to the backend that serves the model"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the gateway
    Serve(ServeArgs),
    /// List the merged model catalog
    Models(ModelsArgs),
    /// Show configured backends
    Backends(BackendsArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Override server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override server host
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Backend as URL or URL|CREDENTIAL; repeat in priority order (replaces configured backends)
    #[arg(short, long = "backend")]
    pub backends: Vec<String>,

    /// Seconds between catalog refreshes
    #[arg(long)]
    pub refresh_interval: Option<u64>,
}

#[derive(Args, Debug)]
pub struct ModelsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct BackendsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// Load the config file if it exists (defaults otherwise), then apply
/// environment overrides.
pub fn load_config(path: &Path) -> Result<GatewayConfig, Box<dyn std::error::Error>> {
    let config = if path.exists() {
        GatewayConfig::load(Some(path))?
    } else {
        tracing::debug!(path = %path.display(), "Config file not found, using defaults");
        GatewayConfig::default()
    };

    Ok(config.with_env_overrides())
}

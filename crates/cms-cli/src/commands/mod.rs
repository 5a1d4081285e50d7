//! CLI command definitions and dispatch.

pub mod config;
pub mod hook;
pub mod migrate;
pub mod plugin;
pub mod serve;
pub mod token;

use clap::{Parser, Subcommand};

use cms_api::{AppState, Stores};
use cms_core::config::AppConfig;
use cms_core::error::AppError;

use crate::output::{self, OutputFormat};

/// CMS Pro: plugin-extensible content management
#[derive(Debug, Parser)]
#[command(name = "cms", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Environment overlay (`config/<env>.toml`)
    #[arg(short, long, default_value = "development", env = "CMS_ENV")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the API server
    Serve(serve::ServeArgs),
    /// Apply database migrations
    Migrate,
    /// Plugin management
    Plugin(plugin::PluginArgs),
    /// Run a hook locally and print the outcome
    Hook(hook::HookArgs),
    /// Bearer token utilities
    Token(token::TokenArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, &self.load_config()?).await,
            Commands::Migrate => migrate::execute(&self.load_config()?).await,
            Commands::Plugin(args) => plugin::execute(args, self.load_config()?, self.format).await,
            Commands::Hook(args) => hook::execute(args, self.load_config()?).await,
            Commands::Token(args) => token::execute(args, &self.load_config()?),
            Commands::Config(args) => config::execute(args, &self.config, &self.env),
        }
    }

    fn load_config(&self) -> Result<AppConfig, AppError> {
        AppConfig::load_file(&self.config, &self.env)
    }
}

/// Helper: build the application state over the configured stores.
///
/// Without a database the state is in-memory and nothing the command changes
/// outlives it.
pub async fn load_state(config: AppConfig) -> Result<AppState, AppError> {
    if !config.database.is_configured() {
        output::print_warning("No database configured; changes will not be persisted");
    }
    let stores = Stores::connect(&config.database).await?;
    cms_api::build_state(config, stores).await
}

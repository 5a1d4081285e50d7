//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use cms_core::config::AppConfig;
use cms_core::error::AppError;
use cms_database::connection::mask_password;

use crate::output;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration, secrets masked
    Show,
    /// Validate the configuration files
    Validate,
}

/// Execute config commands
pub fn execute(args: &ConfigArgs, config_path: &str, env: &str) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let mut config = AppConfig::load_file(config_path, env)?;
            config.auth.jwt_secret = "****".to_string();
            config.plugins.remote_token = "****".to_string();
            config.database.url = mask_password(&config.database.url);
            output::print_item(&config);
        }
        ConfigCommand::Validate => match AppConfig::load_file(config_path, env) {
            Ok(config) => {
                output::print_success(&format!("Configuration '{}' is valid", config_path));
                output::print_kv("Server", &config.server.bind_address());
                output::print_kv("Database", &mask_password(&config.database.url));
                output::print_kv("Plugin directory", &config.plugins.directory);
                output::print_kv("Dispatcher", &format!("{:?}", config.plugins.dispatcher));
                if config.auth.jwt_secret == "CHANGE_ME_IN_PRODUCTION" {
                    output::print_warning("auth.jwt_secret still has its default value");
                }
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {}", e));
                return Err(e);
            }
        },
    }

    Ok(())
}

//! Bearer token commands.

use clap::{Args, Subcommand};

use cms_api::jwt::JwtCodec;
use cms_core::config::AppConfig;
use cms_core::error::AppError;
use cms_entity::user::{UserContext, UserRole};

/// Arguments for token commands
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Token subcommand
    #[command(subcommand)]
    pub command: TokenCommand,
}

/// Token subcommands
#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Issue a signed token for a user
    Issue {
        /// User id (`sub` claim)
        #[arg(long, default_value = "admin")]
        id: String,
        /// Display name
        #[arg(long, default_value = "Administrator")]
        name: String,
        /// Role: admin, editor or author
        #[arg(long, default_value = "admin")]
        role: UserRole,
    },
}

/// Execute token commands
pub fn execute(args: &TokenArgs, config: &AppConfig) -> Result<(), AppError> {
    match &args.command {
        TokenCommand::Issue { id, name, role } => {
            let codec = JwtCodec::new(&config.auth);
            let token = codec.issue(&UserContext::new(id.clone(), name.clone(), *role))?;
            println!("{}", token);
        }
    }
    Ok(())
}

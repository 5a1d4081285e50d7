//! Start the API server.

use clap::Args;

use cms_api::Stores;
use cms_core::config::AppConfig;
use cms_core::error::AppError;

use crate::output;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the server host
    #[arg(long)]
    pub host: Option<String>,
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs, config: &AppConfig) -> Result<(), AppError> {
    let mut config = config.clone();
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }

    println!("Starting CMS Pro server...");
    output::print_kv("Address", &config.server.bind_address());
    output::print_kv(
        "Database",
        if config.database.is_configured() {
            "postgres"
        } else {
            "in-memory"
        },
    );

    let stores = Stores::connect(&config.database).await?;
    let state = cms_api::build_state(config, stores).await?;
    cms_api::serve(state, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

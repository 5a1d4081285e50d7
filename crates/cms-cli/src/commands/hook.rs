//! Run a hook through the local dispatcher.

use clap::Args;
use serde_json::Value;

use cms_core::config::AppConfig;
use cms_core::error::AppError;
use cms_plugin::HookPoint;

use crate::output;

/// Arguments for the hook command
#[derive(Debug, Args)]
pub struct HookArgs {
    /// Hook name, e.g. `admin_menu`
    pub name: String,

    /// Payload as JSON
    #[arg(short, long, default_value = "{}")]
    pub data: String,

    /// Plugins to activate before dispatching
    #[arg(short, long, value_delimiter = ',')]
    pub activate: Vec<String>,
}

/// Execute the hook command
pub async fn execute(args: &HookArgs, config: AppConfig) -> Result<(), AppError> {
    let payload: Value = serde_json::from_str(&args.data)
        .map_err(|e| AppError::validation(format!("Payload is not valid JSON: {}", e)))?;

    let state = super::load_state(config).await?;
    for id in &args.activate {
        state.plugins.activate(id).await?;
    }

    let outcome = state
        .plugins
        .dispatch(&HookPoint::from(args.name.as_str()), payload)
        .await;
    for report in &outcome.executed {
        match &report.error {
            None => output::print_success(&report.plugin_id),
            Some(e) => output::print_error(&format!("{}: {}", report.plugin_id, e)),
        }
    }
    output::print_item(&outcome.data);
    Ok(())
}

//! Plugin management CLI commands.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use dialoguer::Confirm;
use serde::Serialize;
use serde_json::Value;
use tabled::Tabled;

use cms_core::config::AppConfig;
use cms_core::error::AppError;
use cms_entity::plugin::{PluginRecord, PluginStatus};
use cms_plugin::loader;
use cms_plugin::registry::PluginQuery;

use crate::output::{self, OutputFormat};

/// Arguments for plugin commands
#[derive(Debug, Args)]
pub struct PluginArgs {
    /// Plugin subcommand
    #[command(subcommand)]
    pub command: PluginCommand,
}

/// Plugin subcommands
#[derive(Debug, Subcommand)]
pub enum PluginCommand {
    /// List plugins
    List {
        /// Filter by status
        #[arg(short, long)]
        status: Option<PluginStatus>,
        /// Filter by category
        #[arg(long)]
        category: Option<String>,
        /// Match name or description
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one plugin
    Show {
        /// Plugin id
        id: String,
    },
    /// Install a plugin from a `plugin.json` manifest, or a catalogue
    /// plugin by id
    Install {
        /// Manifest path or catalogue id
        source: String,
    },
    /// Activate a plugin
    Activate {
        /// Plugin id
        id: String,
    },
    /// Deactivate a plugin
    Deactivate {
        /// Plugin id
        id: String,
    },
    /// Remove a plugin
    Uninstall {
        /// Plugin id
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show or replace a plugin's settings
    Settings {
        /// Plugin id
        id: String,
        /// New settings as a JSON object
        #[arg(long)]
        set: Option<String>,
    },
    /// List frontend hooks of active plugins
    Hooks,
}

/// Plugin display row for table output
#[derive(Debug, Serialize, Tabled)]
struct PluginRow {
    /// Plugin id
    id: String,
    /// Display name
    name: String,
    /// Version
    version: String,
    /// Category
    category: String,
    /// Status
    status: String,
    /// Declared hook names
    hooks: usize,
}

impl From<&PluginRecord> for PluginRow {
    fn from(record: &PluginRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            version: record.version.clone(),
            category: record.category.clone(),
            status: record.status.to_string(),
            hooks: record.hooks.len(),
        }
    }
}

/// Frontend hook row for table output
#[derive(Debug, Serialize, Tabled)]
struct HookRow {
    plugin: String,
    hook: String,
    order: i32,
    description: String,
}

/// Execute plugin commands
pub async fn execute(
    args: &PluginArgs,
    config: AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let state = super::load_state(config).await?;
    let plugins = &state.plugins;

    match &args.command {
        PluginCommand::List {
            status,
            category,
            search,
        } => {
            let query = PluginQuery {
                status: *status,
                category: category.clone(),
                search: search.clone(),
            };
            let records = plugins.registry().search(&query).await?;
            let rows: Vec<PluginRow> = records.iter().map(PluginRow::from).collect();
            output::print_list(&rows, format);
        }
        PluginCommand::Show { id } => {
            let record = plugins.registry().get(id).await?;
            output::print_item(&record);
        }
        PluginCommand::Install { source } => {
            let path = PathBuf::from(source);
            let record = if tokio::fs::try_exists(&path).await? {
                let manifest = loader::read_manifest(&path).await?;
                plugins.install(manifest).await?
            } else {
                plugins.install_available(source).await?
            };
            output::print_success(&format!(
                "Plugin '{}' installed (v{})",
                record.id, record.version
            ));
        }
        PluginCommand::Activate { id } => {
            let record = plugins.activate(id).await?;
            output::print_success(&format!("Plugin '{}' is {}", record.id, record.status));
        }
        PluginCommand::Deactivate { id } => {
            let record = plugins.deactivate(id).await?;
            output::print_success(&format!("Plugin '{}' is {}", record.id, record.status));
        }
        PluginCommand::Uninstall { id, yes } => {
            let record = plugins.registry().get(id).await?;
            if !*yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Uninstall '{}' ({})?", record.name, record.id))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Prompt failed: {}", e)))?;
                if !confirmed {
                    output::print_warning("Aborted");
                    return Ok(());
                }
            }
            plugins.uninstall(id).await?;
            output::print_success(&format!("Plugin '{}' uninstalled", id));
        }
        PluginCommand::Settings { id, set: None } => {
            let settings = plugins.registry().settings(id).await?;
            output::print_item(&settings);
        }
        PluginCommand::Settings { id, set: Some(raw) } => {
            let settings: Value = serde_json::from_str(raw)
                .map_err(|e| AppError::validation(format!("Settings are not valid JSON: {}", e)))?;
            if !settings.is_object() {
                return Err(AppError::validation("Settings must be a JSON object"));
            }
            let record = plugins.update_settings(id, settings).await?;
            output::print_success(&format!("Settings of '{}' updated", record.id));
        }
        PluginCommand::Hooks => {
            let rows: Vec<HookRow> = plugins
                .frontend_hooks()
                .await?
                .into_iter()
                .map(|h| HookRow {
                    plugin: h.plugin_id,
                    hook: h.hook,
                    order: h.order,
                    description: h.description,
                })
                .collect();
            output::print_list(&rows, format);
        }
    }

    Ok(())
}

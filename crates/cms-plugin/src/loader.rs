//! Loads plugin manifests (`<dir>/<plugin>/plugin.json`) from the plugins directory.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use cms_core::error::AppError;
use cms_core::result::AppResult;
use cms_entity::plugin::PluginManifest;

/// Manifest file name inside each plugin directory.
pub const MANIFEST_FILE: &str = "plugin.json";

/// Reads every valid manifest under `dir`. Invalid manifests are logged and
/// skipped; a missing directory yields nothing.
pub async fn load_manifests(dir: &Path) -> AppResult<Vec<PluginManifest>> {
    if !tokio::fs::try_exists(dir).await? {
        debug!(dir = %dir.display(), "Plugin directory does not exist");
        return Ok(Vec::new());
    }

    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut paths: Vec<PathBuf> = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path().join(MANIFEST_FILE);
        if entry.file_type().await?.is_dir() && tokio::fs::try_exists(&path).await? {
            paths.push(path);
        }
    }
    paths.sort();

    let mut manifests = Vec::with_capacity(paths.len());
    for path in paths {
        match read_manifest(&path).await {
            Ok(manifest) => manifests.push(manifest),
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping invalid plugin manifest"),
        }
    }
    Ok(manifests)
}

/// Reads and validates a single manifest file.
pub async fn read_manifest(path: &Path) -> AppResult<PluginManifest> {
    let source = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::validation(format!("Cannot read {}: {e}", path.display()))
    })?;
    PluginManifest::from_json(&source)
}

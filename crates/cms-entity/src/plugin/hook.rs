//! Hook declarations carried by plugin manifests.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Hook name → one or more definitions, as declared in a manifest.
pub type HookMap = BTreeMap<String, HookBinding>;

/// Where a hook's effect is consumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookSide {
    /// Consumed by the admin UI.
    Frontend,
    /// Consumed by the server.
    Backend,
    /// Consumed by both.
    #[default]
    Both,
}

impl HookSide {
    /// Whether a UI layer cares about this hook.
    pub fn is_frontend(&self) -> bool {
        matches!(self, Self::Frontend | Self::Both)
    }
}

/// A single handler declaration for one hook.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HookDefinition {
    /// Frontend, backend or both.
    #[serde(rename = "type", default)]
    pub side: HookSide,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Ascending execution priority. Ties fall back to install order.
    #[serde(default, alias = "execution_order")]
    pub order: i32,
    /// Declarative behavior, for plugins without a compiled module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ManifestAction>,
}

/// A hook entry in a manifest: either one definition or a list of them.
///
/// `Multiple` is listed first so an array never collapses into a
/// defaulted single definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HookBinding {
    /// Several handlers on the same hook.
    Multiple(Vec<HookDefinition>),
    /// The common case.
    Single(HookDefinition),
}

impl HookBinding {
    /// All definitions in declaration order.
    pub fn definitions(&self) -> &[HookDefinition] {
        match self {
            Self::Multiple(defs) => defs,
            Self::Single(def) => std::slice::from_ref(def),
        }
    }
}

impl From<HookDefinition> for HookBinding {
    fn from(def: HookDefinition) -> Self {
        Self::Single(def)
    }
}

/// Payload transformation a manifest can declare without shipping code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ManifestAction {
    /// Push `item` onto an array payload (`admin_menu`).
    AppendMenuItem {
        /// Menu entry `{title, path, roles}`.
        item: Value,
    },
    /// Push `stat` onto the payload's `stats` array (`dashboard_stats`).
    AppendStat {
        /// Stat card `{title, value, change, changeType}`.
        stat: Value,
    },
    /// Insert `activity` at the front of `recentActivity`.
    PrependActivity {
        /// Activity entry.
        activity: Value,
    },
    /// Merge `fields` into an object payload.
    MergeFields {
        /// Fields to contribute.
        fields: Map<String, Value>,
        /// Replace keys that are already present.
        #[serde(default)]
        overwrite: bool,
    },
}

//! Icon bindings for menu entries and stat cards.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Icons the admin UI knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Icon {
    /// Dashboard / home.
    LayoutDashboard,
    /// Posts.
    FileText,
    /// Pages.
    File,
    /// Media library.
    Image,
    /// Users.
    Users,
    /// Plugins and plugin-contributed entries.
    Puzzle,
    /// Settings.
    Settings,
    /// Plugin-contributed stat cards.
    BarChart,
    /// Trends.
    TrendingUp,
}

impl Icon {
    /// Removes a handler-supplied `icon` field, keeping it only if it names a
    /// known icon.
    pub fn take_from(extra: &mut Map<String, Value>) -> Option<Self> {
        extra
            .remove("icon")
            .and_then(|value| serde_json::from_value(value).ok())
    }
}

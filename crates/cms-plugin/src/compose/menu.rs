//! Admin menu composition through the `admin_menu` hook.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use cms_core::result::AppResult;
use cms_entity::user::{UserContext, UserRole};

use super::auth::Authorizer;
use super::icon::Icon;
use crate::hooks::definitions::HookPoint;
use crate::hooks::dispatcher::Dispatcher;

/// The serializable part of a menu entry, as handlers see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuEntry {
    /// Label.
    pub title: String,
    /// Route; the key icons are matched by.
    pub path: String,
    /// Roles allowed to see the entry. Empty means everyone.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Fields the host does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A menu entry with its icon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuItem {
    /// Entry data.
    #[serde(flatten)]
    pub entry: MenuEntry,
    /// Icon binding.
    pub icon: Icon,
}

impl MenuItem {
    /// Creates a menu item.
    pub fn new(title: &str, path: &str, roles: &[UserRole], icon: Icon) -> Self {
        Self {
            entry: MenuEntry {
                title: title.to_string(),
                path: path.to_string(),
                roles: roles.iter().map(|r| r.as_str().to_string()).collect(),
                extra: Map::new(),
            },
            icon,
        }
    }
}

/// Builds the admin menu a user sees.
#[derive(Debug, Clone)]
pub struct MenuComposer {
    dispatcher: Arc<dyn Dispatcher>,
    authorizer: Arc<dyn Authorizer>,
}

impl MenuComposer {
    /// Creates a composer.
    pub fn new(dispatcher: Arc<dyn Dispatcher>, authorizer: Arc<dyn Authorizer>) -> Self {
        Self {
            dispatcher,
            authorizer,
        }
    }

    /// The host's own menu entries.
    pub fn default_menu() -> Vec<MenuItem> {
        use UserRole::{Admin, Author, Editor};
        vec![
            MenuItem::new("Dashboard", "/admin", &[Admin, Editor, Author], Icon::LayoutDashboard),
            MenuItem::new("Posts", "/admin/posts", &[Admin, Editor, Author], Icon::FileText),
            MenuItem::new("Pages", "/admin/pages", &[Admin, Editor], Icon::File),
            MenuItem::new("Media", "/admin/media", &[Admin, Editor, Author], Icon::Image),
            MenuItem::new("Users", "/admin/users", &[Admin], Icon::Users),
            MenuItem::new("Plugins", "/admin/plugins", &[Admin], Icon::Puzzle),
            MenuItem::new("Settings", "/admin/settings", &[Admin], Icon::Settings),
        ]
    }

    /// Dispatches `admin_menu` over `base` and returns the entries `user` may see.
    pub async fn compose(&self, base: &[MenuItem], user: &UserContext) -> AppResult<Vec<MenuItem>> {
        let icons: HashMap<&str, Icon> = base
            .iter()
            .map(|item| (item.entry.path.as_str(), item.icon))
            .collect();
        let stripped: Vec<&MenuEntry> = base.iter().map(|item| &item.entry).collect();
        let payload = serde_json::to_value(&stripped)?;

        let outcome = self.dispatcher.dispatch(&HookPoint::AdminMenu, payload).await;
        let entries: Vec<MenuEntry> = match serde_json::from_value(outcome.data) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Composed menu could not be decoded, using base menu");
                base.iter().map(|item| item.entry.clone()).collect()
            }
        };

        Ok(entries
            .into_iter()
            .filter(|entry| self.visible(entry, user))
            .map(|mut entry| {
                let icon = Icon::take_from(&mut entry.extra)
                    .or_else(|| icons.get(entry.path.as_str()).copied())
                    .unwrap_or(Icon::Puzzle);
                MenuItem { entry, icon }
            })
            .collect())
    }

    fn visible(&self, entry: &MenuEntry, user: &UserContext) -> bool {
        entry.roles.is_empty()
            || entry
                .roles
                .iter()
                .any(|role| self.authorizer.has_role(user, role))
    }
}

//! Dashboard composition through the `dashboard_stats` hook.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::warn;

use cms_core::result::AppResult;
use cms_database::store::ContentCounts;
use cms_entity::user::UserContext;

use super::icon::Icon;
use crate::hooks::definitions::HookPoint;
use crate::hooks::dispatcher::Dispatcher;

/// The serializable part of a stat card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatCard {
    /// Card title; the key icons are matched by.
    pub title: String,
    /// Displayed value.
    #[serde(default)]
    pub value: Value,
    /// Change label, e.g. `+12%`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<String>,
    /// `positive`, `negative` or `neutral`.
    #[serde(rename = "changeType", default, skip_serializing_if = "Option::is_none")]
    pub change_type: Option<String>,
    /// Fields the host does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A stat card with its icon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatItem {
    /// Card data.
    #[serde(flatten)]
    pub card: StatCard,
    /// Icon binding.
    pub icon: Icon,
}

impl StatItem {
    /// Creates a card with a value and a change label.
    pub fn new(title: &str, value: impl Into<Value>, change: &str, icon: Icon) -> Self {
        Self {
            card: StatCard {
                title: title.to_string(),
                value: value.into(),
                change: Some(change.to_string()),
                change_type: Some("neutral".to_string()),
                extra: Map::new(),
            },
            icon,
        }
    }
}

/// The composed dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    /// Stat cards in display order.
    pub stats: Vec<StatItem>,
    /// Activity feed, newest first.
    #[serde(rename = "recentActivity")]
    pub recent_activity: Vec<Value>,
    /// Other top-level fields contributed by handlers.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Builds the dashboard a user sees.
#[derive(Debug, Clone)]
pub struct DashboardComposer {
    dispatcher: Arc<dyn Dispatcher>,
}

impl DashboardComposer {
    /// Creates a composer.
    pub fn new(dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Default cards from content counts. The users card is only shown to
    /// editors and admins.
    pub fn base_cards(counts: &ContentCounts, active_plugins: usize, user: &UserContext) -> Vec<StatItem> {
        let mut cards = vec![
            StatItem::new("Total Posts", counts.posts, &format!("{} published", counts.published), Icon::FileText),
            StatItem::new("Total Pages", counts.pages, &format!("{} drafts", counts.drafts), Icon::File),
        ];
        if user.role.is_editor_or_above() {
            cards.push(StatItem::new("Users", counts.authors, "contributors", Icon::Users));
        }
        cards.push(StatItem::new("Active Plugins", active_plugins as u64, "installed", Icon::Puzzle));
        cards
    }

    /// Dispatches `dashboard_stats` over the base cards and activity.
    pub async fn compose(
        &self,
        base_cards: &[StatItem],
        activity: Vec<Value>,
        user: &UserContext,
    ) -> AppResult<DashboardView> {
        let icons: HashMap<&str, Icon> = base_cards
            .iter()
            .map(|item| (item.card.title.as_str(), item.icon))
            .collect();
        let stripped: Vec<&StatCard> = base_cards.iter().map(|item| &item.card).collect();
        let payload = json!({
            "stats": serde_json::to_value(&stripped)?,
            "recentActivity": activity.clone(),
            "currentUser": user.to_hook_value(),
        });

        let outcome = self
            .dispatcher
            .dispatch(&HookPoint::DashboardStats, payload)
            .await;

        let mut fields = match outcome.data {
            Value::Object(fields) => fields,
            other => {
                warn!(kind = ?other, "Composed dashboard is not an object, using base cards");
                Map::new()
            }
        };
        fields.remove("currentUser");

        let cards: Vec<StatCard> = match fields.remove("stats").map(serde_json::from_value::<Vec<StatCard>>) {
            Some(Ok(cards)) => cards,
            Some(Err(e)) => {
                warn!(error = %e, "Composed stats could not be decoded, using base cards");
                stripped.into_iter().cloned().collect()
            }
            None => stripped.into_iter().cloned().collect(),
        };
        let recent_activity = match fields.remove("recentActivity") {
            Some(Value::Array(items)) => items,
            _ => activity,
        };

        let stats = cards
            .into_iter()
            .map(|mut card| {
                let icon = Icon::take_from(&mut card.extra)
                    .or_else(|| icons.get(card.title.as_str()).copied())
                    .unwrap_or(Icon::BarChart);
                StatItem { card, icon }
            })
            .collect();

        Ok(DashboardView {
            stats,
            recent_activity,
            extra: fields,
        })
    }
}

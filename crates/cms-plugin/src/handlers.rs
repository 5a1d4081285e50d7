//! Handlers built from declarative manifest actions.

use async_trait::async_trait;
use serde_json::{Map, Value};

use cms_core::error::AppError;
use cms_core::result::AppResult;
use cms_entity::plugin::ManifestAction;

use crate::hooks::definitions::HookAction;
use crate::hooks::registry::HookHandler;

/// Runs a [`ManifestAction`] against the payload.
#[derive(Debug, Clone)]
pub struct ActionHandler {
    action: ManifestAction,
}

impl ActionHandler {
    /// Creates a handler for `action`.
    pub fn new(action: ManifestAction) -> Self {
        Self { action }
    }
}

fn array_field<'a>(payload: &'a Value, key: &str) -> AppResult<&'a Vec<Value>> {
    payload
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::plugin(format!("payload has no '{key}' array")))
}

#[async_trait]
impl HookHandler for ActionHandler {
    async fn handle(&self, payload: &Value) -> AppResult<HookAction> {
        match &self.action {
            ManifestAction::AppendMenuItem { item } => {
                let entries = payload
                    .as_array()
                    .ok_or_else(|| AppError::plugin("append_menu_item needs an array payload"))?;
                let path = item.get("path");
                if path.is_some() && entries.iter().any(|e| e.get("path") == path) {
                    return Ok(HookAction::Continue);
                }
                let mut out = entries.clone();
                out.push(item.clone());
                Ok(HookAction::ContinueWith(Value::Array(out)))
            }
            ManifestAction::AppendStat { stat } => {
                let mut stats = array_field(payload, "stats")?.clone();
                stats.push(stat.clone());
                Ok(HookAction::ContinueWith(
                    serde_json::json!({ "stats": stats }),
                ))
            }
            ManifestAction::PrependActivity { activity } => {
                let mut feed = array_field(payload, "recentActivity")?.clone();
                feed.insert(0, activity.clone());
                Ok(HookAction::ContinueWith(
                    serde_json::json!({ "recentActivity": feed }),
                ))
            }
            ManifestAction::MergeFields { fields, overwrite } => {
                let current = payload
                    .as_object()
                    .ok_or_else(|| AppError::plugin("merge_fields needs an object payload"))?;
                let contributed: Map<String, Value> = fields
                    .iter()
                    .filter(|(key, _)| *overwrite || !current.contains_key(*key))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                if contributed.is_empty() {
                    Ok(HookAction::Continue)
                } else {
                    Ok(HookAction::ContinueWith(Value::Object(contributed)))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn run(action: ManifestAction, payload: Value) -> AppResult<HookAction> {
        ActionHandler::new(action).handle(&payload).await
    }

    #[tokio::test]
    async fn test_append_menu_item_skips_known_path() {
        let item = json!({"title": "SEO", "path": "/admin/seo", "roles": ["admin"]});
        let action = ManifestAction::AppendMenuItem { item: item.clone() };

        let added = run(action.clone(), json!([])).await.unwrap();
        assert_eq!(added, HookAction::ContinueWith(json!([item.clone()])));

        let again = run(action, json!([item])).await.unwrap();
        assert_eq!(again, HookAction::Continue);
    }

    #[tokio::test]
    async fn test_stat_and_activity() {
        let payload = json!({"stats": [{"title": "Posts"}], "recentActivity": [{"type": "post"}]});

        let stat = run(
            ManifestAction::AppendStat { stat: json!({"title": "Views"}) },
            payload.clone(),
        )
        .await
        .unwrap();
        assert_eq!(
            stat,
            HookAction::ContinueWith(json!({"stats": [{"title": "Posts"}, {"title": "Views"}]}))
        );

        let activity = run(
            ManifestAction::PrependActivity { activity: json!({"type": "backup"}) },
            payload,
        )
        .await
        .unwrap();
        assert_eq!(
            activity,
            HookAction::ContinueWith(
                json!({"recentActivity": [{"type": "backup"}, {"type": "post"}]})
            )
        );
    }

    #[tokio::test]
    async fn test_merge_fields_respects_overwrite() {
        let fields: Map<String, Value> =
            serde_json::from_value(json!({"seo_score": 0, "title": "x"})).unwrap();
        let keep = run(
            ManifestAction::MergeFields { fields: fields.clone(), overwrite: false },
            json!({"title": "Hello"}),
        )
        .await
        .unwrap();
        assert_eq!(keep, HookAction::ContinueWith(json!({"seo_score": 0})));

        let replace = run(
            ManifestAction::MergeFields { fields, overwrite: true },
            json!({"title": "Hello"}),
        )
        .await
        .unwrap();
        assert_eq!(replace, HookAction::ContinueWith(json!({"seo_score": 0, "title": "x"})));
    }

    #[tokio::test]
    async fn test_wrong_payload_is_an_error() {
        let err = run(
            ManifestAction::AppendStat { stat: json!({}) },
            json!([]),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind, cms_core::error::ErrorKind::Plugin);
    }
}

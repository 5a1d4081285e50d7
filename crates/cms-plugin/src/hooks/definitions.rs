//! Hook points, handler results and the payload merge rule.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use cms_core::error::AppError;

/// A named extension point.
///
/// The well-known hooks carry a payload shape contract; any other name is a
/// `Custom` hook with no contract beyond "same JSON kind in, same kind out".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HookPoint {
    /// `[{title, path, roles}]`, composed into the admin sidebar.
    AdminMenu,
    /// `{stats, recentActivity, ...}`, composed into the dashboard.
    DashboardStats,
    /// `{post, ...}` when a post is rendered.
    PostContent,
    /// The post object before it is stored.
    BeforePostSave,
    /// The stored post object.
    AfterPostSave,
    /// Activity feed entries.
    ActivityFeed,
    /// Quick stats widget.
    QuickStats,
    /// `{post, ...}` for post metadata widgets.
    PostMeta,
    /// Any other hook name.
    Custom(String),
}

impl HookPoint {
    /// Returns the wire name of this hook.
    pub fn as_str(&self) -> &str {
        match self {
            Self::AdminMenu => "admin_menu",
            Self::DashboardStats => "dashboard_stats",
            Self::PostContent => "post_content",
            Self::BeforePostSave => "before_post_save",
            Self::AfterPostSave => "after_post_save",
            Self::ActivityFeed => "activity_feed",
            Self::QuickStats => "quick_stats",
            Self::PostMeta => "post_meta",
            Self::Custom(name) => name,
        }
    }

    /// Checks `payload` against the hook's shape contract.
    pub fn check_shape(&self, payload: &Value) -> Result<(), String> {
        match self {
            Self::AdminMenu => {
                let entries = payload
                    .as_array()
                    .ok_or("admin_menu payload must be an array")?;
                for (i, entry) in entries.iter().enumerate() {
                    let valid = entry.get("title").is_some_and(Value::is_string)
                        && entry.get("path").is_some_and(Value::is_string)
                        && entry.get("roles").is_some_and(Value::is_array);
                    if !valid {
                        return Err(format!(
                            "admin_menu entry {i} must have string title, string path and array roles"
                        ));
                    }
                }
                Ok(())
            }
            Self::DashboardStats => {
                let valid = payload.get("stats").is_some_and(Value::is_array)
                    && payload.get("recentActivity").is_some_and(Value::is_array);
                if valid {
                    Ok(())
                } else {
                    Err("dashboard_stats payload must have array stats and recentActivity".into())
                }
            }
            _ => Ok(()),
        }
    }
}

impl From<&str> for HookPoint {
    fn from(name: &str) -> Self {
        match name {
            "admin_menu" => Self::AdminMenu,
            "dashboard_stats" => Self::DashboardStats,
            "post_content" => Self::PostContent,
            "before_post_save" => Self::BeforePostSave,
            "after_post_save" => Self::AfterPostSave,
            "activity_feed" => Self::ActivityFeed,
            "quick_stats" => Self::QuickStats,
            "post_meta" => Self::PostMeta,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl From<String> for HookPoint {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl From<HookPoint> for String {
    fn from(hook: HookPoint) -> Self {
        hook.as_str().to_string()
    }
}

impl std::fmt::Display for HookPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a handler did with the payload.
#[derive(Debug, Clone, PartialEq)]
pub enum HookAction {
    /// Leave the payload unchanged.
    Continue,
    /// Merge this value into the payload.
    ContinueWith(Value),
}

/// Why a handler's contribution was dropped.
#[derive(Debug, thiserror::Error)]
pub enum HandlerFailure {
    /// The handler returned an error.
    #[error("handler failed: {0}")]
    Failed(#[from] AppError),
    /// The handler panicked.
    #[error("handler panicked: {0}")]
    Panicked(String),
    /// The handler exceeded the dispatch timeout.
    #[error("handler timed out after {0:?}")]
    TimedOut(Duration),
    /// The handler returned a value that cannot be merged.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

/// Result line for one handler in a dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerReport {
    /// Plugin that owns the handler.
    pub plugin_id: String,
    /// Whether the handler's result was applied.
    pub success: bool,
    /// Failure description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of folding all handlers for a hook over a payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    /// The folded payload.
    pub data: Value,
    /// One report per handler, in execution order.
    #[serde(rename = "executed_hooks", default)]
    pub executed: Vec<HandlerReport>,
}

impl DispatchOutcome {
    /// An outcome where nothing ran.
    pub fn unchanged(data: Value) -> Self {
        Self {
            data,
            executed: Vec::new(),
        }
    }

    /// Number of handlers whose result was dropped.
    pub fn failures(&self) -> usize {
        self.executed.iter().filter(|r| !r.success).count()
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Applies a handler's returned value to the prior payload.
///
/// Objects merge shallowly: returned keys override, untouched keys pass
/// through. Any other payload is replaced, and the replacement must keep the
/// prior JSON kind. A payload that satisfied the hook's shape contract must
/// still satisfy it afterwards.
pub fn merge_payload(hook: &HookPoint, prior: &Value, returned: Value) -> Result<Value, HandlerFailure> {
    let merged = match (prior, returned) {
        (Value::Object(prior_fields), Value::Object(fields)) => {
            let mut out = prior_fields.clone();
            out.extend(fields);
            Value::Object(out)
        }
        (Value::Null, next) => next,
        (prior, next) if kind_name(prior) == kind_name(&next) => next,
        (prior, next) => {
            return Err(HandlerFailure::InvalidPayload(format!(
                "{hook} expects {} but handler returned {}",
                kind_name(prior),
                kind_name(&next)
            )));
        }
    };

    if hook.check_shape(prior).is_ok() {
        hook.check_shape(&merged)
            .map_err(HandlerFailure::InvalidPayload)?;
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hook_point_round_trips_names() {
        assert_eq!(HookPoint::from("admin_menu"), HookPoint::AdminMenu);
        assert_eq!(
            HookPoint::from("seo_meta"),
            HookPoint::Custom("seo_meta".into())
        );
        let encoded = serde_json::to_value(HookPoint::BeforePostSave).unwrap();
        assert_eq!(encoded, json!("before_post_save"));
    }

    #[test]
    fn test_object_merge_preserves_untouched_fields() {
        let prior = json!({"stats": [], "recentActivity": [], "theme": "dark"});
        let merged = merge_payload(
            &HookPoint::DashboardStats,
            &prior,
            json!({"stats": [{"title": "Views"}]}),
        )
        .unwrap();
        assert_eq!(merged["theme"], "dark");
        assert_eq!(merged["stats"][0]["title"], "Views");
        assert_eq!(merged["recentActivity"], json!([]));
    }

    #[test]
    fn test_kind_change_is_invalid() {
        let err = merge_payload(&HookPoint::AdminMenu, &json!([]), json!({"oops": true}))
            .unwrap_err();
        assert!(matches!(err, HandlerFailure::InvalidPayload(_)));
    }

    #[test]
    fn test_shape_contract_is_enforced() {
        let prior = json!([{"title": "Dashboard", "path": "/admin", "roles": ["admin"]}]);
        let err = merge_payload(&HookPoint::AdminMenu, &prior, json!([{"title": "No path"}]))
            .unwrap_err();
        assert!(matches!(err, HandlerFailure::InvalidPayload(_)));

        let prior = json!({"stats": [], "recentActivity": []});
        let err = merge_payload(&HookPoint::DashboardStats, &prior, json!({"stats": {}}))
            .unwrap_err();
        assert!(matches!(err, HandlerFailure::InvalidPayload(_)));
    }

    #[test]
    fn test_custom_hook_replaces_scalars() {
        let hook = HookPoint::from("word_count");
        assert_eq!(merge_payload(&hook, &json!(1), json!(2)).unwrap(), json!(2));
        assert!(merge_payload(&hook, &json!(1), json!("two")).is_err());
    }
}

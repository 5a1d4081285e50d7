//! Hook dispatcher: folds every registered handler over a payload.
//!
//! Each handler runs under a timeout and a panic guard. A handler that
//! errors, panics, times out or returns an unmergeable value is logged and
//! skipped; the fold continues with the last good payload.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use serde_json::Value;
use tracing::{debug, warn};

use super::definitions::{
    DispatchOutcome, HandlerFailure, HandlerReport, HookAction, HookPoint, merge_payload,
};
use super::registry::{HookEntry, HookRegistry};

/// Default per-handler time budget.
pub const DEFAULT_HANDLER_TIMEOUT: Duration = Duration::from_millis(300);

/// Folds the handlers registered for a hook over a payload.
///
/// Dispatch never fails: handler failures are reported in
/// [`DispatchOutcome::executed`] and otherwise ignored.
#[async_trait]
pub trait Dispatcher: Send + Sync + std::fmt::Debug {
    /// Dispatches `payload` through every handler for `hook`.
    async fn dispatch(&self, hook: &HookPoint, payload: Value) -> DispatchOutcome;
}

/// In-process dispatcher over a [`HookRegistry`].
#[derive(Debug, Clone)]
pub struct LocalDispatcher {
    registry: Arc<HookRegistry>,
    handler_timeout: Duration,
}

impl LocalDispatcher {
    /// Creates a dispatcher with the default handler timeout.
    pub fn new(registry: Arc<HookRegistry>) -> Self {
        Self::with_timeout(registry, DEFAULT_HANDLER_TIMEOUT)
    }

    /// Creates a dispatcher with an explicit handler timeout.
    pub fn with_timeout(registry: Arc<HookRegistry>, handler_timeout: Duration) -> Self {
        Self {
            registry,
            handler_timeout,
        }
    }

    /// Returns a reference to the hook registry.
    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }

    async fn run_one(
        &self,
        hook: &HookPoint,
        entry: &HookEntry,
        payload: &Value,
    ) -> Result<Option<Value>, HandlerFailure> {
        let guarded = AssertUnwindSafe(entry.handler.handle(payload)).catch_unwind();
        let action = match tokio::time::timeout(self.handler_timeout, guarded).await {
            Err(_) => return Err(HandlerFailure::TimedOut(self.handler_timeout)),
            Ok(Err(panic)) => return Err(HandlerFailure::Panicked(panic_message(panic.as_ref()))),
            Ok(Ok(result)) => result?,
        };

        match action {
            HookAction::Continue => Ok(None),
            HookAction::ContinueWith(value) => merge_payload(hook, payload, value).map(Some),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[async_trait]
impl Dispatcher for LocalDispatcher {
    async fn dispatch(&self, hook: &HookPoint, payload: Value) -> DispatchOutcome {
        let handlers = self.registry.handlers(hook).await;
        if handlers.is_empty() {
            return DispatchOutcome::unchanged(payload);
        }

        debug!(hook = %hook, handler_count = handlers.len(), "Dispatching hook");

        let mut data = payload;
        let mut executed = Vec::with_capacity(handlers.len());

        for entry in &handlers {
            match self.run_one(hook, entry, &data).await {
                Ok(next) => {
                    if let Some(next) = next {
                        data = next;
                    }
                    executed.push(HandlerReport {
                        plugin_id: entry.plugin_id.clone(),
                        success: true,
                        error: None,
                    });
                }
                Err(failure) => {
                    warn!(
                        hook = %hook,
                        plugin_id = %entry.plugin_id,
                        error = %failure,
                        "Hook handler skipped"
                    );
                    executed.push(HandlerReport {
                        plugin_id: entry.plugin_id.clone(),
                        success: false,
                        error: Some(failure.to_string()),
                    });
                }
            }
        }

        DispatchOutcome { data, executed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::registry::{HookHandler, HookRegistration};
    use crate::traits::ClosureHandler;
    use cms_core::error::AppError;
    use serde_json::json;

    fn append(title: &'static str) -> Arc<dyn HookHandler> {
        ClosureHandler::shared(move |payload| async move {
            let mut items = payload.as_array().cloned().unwrap_or_default();
            items.push(json!({"title": title, "path": format!("/{title}"), "roles": []}));
            Ok(HookAction::ContinueWith(Value::Array(items)))
        })
    }

    fn dispatcher() -> LocalDispatcher {
        LocalDispatcher::with_timeout(Arc::new(HookRegistry::new()), Duration::from_millis(50))
    }

    fn titles(value: &Value) -> Vec<String> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["title"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_identity_without_handlers() {
        let d = dispatcher();
        let payload = json!({"anything": [1, 2, 3]});
        let outcome = d.dispatch(&HookPoint::from("nobody_listens"), payload.clone()).await;
        assert_eq!(outcome.data, payload);
        assert!(outcome.executed.is_empty());
    }

    #[tokio::test]
    async fn test_failing_handler_is_skipped() {
        let d = dispatcher();
        let registry = d.registry();
        registry.register("a", HookPoint::AdminMenu, append("A"), 0).await;
        registry
            .register(
                "broken",
                HookPoint::AdminMenu,
                ClosureHandler::shared(|_| async { Err(AppError::plugin("boom")) }),
                0,
            )
            .await;
        registry.register("c", HookPoint::AdminMenu, append("C"), 0).await;

        let outcome = d.dispatch(&HookPoint::AdminMenu, json!([])).await;
        assert_eq!(titles(&outcome.data), vec!["A", "C"]);
        assert_eq!(outcome.failures(), 1);
        assert_eq!(outcome.executed[1].plugin_id, "broken");
        assert!(!outcome.executed[1].success);
    }

    #[tokio::test]
    async fn test_panicking_and_slow_handlers_are_skipped() {
        let d = dispatcher();
        let registry = d.registry();
        registry
            .register(
                "panics",
                HookPoint::AdminMenu,
                ClosureHandler::shared(|_| async { panic!("plugin bug") }),
                0,
            )
            .await;
        registry
            .register(
                "slow",
                HookPoint::AdminMenu,
                ClosureHandler::shared(|_| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(HookAction::ContinueWith(json!([])))
                }),
                0,
            )
            .await;
        registry.register("ok", HookPoint::AdminMenu, append("OK"), 0).await;

        let outcome = d.dispatch(&HookPoint::AdminMenu, json!([])).await;
        assert_eq!(titles(&outcome.data), vec!["OK"]);
        assert_eq!(outcome.failures(), 2);
        let errors: Vec<_> = outcome.executed.iter().filter_map(|r| r.error.clone()).collect();
        assert!(errors[0].contains("plugin bug"));
        assert!(errors[1].contains("timed out"));
    }

    #[tokio::test]
    async fn test_invalid_shape_keeps_last_good_payload() {
        let d = dispatcher();
        let registry = d.registry();
        registry.register("a", HookPoint::AdminMenu, append("A"), 0).await;
        registry
            .register(
                "shape",
                HookPoint::AdminMenu,
                ClosureHandler::shared(|_| async {
                    Ok(HookAction::ContinueWith(json!({"not": "a list"})))
                }),
                1,
            )
            .await;

        let outcome = d.dispatch(&HookPoint::AdminMenu, json!([])).await;
        assert_eq!(titles(&outcome.data), vec!["A"]);
        assert!(outcome.executed[1].error.as_deref().unwrap().contains("invalid payload"));
    }

    #[tokio::test]
    async fn test_repeated_dispatch_is_deterministic() {
        let d = dispatcher();
        let registry = d.registry();
        registry
            .register_all(
                "b",
                2,
                vec![HookRegistration::new(HookPoint::AdminMenu, append("B"), 0)],
            )
            .await;
        registry
            .register_all(
                "a",
                1,
                vec![HookRegistration::new(HookPoint::AdminMenu, append("A"), 0)],
            )
            .await;

        let first = d.dispatch(&HookPoint::AdminMenu, json!([])).await;
        let second = d.dispatch(&HookPoint::AdminMenu, json!([])).await;
        assert_eq!(first, second);
        assert_eq!(titles(&first.data), vec!["A", "B"]);
    }
}

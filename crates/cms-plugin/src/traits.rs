//! Handler and module traits for plugin authors.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use cms_core::result::AppResult;
use cms_entity::plugin::PluginManifest;

use crate::hooks::definitions::{HookAction, HookPoint};
use crate::hooks::registry::HookHandler;

type HandlerFuture = Pin<Box<dyn Future<Output = AppResult<HookAction>> + Send>>;
type BoxedHandlerFn = dyn Fn(Value) -> HandlerFuture + Send + Sync;

/// A closure-based hook handler for quick handler creation.
///
/// The closure receives its own copy of the payload.
#[derive(Clone)]
pub struct ClosureHandler {
    handler: Arc<BoxedHandlerFn>,
}

impl std::fmt::Debug for ClosureHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosureHandler")
            .field("handler", &"<closure>")
            .finish()
    }
}

impl ClosureHandler {
    /// Creates a new closure-based handler.
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<HookAction>> + Send + 'static,
    {
        let boxed: Arc<BoxedHandlerFn> =
            Arc::new(move |payload: Value| -> HandlerFuture { Box::pin(handler(payload)) });
        Self { handler: boxed }
    }

    /// Wraps the handler into an `Arc<dyn HookHandler>`.
    pub fn shared<F, Fut>(handler: F) -> Arc<dyn HookHandler>
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<HookAction>> + Send + 'static,
    {
        Arc::new(Self::new(handler))
    }
}

#[async_trait]
impl HookHandler for ClosureHandler {
    async fn handle(&self, payload: &Value) -> AppResult<HookAction> {
        (self.handler)(payload.clone()).await
    }
}

/// A plugin whose handlers are compiled into the server.
///
/// The module's manifest is offered in the catalogue; when a plugin record
/// with the same id is activated, its declared hooks without a declarative
/// action are resolved through [`PluginModule::handler`].
pub trait PluginModule: Send + Sync + std::fmt::Debug {
    /// Plugin id this module implements.
    fn id(&self) -> &'static str;

    /// Catalogue manifest for the module.
    fn manifest(&self) -> PluginManifest;

    /// Handler for `hook`, built from the plugin's current settings.
    fn handler(&self, hook: &HookPoint, settings: &Value) -> Option<Arc<dyn HookHandler>>;
}

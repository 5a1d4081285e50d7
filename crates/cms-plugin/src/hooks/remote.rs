//! Remote dispatcher: delegates dispatch to another CMS instance over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, warn};

use cms_core::error::{AppError, ErrorKind};
use cms_core::result::AppResult;

use super::definitions::{DispatchOutcome, HookPoint};
use super::dispatcher::Dispatcher;

/// Calls `POST {base_url}/api/plugins/execute-hook` on a server that owns
/// the registrations. Transport and decoding failures return the input
/// payload unchanged.
#[derive(Debug, Clone)]
pub struct RemoteDispatcher {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl RemoteDispatcher {
    /// Creates a remote dispatcher.
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        if base_url.trim().is_empty() {
            return Err(AppError::configuration(
                "plugins.remote_url is required for the remote dispatcher",
            ));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/api/plugins/execute-hook",
                base_url.trim_end_matches('/')
            ),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    /// The full endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call(&self, hook: &HookPoint, payload: &Value) -> AppResult<DispatchOutcome> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "hook_name": hook.as_str(), "data": payload }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            AppError::with_source(ErrorKind::ExternalService, "Remote dispatch request failed", e)
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::external(format!("Remote returned {status}")));
        }
        response.json::<DispatchOutcome>().await.map_err(|e| {
            AppError::with_source(ErrorKind::ExternalService, "Invalid remote response body", e)
        })
    }
}

#[async_trait]
impl Dispatcher for RemoteDispatcher {
    async fn dispatch(&self, hook: &HookPoint, payload: Value) -> DispatchOutcome {
        match self.call(hook, &payload).await {
            Ok(outcome) => {
                debug!(hook = %hook, executed = outcome.executed.len(), "Remote dispatch complete");
                outcome
            }
            Err(error) => {
                warn!(
                    hook = %hook,
                    endpoint = %self.endpoint,
                    error = %error,
                    "Remote dispatch failed, using input payload"
                );
                DispatchOutcome::unchanged(payload)
            }
        }
    }
}

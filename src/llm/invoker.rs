use super::scrub::sanitize_api_error;
use super::traits::Provider;
use crate::config::LlmConfig;
use crate::error::LlmError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

/// Sends a `(system, user)` prompt pair to the language model and returns
/// the raw reply text. One call, no retries.
pub trait ModelInvoker: Send + Sync {
    fn invoke<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
        session_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>>;

    /// Provider name for logs and the health endpoint.
    fn provider_name(&self) -> &str;

    fn model(&self) -> &str;
}

/// [`ModelInvoker`] backed by a [`Provider`].
pub struct ProviderInvoker {
    provider: Option<Arc<dyn Provider>>,
    provider_name: String,
    model: String,
    temperature: f64,
    timeout: Duration,
}

impl ProviderInvoker {
    /// `provider` is `None` when no credential is configured.
    pub fn new(provider: Option<Arc<dyn Provider>>, config: &LlmConfig) -> Self {
        let provider_name = provider
            .as_ref()
            .map_or_else(|| config.provider.trim().to_ascii_lowercase(), |p| p.name().to_string());
        Self {
            provider,
            provider_name,
            model: config.model.clone(),
            temperature: config.temperature,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    fn classify(&self, err: &anyhow::Error) -> LlmError {
        let timed_out = err.chain().any(|cause| {
            cause
                .downcast_ref::<reqwest::Error>()
                .is_some_and(reqwest::Error::is_timeout)
        });
        if timed_out {
            return LlmError::Timeout {
                provider: self.provider_name.clone(),
                secs: self.timeout.as_secs(),
            };
        }

        LlmError::RequestFailed {
            provider: self.provider_name.clone(),
            message: sanitize_api_error(&format!("{err:#}")),
        }
    }
}

impl ModelInvoker for ProviderInvoker {
    fn invoke<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
        session_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>> {
        let span = tracing::info_span!(
            "model_invoke",
            session_id,
            provider = %self.provider_name,
            model = %self.model
        );

        Box::pin(
            async move {
                let Some(provider) = self.provider.as_ref() else {
                    tracing::error!("no API key configured for model provider");
                    return Err(LlmError::ModelUnavailable {
                        provider: self.provider_name.clone(),
                    });
                };

                let call = provider.chat_with_system(
                    Some(system_prompt),
                    user_prompt,
                    &self.model,
                    self.temperature,
                );

                let result = match tokio::time::timeout(self.timeout, call).await {
                    Ok(Ok(text)) => Ok(text),
                    Ok(Err(err)) => Err(self.classify(&err)),
                    Err(_) => Err(LlmError::Timeout {
                        provider: self.provider_name.clone(),
                        secs: self.timeout.as_secs(),
                    }),
                };

                match &result {
                    Ok(text) => tracing::debug!(reply_chars = text.chars().count(), "model replied"),
                    Err(err) => tracing::error!(error = %err, "model invocation failed"),
                }
                result
            }
            .instrument(span),
        )
    }

    fn provider_name(&self) -> &str {
        &self.provider_name
    }

    fn model(&self) -> &str {
        &self.model
    }
}

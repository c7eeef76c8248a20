use super::compatible::{DEFAULT_OPENAI_BASE_URL, OpenAiCompatibleProvider};
use super::gemini::GeminiProvider;
use super::invoker::ProviderInvoker;
use super::traits::Provider;
use crate::config::LlmConfig;
use crate::error::ConfigError;
use std::sync::Arc;

const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Build the configured provider.
///
/// Returns `Ok(None)` when no credential is configured: the service still
/// starts and each model request reports the provider as unavailable.
pub fn create_provider(config: &LlmConfig) -> Result<Option<Box<dyn Provider>>, ConfigError> {
    let name = config.provider.trim().to_ascii_lowercase();
    let base_url = config
        .base_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty());

    let Some(api_key) = config.api_key() else {
        // Still reject unknown names so a typo is caught at startup.
        ensure_known_provider(&name, base_url)?;
        return Ok(None);
    };

    let provider: Box<dyn Provider> = match name.as_str() {
        "gemini" | "google" | "google-gemini" => Box::new(GeminiProvider::new(
            api_key,
            base_url,
            config.timeout_secs,
        )),
        "openai" => Box::new(OpenAiCompatibleProvider::new(
            "openai",
            base_url.unwrap_or(DEFAULT_OPENAI_BASE_URL),
            api_key,
            config.timeout_secs,
        )),
        "openrouter" => Box::new(OpenAiCompatibleProvider::new(
            "openrouter",
            base_url.unwrap_or(OPENROUTER_BASE_URL),
            api_key,
            config.timeout_secs,
        )),
        "compatible" | "custom" => {
            let url = base_url.ok_or_else(|| {
                ConfigError::Validation(format!("provider `{name}` requires llm.base_url"))
            })?;
            Box::new(OpenAiCompatibleProvider::new(
                "compatible",
                url,
                api_key,
                config.timeout_secs,
            ))
        }
        other => {
            return Err(ConfigError::Validation(format!(
                "unknown llm provider `{other}`"
            )));
        }
    };

    Ok(Some(provider))
}

fn ensure_known_provider(name: &str, base_url: Option<&str>) -> Result<(), ConfigError> {
    match name {
        "gemini" | "google" | "google-gemini" | "openai" | "openrouter" => Ok(()),
        "compatible" | "custom" if base_url.is_some() => Ok(()),
        "compatible" | "custom" => Err(ConfigError::Validation(format!(
            "provider `{name}` requires llm.base_url"
        ))),
        other => Err(ConfigError::Validation(format!(
            "unknown llm provider `{other}`"
        ))),
    }
}

/// Build the invoker used by the broker from the `[llm]` section.
pub fn create_invoker(config: &LlmConfig) -> Result<ProviderInvoker, ConfigError> {
    let provider = create_provider(config)?.map(Arc::from);
    Ok(ProviderInvoker::new(provider, config))
}

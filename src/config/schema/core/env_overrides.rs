use super::Config;
use crate::config::HistoryBackend;
use std::path::PathBuf;

/// Credential variables, most specific first.
const API_KEY_VARS: [&str; 3] = ["FORMAID_API_KEY", "EMERGENT_LLM_KEY", "GEMINI_API_KEY"];

fn first_non_empty(vars: &[&str]) -> Option<String> {
    vars.iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Some(key) = first_non_empty(&API_KEY_VARS) {
            self.llm.api_key = Some(key);
        }

        if let Some(provider) = first_non_empty(&["FORMAID_PROVIDER"]) {
            self.llm.provider = provider;
        }

        if let Some(model) = first_non_empty(&["FORMAID_MODEL"]) {
            self.llm.model = model;
        }

        if let Some(base_url) = first_non_empty(&["FORMAID_BASE_URL"]) {
            self.llm.base_url = Some(base_url);
        }

        if let Ok(temp_str) = std::env::var("FORMAID_TEMPERATURE")
            && let Ok(temp) = temp_str.trim().parse::<f64>()
            && (0.0..=2.0).contains(&temp)
        {
            self.llm.temperature = temp;
        }

        if let Some(host) = first_non_empty(&["FORMAID_HOST", "HOST"]) {
            self.gateway.host = host;
        }

        if let Some(port_str) = first_non_empty(&["FORMAID_PORT", "PORT"])
            && let Ok(port) = port_str.parse::<u16>()
        {
            self.gateway.port = port;
        }

        if let Some(origins) = first_non_empty(&["FORMAID_CORS_ORIGINS", "CORS_ORIGINS"]) {
            self.gateway.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(ToString::to_string)
                .collect();
        }

        if let Some(path) = first_non_empty(&["FORMAID_DATABASE_PATH"]) {
            self.history.database_path = Some(PathBuf::from(path));
        }

        if let Some(backend) = first_non_empty(&["FORMAID_HISTORY_BACKEND"])
            && let Some(backend) = HistoryBackend::parse(&backend)
        {
            self.history.backend = backend;
        }

        if let Some(path) = first_non_empty(&["FORMAID_EXTENSION_PATH"]) {
            self.extension.archive_path = Some(PathBuf::from(path));
        }

        if let Some(level) = first_non_empty(&["FORMAID_LOG"]) {
            self.log_level = level;
        }
    }
}

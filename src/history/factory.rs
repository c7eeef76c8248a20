use super::sqlite::SqliteHistoryStore;
use super::store::{HistoryStore, NoopHistoryStore};
use crate::config::{Config, HistoryBackend};
use anyhow::Context;
use std::sync::Arc;

pub async fn create_history_store(config: &Config) -> anyhow::Result<Arc<dyn HistoryStore>> {
    let store: Arc<dyn HistoryStore> = match config.history.backend {
        HistoryBackend::Sqlite => {
            let path = config.history_db_path();
            let store = SqliteHistoryStore::open(&path, config.history.max_connections)
                .await
                .with_context(|| format!("Failed to open history store: {}", path.display()))?;
            tracing::info!(path = %path.display(), "history store ready");
            Arc::new(store)
        }
        HistoryBackend::None => {
            tracing::info!("history recording disabled");
            Arc::new(NoopHistoryStore)
        }
    };
    Ok(store)
}

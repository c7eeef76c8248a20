use super::store::{HistoryResult, HistoryStore};
use super::types::{ChatRecord, InteractionRecord, StatusCheck};
use crate::error::HistoryError;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use std::future::Future;
use std::path::Path;
use std::pin::Pin;

/// SQLite-backed history log using an sqlx async pool.
pub struct SqliteHistoryStore {
    pool: SqlitePool,
}

const HISTORY_SCHEMA_META_TABLE: &str = "
CREATE TABLE IF NOT EXISTS history_schema_meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
)";
const HISTORY_SCHEMA_VERSION_KEY: &str = "history_schema_version";
const HISTORY_SCHEMA_VERSION: u32 = 1;

async fn ensure_history_schema_version(pool: &SqlitePool) -> HistoryResult<()> {
    sqlx::query(HISTORY_SCHEMA_META_TABLE).execute(pool).await?;

    let stored_version: Option<(String,)> =
        sqlx::query_as("SELECT value FROM history_schema_meta WHERE key = $1")
            .bind(HISTORY_SCHEMA_VERSION_KEY)
            .fetch_optional(pool)
            .await?;

    if let Some((value,)) = stored_version {
        let parsed = value.parse::<u32>().map_err(|_| {
            HistoryError::Migration(format!("invalid history schema version value: {value}"))
        })?;
        if parsed != HISTORY_SCHEMA_VERSION {
            return Err(HistoryError::Migration(format!(
                "incompatible history schema version: stored={parsed}, \
expected={HISTORY_SCHEMA_VERSION}; remove the history DB and restart"
            )));
        }
        return Ok(());
    }

    sqlx::query("INSERT INTO history_schema_meta (key, value) VALUES ($1, $2)")
        .bind(HISTORY_SCHEMA_VERSION_KEY)
        .bind(HISTORY_SCHEMA_VERSION.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

impl SqliteHistoryStore {
    /// Open (creating if needed) the database file at `path`.
    pub async fn open(path: &Path, max_connections: u32) -> HistoryResult<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                HistoryError::BackendUnavailable(format!(
                    "failed to create history directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let url = format!("sqlite://{}?mode=rwc", path.display());
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&url)
            .await
            .map_err(|e| {
                HistoryError::BackendUnavailable(format!(
                    "failed to open history DB {}: {e}",
                    path.display()
                ))
            })?;

        Self::new(pool).await
    }

    /// Create a store over an existing pool and run migrations.
    pub async fn new(pool: SqlitePool) -> HistoryResult<Self> {
        ensure_history_schema_version(&pool).await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS interactions (
                 id          TEXT PRIMARY KEY,
                 session_id  TEXT NOT NULL,
                 field_label TEXT NOT NULL,
                 result_json TEXT NOT NULL,
                 created_at  TEXT NOT NULL
             )",
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS chat_exchanges (
                 id           TEXT PRIMARY KEY,
                 session_id   TEXT NOT NULL,
                 page_url     TEXT NOT NULL,
                 user_message TEXT NOT NULL,
                 model_reply  TEXT NOT NULL,
                 created_at   TEXT NOT NULL
             )",
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS status_checks (
                 id          TEXT PRIMARY KEY,
                 client_name TEXT NOT NULL,
                 created_at  TEXT NOT NULL
             )",
        )
        .execute(&pool)
        .await?;

        for index in [
            "CREATE INDEX IF NOT EXISTS idx_interactions_created ON interactions(created_at)",
            "CREATE INDEX IF NOT EXISTS idx_chat_exchanges_created ON chat_exchanges(created_at)",
            "CREATE INDEX IF NOT EXISTS idx_status_checks_created ON status_checks(created_at)",
        ] {
            sqlx::query(index).execute(&pool).await?;
        }

        Ok(Self { pool })
    }
}

/// Fixed-width UTC timestamps so text ordering matches time ordering.
fn timestamp_to_str(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn str_to_timestamp(value: &str) -> HistoryResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| HistoryError::Query(format!("invalid stored timestamp {value}: {e}")))
}

fn limit_param(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn map_interaction_row(row: &SqliteRow) -> HistoryResult<InteractionRecord> {
    let result_raw: String = row.try_get("result_json")?;
    let created_at: String = row.try_get("created_at")?;
    let result = serde_json::from_str(&result_raw)
        .map_err(|e| HistoryError::Query(format!("deserialize stored guidance result: {e}")))?;

    Ok(InteractionRecord {
        id: row.try_get("id")?,
        session_id: row.try_get("session_id")?,
        field_label: row.try_get("field_label")?,
        result,
        timestamp: str_to_timestamp(&created_at)?,
    })
}

fn map_chat_row(row: &SqliteRow) -> HistoryResult<ChatRecord> {
    let created_at: String = row.try_get("created_at")?;
    Ok(ChatRecord {
        id: row.try_get("id")?,
        session_id: row.try_get("session_id")?,
        page_url: row.try_get("page_url")?,
        user_message: row.try_get("user_message")?,
        model_reply: row.try_get("model_reply")?,
        timestamp: str_to_timestamp(&created_at)?,
    })
}

fn map_status_row(row: &SqliteRow) -> HistoryResult<StatusCheck> {
    let created_at: String = row.try_get("created_at")?;
    Ok(StatusCheck {
        id: row.try_get("id")?,
        client_name: row.try_get("client_name")?,
        timestamp: str_to_timestamp(&created_at)?,
    })
}

impl HistoryStore for SqliteHistoryStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn record<'a>(
        &'a self,
        record: &'a InteractionRecord,
    ) -> Pin<Box<dyn Future<Output = HistoryResult<()>> + Send + 'a>> {
        Box::pin(async move {
            let result_json = serde_json::to_string(&record.result)
                .map_err(|e| HistoryError::Query(format!("serialize guidance result: {e}")))?;

            sqlx::query(
                "INSERT INTO interactions (id, session_id, field_label, result_json, created_at)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(&record.id)
            .bind(&record.session_id)
            .bind(&record.field_label)
            .bind(&result_json)
            .bind(timestamp_to_str(&record.timestamp))
            .execute(&self.pool)
            .await?;
            Ok(())
        })
    }

    fn recent<'a>(
        &'a self,
        limit: usize,
    ) -> Pin<Box<dyn Future<Output = HistoryResult<Vec<InteractionRecord>>> + Send + 'a>> {
        Box::pin(async move {
            let rows = sqlx::query(
                "SELECT id, session_id, field_label, result_json, created_at
                 FROM interactions
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT $1",
            )
            .bind(limit_param(limit))
            .fetch_all(&self.pool)
            .await?;

            rows.iter().map(map_interaction_row).collect()
        })
    }

    fn record_chat<'a>(
        &'a self,
        record: &'a ChatRecord,
    ) -> Pin<Box<dyn Future<Output = HistoryResult<()>> + Send + 'a>> {
        Box::pin(async move {
            sqlx::query(
                "INSERT INTO chat_exchanges
                     (id, session_id, page_url, user_message, model_reply, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(&record.id)
            .bind(&record.session_id)
            .bind(&record.page_url)
            .bind(&record.user_message)
            .bind(&record.model_reply)
            .bind(timestamp_to_str(&record.timestamp))
            .execute(&self.pool)
            .await?;
            Ok(())
        })
    }

    fn recent_chats<'a>(
        &'a self,
        limit: usize,
    ) -> Pin<Box<dyn Future<Output = HistoryResult<Vec<ChatRecord>>> + Send + 'a>> {
        Box::pin(async move {
            let rows = sqlx::query(
                "SELECT id, session_id, page_url, user_message, model_reply, created_at
                 FROM chat_exchanges
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT $1",
            )
            .bind(limit_param(limit))
            .fetch_all(&self.pool)
            .await?;

            rows.iter().map(map_chat_row).collect()
        })
    }

    fn record_status_check<'a>(
        &'a self,
        check: &'a StatusCheck,
    ) -> Pin<Box<dyn Future<Output = HistoryResult<()>> + Send + 'a>> {
        Box::pin(async move {
            sqlx::query(
                "INSERT INTO status_checks (id, client_name, created_at) VALUES ($1, $2, $3)",
            )
            .bind(&check.id)
            .bind(&check.client_name)
            .bind(timestamp_to_str(&check.timestamp))
            .execute(&self.pool)
            .await?;
            Ok(())
        })
    }

    fn status_checks<'a>(
        &'a self,
        limit: usize,
    ) -> Pin<Box<dyn Future<Output = HistoryResult<Vec<StatusCheck>>> + Send + 'a>> {
        Box::pin(async move {
            let rows = sqlx::query(
                "SELECT id, client_name, created_at
                 FROM status_checks
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT $1",
            )
            .bind(limit_param(limit))
            .fetch_all(&self.pool)
            .await?;

            rows.iter().map(map_status_row).collect()
        })
    }

    fn close<'a>(&'a self) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            self.pool.close().await;
            tracing::debug!("history store closed");
        })
    }
}

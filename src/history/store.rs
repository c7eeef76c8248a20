use super::types::{ChatRecord, InteractionRecord, StatusCheck};
use crate::error::HistoryError;
use std::future::Future;
use std::pin::Pin;

pub type HistoryResult<T> = std::result::Result<T, HistoryError>;

/// Append-only log of guidance interactions and chat exchanges.
///
/// Reads are most recent first and bounded by `limit`. There are no update
/// or delete operations.
pub trait HistoryStore: Send + Sync {
    /// Backend name for logs and the health endpoint.
    fn name(&self) -> &str;

    fn record<'a>(
        &'a self,
        record: &'a InteractionRecord,
    ) -> Pin<Box<dyn Future<Output = HistoryResult<()>> + Send + 'a>>;

    fn recent<'a>(
        &'a self,
        limit: usize,
    ) -> Pin<Box<dyn Future<Output = HistoryResult<Vec<InteractionRecord>>> + Send + 'a>>;

    fn record_chat<'a>(
        &'a self,
        record: &'a ChatRecord,
    ) -> Pin<Box<dyn Future<Output = HistoryResult<()>> + Send + 'a>>;

    fn recent_chats<'a>(
        &'a self,
        limit: usize,
    ) -> Pin<Box<dyn Future<Output = HistoryResult<Vec<ChatRecord>>> + Send + 'a>>;

    fn record_status_check<'a>(
        &'a self,
        check: &'a StatusCheck,
    ) -> Pin<Box<dyn Future<Output = HistoryResult<()>> + Send + 'a>>;

    fn status_checks<'a>(
        &'a self,
        limit: usize,
    ) -> Pin<Box<dyn Future<Output = HistoryResult<Vec<StatusCheck>>> + Send + 'a>>;

    /// Release backend resources. Called once on service shutdown.
    fn close<'a>(&'a self) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async {})
    }
}

/// Backend that accepts writes and returns empty reads.
pub struct NoopHistoryStore;

impl HistoryStore for NoopHistoryStore {
    fn name(&self) -> &str {
        "none"
    }

    fn record<'a>(
        &'a self,
        _record: &'a InteractionRecord,
    ) -> Pin<Box<dyn Future<Output = HistoryResult<()>> + Send + 'a>> {
        Box::pin(async { Ok(()) })
    }

    fn recent<'a>(
        &'a self,
        _limit: usize,
    ) -> Pin<Box<dyn Future<Output = HistoryResult<Vec<InteractionRecord>>> + Send + 'a>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn record_chat<'a>(
        &'a self,
        _record: &'a ChatRecord,
    ) -> Pin<Box<dyn Future<Output = HistoryResult<()>> + Send + 'a>> {
        Box::pin(async { Ok(()) })
    }

    fn recent_chats<'a>(
        &'a self,
        _limit: usize,
    ) -> Pin<Box<dyn Future<Output = HistoryResult<Vec<ChatRecord>>> + Send + 'a>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn record_status_check<'a>(
        &'a self,
        _check: &'a StatusCheck,
    ) -> Pin<Box<dyn Future<Output = HistoryResult<()>> + Send + 'a>> {
        Box::pin(async { Ok(()) })
    }

    fn status_checks<'a>(
        &'a self,
        _limit: usize,
    ) -> Pin<Box<dyn Future<Output = HistoryResult<Vec<StatusCheck>>> + Send + 'a>> {
        Box::pin(async { Ok(Vec::new()) })
    }
}

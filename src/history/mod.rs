pub mod factory;
pub mod sqlite;
pub mod store;
pub mod types;

pub use factory::create_history_store;
pub use sqlite::SqliteHistoryStore;
pub use store::{HistoryResult, HistoryStore, NoopHistoryStore};
pub use types::{ChatRecord, InteractionRecord, StatusCheck};

mod local;
mod memory;
mod remote;
mod synced;

pub use local::LocalStore;
pub use memory::MemoryStore;
pub use remote::RemoteStore;
pub use synced::SyncedStore;

use crate::errors::JournalResult;
use crate::models::{AiThought, JournalEntry, JournalMeta, WeeklySummary};
use std::collections::HashMap;

/// Key-value persistence of entries and meta, addressable by `YYYY-MM-DD` date
/// string. Backends are interchangeable behind this trait; absent records are a
/// normal outcome, not an error.
#[async_trait::async_trait]
pub trait EntryStore: Send + Sync {
    async fn get_entry(&self, date: &str) -> JournalResult<Option<JournalEntry>>;

    async fn put_entry(&self, entry: &JournalEntry) -> JournalResult<()>;

    async fn delete_entry(&self, date: &str) -> JournalResult<()>;

    async fn all_entries(&self) -> JournalResult<HashMap<String, JournalEntry>>;

    async fn get_meta(&self) -> JournalResult<Option<JournalMeta>>;

    async fn put_meta(&self, meta: &JournalMeta) -> JournalResult<()>;

    /// Wall-clock timestamp of the last reconciliation pass, persisted alongside
    /// meta. Backends that don't track it report `None` and the pass runs.
    async fn last_reconcile_at(&self) -> JournalResult<Option<i64>> {
        Ok(None)
    }

    async fn set_last_reconcile_at(&self, _at: i64) -> JournalResult<()> {
        Ok(())
    }

    /// Move anonymous-namespace records into an authenticated user's namespace.
    /// Existing user records win on conflict. Returns the number of adopted
    /// entries; backends without namespaces adopt nothing.
    async fn adopt_guest_namespace(&self, _user_id: &str) -> JournalResult<u64> {
        Ok(0)
    }
}

/// Persistence for AI-generated fragments: one thought per date, one summary
/// per ISO week, both with overwrite semantics.
#[async_trait::async_trait]
pub trait InsightStore: Send + Sync {
    async fn get_thought(&self, date: &str) -> JournalResult<Option<AiThought>>;

    async fn put_thought(&self, date: &str, thought: &str) -> JournalResult<()>;

    async fn get_weekly_summary(&self, week: u32) -> JournalResult<Option<WeeklySummary>>;

    async fn put_weekly_summary(&self, week: u32, summary: &str) -> JournalResult<()>;
}

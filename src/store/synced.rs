use crate::errors::JournalResult;
use crate::models::{JournalEntry, JournalMeta};
use crate::store::EntryStore;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Composes a local cache with a remote per-user store. Reads prefer local; a
/// remote hit on a local miss is backfilled. Writes land in local only — the
/// reconciliation pass, not the write path, pushes entries to durable remote
/// storage.
pub struct SyncedStore {
    local: Arc<dyn EntryStore>,
    remote: Arc<dyn EntryStore>,
}

impl SyncedStore {
    pub fn new(local: Arc<dyn EntryStore>, remote: Arc<dyn EntryStore>) -> Self {
        Self { local, remote }
    }

    pub fn remote(&self) -> Arc<dyn EntryStore> {
        self.remote.clone()
    }
}

#[async_trait::async_trait]
impl EntryStore for SyncedStore {
    async fn get_entry(&self, date: &str) -> JournalResult<Option<JournalEntry>> {
        if let Some(entry) = self.local.get_entry(date).await? {
            return Ok(Some(entry));
        }
        // A remote failure here is transient; the local miss stands.
        match self.remote.get_entry(date).await {
            Ok(Some(entry)) => {
                if let Err(error) = self.local.put_entry(&entry).await {
                    warn!(date, error = %error, "failed to backfill remote entry into local store");
                }
                Ok(Some(entry))
            }
            Ok(None) => Ok(None),
            Err(error) => {
                warn!(date, error = %error, "remote read failed, treating as absent");
                Ok(None)
            }
        }
    }

    async fn put_entry(&self, entry: &JournalEntry) -> JournalResult<()> {
        self.local.put_entry(entry).await
    }

    async fn delete_entry(&self, date: &str) -> JournalResult<()> {
        self.local.delete_entry(date).await?;
        if let Err(error) = self.remote.delete_entry(date).await {
            warn!(date, error = %error, "remote delete failed");
        }
        Ok(())
    }

    async fn all_entries(&self) -> JournalResult<HashMap<String, JournalEntry>> {
        self.local.all_entries().await
    }

    async fn get_meta(&self) -> JournalResult<Option<JournalMeta>> {
        if let Some(meta) = self.local.get_meta().await? {
            return Ok(Some(meta));
        }
        match self.remote.get_meta().await {
            Ok(Some(meta)) => {
                if let Err(error) = self.local.put_meta(&meta).await {
                    warn!(error = %error, "failed to backfill remote meta into local store");
                }
                Ok(Some(meta))
            }
            Ok(None) => Ok(None),
            Err(error) => {
                warn!(error = %error, "remote meta read failed, treating as absent");
                Ok(None)
            }
        }
    }

    async fn put_meta(&self, meta: &JournalMeta) -> JournalResult<()> {
        self.local.put_meta(meta).await
    }

    async fn last_reconcile_at(&self) -> JournalResult<Option<i64>> {
        self.local.last_reconcile_at().await
    }

    async fn set_last_reconcile_at(&self, at: i64) -> JournalResult<()> {
        self.local.set_last_reconcile_at(at).await
    }

    async fn adopt_guest_namespace(&self, user_id: &str) -> JournalResult<u64> {
        self.local.adopt_guest_namespace(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::SyncedStore;
    use crate::models::{JournalEntry, JournalMeta};
    use crate::store::{EntryStore, MemoryStore};
    use std::sync::Arc;

    fn entry(date: &str, title: &str) -> JournalEntry {
        JournalEntry {
            date: date.to_string(),
            day_index: 1,
            title: title.to_string(),
            content_html: String::new(),
            created_at: 1,
            updated_at: 1,
            locked: false,
        }
    }

    #[tokio::test]
    async fn reads_prefer_local() {
        let local = Arc::new(MemoryStore::new());
        let remote = Arc::new(MemoryStore::new());
        local.put_entry(&entry("2026-01-01", "local")).await.expect("put");
        remote.put_entry(&entry("2026-01-01", "remote")).await.expect("put");

        let store = SyncedStore::new(local, remote);
        let loaded = store
            .get_entry("2026-01-01")
            .await
            .expect("get")
            .expect("entry present");
        assert_eq!(loaded.title, "local");
    }

    #[tokio::test]
    async fn remote_hit_backfills_local() {
        let local = Arc::new(MemoryStore::new());
        let remote = Arc::new(MemoryStore::new());
        remote.put_entry(&entry("2026-01-02", "remote")).await.expect("put");

        let store = SyncedStore::new(local.clone(), remote);
        let loaded = store
            .get_entry("2026-01-02")
            .await
            .expect("get")
            .expect("entry present");
        assert_eq!(loaded.title, "remote");

        let cached = local
            .get_entry("2026-01-02")
            .await
            .expect("get")
            .expect("backfilled");
        assert_eq!(cached.title, "remote");
    }

    #[tokio::test]
    async fn writes_stay_local_until_reconciliation() {
        let local = Arc::new(MemoryStore::new());
        let remote = Arc::new(MemoryStore::new());
        let store = SyncedStore::new(local.clone(), remote.clone());

        store.put_entry(&entry("2026-01-03", "draft")).await.expect("put");
        assert!(local.get_entry("2026-01-03").await.expect("get").is_some());
        assert!(remote.get_entry("2026-01-03").await.expect("get").is_none());
    }

    #[tokio::test]
    async fn meta_follows_the_same_rule() {
        let local = Arc::new(MemoryStore::new());
        let remote = Arc::new(MemoryStore::new());
        let meta = JournalMeta {
            start_date: "2026-01-01".to_string(),
            total_days: 365,
            entries_count: 0,
        };
        remote.put_meta(&meta).await.expect("put");

        let store = SyncedStore::new(local.clone(), remote);
        assert_eq!(store.get_meta().await.expect("meta"), Some(meta.clone()));
        assert_eq!(local.get_meta().await.expect("meta"), Some(meta));
    }
}

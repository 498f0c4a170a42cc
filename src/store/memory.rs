use crate::errors::JournalResult;
use crate::models::{AiThought, JournalEntry, JournalMeta, WeeklySummary};
use crate::store::{EntryStore, InsightStore};
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Ephemeral backend for guest sessions and tests. Everything is lost when the
/// process exits.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, JournalEntry>>,
    meta: RwLock<Option<JournalMeta>>,
    thoughts: RwLock<HashMap<String, AiThought>>,
    summaries: RwLock<HashMap<u32, WeeklySummary>>,
    last_reconcile_at: RwLock<Option<i64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl EntryStore for MemoryStore {
    async fn get_entry(&self, date: &str) -> JournalResult<Option<JournalEntry>> {
        Ok(self.entries.read().await.get(date).cloned())
    }

    async fn put_entry(&self, entry: &JournalEntry) -> JournalResult<()> {
        self.entries
            .write()
            .await
            .insert(entry.date.clone(), entry.clone());
        Ok(())
    }

    async fn delete_entry(&self, date: &str) -> JournalResult<()> {
        self.entries.write().await.remove(date);
        Ok(())
    }

    async fn all_entries(&self) -> JournalResult<HashMap<String, JournalEntry>> {
        Ok(self.entries.read().await.clone())
    }

    async fn get_meta(&self) -> JournalResult<Option<JournalMeta>> {
        Ok(self.meta.read().await.clone())
    }

    async fn put_meta(&self, meta: &JournalMeta) -> JournalResult<()> {
        *self.meta.write().await = Some(meta.clone());
        Ok(())
    }

    async fn last_reconcile_at(&self) -> JournalResult<Option<i64>> {
        Ok(*self.last_reconcile_at.read().await)
    }

    async fn set_last_reconcile_at(&self, at: i64) -> JournalResult<()> {
        *self.last_reconcile_at.write().await = Some(at);
        Ok(())
    }
}

#[async_trait::async_trait]
impl InsightStore for MemoryStore {
    async fn get_thought(&self, date: &str) -> JournalResult<Option<AiThought>> {
        Ok(self.thoughts.read().await.get(date).cloned())
    }

    async fn put_thought(&self, date: &str, thought: &str) -> JournalResult<()> {
        self.thoughts.write().await.insert(
            date.to_string(),
            AiThought {
                date: date.to_string(),
                thought: thought.to_string(),
                generated_at: Utc::now().timestamp_millis(),
            },
        );
        Ok(())
    }

    async fn get_weekly_summary(&self, week: u32) -> JournalResult<Option<WeeklySummary>> {
        Ok(self.summaries.read().await.get(&week).cloned())
    }

    async fn put_weekly_summary(&self, week: u32, summary: &str) -> JournalResult<()> {
        self.summaries.write().await.insert(
            week,
            WeeklySummary {
                week,
                summary: summary.to_string(),
                generated_at: Utc::now().timestamp_millis(),
            },
        );
        Ok(())
    }
}

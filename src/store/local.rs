use crate::errors::{JournalError, JournalResult};
use crate::models::{AiThought, JournalEntry, JournalMeta, WeeklySummary, GUEST_NAMESPACE};
use crate::store::{EntryStore, InsightStore};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Device-local backend over sqlite. Rows are namespaced so guest data and
/// per-user data coexist in one file until adoption moves them over.
#[derive(Debug)]
pub struct LocalStore {
    conn: Mutex<Connection>,
    namespace: String,
}

impl LocalStore {
    pub fn new(path: &Path) -> JournalResult<Self> {
        Self::with_namespace(path, GUEST_NAMESPACE)
    }

    pub fn with_namespace(path: &Path, namespace: &str) -> JournalResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| JournalError::Storage(err.to_string()))?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
            namespace: namespace.to_string(),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn lock(&self) -> JournalResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| JournalError::Internal("store mutex poisoned".to_string()))
    }

    fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<JournalEntry> {
        Ok(JournalEntry {
            date: row.get(0)?,
            day_index: row.get(1)?,
            title: row.get(2)?,
            content_html: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
            locked: false,
        })
    }
}

#[async_trait::async_trait]
impl EntryStore for LocalStore {
    async fn get_entry(&self, date: &str) -> JournalResult<Option<JournalEntry>> {
        let conn = self.lock()?;
        let entry = conn
            .query_row(
                "SELECT date, day_index, title, content_html, created_at, updated_at
                 FROM entries WHERE namespace = ?1 AND date = ?2",
                params![self.namespace, date],
                Self::row_to_entry,
            )
            .optional()?;
        Ok(entry)
    }

    async fn put_entry(&self, entry: &JournalEntry) -> JournalResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO entries (namespace, date, day_index, title, content_html, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT (namespace, date) DO UPDATE SET
               day_index = excluded.day_index,
               title = excluded.title,
               content_html = excluded.content_html,
               created_at = excluded.created_at,
               updated_at = excluded.updated_at",
            params![
                self.namespace,
                entry.date,
                entry.day_index,
                entry.title,
                entry.content_html,
                entry.created_at,
                entry.updated_at,
            ],
        )?;
        Ok(())
    }

    async fn delete_entry(&self, date: &str) -> JournalResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "DELETE FROM entries WHERE namespace = ?1 AND date = ?2",
            params![self.namespace, date],
        )?;
        Ok(())
    }

    async fn all_entries(&self) -> JournalResult<HashMap<String, JournalEntry>> {
        let conn = self.lock()?;
        let mut statement = conn.prepare(
            "SELECT date, day_index, title, content_html, created_at, updated_at
             FROM entries WHERE namespace = ?1",
        )?;
        let rows = statement.query_map(params![self.namespace], Self::row_to_entry)?;

        let mut entries = HashMap::new();
        for row in rows {
            let entry = row?;
            entries.insert(entry.date.clone(), entry);
        }
        Ok(entries)
    }

    async fn get_meta(&self) -> JournalResult<Option<JournalMeta>> {
        let conn = self.lock()?;
        let meta = conn
            .query_row(
                "SELECT start_date, total_days, entries_count FROM meta WHERE namespace = ?1",
                params![self.namespace],
                |row| {
                    Ok(JournalMeta {
                        start_date: row.get(0)?,
                        total_days: row.get(1)?,
                        entries_count: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(meta)
    }

    async fn put_meta(&self, meta: &JournalMeta) -> JournalResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO meta (namespace, start_date, total_days, entries_count)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (namespace) DO UPDATE SET
               start_date = excluded.start_date,
               total_days = excluded.total_days,
               entries_count = excluded.entries_count",
            params![self.namespace, meta.start_date, meta.total_days, meta.entries_count],
        )?;
        Ok(())
    }

    async fn last_reconcile_at(&self) -> JournalResult<Option<i64>> {
        let conn = self.lock()?;
        let at = conn
            .query_row(
                "SELECT last_reconcile_at FROM sync_state WHERE namespace = ?1",
                params![self.namespace],
                |row| row.get::<_, Option<i64>>(0),
            )
            .optional()?;
        Ok(at.flatten())
    }

    async fn set_last_reconcile_at(&self, at: i64) -> JournalResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO sync_state (namespace, last_reconcile_at) VALUES (?1, ?2)
             ON CONFLICT (namespace) DO UPDATE SET last_reconcile_at = excluded.last_reconcile_at",
            params![self.namespace, at],
        )?;
        Ok(())
    }

    async fn adopt_guest_namespace(&self, user_id: &str) -> JournalResult<u64> {
        if user_id == GUEST_NAMESPACE {
            return Ok(0);
        }
        let conn = self.lock()?;

        let adopted = conn.execute(
            "INSERT OR IGNORE INTO entries (namespace, date, day_index, title, content_html, created_at, updated_at)
             SELECT ?1, date, day_index, title, content_html, created_at, updated_at
             FROM entries WHERE namespace = ?2",
            params![user_id, GUEST_NAMESPACE],
        )?;
        conn.execute(
            "DELETE FROM entries WHERE namespace = ?1",
            params![GUEST_NAMESPACE],
        )?;

        conn.execute(
            "INSERT OR IGNORE INTO meta (namespace, start_date, total_days, entries_count)
             SELECT ?1, start_date, total_days, entries_count FROM meta WHERE namespace = ?2",
            params![user_id, GUEST_NAMESPACE],
        )?;
        conn.execute("DELETE FROM meta WHERE namespace = ?1", params![GUEST_NAMESPACE])?;

        conn.execute(
            "INSERT OR IGNORE INTO thoughts (namespace, date, thought, generated_at)
             SELECT ?1, date, thought, generated_at FROM thoughts WHERE namespace = ?2",
            params![user_id, GUEST_NAMESPACE],
        )?;
        conn.execute(
            "DELETE FROM thoughts WHERE namespace = ?1",
            params![GUEST_NAMESPACE],
        )?;

        Ok(adopted as u64)
    }
}

#[async_trait::async_trait]
impl InsightStore for LocalStore {
    async fn get_thought(&self, date: &str) -> JournalResult<Option<AiThought>> {
        let conn = self.lock()?;
        let thought = conn
            .query_row(
                "SELECT date, thought, generated_at FROM thoughts WHERE namespace = ?1 AND date = ?2",
                params![self.namespace, date],
                |row| {
                    Ok(AiThought {
                        date: row.get(0)?,
                        thought: row.get(1)?,
                        generated_at: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(thought)
    }

    async fn put_thought(&self, date: &str, thought: &str) -> JournalResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO thoughts (namespace, date, thought, generated_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (namespace, date) DO UPDATE SET
               thought = excluded.thought,
               generated_at = excluded.generated_at",
            params![self.namespace, date, thought, Utc::now().timestamp_millis()],
        )?;
        Ok(())
    }

    async fn get_weekly_summary(&self, week: u32) -> JournalResult<Option<WeeklySummary>> {
        let conn = self.lock()?;
        let summary = conn
            .query_row(
                "SELECT week, summary, generated_at FROM weekly_summaries
                 WHERE namespace = ?1 AND week = ?2",
                params![self.namespace, week],
                |row| {
                    Ok(WeeklySummary {
                        week: row.get(0)?,
                        summary: row.get(1)?,
                        generated_at: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(summary)
    }

    async fn put_weekly_summary(&self, week: u32, summary: &str) -> JournalResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO weekly_summaries (namespace, week, summary, generated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (namespace, week) DO UPDATE SET
               summary = excluded.summary,
               generated_at = excluded.generated_at",
            params![self.namespace, week, summary, Utc::now().timestamp_millis()],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::LocalStore;
    use crate::models::{JournalEntry, JournalMeta};
    use crate::store::{EntryStore, InsightStore};
    use tempfile::TempDir;

    fn entry(date: &str, title: &str) -> JournalEntry {
        JournalEntry {
            date: date.to_string(),
            day_index: 1,
            title: title.to_string(),
            content_html: format!("<p>{title}</p>"),
            created_at: 100,
            updated_at: 100,
            locked: false,
        }
    }

    fn open(dir: &TempDir, namespace: &str) -> LocalStore {
        LocalStore::with_namespace(&dir.path().join("journal.sqlite"), namespace)
            .expect("open store")
    }

    #[tokio::test]
    async fn entry_round_trip_and_delete() {
        let dir = TempDir::new().expect("tempdir");
        let store = open(&dir, "guest");

        assert!(store.get_entry("2026-01-05").await.expect("get").is_none());

        store.put_entry(&entry("2026-01-05", "Walk")).await.expect("put");
        let loaded = store
            .get_entry("2026-01-05")
            .await
            .expect("get")
            .expect("entry present");
        assert_eq!(loaded.title, "Walk");
        assert!(!loaded.locked);

        let mut updated = entry("2026-01-05", "Long walk");
        updated.updated_at = 200;
        store.put_entry(&updated).await.expect("overwrite");
        let loaded = store
            .get_entry("2026-01-05")
            .await
            .expect("get")
            .expect("entry present");
        assert_eq!(loaded.title, "Long walk");
        assert_eq!(loaded.updated_at, 200);

        store.delete_entry("2026-01-05").await.expect("delete");
        assert!(store.get_entry("2026-01-05").await.expect("get").is_none());
    }

    #[tokio::test]
    async fn all_entries_is_keyed_by_date() {
        let dir = TempDir::new().expect("tempdir");
        let store = open(&dir, "guest");
        store.put_entry(&entry("2026-01-01", "a")).await.expect("put");
        store.put_entry(&entry("2026-01-02", "b")).await.expect("put");

        let all = store.all_entries().await.expect("all");
        assert_eq!(all.len(), 2);
        assert_eq!(all["2026-01-02"].title, "b");
    }

    #[tokio::test]
    async fn meta_and_reconcile_state_round_trip() {
        let dir = TempDir::new().expect("tempdir");
        let store = open(&dir, "guest");

        assert!(store.get_meta().await.expect("meta").is_none());
        let meta = JournalMeta {
            start_date: "2026-01-01".to_string(),
            total_days: 365,
            entries_count: 3,
        };
        store.put_meta(&meta).await.expect("put meta");
        assert_eq!(store.get_meta().await.expect("meta"), Some(meta));

        assert!(store.last_reconcile_at().await.expect("state").is_none());
        store.set_last_reconcile_at(9_000).await.expect("set state");
        assert_eq!(store.last_reconcile_at().await.expect("state"), Some(9_000));
    }

    #[tokio::test]
    async fn namespaces_are_isolated() {
        let dir = TempDir::new().expect("tempdir");
        let guest = open(&dir, "guest");
        let user = open(&dir, "ada");

        guest.put_entry(&entry("2026-01-01", "guest note")).await.expect("put");
        assert!(user.get_entry("2026-01-01").await.expect("get").is_none());
    }

    #[tokio::test]
    async fn adoption_moves_guest_rows_and_keeps_user_conflicts() {
        let dir = TempDir::new().expect("tempdir");
        let guest = open(&dir, "guest");
        let user = open(&dir, "ada");

        guest.put_entry(&entry("2026-01-01", "guest a")).await.expect("put");
        guest.put_entry(&entry("2026-01-02", "guest b")).await.expect("put");
        user.put_entry(&entry("2026-01-02", "user b")).await.expect("put");

        let adopted = user.adopt_guest_namespace("ada").await.expect("adopt");
        assert_eq!(adopted, 1);

        let all = user.all_entries().await.expect("all");
        assert_eq!(all.len(), 2);
        assert_eq!(all["2026-01-01"].title, "guest a");
        // The user's own record wins the conflict.
        assert_eq!(all["2026-01-02"].title, "user b");
        assert!(guest.all_entries().await.expect("all").is_empty());
    }

    #[tokio::test]
    async fn thoughts_overwrite_per_date() {
        let dir = TempDir::new().expect("tempdir");
        let store = open(&dir, "guest");

        assert!(store.get_thought("2026-01-01").await.expect("get").is_none());
        store
            .put_thought("2026-01-01", "A quiet start.")
            .await
            .expect("put");
        store
            .put_thought("2026-01-01", "A second look.")
            .await
            .expect("overwrite");

        let thought = store
            .get_thought("2026-01-01")
            .await
            .expect("get")
            .expect("thought present");
        assert_eq!(thought.thought, "A second look.");
        assert!(thought.generated_at > 0);
    }

    #[tokio::test]
    async fn weekly_summaries_round_trip() {
        let dir = TempDir::new().expect("tempdir");
        let store = open(&dir, "guest");

        store
            .put_weekly_summary(12, "A steady week.")
            .await
            .expect("put");
        let summary = store
            .get_weekly_summary(12)
            .await
            .expect("get")
            .expect("summary present");
        assert_eq!(summary.week, 12);
        assert_eq!(summary.summary, "A steady week.");
        assert!(store.get_weekly_summary(13).await.expect("get").is_none());
    }
}

use daybook::{
    EntryStore, JournalConfig, JournalEntry, JournalError, JournalResult, JournalService,
    LocalStore, StaticTokenAuth,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

const HOUR_MS: i64 = 60 * 60 * 1000;
const MINUTE_MS: i64 = 60 * 1000;

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn backdated(date: &str, title: &str, html: &str, created_at: i64) -> JournalEntry {
    JournalEntry {
        date: date.to_string(),
        day_index: 1,
        title: title.to_string(),
        content_html: html.to_string(),
        created_at,
        updated_at: created_at,
        locked: false,
    }
}

#[derive(Default)]
struct ArchiveSpy {
    archived: tokio::sync::Mutex<HashMap<String, JournalEntry>>,
    puts: AtomicUsize,
}

#[async_trait::async_trait]
impl EntryStore for ArchiveSpy {
    async fn get_entry(&self, date: &str) -> JournalResult<Option<JournalEntry>> {
        Ok(self.archived.lock().await.get(date).cloned())
    }

    async fn put_entry(&self, entry: &JournalEntry) -> JournalResult<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.archived
            .lock()
            .await
            .insert(entry.date.clone(), entry.clone());
        Ok(())
    }

    async fn delete_entry(&self, date: &str) -> JournalResult<()> {
        self.archived.lock().await.remove(date);
        Ok(())
    }

    async fn all_entries(&self) -> JournalResult<HashMap<String, JournalEntry>> {
        Ok(self.archived.lock().await.clone())
    }

    async fn get_meta(&self) -> JournalResult<Option<daybook::JournalMeta>> {
        Ok(None)
    }

    async fn put_meta(&self, _meta: &daybook::JournalMeta) -> JournalResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn day_lock_lifecycle_over_sqlite() {
    let dir = TempDir::new().expect("tempdir");
    let store = Arc::new(LocalStore::new(&dir.path().join("journal.sqlite")).expect("open store"));
    let svc = JournalService::new(store.clone(), JournalConfig::default());

    // Entry created 23h59m ago: still editable.
    let date = daybook::format_date(daybook::add_days(daybook::today(), -1));
    let t0 = now_ms() - 23 * HOUR_MS - 59 * MINUTE_MS;
    store
        .put_entry(&backdated(&date, "Walk", "<p>Went for a walk</p>", t0))
        .await
        .expect("seed");

    let loaded = svc.get_entry(&date).await.expect("get").expect("entry");
    assert!(!loaded.locked);

    let updated = svc
        .create_or_update_entry(&date, "Walk", "<p>Went for a longer walk</p>")
        .await
        .expect("save")
        .expect("update accepted");
    assert_eq!(updated.created_at, t0);
    assert!(updated.updated_at > t0);

    // Push the entry past the 24h boundary and try again.
    let mut aged = updated.clone();
    aged.created_at = now_ms() - 24 * HOUR_MS - MINUTE_MS;
    store.put_entry(&aged).await.expect("age entry");
    let svc = JournalService::new(store.clone(), JournalConfig::default());

    let loaded = svc.get_entry(&date).await.expect("get").expect("entry");
    assert!(loaded.locked);

    let rejected = svc
        .create_or_update_entry(&date, "Rewritten", "<p>no</p>")
        .await
        .expect("save call");
    assert!(rejected.is_none());
    let stored = store.get_entry(&date).await.expect("get").expect("entry");
    assert_eq!(stored.title, "Walk");
}

#[tokio::test]
async fn fresh_namespace_bootstraps_meta_and_statuses() {
    let dir = TempDir::new().expect("tempdir");
    let store = Arc::new(LocalStore::new(&dir.path().join("journal.sqlite")).expect("open store"));
    let svc = JournalService::new(store, JournalConfig::default());

    let meta = svc.get_meta().await.expect("meta");
    assert_eq!(meta.start_date, daybook::today_string());
    assert_eq!(meta.total_days, 365);

    let statuses = svc.all_day_statuses().await.expect("statuses");
    assert_eq!(statuses.len(), 365);
    assert_eq!(statuses.iter().filter(|status| status.is_today).count(), 1);
    assert!(statuses.iter().skip(1).all(|status| status.is_future));
}

#[tokio::test]
async fn reconcile_adopts_guest_data_and_archives_past_entries() {
    let dir = TempDir::new().expect("tempdir");
    let db_path = dir.path().join("journal.sqlite");

    // A guest session wrote two days before signing in.
    let guest = LocalStore::new(&db_path).expect("open guest store");
    let yesterday = daybook::format_date(daybook::add_days(daybook::today(), -1));
    let two_ago = daybook::format_date(daybook::add_days(daybook::today(), -2));
    guest
        .put_entry(&backdated(&two_ago, "First", "<p>one</p>", now_ms()))
        .await
        .expect("seed");
    guest
        .put_entry(&backdated(&yesterday, "Second", "<p>two</p>", now_ms()))
        .await
        .expect("seed");

    let user_store =
        Arc::new(LocalStore::with_namespace(&db_path, "ada").expect("open user store"));
    let remote = Arc::new(ArchiveSpy::default());
    let auth = Arc::new(StaticTokenAuth::signed_in("ada", "token-1"));
    let svc = JournalService::new(user_store.clone(), JournalConfig::default())
        .with_remote(remote.clone())
        .with_auth(auth);

    svc.reconcile().await.expect("reconcile");

    // Guest rows now belong to the user and the past days are archived.
    assert_eq!(user_store.all_entries().await.expect("all").len(), 2);
    assert_eq!(remote.puts.load(Ordering::SeqCst), 2);
    assert!(remote.get_entry(&two_ago).await.expect("get").is_some());

    // A second pass inside the window does nothing.
    svc.reconcile().await.expect("second reconcile");
    assert_eq!(remote.puts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn storage_surface_errors_reach_the_caller() {
    struct BrokenStore;

    #[async_trait::async_trait]
    impl EntryStore for BrokenStore {
        async fn get_entry(&self, _date: &str) -> JournalResult<Option<JournalEntry>> {
            Ok(None)
        }

        async fn put_entry(&self, _entry: &JournalEntry) -> JournalResult<()> {
            Err(JournalError::Storage("disk full".to_string()))
        }

        async fn delete_entry(&self, _date: &str) -> JournalResult<()> {
            Ok(())
        }

        async fn all_entries(&self) -> JournalResult<HashMap<String, JournalEntry>> {
            Ok(HashMap::new())
        }

        async fn get_meta(&self) -> JournalResult<Option<daybook::JournalMeta>> {
            Ok(None)
        }

        async fn put_meta(&self, _meta: &daybook::JournalMeta) -> JournalResult<()> {
            Ok(())
        }
    }

    let svc = JournalService::new(Arc::new(BrokenStore), JournalConfig::default());
    let result = svc
        .create_or_update_entry(&daybook::today_string(), "Walk", "<p>x</p>")
        .await;
    // No silent data loss: the save failure must surface.
    assert!(matches!(result, Err(JournalError::Storage(_))));
}

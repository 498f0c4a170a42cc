use crate::auth::AuthProvider;
use crate::dates;
use crate::errors::JournalResult;
use crate::insight::InsightCache;
use crate::lock::LockPolicy;
use crate::models::{DayStatus, JournalConfig, JournalEntry, JournalMeta};
use crate::store::EntryStore;
use crate::text;
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const HOUR_MS: i64 = 60 * 60 * 1000;

/// Orchestrates the entry lifecycle over an `EntryStore`. One instance per
/// session; nothing here is process-global, so tests run several side by side.
pub struct JournalService {
    store: Arc<dyn EntryStore>,
    remote: Option<Arc<dyn EntryStore>>,
    auth: Option<Arc<dyn AuthProvider>>,
    insights: Option<Arc<InsightCache>>,
    policy: LockPolicy,
    config: JournalConfig,
    mirror: RwLock<HashMap<String, JournalEntry>>,
}

impl JournalService {
    pub fn new(store: Arc<dyn EntryStore>, config: JournalConfig) -> Self {
        let policy = LockPolicy::with_hours(config.lock_after_hours);
        Self {
            store,
            remote: None,
            auth: None,
            insights: None,
            policy,
            config,
            mirror: RwLock::new(HashMap::new()),
        }
    }

    /// Durable archive target for the reconciliation pass.
    pub fn with_remote(mut self, remote: Arc<dyn EntryStore>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn with_auth(mut self, auth: Arc<dyn AuthProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn with_insights(mut self, insights: Arc<InsightCache>) -> Self {
        self.insights = Some(insights);
        self
    }

    pub fn lock_policy(&self) -> LockPolicy {
        self.policy
    }

    fn now_ms() -> i64 {
        Utc::now().timestamp_millis()
    }

    async fn load_entry(&self, date: &str) -> JournalResult<Option<JournalEntry>> {
        if let Some(entry) = self.mirror.read().await.get(date) {
            return Ok(Some(entry.clone()));
        }
        let entry = self.store.get_entry(date).await?;
        if let Some(entry) = &entry {
            self.mirror
                .write()
                .await
                .insert(date.to_string(), entry.clone());
        }
        Ok(entry)
    }

    /// Entry for `date` with `locked` recomputed from `created_at` and the
    /// current time. The stored flag is never trusted.
    pub async fn get_entry(&self, date: &str) -> JournalResult<Option<JournalEntry>> {
        dates::parse_date(date)?;
        let now = Self::now_ms();
        Ok(self.load_entry(date).await?.map(|mut entry| {
            entry.locked = self.policy.is_locked(entry.created_at, now);
            entry
        }))
    }

    /// Save for `date`. Returns `Ok(None)` when the entry is locked (no write
    /// happens) and when a first save carries nothing but blank text.
    pub async fn create_or_update_entry(
        &self,
        date: &str,
        title: &str,
        content_html: &str,
    ) -> JournalResult<Option<JournalEntry>> {
        let parsed = dates::parse_date(date)?;
        let now = Self::now_ms();
        let existing = self.load_entry(date).await?;

        if let Some(existing) = &existing {
            if self.policy.is_locked(existing.created_at, now) {
                warn!(date, "rejected save against locked entry");
                return Ok(None);
            }
            if existing.title == title && existing.content_html == content_html {
                return Ok(Some(existing.clone()));
            }
        } else if title.trim().is_empty() && text::is_blank(content_html) {
            // An all-blank first save must not start the lock clock.
            return Ok(None);
        }

        let entry = JournalEntry {
            date: date.to_string(),
            day_index: dates::day_of_year_index(parsed),
            title: title.to_string(),
            content_html: content_html.to_string(),
            created_at: existing.as_ref().map_or(now, |entry| entry.created_at),
            updated_at: now,
            locked: false,
        };

        self.store.put_entry(&entry).await?;
        self.mirror
            .write()
            .await
            .insert(date.to_string(), entry.clone());

        if existing.is_none() {
            let mut meta = self.get_meta().await?;
            meta.entries_count += 1;
            self.store.put_meta(&meta).await?;
        }

        self.spawn_insight_refresh(date);
        Ok(Some(entry))
    }

    fn spawn_insight_refresh(&self, date: &str) {
        let Some(insights) = self.insights.clone() else {
            return;
        };
        let store = self.store.clone();
        let date = date.to_string();
        let limit = self.config.recent_context_entries;
        tokio::spawn(async move {
            let mut recent: Vec<JournalEntry> = match store.all_entries().await {
                Ok(entries) => entries.into_values().collect(),
                Err(error) => {
                    warn!(date, error = %error, "skipping insight refresh, entry listing failed");
                    return;
                }
            };
            recent.sort_by(|a, b| b.date.cmp(&a.date));
            recent.truncate(limit);
            insights.regenerate(&date, &recent).await;
        });
    }

    /// Singleton meta, created on first access for a fresh namespace.
    pub async fn get_meta(&self) -> JournalResult<JournalMeta> {
        if let Some(meta) = self.store.get_meta().await? {
            return Ok(meta);
        }
        let meta = JournalMeta {
            start_date: dates::today_string(),
            total_days: self.config.total_days,
            entries_count: 0,
        };
        self.store.put_meta(&meta).await?;
        info!(start_date = %meta.start_date, "initialized journal meta");
        Ok(meta)
    }

    pub async fn get_day_status(&self, date: &str) -> JournalResult<DayStatus> {
        let parsed = dates::parse_date(date)?;
        let entry = if dates::is_future(parsed) {
            None
        } else {
            self.load_entry(date).await?
        };
        Ok(self.day_status_of(date, parsed, entry.as_ref(), Self::now_ms()))
    }

    fn day_status_of(
        &self,
        date: &str,
        parsed: NaiveDate,
        entry: Option<&JournalEntry>,
        now: i64,
    ) -> DayStatus {
        // Future days always read as blank, whatever the store holds.
        let entry = if dates::is_future(parsed) { None } else { entry };
        let has_entry = entry.is_some_and(|entry| {
            !entry.title.trim().is_empty() || !text::is_blank(&entry.content_html)
        });
        DayStatus {
            date: date.to_string(),
            day_index: dates::day_of_year_index(parsed),
            has_entry,
            is_locked: entry.is_some_and(|entry| self.policy.is_locked(entry.created_at, now)),
            is_future: dates::is_future(parsed),
            is_today: dates::is_today(parsed),
            word_count: entry.map_or(0, |entry| text::word_count(&entry.content_html)),
        }
    }

    /// One status per day of the journey, fully materialized. Pure function of
    /// stored state and the current time; safe to call repeatedly.
    pub async fn all_day_statuses(&self) -> JournalResult<Vec<DayStatus>> {
        let meta = self.get_meta().await?;
        let start = dates::parse_date(&meta.start_date)?;
        let entries = self.store.all_entries().await?;
        {
            let mut mirror = self.mirror.write().await;
            for (date, entry) in &entries {
                mirror.insert(date.clone(), entry.clone());
            }
        }

        let now = Self::now_ms();
        let mut statuses = Vec::with_capacity(meta.total_days as usize);
        for offset in 0..i64::from(meta.total_days) {
            let day = dates::add_days(start, offset);
            let date = dates::format_date(day);
            let entry = entries.get(&date);
            statuses.push(self.day_status_of(&date, day, entry, now));
        }
        Ok(statuses)
    }

    /// Background maintenance: adopt guest data into the signed-in user's
    /// namespace, then archive every strictly-past entry to the remote target.
    /// Runs at most once per reconcile window, gated by a persisted timestamp.
    /// Per-entry failures are logged and skipped; nothing surfaces to the UI.
    pub async fn reconcile(&self) -> JournalResult<()> {
        let now = Self::now_ms();
        let window_ms = i64::from(self.config.reconcile_interval_hours) * HOUR_MS;
        if let Some(last) = self.store.last_reconcile_at().await? {
            if now - last < window_ms {
                debug!(last_run = last, "reconcile skipped, window not elapsed");
                return Ok(());
            }
        }
        self.store.set_last_reconcile_at(now).await?;

        if let Some(user_id) = self.auth.as_ref().and_then(|auth| auth.user_id()) {
            match self.store.adopt_guest_namespace(&user_id).await {
                Ok(0) => {}
                Ok(adopted) => {
                    info!(user_id = %user_id, adopted, "adopted guest entries");
                    self.mirror.write().await.clear();
                }
                Err(error) => warn!(user_id = %user_id, error = %error, "guest adoption failed"),
            }
        }

        let Some(remote) = &self.remote else {
            return Ok(());
        };

        let today = dates::today();
        let mut archived = 0u32;
        let mut failed = 0u32;
        for (date, entry) in self.store.all_entries().await? {
            let Ok(parsed) = dates::parse_date(&date) else {
                warn!(date, "skipping entry with malformed date key");
                continue;
            };
            if parsed >= today {
                continue;
            }
            match remote.put_entry(&entry).await {
                Ok(()) => archived += 1,
                Err(error) => {
                    warn!(date, error = %error, "archive failed, skipping entry");
                    failed += 1;
                }
            }
        }
        info!(archived, failed, "reconcile pass complete");
        Ok(())
    }
}

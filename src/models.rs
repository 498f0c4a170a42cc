use serde::{Deserialize, Serialize};

pub const TOTAL_DAYS: u32 = 365;
pub const GUEST_NAMESPACE: &str = "guest";

/// One calendar day's journal record. `locked` is derived from `created_at` at
/// read time; the stored value is never authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub date: String,
    pub day_index: u32,
    pub title: String,
    pub content_html: String,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default)]
    pub locked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalMeta {
    pub start_date: String,
    pub total_days: u32,
    pub entries_count: u32,
}

/// Derived view of a date, computed on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayStatus {
    pub date: String,
    pub day_index: u32,
    pub has_entry: bool,
    pub is_locked: bool,
    pub is_future: bool,
    pub is_today: bool,
    pub word_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiThought {
    pub date: String,
    pub thought: String,
    pub generated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySummary {
    pub week: u32,
    pub summary: String,
    pub generated_at: i64,
}

/// Published on the insight broadcast channel whenever the cached thought for a
/// date changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightUpdate {
    pub date: String,
    pub thought: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JournalConfig {
    pub total_days: u32,
    pub lock_after_hours: u32,
    pub reconcile_interval_hours: u32,
    pub recent_context_entries: usize,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            total_days: TOTAL_DAYS,
            lock_after_hours: 24,
            reconcile_interval_hours: 12,
            recent_context_entries: 5,
        }
    }
}

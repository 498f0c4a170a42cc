mod auth;
mod completion;
mod dates;
mod errors;
mod insight;
mod lock;
mod models;
mod service;
mod store;
mod text;

pub use auth::{AuthProvider, StaticTokenAuth};
pub use completion::{CompletionOptions, CompletionProvider, HttpCompletion, DEFAULT_MODEL};
pub use dates::{
    add_days, day_of_year_index, format_date, format_time_remaining, is_future, is_today,
    iso_week, parse_date, today, today_string, DATE_FORMAT,
};
pub use errors::{JournalError, JournalResult};
pub use insight::{
    InsightCache, FALLBACK_MONTHLY, FALLBACK_NOTIFICATION, FALLBACK_THOUGHT, FALLBACK_WEEKLY,
    FIRST_DAY_THOUGHT,
};
pub use lock::LockPolicy;
pub use models::{
    AiThought, DayStatus, InsightUpdate, JournalConfig, JournalEntry, JournalMeta, WeeklySummary,
    GUEST_NAMESPACE, TOTAL_DAYS,
};
pub use service::JournalService;
pub use store::{EntryStore, InsightStore, LocalStore, MemoryStore, RemoteStore, SyncedStore};
pub use text::{is_blank, strip_tags, word_count};

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

/// Set up daily-rolling json logs under `<data_dir>/logs`. Call once from the
/// embedding application; repeated calls fail quietly inside `try_init`.
pub fn init_tracing(data_dir: &Path) -> Result<(), String> {
    let log_dir = data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).map_err(|error| error.to_string())?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "journal.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| error.to_string())
}

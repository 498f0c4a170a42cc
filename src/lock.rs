const HOUR_MS: i64 = 60 * 60 * 1000;
const DEFAULT_LOCK_AFTER_MS: i64 = 24 * HOUR_MS;

/// Decides when an entry becomes immutable. Pure timestamp arithmetic over
/// epoch milliseconds; an entry locks strictly more than `lock_after_ms` after
/// its first save.
#[derive(Debug, Clone, Copy)]
pub struct LockPolicy {
    lock_after_ms: i64,
}

impl Default for LockPolicy {
    fn default() -> Self {
        Self {
            lock_after_ms: DEFAULT_LOCK_AFTER_MS,
        }
    }
}

impl LockPolicy {
    pub fn with_hours(hours: u32) -> Self {
        Self {
            lock_after_ms: i64::from(hours) * HOUR_MS,
        }
    }

    pub fn is_locked(&self, created_at: i64, now: i64) -> bool {
        now - created_at > self.lock_after_ms
    }

    pub fn time_until_lock(&self, created_at: i64, now: i64) -> i64 {
        (created_at + self.lock_after_ms - now).max(0)
    }
}

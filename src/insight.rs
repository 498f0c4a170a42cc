use crate::completion::{CompletionOptions, CompletionProvider};
use crate::models::{InsightUpdate, JournalEntry};
use crate::store::InsightStore;
use crate::text::strip_tags;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::warn;

pub const FALLBACK_THOUGHT: &str = "Your journey continues...";
pub const FIRST_DAY_THOUGHT: &str = "Your journey begins today.";
pub const FALLBACK_WEEKLY: &str = "A week of thoughts captured.";
pub const FALLBACK_MONTHLY: &str = "Another month documented.";
pub const FALLBACK_NOTIFICATION: &str = "You haven't said anything about today yet.";

/// Per-date cache of AI-generated reflections. Generation failures never leave
/// this module; callers always get a string back.
pub struct InsightCache {
    store: Arc<dyn InsightStore>,
    provider: Arc<dyn CompletionProvider>,
    updates: broadcast::Sender<InsightUpdate>,
}

impl InsightCache {
    pub fn new(store: Arc<dyn InsightStore>, provider: Arc<dyn CompletionProvider>) -> Self {
        let (updates, _) = broadcast::channel(64);
        Self {
            store,
            provider,
            updates,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<InsightUpdate> {
        self.updates.subscribe()
    }

    /// Cached thought for `date`, generating one only on a miss. An empty
    /// context means there is nothing to observe yet.
    pub async fn ensure(&self, date: &str, recent: &[JournalEntry]) -> String {
        match self.store.get_thought(date).await {
            Ok(Some(existing)) => return existing.thought,
            Ok(None) => {}
            Err(error) => warn!(date, error = %error, "thought cache read failed"),
        }

        if recent.is_empty() {
            return FIRST_DAY_THOUGHT.to_string();
        }
        self.generate_and_cache(date, recent).await
    }

    /// Unconditionally regenerate the thought for `date`, overwrite the cached
    /// value, and notify subscribers. The cached value survives a failed call.
    pub async fn regenerate(&self, date: &str, recent: &[JournalEntry]) -> String {
        if recent.is_empty() {
            return FIRST_DAY_THOUGHT.to_string();
        }
        self.generate_and_cache(date, recent).await
    }

    async fn generate_and_cache(&self, date: &str, recent: &[JournalEntry]) -> String {
        let prompt = build_thought_prompt(recent);
        match self
            .provider
            .complete(&prompt, &CompletionOptions::with_limits(0.6, 60))
            .await
        {
            Ok(thought) => {
                if let Err(error) = self.store.put_thought(date, &thought).await {
                    warn!(date, error = %error, "failed to cache generated thought");
                }
                let _ = self.updates.send(InsightUpdate {
                    date: date.to_string(),
                    thought: thought.clone(),
                });
                thought
            }
            Err(error) => {
                warn!(date, error = %error, "thought generation failed");
                FALLBACK_THOUGHT.to_string()
            }
        }
    }

    /// Narrative summary for one ISO week, cached per week number.
    pub async fn ensure_weekly_summary(&self, week: u32, entries: &[JournalEntry]) -> String {
        match self.store.get_weekly_summary(week).await {
            Ok(Some(existing)) => return existing.summary,
            Ok(None) => {}
            Err(error) => warn!(week, error = %error, "weekly summary cache read failed"),
        }

        if entries.is_empty() {
            return FALLBACK_WEEKLY.to_string();
        }

        let prompt = build_weekly_prompt(entries);
        match self
            .provider
            .complete(&prompt, &CompletionOptions::with_limits(0.5, 150))
            .await
        {
            Ok(summary) => {
                if let Err(error) = self.store.put_weekly_summary(week, &summary).await {
                    warn!(week, error = %error, "failed to cache weekly summary");
                }
                summary
            }
            Err(error) => {
                warn!(week, error = %error, "weekly summary generation failed");
                FALLBACK_WEEKLY.to_string()
            }
        }
    }

    /// Month-level reflection; uncached, regenerated on demand.
    pub async fn monthly_reflection(&self, entries: &[JournalEntry]) -> String {
        if entries.is_empty() {
            return FALLBACK_MONTHLY.to_string();
        }
        let prompt = build_monthly_prompt(entries);
        match self
            .provider
            .complete(&prompt, &CompletionOptions::with_limits(0.5, 200))
            .await
        {
            Ok(reflection) => reflection,
            Err(error) => {
                warn!(error = %error, "monthly reflection generation failed");
                FALLBACK_MONTHLY.to_string()
            }
        }
    }

    /// One gentle sentence for a reminder surface. Delivery is not this crate's
    /// concern; only the text is produced here.
    pub async fn notification_thought(&self) -> String {
        match self
            .provider
            .complete(NOTIFICATION_PROMPT, &CompletionOptions::with_limits(0.7, 40))
            .await
        {
            Ok(thought) => thought,
            Err(error) => {
                warn!(error = %error, "notification thought generation failed");
                FALLBACK_NOTIFICATION.to_string()
            }
        }
    }
}

const NOTIFICATION_PROMPT: &str = "\
Write one gentle reflective notification.
No commands.
No reminders.
No pressure.

It should feel like a thought, not a task.

Output one short sentence.";

fn build_thought_prompt(recent: &[JournalEntry]) -> String {
    let journal_text = recent
        .iter()
        .map(|entry| format!("{}\n{}", entry.title, strip_tags(&entry.content_html)))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are a quiet observer.\n\n\
         Based on the following journal text, write ONE short reflective thought.\n\
         Do not give advice.\n\
         Do not judge.\n\
         Do not motivate.\n\
         Just observe patterns or tone.\n\n\
         Journal:\n{journal_text}\n\n\
         Output only one sentence."
    )
}

fn build_weekly_prompt(entries: &[JournalEntry]) -> String {
    let entries_text = entries
        .iter()
        .map(|entry| {
            format!(
                "Day {}: {}\n{}",
                entry.day_index,
                entry.title,
                strip_tags(&entry.content_html)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are analyzing a week's worth of personal journal entries.\n\n\
         Write a short narrative summary.\n\
         Do not give advice.\n\
         Do not judge.\n\
         Do not suggest actions.\n\n\
         Just describe patterns, tone shifts, or recurring themes.\n\n\
         Entries:\n{entries_text}\n\n\
         Output 2-3 sentences."
    )
}

fn build_monthly_prompt(entries: &[JournalEntry]) -> String {
    let entries_text = entries
        .iter()
        .take(30)
        .map(|entry| {
            let text = strip_tags(&entry.content_html);
            let clipped: String = text.chars().take(100).collect();
            format!("{}: {}", entry.title, clipped)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are reflecting on a month of journal entries.\n\n\
         Identify the main themes and emotional patterns.\n\
         Do not give advice.\n\
         Do not judge.\n\
         Do not analyze deeply.\n\n\
         Just observe what emerged this month.\n\n\
         Entries:\n{entries_text}\n\n\
         Output 3-4 sentences."
    )
}

//! Decides which fetched entries get announced and keeps the store in step.

use crate::config::FiltersConfig;
use crate::core::notifier::Notifier;
use crate::domain::model::{CatalogEntry, Classification, ClassificationRecord, EntryId};
use crate::domain::ports::{ClassificationStore, LogSink};
use crate::utils::error::{Result, SyncError};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// Parses the `yyyy-mm-dd` start date (RFC 3339 also accepted) as midnight UTC.
pub fn parse_cutoff(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| SyncError::InvalidConfigValueError {
            field: "filters.date_to_start_by".to_string(),
            value: raw.to_string(),
            reason: "Use the format 'yyyy-mm-dd'".to_string(),
        })
}

#[derive(Debug, Clone, Default)]
pub struct ReconcilePolicy {
    cutoff: Option<DateTime<Utc>>,
    creators_to_ignore: HashSet<String>,
}

impl ReconcilePolicy {
    pub fn new(cutoff: Option<DateTime<Utc>>, creators_to_ignore: &[String]) -> Self {
        Self {
            cutoff,
            creators_to_ignore: creators_to_ignore
                .iter()
                .map(|c| c.trim().to_lowercase())
                .filter(|c| !c.is_empty())
                .collect(),
        }
    }

    /// An unparsable start date is logged and the cutoff left disabled.
    pub fn from_filters(filters: &FiltersConfig) -> Self {
        let cutoff = match filters
            .date_to_start_by
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
        {
            Some(raw) => match parse_cutoff(raw) {
                Ok(cutoff) => Some(cutoff),
                Err(e) => {
                    tracing::error!("❌ {}; the start date filter is skipped", e);
                    None
                }
            },
            None => None,
        };

        Self::new(cutoff, &filters.creators_to_ignore)
    }

    pub fn cutoff(&self) -> Option<DateTime<Utc>> {
        self.cutoff
    }

    fn after_cutoff(&self, entry: &CatalogEntry) -> bool {
        self.cutoff.map_or(true, |cutoff| entry.modified_at > cutoff)
    }

    fn is_ignored_creator(&self, entry: &CatalogEntry) -> bool {
        [&entry.artist, &entry.author]
            .into_iter()
            .flatten()
            .any(|name| self.creators_to_ignore.contains(&name.trim().to_lowercase()))
    }
}

/// Per-pass bookkeeping shared by every job of the pass.
#[derive(Debug, Default)]
pub struct PassState {
    claimed: Mutex<HashSet<EntryId>>,
    pending_updates: Mutex<HashSet<EntryId>>,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl PassState {
    /// First job to see an id in this pass owns its read-then-write sequence.
    fn claim(&self, id: EntryId) -> bool {
        locked(&self.claimed).insert(id)
    }

    fn mark_pending(&self, id: EntryId) {
        locked(&self.pending_updates).insert(id);
    }

    fn take_pending(&self, id: EntryId) -> bool {
        locked(&self.pending_updates).remove(&id)
    }

    pub fn pending_updates(&self) -> usize {
        locked(&self.pending_updates).len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub announced: usize,
    pub refreshed: usize,
    pub before_cutoff: usize,
    pub already_handled: usize,
    pub ignored_creator: usize,
    pub missing_url: usize,
    pub claimed_elsewhere: usize,
}

pub struct Reconciler<'a> {
    pub policy: &'a ReconcilePolicy,
    pub store: &'a dyn ClassificationStore,
    pub notifier: &'a Notifier,
    pub sink: &'a dyn LogSink,
    pub state: &'a PassState,
}

impl Reconciler<'_> {
    /// Processes one candidate's listing in order. Store failures abort the
    /// listing so no announced entry goes unrecorded.
    pub fn reconcile(&self, entries: &[CatalogEntry]) -> Result<ReconcileOutcome> {
        let mut outcome = ReconcileOutcome::default();

        for entry in entries {
            if !self.policy.after_cutoff(entry) {
                outcome.before_cutoff += 1;
                continue;
            }

            if !self.state.claim(entry.id) {
                outcome.claimed_elsewhere += 1;
                continue;
            }

            match self.store.classify(entry.id, entry.modified_at)? {
                Classification::NotHandled => {}
                Classification::Outdated => self.state.mark_pending(entry.id),
                Classification::Handled => {
                    outcome.already_handled += 1;
                    continue;
                }
            }

            if self.policy.is_ignored_creator(entry) {
                outcome.ignored_creator += 1;
                continue;
            }

            if entry.usable_url().is_none() {
                tracing::debug!("Entry {} has no download URL, skipping", entry.id);
                outcome.missing_url += 1;
                continue;
            }

            self.sink.notify(&self.notifier.render(entry));
            self.store.insert(&ClassificationRecord::from(entry))?;
            outcome.announced += 1;

            if self.state.take_pending(entry.id) {
                self.store.update_modified_at(entry.id, entry.modified_at)?;
                outcome.refreshed += 1;
            }
        }

        Ok(outcome)
    }
}

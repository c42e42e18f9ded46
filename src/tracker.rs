use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::db::KeyValueStore;
use crate::models::{Digest, JobStatus, PreferenceProfile, StatusChange};
use crate::proof::{ProofLinks, TestChecklist};

const PREFERENCES_KEY: &str = "jobTrackerPreferences";
const STATUS_KEY: &str = "jobTrackerStatus";
const HISTORY_KEY: &str = "jobTrackerStatusHistory";
const SAVED_KEY: &str = "savedJobs";
const DIGEST_KEY_PREFIX: &str = "jobTrackerDigest_";
const PROOF_KEY: &str = "jobTrackerProof";
const CHECKLIST_KEY: &str = "jobTrackerTestChecklist";

pub const HISTORY_LIMIT: usize = 20;

pub type StatusMap = BTreeMap<i64, JobStatus>;

/// Typed records over a key-value store.
///
/// Every write replaces one whole record. A record that no longer parses is
/// logged and read back as absent.
pub struct Tracker<S> {
    store: S,
}

impl<S: KeyValueStore> Tracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(bytes) = self.store.get(key)? else {
            return Ok(None);
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key, error = %e, "ignoring corrupt record");
                Ok(None)
            }
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)
            .with_context(|| format!("Failed to serialize '{}'", key))?;
        self.store.set(key, &bytes)
    }

    // --- Preferences ---

    pub fn preferences(&self) -> Result<Option<PreferenceProfile>> {
        Ok(self
            .read::<PreferenceProfile>(PREFERENCES_KEY)?
            .map(PreferenceProfile::normalized))
    }

    pub fn save_preferences(&self, prefs: &PreferenceProfile) -> Result<()> {
        debug!(?prefs, "saving preferences");
        self.write(PREFERENCES_KEY, prefs)
    }

    pub fn clear_preferences(&self) -> Result<()> {
        self.store.remove(PREFERENCES_KEY)
    }

    // --- Status tracking ---

    pub fn statuses(&self) -> Result<StatusMap> {
        Ok(self.read(STATUS_KEY)?.unwrap_or_default())
    }

    pub fn status(&self, job_id: i64) -> Result<JobStatus> {
        Ok(self.statuses()?.get(&job_id).copied().unwrap_or_default())
    }

    /// Records `status` for the job and logs it to the history, even when the
    /// status did not change.
    pub fn set_status(&self, job_id: i64, status: JobStatus, at: DateTime<Utc>) -> Result<()> {
        let mut statuses = self.statuses()?;
        statuses.insert(job_id, status);
        self.write(STATUS_KEY, &statuses)?;

        let mut history = self.history()?;
        history.insert(
            0,
            StatusChange {
                job_id,
                status,
                date: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            },
        );
        history.truncate(HISTORY_LIMIT);
        self.write(HISTORY_KEY, &history)?;

        debug!(job_id, %status, "status updated");
        Ok(())
    }

    /// Status changes, newest first.
    pub fn history(&self) -> Result<Vec<StatusChange>> {
        Ok(self.read(HISTORY_KEY)?.unwrap_or_default())
    }

    // --- Saved jobs ---

    pub fn saved(&self) -> Result<Vec<i64>> {
        Ok(self.read(SAVED_KEY)?.unwrap_or_default())
    }

    pub fn is_saved(&self, job_id: i64) -> Result<bool> {
        Ok(self.saved()?.contains(&job_id))
    }

    /// Flips membership and returns whether the job is now saved.
    pub fn toggle_saved(&self, job_id: i64) -> Result<bool> {
        let mut saved = self.saved()?;
        let now_saved = match saved.iter().position(|id| *id == job_id) {
            Some(idx) => {
                saved.remove(idx);
                false
            }
            None => {
                saved.push(job_id);
                true
            }
        };
        self.write(SAVED_KEY, &saved)?;
        debug!(job_id, now_saved, "toggled saved");
        Ok(now_saved)
    }

    // --- Digests ---

    pub fn digest(&self, date: NaiveDate) -> Result<Option<Digest>> {
        self.read(&digest_key(date))
    }

    pub fn store_digest(&self, date: NaiveDate, digest: &Digest) -> Result<()> {
        self.write(&digest_key(date), digest)
    }

    pub fn remove_digest(&self, date: NaiveDate) -> Result<()> {
        self.store.remove(&digest_key(date))
    }

    // --- Proof links and checklist ---

    pub fn proof_links(&self) -> Result<ProofLinks> {
        Ok(self.read(PROOF_KEY)?.unwrap_or_default())
    }

    pub fn save_proof_links(&self, links: &ProofLinks) -> Result<()> {
        self.write(PROOF_KEY, links)
    }

    pub fn checklist(&self) -> Result<TestChecklist> {
        Ok(self.read(CHECKLIST_KEY)?.unwrap_or_default())
    }

    pub fn save_checklist(&self, checklist: &TestChecklist) -> Result<()> {
        self.write(CHECKLIST_KEY, checklist)
    }

    pub fn reset_checklist(&self) -> Result<()> {
        self.store.remove(CHECKLIST_KEY)
    }
}

fn digest_key(date: NaiveDate) -> String {
    format!("{}{}", DIGEST_KEY_PREFIX, date.format("%Y-%m-%d"))
}

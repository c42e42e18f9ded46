use anyhow::Result;
use chrono::NaiveDate;
use std::fmt::Write;
use thiserror::Error;
use tracing::debug;

use crate::db::KeyValueStore;
use crate::models::{Digest, DigestEntry, JobRecord, PreferenceProfile, StatusChange};
use crate::scoring::match_score;
use crate::tracker::Tracker;

pub const DIGEST_SIZE: usize = 10;
pub const RECENT_UPDATES: usize = 5;

const HEADER: &str = "TOP 10 JOBS FOR YOU — 9AM DIGEST";
const FOOTER: &str = "This digest was generated based on your preferences.";
const MAIL_SUBJECT: &str = "My 9AM Job Digest";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DigestError {
    #[error("preferences required: set your preferences to generate a digest")]
    PreferencesRequired,
}

/// Top matches for `date`: highest score first, more recent postings win
/// ties, at most ten entries. An empty job list is a valid digest.
pub fn build(
    jobs: &[JobRecord],
    prefs: Option<&PreferenceProfile>,
    date: NaiveDate,
) -> Result<Digest, DigestError> {
    let prefs = prefs.ok_or(DigestError::PreferencesRequired)?;

    let mut scored: Vec<(&JobRecord, u8)> = jobs
        .iter()
        .map(|job| (job, match_score(job, Some(prefs))))
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.posted_days_ago.cmp(&b.0.posted_days_ago)));
    scored.truncate(DIGEST_SIZE);

    Ok(Digest {
        date: date.format("%Y-%m-%d").to_string(),
        jobs: scored
            .into_iter()
            .map(|(job, score)| DigestEntry {
                id: job.id,
                title: job.title.clone(),
                company: job.company.clone(),
                location: job.location.clone(),
                experience: job.experience,
                match_score: score,
                apply_url: job.apply_url.clone(),
            })
            .collect(),
    })
}

/// Returns the stored digest for `date`, building and storing it first if
/// the day has none yet.
pub fn generate<S: KeyValueStore>(
    tracker: &Tracker<S>,
    jobs: &[JobRecord],
    date: NaiveDate,
) -> Result<Digest> {
    if let Some(existing) = tracker.digest(date)? {
        return Ok(existing);
    }
    let prefs = tracker.preferences()?;
    let digest = build(jobs, prefs.as_ref(), date)?;
    tracker.store_digest(date, &digest)?;
    debug!(date = %digest.date, jobs = digest.jobs.len(), "digest generated");
    Ok(digest)
}

/// Discards the stored digest for `date` and builds a fresh one.
pub fn regenerate<S: KeyValueStore>(
    tracker: &Tracker<S>,
    jobs: &[JobRecord],
    date: NaiveDate,
) -> Result<Digest> {
    // Refuse before deleting so a missing profile keeps the old snapshot.
    if tracker.preferences()?.is_none() {
        return Err(DigestError::PreferencesRequired.into());
    }
    tracker.remove_digest(date)?;
    generate(tracker, jobs, date)
}

/// Newest status changes whose jobs still exist in the dataset.
pub fn recent_updates<'a>(
    history: &'a [StatusChange],
    jobs: &'a [JobRecord],
) -> Vec<(&'a StatusChange, &'a JobRecord)> {
    history
        .iter()
        .take(RECENT_UPDATES)
        .filter_map(|change| {
            jobs.iter()
                .find(|job| job.id == change.job_id)
                .map(|job| (change, job))
        })
        .collect()
}

fn long_date(digest: &Digest) -> String {
    match NaiveDate::parse_from_str(&digest.date, "%Y-%m-%d") {
        Ok(date) => date.format("%A, %B %-d, %Y").to_string(),
        Err(_) => digest.date.clone(),
    }
}

fn render(digest: &Digest, newline: &str) -> String {
    let mut text = String::new();
    let _ = write!(text, "{HEADER}{newline}{}{newline}{newline}", long_date(digest));
    for (idx, job) in digest.jobs.iter().enumerate() {
        let _ = write!(text, "{}. {}{newline}", idx + 1, job.title);
        let _ = write!(text, "   {}{newline}", job.company);
        let _ = write!(
            text,
            "   {} • {} • {}% match{newline}",
            job.location, job.experience, job.match_score
        );
        let _ = write!(text, "   Apply: {}{newline}{newline}", job.apply_url);
    }
    text.push_str(FOOTER);
    text
}

/// Plain-text digest, suitable for pasting.
pub fn to_text(digest: &Digest) -> String {
    render(digest, "\n")
}

/// `mailto:` link that opens a draft containing the digest.
pub fn mailto_url(digest: &Digest) -> String {
    format!(
        "mailto:?subject={}&body={}",
        urlencoding::encode(MAIL_SUBJECT),
        urlencoding::encode(&render(digest, "\r\n"))
    )
}

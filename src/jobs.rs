use anyhow::{anyhow, Context, Result};
use std::collections::HashSet;
use std::path::Path;

use crate::models::JobRecord;

const BUNDLED_JOBS: &str = include_str!("../data/jobs.json");

/// Loads the dataset from `path`, or the bundled one when no path is given.
pub fn load(path: Option<&Path>) -> Result<Vec<JobRecord>> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read job dataset: {}", path.display()))?;
            parse(&content).with_context(|| format!("Invalid job dataset: {}", path.display()))
        }
        None => parse(BUNDLED_JOBS).context("Invalid bundled job dataset"),
    }
}

/// Parses a JSON array of jobs and rejects duplicate ids.
pub fn parse(content: &str) -> Result<Vec<JobRecord>> {
    let jobs: Vec<JobRecord> = serde_json::from_str(content)?;
    let mut seen = HashSet::new();
    for job in &jobs {
        if !seen.insert(job.id) {
            return Err(anyhow!("Duplicate job id {}", job.id));
        }
    }
    Ok(jobs)
}

pub fn find(jobs: &[JobRecord], id: i64) -> Option<&JobRecord> {
    jobs.iter().find(|job| job.id == id)
}

use std::env;
use std::path::PathBuf;

const DB_ENV: &str = "JOBTRACK_DB";
const JOBS_ENV: &str = "JOBTRACK_JOBS";
const LOG_ENV: &str = "JOBTRACK_LOG";
const DEFAULT_LOG_FILTER: &str = "warn";

/// Runtime settings resolved from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite file backing the key-value store.
    pub db_path: PathBuf,

    /// Job dataset file. `None` uses the dataset compiled into the binary.
    pub jobs_path: Option<PathBuf>,

    /// `tracing` filter directive, e.g. `debug` or `jobtrack=debug`.
    pub log_filter: String,
}

impl Config {
    /// Environment variables:
    /// - JOBTRACK_DB: database path (default: platform data dir)
    /// - JOBTRACK_JOBS: job dataset path (default: bundled dataset)
    /// - JOBTRACK_LOG, then RUST_LOG: log filter (default: warn)
    pub fn from_env() -> Self {
        let db_path = env::var_os(DB_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);

        let jobs_path = env::var_os(JOBS_ENV).map(PathBuf::from);

        let log_filter = env::var(LOG_ENV)
            .or_else(|_| env::var("RUST_LOG"))
            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

        Self {
            db_path,
            jobs_path,
            log_filter,
        }
    }

    /// Applies command-line overrides on top of the environment.
    pub fn with_overrides(mut self, db: Option<PathBuf>, jobs: Option<PathBuf>) -> Self {
        if let Some(db) = db {
            self.db_path = db;
        }
        if jobs.is_some() {
            self.jobs_path = jobs;
        }
        self
    }
}

fn default_db_path() -> PathBuf {
    // Use XDG data directory or fallback
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "jobtrack") {
        proj_dirs.data_dir().join("jobtrack.db")
    } else {
        PathBuf::from("jobtrack.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_only_given_values() {
        let base = Config {
            db_path: PathBuf::from("/data/jobtrack.db"),
            jobs_path: Some(PathBuf::from("/data/jobs.json")),
            log_filter: "warn".to_string(),
        };

        let cfg = base.clone().with_overrides(None, None);
        assert_eq!(cfg.db_path, PathBuf::from("/data/jobtrack.db"));
        assert_eq!(cfg.jobs_path, Some(PathBuf::from("/data/jobs.json")));

        let cfg = base.with_overrides(Some(PathBuf::from("/tmp/t.db")), Some(PathBuf::from("/tmp/j.json")));
        assert_eq!(cfg.db_path, PathBuf::from("/tmp/t.db"));
        assert_eq!(cfg.jobs_path, Some(PathBuf::from("/tmp/j.json")));
    }

    #[test]
    fn test_default_db_path_names_file() {
        assert!(default_db_path().ends_with("jobtrack.db"));
    }
}

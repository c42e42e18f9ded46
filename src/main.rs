mod config;
mod db;
mod digest;
mod filter;
mod jobs;
mod models;
mod proof;
mod scoring;
mod tracker;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use config::Config;
use db::Database;
use digest::DigestError;
use filter::{FilterSpec, SortKey};
use models::{Experience, JobRecord, JobStatus, PreferenceProfile, WorkMode};
use proof::{ProofLinks, CHECKLIST_ITEMS};
use scoring::{match_score, MatchBand};
use std::path::PathBuf;
use std::str::FromStr;
use tracker::Tracker;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jobtrack")]
#[command(about = "Job notification tracker - match, filter, track, and digest job postings")]
struct Cli {
    /// Database file (overrides JOBTRACK_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Job dataset JSON file (overrides JOBTRACK_JOBS)
    #[arg(long, global = true)]
    jobs: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database if needed and show where it lives
    Init,

    /// List jobs (the dashboard)
    List {
        /// Match title or company (case-insensitive)
        #[arg(short, long)]
        keyword: Option<String>,

        /// Exact location, e.g. Pune
        #[arg(short, long)]
        location: Option<String>,

        /// Work mode (remote, hybrid, onsite); empty means any
        #[arg(short, long)]
        mode: Option<String>,

        /// Experience bracket (fresher, 0-1, 1-3, 3-5); empty means any
        #[arg(short, long)]
        experience: Option<String>,

        /// Exact source platform, e.g. LinkedIn
        #[arg(long)]
        source: Option<String>,

        /// Filter by status (not-applied, applied, rejected, selected); empty means any
        #[arg(long)]
        status: Option<String>,

        /// Sort order (latest, match, salary)
        #[arg(long, default_value = "latest")]
        sort: SortKey,

        /// Only show jobs at or above your minimum match score
        #[arg(long)]
        matches: bool,
    },

    /// Show job details
    Show {
        /// Job ID
        id: i64,
    },

    /// List saved jobs
    Saved,

    /// Save or unsave a job
    Save {
        /// Job ID
        id: i64,
    },

    /// Set the application status of a job
    Status {
        /// Job ID
        id: i64,

        /// New status (not-applied, applied, rejected, selected)
        status: JobStatus,
    },

    /// Show recent status changes
    History {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },

    /// Manage match preferences
    Prefs {
        #[command(subcommand)]
        command: PrefsCommands,
    },

    /// Daily digest of top matches
    Digest {
        #[command(subcommand)]
        command: DigestCommands,
    },

    /// Manage proof links
    Proof {
        #[command(subcommand)]
        command: ProofCommands,
    },

    /// Manage the test checklist
    Checklist {
        #[command(subcommand)]
        command: ChecklistCommands,
    },

    /// Show project status and the final submission
    Ship,
}

#[derive(Subcommand)]
enum PrefsCommands {
    /// Show current preferences
    Show,

    /// Replace preferences
    Set {
        /// Role keywords, comma-separated (e.g. "developer, engineer")
        #[arg(short, long, default_value = "")]
        roles: String,

        /// Skills, comma-separated (e.g. "react, python")
        #[arg(short, long, default_value = "")]
        skills: String,

        /// Preferred location (repeatable)
        #[arg(short, long = "location")]
        locations: Vec<String>,

        /// Preferred work mode (repeatable)
        #[arg(short, long = "mode")]
        modes: Vec<WorkMode>,

        /// Experience level
        #[arg(short, long)]
        experience: Option<Experience>,

        /// Minimum match score for --matches (0-100)
        #[arg(long, default_value_t = models::DEFAULT_MIN_MATCH_SCORE,
              value_parser = clap::value_parser!(u8).range(0..=100))]
        min_score: u8,
    },

    /// Remove preferences (disables matching)
    Clear,
}

#[derive(Subcommand)]
enum DigestCommands {
    /// Show today's digest
    Show,

    /// Generate today's digest (keeps an existing one)
    Generate,

    /// Replace today's digest with a fresh one
    Regenerate,

    /// Print today's digest as plain text
    Text,

    /// Print a mailto: link with today's digest as the body
    Email,
}

#[derive(Subcommand)]
enum ProofCommands {
    /// Show saved links
    Show,

    /// Save links (each must be http:// or https:// when given)
    Set {
        #[arg(long, default_value = "")]
        lovable: String,

        #[arg(long, default_value = "")]
        github: String,

        #[arg(long, default_value = "")]
        deployed: String,
    },
}

#[derive(Subcommand)]
enum ChecklistCommands {
    /// Show checklist items and their state
    Show,

    /// Flip one item
    Toggle {
        /// Item id, e.g. match-score
        item: String,
    },

    /// Clear every item
    Reset,
}

fn init_logging(filter: &str) {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let Cli {
        db,
        jobs: jobs_file,
        command,
    } = Cli::parse();

    let config = Config::from_env().with_overrides(db, jobs_file);
    init_logging(&config.log_filter);

    let jobs = jobs::load(config.jobs_path.as_deref())?;
    let tracker = Tracker::new(Database::open(&config.db_path)?);
    let today = Utc::now().date_naive();

    match command {
        Commands::Init => {
            if let Some(path) = tracker.store().path() {
                println!("Database ready at {}", path.display());
            }
            println!("{} jobs in dataset.", jobs.len());
        }

        Commands::List {
            keyword,
            location,
            mode,
            experience,
            source,
            status,
            sort,
            matches,
        } => {
            let prefs = tracker.preferences()?;
            if prefs.is_none() {
                println!("Set your preferences to activate matching: jobtrack prefs set --help\n");
            }
            let filters = FilterSpec {
                keyword,
                location,
                mode: filter_value(mode)?,
                experience: filter_value(experience)?,
                source,
                status: filter_value(status)?,
                sort,
            };
            let statuses = tracker.statuses()?;
            let saved = tracker.saved()?;
            let results = filter::apply(
                &jobs,
                &filters,
                prefs.as_ref(),
                |id| statuses.get(&id).copied().unwrap_or_default(),
                matches,
            );

            if results.is_empty() {
                println!("No roles match your criteria. Adjust filters or lower threshold.");
            } else {
                print_job_header(prefs.is_some());
                for scored in results {
                    let status = statuses.get(&scored.job.id).copied().unwrap_or_default();
                    let score = prefs.as_ref().map(|_| scored.score);
                    print_job_row(scored.job, status, saved.contains(&scored.job.id), score);
                }
            }
        }

        Commands::Show { id } => {
            let job = jobs::find(&jobs, id).ok_or_else(|| anyhow!("Job #{} not found", id))?;
            let prefs = tracker.preferences()?;

            println!("Job #{}", job.id);
            println!("Title: {}", job.title);
            println!("Company: {}", job.company);
            println!("Location: {} ({})", job.location, job.mode);
            println!("Experience: {}", job.experience);
            println!("Salary: {}", job.salary_range);
            println!("Source: {}", job.source);
            println!("Posted: {}", posted_label(job.posted_days_ago));
            println!("Status: {}", tracker.status(job.id)?);
            if tracker.is_saved(job.id)? {
                println!("Saved: yes");
            }
            if let Some(prefs) = &prefs {
                let score = match_score(job, Some(prefs));
                println!("Match: {}% ({})", score, MatchBand::for_score(score).label());
            }
            if !job.skills.is_empty() {
                println!("Skills: {}", job.skills.join(", "));
            }
            println!("Apply: {}", job.apply_url);
            if !job.description.is_empty() {
                println!("\n{}", textwrap::fill(&job.description, 72));
            }
        }

        Commands::Saved => {
            let saved = tracker.saved()?;
            let saved_jobs: Vec<&JobRecord> = jobs.iter().filter(|j| saved.contains(&j.id)).collect();
            if saved_jobs.is_empty() {
                println!("No saved jobs. Save one with 'jobtrack save <id>'.");
            } else {
                let prefs = tracker.preferences()?;
                let statuses = tracker.statuses()?;
                print_job_header(prefs.is_some());
                for job in saved_jobs {
                    let status = statuses.get(&job.id).copied().unwrap_or_default();
                    let score = prefs.as_ref().map(|p| match_score(job, Some(p)));
                    print_job_row(job, status, true, score);
                }
            }
        }

        Commands::Save { id } => {
            let job = jobs::find(&jobs, id).ok_or_else(|| anyhow!("Job #{} not found", id))?;
            if tracker.toggle_saved(job.id)? {
                println!("Saved job #{} ({}).", job.id, job.title);
            } else {
                println!("Removed job #{} ({}) from saved.", job.id, job.title);
            }
        }

        Commands::Status { id, status } => {
            let job = jobs::find(&jobs, id).ok_or_else(|| anyhow!("Job #{} not found", id))?;
            tracker.set_status(job.id, status, Utc::now())?;
            println!("Status updated: {}", status);
        }

        Commands::History { limit } => {
            let history = tracker.history()?;
            if history.is_empty() {
                println!("No status changes yet.");
            } else {
                println!("{:<20} {:<6} {:<12} {:<30}", "WHEN", "ID", "STATUS", "TITLE");
                println!("{}", "-".repeat(70));
                for change in history.iter().take(limit) {
                    let title = jobs::find(&jobs, change.job_id)
                        .map(|j| j.title.as_str())
                        .unwrap_or("(removed)");
                    println!(
                        "{:<20} {:<6} {:<12} {:<30}",
                        short_timestamp(&change.date),
                        change.job_id,
                        change.status,
                        truncate(title, 28)
                    );
                }
            }
        }

        Commands::Prefs { command } => match command {
            PrefsCommands::Show => match tracker.preferences()? {
                Some(prefs) => print_preferences(&prefs),
                None => println!("No preferences set. Matching is inactive."),
            },

            PrefsCommands::Set {
                roles,
                skills,
                locations,
                modes,
                experience,
                min_score,
            } => {
                let prefs = PreferenceProfile::from_lists(
                    &roles, &skills, locations, modes, experience, min_score,
                );
                tracker.save_preferences(&prefs)?;
                println!("Preferences saved.");
                print_preferences(&prefs);
            }

            PrefsCommands::Clear => {
                tracker.clear_preferences()?;
                println!("Preferences cleared. Matching is inactive.");
            }
        },

        Commands::Digest { command } => {
            let outcome = match command {
                DigestCommands::Show => show_digest(&tracker, &jobs, today),
                DigestCommands::Generate => {
                    digest::generate(&tracker, &jobs, today).map(|d| print_digest(&d))
                }
                DigestCommands::Regenerate => {
                    digest::regenerate(&tracker, &jobs, today).map(|d| print_digest(&d))
                }
                DigestCommands::Text => with_todays_digest(&tracker, today, |d| {
                    println!("{}", digest::to_text(d))
                }),
                DigestCommands::Email => with_todays_digest(&tracker, today, |d| {
                    println!("{}", digest::mailto_url(d))
                }),
            };

            match outcome {
                Err(e) if e.downcast_ref::<DigestError>().is_some() => {
                    println!("Set preferences to generate a personalized digest: jobtrack prefs set --help");
                }
                other => other?,
            }
        }

        Commands::Proof { command } => match command {
            ProofCommands::Show => {
                let links = tracker.proof_links()?;
                println!("Lovable Project:   {}", or_dash(&links.lovable_link));
                println!("GitHub Repository: {}", or_dash(&links.github_link));
                println!("Live Deployment:   {}", or_dash(&links.deployed_url));
            }

            ProofCommands::Set {
                lovable,
                github,
                deployed,
            } => {
                let links = ProofLinks::new(&lovable, &github, &deployed)?;
                tracker.save_proof_links(&links)?;
                println!("Proof links saved.");
            }
        },

        Commands::Checklist { command } => match command {
            ChecklistCommands::Show => {
                let checklist = tracker.checklist()?;
                println!(
                    "Tests Passed: {} / {}",
                    checklist.passed_count(),
                    CHECKLIST_ITEMS.len()
                );
                for item in &CHECKLIST_ITEMS {
                    let mark = if checklist.is_checked(item.id) { "x" } else { " " };
                    println!("[{}] {:<16} {}", mark, item.id, item.label);
                    println!("    {}", item.how_to);
                }
                if !checklist.all_passed() {
                    println!("\nResolve all issues before shipping.");
                }
            }

            ChecklistCommands::Toggle { item } => {
                let mut checklist = tracker.checklist()?;
                let checked = checklist.toggle(&item)?;
                tracker.save_checklist(&checklist)?;
                println!("{} {}", item, if checked { "passed" } else { "unchecked" });
            }

            ChecklistCommands::Reset => {
                tracker.reset_checklist()?;
                println!("Checklist reset.");
            }
        },

        Commands::Ship => {
            let links = tracker.proof_links()?;
            let checklist = tracker.checklist()?;

            println!("Project status: {}", proof::project_status(&links, &checklist));
            println!();
            for (i, (name, done)) in proof::build_steps(&links, &checklist).iter().enumerate() {
                println!("{}. [{}] {}", i + 1, if *done { "x" } else { " " }, name);
            }
            println!();

            if proof::is_shipped(&links, &checklist) {
                println!("{}", proof::submission_text(&links)?);
            } else if !checklist.all_passed() {
                println!("Complete all tests before shipping.");
            } else {
                match proof::submission_text(&links) {
                    Ok(_) => println!("Fix invalid proof links before shipping."),
                    Err(e) => println!("{}", e),
                }
            }
        }
    }

    Ok(())
}

fn show_digest(tracker: &Tracker<Database>, jobs: &[JobRecord], today: chrono::NaiveDate) -> Result<()> {
    if tracker.preferences()?.is_none() {
        return Err(DigestError::PreferencesRequired.into());
    }
    match tracker.digest(today)? {
        Some(d) => print_digest(&d),
        None => println!("No digest generated yet for today. Run 'jobtrack digest generate'."),
    }

    let history = tracker.history()?;
    let updates = digest::recent_updates(&history, jobs);
    if !updates.is_empty() {
        println!("\nRecent Status Updates");
        for (change, job) in updates {
            println!(
                "  {} - {} ({}) {}",
                short_date(&change.date),
                truncate(&job.title, 28),
                job.company,
                change.status
            );
        }
    }
    Ok(())
}

fn with_todays_digest<F>(tracker: &Tracker<Database>, today: chrono::NaiveDate, f: F) -> Result<()>
where
    F: FnOnce(&models::Digest),
{
    match tracker.digest(today)? {
        Some(d) => f(&d),
        None => println!("No digest generated yet for today. Run 'jobtrack digest generate'."),
    }
    Ok(())
}

fn print_digest(d: &models::Digest) {
    if d.jobs.is_empty() {
        println!("No matching roles today. Check again tomorrow.");
        return;
    }
    println!("{}", digest::to_text(d));
}

fn print_preferences(prefs: &PreferenceProfile) {
    println!("Role keywords:      {}", or_dash(&prefs.role_keywords.join(", ")));
    println!("Skills:             {}", or_dash(&prefs.skills.join(", ")));
    println!("Locations:          {}", or_dash(&prefs.preferred_locations.join(", ")));
    let modes: Vec<&str> = prefs.preferred_mode.iter().map(|m| m.as_str()).collect();
    println!("Modes:              {}", or_dash(&modes.join(", ")));
    println!(
        "Experience:         {}",
        prefs.experience_level.map(|e| e.as_str()).unwrap_or("Any")
    );
    println!("Minimum match:      {}%", prefs.min_match_score);
}

fn print_job_header(with_match: bool) {
    print!(
        "{:<5} {:<12} {:<26} {:<16} {:<10} {:<7} {:<8} {:<14}",
        "ID", "STATUS", "TITLE", "COMPANY", "LOCATION", "MODE", "EXP", "SALARY"
    );
    if with_match {
        print!(" {:>6}", "MATCH");
    }
    println!();
    println!("{}", "-".repeat(if with_match { 112 } else { 105 }));
}

fn print_job_row(job: &JobRecord, status: JobStatus, saved: bool, score: Option<u8>) {
    let id = if saved {
        format!("{}*", job.id)
    } else {
        job.id.to_string()
    };
    print!(
        "{:<5} {:<12} {:<26} {:<16} {:<10} {:<7} {:<8} {:<14}",
        id,
        status,
        truncate(&job.title, 24),
        truncate(&job.company, 14),
        truncate(&job.location, 10),
        job.mode,
        job.experience,
        truncate(&job.salary_range, 14)
    );
    if let Some(score) = score {
        print!(" {:>5}%", score);
    }
    println!();
}

/// Parses an optional enum filter. A blank value leaves the filter inactive.
fn filter_value<T: FromStr<Err = String>>(value: Option<String>) -> Result<Option<T>> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(|e| anyhow!(e)),
    }
}

fn posted_label(days: u32) -> String {
    match days {
        0 => "Today".to_string(),
        1 => "1 day ago".to_string(),
        n => format!("{} days ago", n),
    }
}

fn short_timestamp(rfc3339: &str) -> String {
    DateTime::parse_from_rfc3339(rfc3339)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| rfc3339.to_string())
}

fn short_date(rfc3339: &str) -> String {
    DateTime::parse_from_rfc3339(rfc3339)
        .map(|t| t.format("%b %-d").to_string())
        .unwrap_or_else(|_| rfc3339.to_string())
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() { "-" } else { s }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

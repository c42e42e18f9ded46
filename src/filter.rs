use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::models::{Experience, JobRecord, JobStatus, PreferenceProfile, WorkMode};
use crate::scoring::match_score;

static FIRST_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Latest,
    Match,
    Salary,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "latest" => Ok(SortKey::Latest),
            "match" => Ok(SortKey::Match),
            "salary" => Ok(SortKey::Salary),
            other => Err(format!("unknown sort '{}' (latest, match, salary)", other)),
        }
    }
}

/// Dashboard filters. `None` or an empty string leaves a filter inactive.
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    pub keyword: Option<String>,
    pub location: Option<String>,
    pub mode: Option<WorkMode>,
    pub experience: Option<Experience>,
    pub source: Option<String>,
    pub status: Option<JobStatus>,
    pub sort: SortKey,
}

#[derive(Debug, Clone, Copy)]
pub struct ScoredJob<'a> {
    pub job: &'a JobRecord,
    pub score: u8,
}

/// Scores every job, narrows the set, then sorts it.
///
/// With `match_only` and a profile present, jobs under the profile's
/// threshold are dropped before the other filters run. Sorting is stable so
/// equal keys keep dataset order.
pub fn apply<'a, F>(
    jobs: &'a [JobRecord],
    filters: &FilterSpec,
    prefs: Option<&PreferenceProfile>,
    status_of: F,
    match_only: bool,
) -> Vec<ScoredJob<'a>>
where
    F: Fn(i64) -> JobStatus,
{
    let mut scored: Vec<ScoredJob<'a>> = jobs
        .iter()
        .map(|job| ScoredJob {
            job,
            score: match_score(job, prefs),
        })
        .collect();

    if let (true, Some(prefs)) = (match_only, prefs) {
        let threshold = prefs.min_match_score;
        scored.retain(|s| s.score >= threshold);
    }

    if let Some(kw) = active(&filters.keyword) {
        let kw = kw.to_lowercase();
        scored.retain(|s| {
            s.job.title.to_lowercase().contains(&kw) || s.job.company.to_lowercase().contains(&kw)
        });
    }

    if let Some(location) = active(&filters.location) {
        scored.retain(|s| s.job.location == location);
    }

    if let Some(mode) = filters.mode {
        scored.retain(|s| s.job.mode == mode);
    }

    if let Some(experience) = filters.experience {
        scored.retain(|s| s.job.experience == experience);
    }

    if let Some(source) = active(&filters.source) {
        scored.retain(|s| s.job.source == source);
    }

    if let Some(status) = filters.status {
        scored.retain(|s| status_of(s.job.id) == status);
    }

    match filters.sort {
        SortKey::Latest => scored.sort_by_key(|s| s.job.posted_days_ago),
        SortKey::Match => scored.sort_by(|a, b| b.score.cmp(&a.score)),
        SortKey::Salary => scored.sort_by(|a, b| {
            salary_magnitude(&b.job.salary_range).cmp(&salary_magnitude(&a.job.salary_range))
        }),
    }

    scored
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// First run of digits in a salary string, or 0 when there is none.
pub fn salary_magnitude(salary_range: &str) -> u64 {
    FIRST_NUMBER
        .find(salary_range)
        .map(|m| m.as_str().parse().unwrap_or(u64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn job(id: i64, title: &str, days: u32, salary: &str) -> JobRecord {
        JobRecord {
            id,
            title: title.to_string(),
            company: format!("Company {}", id),
            location: "Pune".to_string(),
            mode: WorkMode::Remote,
            experience: Experience::OneToThree,
            source: "Indeed".to_string(),
            salary_range: salary.to_string(),
            skills: vec![],
            description: String::new(),
            posted_days_ago: days,
            apply_url: format!("https://example.com/{}", id),
        }
    }

    fn not_applied(_: i64) -> JobStatus {
        JobStatus::NotApplied
    }

    fn ids(result: &[ScoredJob<'_>]) -> Vec<i64> {
        result.iter().map(|s| s.job.id).collect()
    }

    #[test]
    fn test_salary_magnitude() {
        assert_eq!(salary_magnitude("₹15-20 LPA"), 15);
        assert_eq!(salary_magnitude("₹8-12 LPA"), 8);
        assert_eq!(salary_magnitude("Not disclosed"), 0);
        assert_eq!(salary_magnitude(""), 0);
    }

    #[test]
    fn test_salary_sort_puts_undisclosed_last() {
        let jobs = vec![
            job(1, "A", 0, "₹8-12 LPA"),
            job(2, "B", 0, "₹15-20 LPA"),
            job(3, "C", 0, "Not disclosed"),
        ];
        let filters = FilterSpec { sort: SortKey::Salary, ..Default::default() };
        let result = apply(&jobs, &filters, None, not_applied, false);
        let salaries: Vec<&str> = result.iter().map(|s| s.job.salary_range.as_str()).collect();
        assert_eq!(salaries, vec!["₹15-20 LPA", "₹8-12 LPA", "Not disclosed"]);
    }

    #[test]
    fn test_latest_sort_is_stable() {
        let jobs = vec![
            job(1, "A", 3, ""),
            job(2, "B", 1, ""),
            job(3, "C", 3, ""),
            job(4, "D", 1, ""),
        ];
        let result = apply(&jobs, &FilterSpec::default(), None, not_applied, false);
        assert_eq!(ids(&result), vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_keyword_matches_title_or_company() {
        let mut jobs = vec![job(1, "Frontend Developer", 0, ""), job(2, "Analyst", 0, "")];
        jobs[1].company = "DevWorks".to_string();
        jobs.push(job(3, "Designer", 0, ""));
        let filters = FilterSpec { keyword: Some("DEV".to_string()), ..Default::default() };
        let result = apply(&jobs, &filters, None, not_applied, false);
        assert_eq!(ids(&result), vec![1, 2]);
    }

    #[test]
    fn test_empty_strings_are_inactive() {
        let jobs = vec![job(1, "A", 0, ""), job(2, "B", 1, "")];
        let filters = FilterSpec {
            keyword: Some(String::new()),
            location: Some(String::new()),
            source: Some(String::new()),
            ..Default::default()
        };
        let result = apply(&jobs, &filters, None, not_applied, false);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_exact_match_filters_combine() {
        let mut jobs = vec![job(1, "A", 0, ""), job(2, "B", 0, ""), job(3, "C", 0, "")];
        jobs[1].location = "Mumbai".to_string();
        jobs[2].mode = WorkMode::Hybrid;
        jobs[0].source = "LinkedIn".to_string();
        jobs[2].source = "LinkedIn".to_string();

        let filters = FilterSpec {
            location: Some("Pune".to_string()),
            source: Some("LinkedIn".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&apply(&jobs, &filters, None, not_applied, false)), vec![1, 3]);

        let filters = FilterSpec {
            mode: Some(WorkMode::Hybrid),
            experience: Some(Experience::OneToThree),
            ..Default::default()
        };
        assert_eq!(ids(&apply(&jobs, &filters, None, not_applied, false)), vec![3]);
    }

    #[test]
    fn test_status_filter_uses_lookup() {
        let jobs = vec![job(1, "A", 0, ""), job(2, "B", 0, ""), job(3, "C", 0, "")];
        let statuses: HashMap<i64, JobStatus> = HashMap::from([(2, JobStatus::Applied)]);
        let lookup = |id: i64| statuses.get(&id).copied().unwrap_or_default();

        let filters = FilterSpec { status: Some(JobStatus::Applied), ..Default::default() };
        assert_eq!(ids(&apply(&jobs, &filters, None, lookup, false)), vec![2]);

        let filters = FilterSpec { status: Some(JobStatus::NotApplied), ..Default::default() };
        assert_eq!(ids(&apply(&jobs, &filters, None, lookup, false)), vec![1, 3]);
    }

    #[test]
    fn test_match_only_is_subsequence_of_match_sort() {
        let mut jobs = vec![
            job(1, "Rust Engineer", 5, ""),
            job(2, "Accountant", 5, ""),
            job(3, "Engineer Intern", 1, ""),
            job(4, "Data Engineer", 9, ""),
        ];
        jobs[1].location = "Chennai".to_string();
        let prefs = PreferenceProfile {
            role_keywords: vec!["engineer".to_string()],
            preferred_locations: vec!["Pune".to_string()],
            min_match_score: 40,
            ..Default::default()
        };
        let filters = FilterSpec { sort: SortKey::Match, ..Default::default() };

        let all = apply(&jobs, &filters, Some(&prefs), not_applied, false);
        let matched = apply(&jobs, &filters, Some(&prefs), not_applied, true);

        assert!(matched.iter().all(|s| s.score >= 40));
        assert_eq!(ids(&all), vec![3, 1, 4, 2]);
        assert_eq!(ids(&matched), vec![3, 1, 4]);

        let all_ids = ids(&all);
        let mut cursor = all_ids.iter();
        for id in ids(&matched) {
            assert!(cursor.any(|x| *x == id));
        }
    }

    #[test]
    fn test_match_only_without_profile_keeps_everything() {
        let jobs = vec![job(1, "A", 0, ""), job(2, "B", 0, "")];
        let result = apply(&jobs, &FilterSpec::default(), None, not_applied, true);
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|s| s.score == 0));
    }

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!("".parse::<SortKey>().unwrap(), SortKey::Latest);
        assert_eq!("Match".parse::<SortKey>().unwrap(), SortKey::Match);
        assert!("oldest".parse::<SortKey>().is_err());
    }
}

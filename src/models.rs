use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Source that earns the premium bonus when scoring.
pub const PREMIUM_SOURCE: &str = "LinkedIn";

pub const DEFAULT_MIN_MATCH_SCORE: u8 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkMode {
    Remote,
    Hybrid,
    Onsite,
}

impl WorkMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkMode::Remote => "Remote",
            WorkMode::Hybrid => "Hybrid",
            WorkMode::Onsite => "Onsite",
        }
    }
}

impl fmt::Display for WorkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "remote" => Ok(WorkMode::Remote),
            "hybrid" => Ok(WorkMode::Hybrid),
            "onsite" | "on-site" => Ok(WorkMode::Onsite),
            other => Err(format!("unknown work mode '{}' (remote, hybrid, onsite)", other)),
        }
    }
}

/// Experience bracket of a posting or a preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Experience {
    Fresher,
    #[serde(rename = "0-1")]
    ZeroToOne,
    #[serde(rename = "1-3")]
    OneToThree,
    #[serde(rename = "3-5")]
    ThreeToFive,
}

impl Experience {
    pub fn as_str(&self) -> &'static str {
        match self {
            Experience::Fresher => "Fresher",
            Experience::ZeroToOne => "0-1",
            Experience::OneToThree => "1-3",
            Experience::ThreeToFive => "3-5",
        }
    }
}

impl fmt::Display for Experience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Experience {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fresher" => Ok(Experience::Fresher),
            "0-1" => Ok(Experience::ZeroToOne),
            "1-3" => Ok(Experience::OneToThree),
            "3-5" => Ok(Experience::ThreeToFive),
            other => Err(format!("unknown experience bracket '{}' (fresher, 0-1, 1-3, 3-5)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    #[default]
    #[serde(rename = "Not Applied")]
    NotApplied,
    Applied,
    Rejected,
    Selected,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::NotApplied => "Not Applied",
            JobStatus::Applied => "Applied",
            JobStatus::Rejected => "Rejected",
            JobStatus::Selected => "Selected",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "not applied" => Ok(JobStatus::NotApplied),
            "applied" => Ok(JobStatus::Applied),
            "rejected" => Ok(JobStatus::Rejected),
            "selected" => Ok(JobStatus::Selected),
            other => Err(format!(
                "unknown status '{}' (not-applied, applied, rejected, selected)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub location: String,
    pub mode: WorkMode,
    pub experience: Experience,
    pub source: String,
    pub salary_range: String, // free text, e.g. "₹8-12 LPA"
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub description: String,
    pub posted_days_ago: u32,
    pub apply_url: String,
}

/// User criteria consumed by the scorer. Saved and replaced wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceProfile {
    #[serde(default)]
    pub role_keywords: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub preferred_locations: Vec<String>,
    #[serde(default)]
    pub preferred_mode: Vec<WorkMode>,
    #[serde(default)]
    pub experience_level: Option<Experience>,
    #[serde(default = "default_min_match_score")]
    pub min_match_score: u8,
}

fn default_min_match_score() -> u8 {
    DEFAULT_MIN_MATCH_SCORE
}

impl Default for PreferenceProfile {
    fn default() -> Self {
        Self {
            role_keywords: Vec::new(),
            skills: Vec::new(),
            preferred_locations: Vec::new(),
            preferred_mode: Vec::new(),
            experience_level: None,
            min_match_score: DEFAULT_MIN_MATCH_SCORE,
        }
    }
}

impl PreferenceProfile {
    /// Builds a profile from settings input. Keyword and skill fields are
    /// comma-separated lists.
    pub fn from_lists(
        role_keywords: &str,
        skills: &str,
        preferred_locations: Vec<String>,
        preferred_mode: Vec<WorkMode>,
        experience_level: Option<Experience>,
        min_match_score: u8,
    ) -> Self {
        Self {
            role_keywords: split_terms(role_keywords),
            skills: split_terms(skills),
            preferred_locations,
            preferred_mode,
            experience_level,
            min_match_score,
        }
        .normalized()
    }

    /// Lowercases and trims terms, drops empties and duplicate set members,
    /// and clamps the threshold to 0..=100.
    pub fn normalized(mut self) -> Self {
        self.role_keywords = normalize_terms(self.role_keywords);
        self.skills = normalize_terms(self.skills);

        let mut locations: Vec<String> = Vec::new();
        for loc in self.preferred_locations {
            let loc = loc.trim().to_string();
            if !loc.is_empty() && !locations.contains(&loc) {
                locations.push(loc);
            }
        }
        self.preferred_locations = locations;

        let mut modes = Vec::new();
        for mode in self.preferred_mode {
            if !modes.contains(&mode) {
                modes.push(mode);
            }
        }
        self.preferred_mode = modes;

        self.min_match_score = self.min_match_score.min(100);
        self
    }
}

fn split_terms(input: &str) -> Vec<String> {
    normalize_terms(input.split(',').map(str::to_string).collect())
}

fn normalize_terms(terms: Vec<String>) -> Vec<String> {
    terms
        .into_iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// One entry of the status audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub job_id: i64,
    pub status: JobStatus,
    pub date: String, // RFC 3339, UTC
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigestEntry {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub location: String,
    pub experience: Experience,
    pub match_score: u8,
    pub apply_url: String,
}

/// Dated top-matches snapshot. `jobs` may be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Digest {
    pub date: String, // YYYY-MM-DD
    pub jobs: Vec<DigestEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_lists_normalizes_terms() {
        let prefs = PreferenceProfile::from_lists(
            " Developer, ENGINEER ,, ",
            "React,  python",
            vec!["Pune".to_string(), " Pune ".to_string(), "".to_string()],
            vec![WorkMode::Remote, WorkMode::Remote, WorkMode::Hybrid],
            None,
            150,
        );
        assert_eq!(prefs.role_keywords, vec!["developer", "engineer"]);
        assert_eq!(prefs.skills, vec!["react", "python"]);
        assert_eq!(prefs.preferred_locations, vec!["Pune"]);
        assert_eq!(prefs.preferred_mode, vec![WorkMode::Remote, WorkMode::Hybrid]);
        assert_eq!(prefs.min_match_score, 100);
    }

    #[test]
    fn test_empty_input_yields_empty_lists() {
        let prefs = PreferenceProfile::from_lists("", " , ", vec![], vec![], None, 40);
        assert!(prefs.role_keywords.is_empty());
        assert!(prefs.skills.is_empty());
    }

    #[test]
    fn test_preferences_json_shape() {
        let json = r#"{"roleKeywords":["engineer"],"preferredMode":["Remote"],"experienceLevel":"1-3"}"#;
        let prefs: PreferenceProfile = serde_json::from_str(json).unwrap();
        assert_eq!(prefs.role_keywords, vec!["engineer"]);
        assert_eq!(prefs.experience_level, Some(Experience::OneToThree));
        assert_eq!(prefs.min_match_score, DEFAULT_MIN_MATCH_SCORE);
        assert!(prefs.skills.is_empty());
    }

    #[test]
    fn test_zero_min_match_score_is_kept() {
        let json = r#"{"roleKeywords":["engineer"],"minMatchScore":0}"#;
        let prefs: PreferenceProfile = serde_json::from_str(json).unwrap();
        assert_eq!(prefs.normalized().min_match_score, 0);
    }

    #[test]
    fn test_status_parsing_and_serialization() {
        assert_eq!("not-applied".parse::<JobStatus>().unwrap(), JobStatus::NotApplied);
        assert_eq!("Not Applied".parse::<JobStatus>().unwrap(), JobStatus::NotApplied);
        assert_eq!("APPLIED".parse::<JobStatus>().unwrap(), JobStatus::Applied);
        assert!("hired".parse::<JobStatus>().is_err());
        assert_eq!(serde_json::to_string(&JobStatus::NotApplied).unwrap(), "\"Not Applied\"");
        assert_eq!(JobStatus::default(), JobStatus::NotApplied);
    }

    #[test]
    fn test_experience_and_mode_parsing() {
        assert_eq!("1-3".parse::<Experience>().unwrap(), Experience::OneToThree);
        assert_eq!("fresher".parse::<Experience>().unwrap(), Experience::Fresher);
        assert!("5-10".parse::<Experience>().is_err());
        assert_eq!("on-site".parse::<WorkMode>().unwrap(), WorkMode::Onsite);
        assert_eq!(serde_json::to_string(&Experience::ZeroToOne).unwrap(), "\"0-1\"");
    }

    #[test]
    fn test_job_record_json_shape() {
        let json = r#"{
            "id": 7, "title": "Backend Engineer", "company": "Acme",
            "location": "Pune", "mode": "Remote", "experience": "1-3",
            "source": "LinkedIn", "salaryRange": "₹8-12 LPA",
            "skills": ["Java"], "description": "Java services",
            "postedDaysAgo": 1, "applyUrl": "https://example.com/7"
        }"#;
        let job: JobRecord = serde_json::from_str(json).unwrap();
        assert_eq!(job.mode, WorkMode::Remote);
        assert_eq!(job.salary_range, "₹8-12 LPA");
        assert_eq!(job.posted_days_ago, 1);
    }
}

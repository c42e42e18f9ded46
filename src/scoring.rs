use crate::models::{JobRecord, PreferenceProfile, PREMIUM_SOURCE};

const TITLE_KEYWORD_BONUS: u8 = 25;
const DESCRIPTION_KEYWORD_BONUS: u8 = 15;
const LOCATION_BONUS: u8 = 15;
const MODE_BONUS: u8 = 10;
const EXPERIENCE_BONUS: u8 = 10;
const SKILL_OVERLAP_BONUS: u8 = 15;
const RECENT_BONUS: u8 = 5;
const PREMIUM_SOURCE_BONUS: u8 = 5;

const RECENT_DAYS: u32 = 2;
const MAX_SCORE: u8 = 100;

/// Scores how well a job fits the profile, 0..=100.
///
/// Without a profile the score is 0; callers should hide match UI in that
/// case rather than show it as a real score. Keywords and skills in the
/// profile are expected to be lowercase already (see
/// `PreferenceProfile::normalized`).
pub fn match_score(job: &JobRecord, prefs: Option<&PreferenceProfile>) -> u8 {
    let Some(prefs) = prefs else { return 0 };

    let title = job.title.to_lowercase();
    let description = job.description.to_lowercase();
    let mut score: u32 = 0;

    if prefs.role_keywords.iter().any(|kw| title.contains(kw.as_str())) {
        score += u32::from(TITLE_KEYWORD_BONUS);
    }

    if prefs.role_keywords.iter().any(|kw| description.contains(kw.as_str())) {
        score += u32::from(DESCRIPTION_KEYWORD_BONUS);
    }

    if prefs.preferred_locations.contains(&job.location) {
        score += u32::from(LOCATION_BONUS);
    }

    if prefs.preferred_mode.contains(&job.mode) {
        score += u32::from(MODE_BONUS);
    }

    if prefs.experience_level == Some(job.experience) {
        score += u32::from(EXPERIENCE_BONUS);
    }

    if skills_overlap(&prefs.skills, &job.skills) {
        score += u32::from(SKILL_OVERLAP_BONUS);
    }

    if job.posted_days_ago <= RECENT_DAYS {
        score += u32::from(RECENT_BONUS);
    }

    if job.source == PREMIUM_SOURCE {
        score += u32::from(PREMIUM_SOURCE_BONUS);
    }

    score.min(u32::from(MAX_SCORE)) as u8
}

// Either side may contain the other: "react" matches "React Native".
fn skills_overlap(user_skills: &[String], job_skills: &[String]) -> bool {
    if user_skills.is_empty() {
        return false;
    }
    let job_skills: Vec<String> = job_skills.iter().map(|s| s.to_lowercase()).collect();
    user_skills.iter().any(|us| {
        job_skills
            .iter()
            .any(|js| js.contains(us.as_str()) || us.contains(js.as_str()))
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchBand {
    Strong,
    Good,
    Fair,
    Low,
}

impl MatchBand {
    pub fn for_score(score: u8) -> Self {
        match score {
            80.. => MatchBand::Strong,
            60..=79 => MatchBand::Good,
            40..=59 => MatchBand::Fair,
            _ => MatchBand::Low,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MatchBand::Strong => "strong",
            MatchBand::Good => "good",
            MatchBand::Fair => "fair",
            MatchBand::Low => "low",
        }
    }
}

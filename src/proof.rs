use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProofLinks {
    pub lovable_link: String,
    pub github_link: String,
    pub deployed_url: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProofError {
    #[error("Invalid {0}. Must start with http:// or https://")]
    InvalidLink(&'static str),
    #[error("Please provide all three links before copying submission.")]
    MissingLinks,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChecklistError {
    #[error("unknown checklist item '{0}'")]
    UnknownItem(String),
}

/// Non-empty, parses as a URL, and uses http or https.
pub fn is_valid_url(input: &str) -> bool {
    if input.is_empty() {
        return false;
    }
    match Url::parse(input) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

impl ProofLinks {
    /// Trims the inputs and validates every non-empty one. The first invalid
    /// link rejects the whole set.
    pub fn new(lovable_link: &str, github_link: &str, deployed_url: &str) -> Result<Self, ProofError> {
        let links = Self {
            lovable_link: lovable_link.trim().to_string(),
            github_link: github_link.trim().to_string(),
            deployed_url: deployed_url.trim().to_string(),
        };

        for (value, name) in links.fields() {
            if !value.is_empty() && !is_valid_url(value) {
                return Err(ProofError::InvalidLink(name));
            }
        }
        Ok(links)
    }

    fn fields(&self) -> [(&str, &'static str); 3] {
        [
            (self.lovable_link.as_str(), "Lovable Project URL"),
            (self.github_link.as_str(), "GitHub Repository URL"),
            (self.deployed_url.as_str(), "Deployed URL"),
        ]
    }

    pub fn any_provided(&self) -> bool {
        self.fields().iter().any(|(v, _)| !v.is_empty())
    }

    pub fn all_provided(&self) -> bool {
        self.fields().iter().all(|(v, _)| !v.is_empty())
    }

    pub fn all_valid(&self) -> bool {
        self.fields().iter().all(|(v, _)| is_valid_url(v))
    }
}

pub struct ChecklistItem {
    pub id: &'static str,
    pub label: &'static str,
    pub how_to: &'static str,
}

pub const CHECKLIST_ITEMS: [ChecklistItem; 10] = [
    ChecklistItem {
        id: "prefs-persist",
        label: "Preferences persist after refresh",
        how_to: "Set preferences, restart, verify they are still set",
    },
    ChecklistItem {
        id: "match-score",
        label: "Match score calculates correctly",
        how_to: "Set preferences, check job listings show match scores with the right band",
    },
    ChecklistItem {
        id: "match-toggle",
        label: "\"Show only matches\" toggle works",
        how_to: "List with --matches, verify only jobs above threshold show",
    },
    ChecklistItem {
        id: "save-persist",
        label: "Save job persists after refresh",
        how_to: "Save a job, restart, open the saved list, verify job is there",
    },
    ChecklistItem {
        id: "apply-tab",
        label: "Apply opens in new tab",
        how_to: "Open the apply link of any job, verify it points at the job URL",
    },
    ChecklistItem {
        id: "status-persist",
        label: "Status update persists after refresh",
        how_to: "Change job status to Applied, restart, verify status is still Applied",
    },
    ChecklistItem {
        id: "status-filter",
        label: "Status filter works correctly",
        how_to: "Set some jobs to Applied, filter by Applied status, verify only those show",
    },
    ChecklistItem {
        id: "digest-top10",
        label: "Digest generates top 10 by score",
        how_to: "Generate digest, verify it shows 10 jobs sorted by match score",
    },
    ChecklistItem {
        id: "digest-persist",
        label: "Digest persists for the day",
        how_to: "Generate digest, restart, show the digest, verify the same one loads",
    },
    ChecklistItem {
        id: "no-errors",
        label: "No errors on main pages",
        how_to: "Run every command once, verify none of them report an error",
    },
];

/// Checklist item id -> passed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestChecklist(BTreeMap<String, bool>);

impl TestChecklist {
    pub fn is_checked(&self, item_id: &str) -> bool {
        self.0.get(item_id).copied().unwrap_or(false)
    }

    /// Flips one item and returns its new state.
    pub fn toggle(&mut self, item_id: &str) -> Result<bool, ChecklistError> {
        if !CHECKLIST_ITEMS.iter().any(|item| item.id == item_id) {
            return Err(ChecklistError::UnknownItem(item_id.to_string()));
        }
        let checked = !self.is_checked(item_id);
        self.0.insert(item_id.to_string(), checked);
        Ok(checked)
    }

    pub fn passed_count(&self) -> usize {
        CHECKLIST_ITEMS.iter().filter(|item| self.is_checked(item.id)).count()
    }

    pub fn all_passed(&self) -> bool {
        self.passed_count() == CHECKLIST_ITEMS.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
    NotStarted,
    InProgress,
    Shipped,
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProjectStatus::NotStarted => "Not Started",
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::Shipped => "Shipped",
        })
    }
}

pub fn is_shipped(links: &ProofLinks, checklist: &TestChecklist) -> bool {
    checklist.all_passed() && links.all_provided() && links.all_valid()
}

pub fn project_status(links: &ProofLinks, checklist: &TestChecklist) -> ProjectStatus {
    if is_shipped(links, checklist) {
        ProjectStatus::Shipped
    } else if links.any_provided() || checklist.all_passed() {
        ProjectStatus::InProgress
    } else {
        ProjectStatus::NotStarted
    }
}

/// Build steps with their completion state. The last two depend on the
/// checklist and on shipping.
pub fn build_steps(links: &ProofLinks, checklist: &TestChecklist) -> Vec<(&'static str, bool)> {
    vec![
        ("Job Data & Rendering", true),
        ("Preference Logic", true),
        ("Match Scoring Engine", true),
        ("Filter System", true),
        ("Status Tracking", true),
        ("Daily Digest", true),
        ("Test Checklist", checklist.all_passed()),
        ("Final Proof", is_shipped(links, checklist)),
    ]
}

pub fn submission_text(links: &ProofLinks) -> Result<String, ProofError> {
    if !links.all_provided() {
        return Err(ProofError::MissingLinks);
    }
    let rule = "-".repeat(42);
    Ok(format!(
        "{rule}\n\
         Job Notification Tracker — Final Submission\n\n\
         Lovable Project:\n{}\n\n\
         GitHub Repository:\n{}\n\n\
         Live Deployment:\n{}\n\n\
         Core Features:\n\
         - Intelligent match scoring\n\
         - Daily digest simulation\n\
         - Status tracking\n\
         - Test checklist enforced\n\
         {rule}",
        links.lovable_link, links.github_link, links.deployed_url,
    ))
}

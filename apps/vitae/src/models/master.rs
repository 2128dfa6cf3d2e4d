//! Master content store: the canonical record every emitted item traces back to.

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::models::content::{Certification, Contact, Education, Position, Project, SkillSet};

/// Summary used when a role's `summary_key` is missing and fallback is allowed.
pub const FALLBACK_SUMMARY_KEY: &str = "comprehensive";

#[derive(Debug, Error)]
pub enum MasterError {
    #[error("cannot read master store {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed master store {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The master store. Maps keep file order, so "first" and "insertion order"
/// mean what the author wrote.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MasterStore {
    #[serde(rename = "personal_info")]
    pub contact: Contact,
    #[serde(rename = "professional_summary")]
    pub summaries: IndexMap<String, String>,
    #[serde(rename = "key_achievements")]
    pub achievements: IndexMap<String, Vec<String>>,
    #[serde(rename = "key_projects")]
    pub projects: IndexMap<String, Project>,
    #[serde(rename = "work_experience")]
    pub positions: IndexMap<String, Position>,
    #[serde(rename = "technical_skills_comprehensive")]
    pub skills: IndexMap<String, SkillSet>,
    pub education: Vec<Education>,
    pub certifications: Vec<Certification>,
}

impl MasterStore {
    pub fn load(path: &Path) -> Result<Self, MasterError> {
        let raw = std::fs::read_to_string(path).map_err(|source| MasterError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store: MasterStore =
            serde_json::from_str(&raw).map_err(|source| MasterError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        info!(
            path = %path.display(),
            positions = store.positions.len(),
            projects = store.projects.len(),
            summaries = store.summaries.len(),
            skill_categories = store.skills.len(),
            "Master store loaded"
        );
        Ok(store)
    }

    /// True when `key` names an item that exists in this store.
    pub fn resolves(&self, key: &SourceKey) -> bool {
        match key {
            SourceKey::Contact => true,
            SourceKey::Summary(k) => self.summaries.contains_key(k),
            SourceKey::Achievement { category, index } => self
                .achievements
                .get(category)
                .is_some_and(|items| *index < items.len()),
            SourceKey::Position(k) => self.positions.contains_key(k),
            SourceKey::Project(k) => self.projects.contains_key(k),
            SourceKey::SkillCategory(k) => self.skills.contains_key(k),
            SourceKey::Skill { category, entry } => match self.skills.get(category) {
                Some(SkillSet::Detailed(map)) => map.contains_key(entry),
                Some(SkillSet::Listed(list)) => entry
                    .parse::<usize>()
                    .is_ok_and(|i| i < list.len()),
                None => false,
            },
            SourceKey::Education(i) => *i < self.education.len(),
            SourceKey::Certification(i) => *i < self.certifications.len(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Source keys
// ────────────────────────────────────────────────────────────────────────────

/// Stable address of one master item. Every item in a derived view carries one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKey {
    Contact,
    Summary(String),
    Achievement { category: String, index: usize },
    Position(String),
    Project(String),
    SkillCategory(String),
    /// `entry` is the sub-key for detailed categories, the list index otherwise.
    Skill { category: String, entry: String },
    Education(usize),
    Certification(usize),
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKey::Contact => write!(f, "personal_info"),
            SourceKey::Summary(k) => write!(f, "professional_summary.{k}"),
            SourceKey::Achievement { category, index } => {
                write!(f, "key_achievements.{category}[{index}]")
            }
            SourceKey::Position(k) => write!(f, "work_experience.{k}"),
            SourceKey::Project(k) => write!(f, "key_projects.{k}"),
            SourceKey::SkillCategory(k) => write!(f, "technical_skills_comprehensive.{k}"),
            SourceKey::Skill { category, entry } => {
                write!(f, "technical_skills_comprehensive.{category}.{entry}")
            }
            SourceKey::Education(i) => write!(f, "education[{i}]"),
            SourceKey::Certification(i) => write!(f, "certifications[{i}]"),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

//! Role configuration registry: declarative selection, trim and order rules per role.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::models::master::FALLBACK_SUMMARY_KEY;

#[derive(Debug, Error)]
pub enum RoleError {
    #[error("cannot read role configuration {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed role configuration {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown role '{0}'")]
    Unknown(String),

    #[error("role '{role}': {reason}")]
    Invalid { role: String, reason: String },
}

fn default_summary_key() -> String {
    FALLBACK_SUMMARY_KEY.to_string()
}

fn default_max_responsibilities() -> usize {
    4
}

fn default_total_max() -> usize {
    6
}

/// Rules for one role key. List fields keep the author's order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoleConfig {
    #[serde(default = "default_summary_key")]
    pub summary_key: String,
    #[serde(default)]
    pub include_positions: Vec<String>,
    #[serde(default = "default_max_responsibilities")]
    pub max_responsibilities_per_job: usize,
    /// Per-position replacement for `max_responsibilities_per_job`.
    #[serde(default)]
    pub responsibility_overrides: IndexMap<String, usize>,
    #[serde(default)]
    pub include_projects: Vec<String>,
    #[serde(default)]
    pub show_technical_details: bool,
    #[serde(default)]
    pub include_achievements: Vec<String>,
    #[serde(default = "default_total_max")]
    pub total_max: usize,
    #[serde(default)]
    pub include_skill_categories: Vec<String>,
}

impl Default for RoleConfig {
    fn default() -> Self {
        Self {
            summary_key: default_summary_key(),
            include_positions: Vec::new(),
            max_responsibilities_per_job: default_max_responsibilities(),
            responsibility_overrides: IndexMap::new(),
            include_projects: Vec::new(),
            show_technical_details: false,
            include_achievements: Vec::new(),
            total_max: default_total_max(),
            include_skill_categories: Vec::new(),
        }
    }
}

impl RoleConfig {
    /// Responsibility cap for one position, honouring overrides.
    pub fn responsibility_cap(&self, position_key: &str) -> usize {
        self.responsibility_overrides
            .get(position_key)
            .copied()
            .unwrap_or(self.max_responsibilities_per_job)
    }

    fn check(&self, role: &str) -> Result<(), RoleError> {
        let invalid = |reason: String| RoleError::Invalid {
            role: role.to_string(),
            reason,
        };

        if let Some(dup) = first_duplicate(&self.include_positions) {
            return Err(invalid(format!("position '{dup}' listed twice")));
        }
        if let Some(dup) = first_duplicate(&self.include_projects) {
            return Err(invalid(format!("project '{dup}' listed twice")));
        }
        if let Some(dup) = first_duplicate(&self.include_skill_categories) {
            return Err(invalid(format!("skill category '{dup}' listed twice")));
        }
        for key in self.responsibility_overrides.keys() {
            if !self.include_positions.contains(key) {
                return Err(invalid(format!(
                    "override for '{key}' which is not in include_positions"
                )));
            }
        }
        Ok(())
    }
}

fn first_duplicate(items: &[String]) -> Option<&str> {
    items
        .iter()
        .enumerate()
        .find(|(i, item)| items[..*i].contains(item))
        .map(|(_, item)| item.as_str())
}

// ────────────────────────────────────────────────────────────────────────────
// Registry
// ────────────────────────────────────────────────────────────────────────────

/// All role configurations, in file order.
#[derive(Debug, Clone, Default)]
pub struct RoleRegistry {
    roles: IndexMap<String, RoleConfig>,
}

impl RoleRegistry {
    pub fn load(path: &Path) -> Result<Self, RoleError> {
        let raw = std::fs::read_to_string(path).map_err(|source| RoleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let roles: IndexMap<String, RoleConfig> =
            serde_json::from_str(&raw).map_err(|source| RoleError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let registry = Self::from_map(roles)?;

        info!(path = %path.display(), roles = registry.len(), "Role configuration loaded");
        Ok(registry)
    }

    pub fn from_map(roles: IndexMap<String, RoleConfig>) -> Result<Self, RoleError> {
        for (name, cfg) in &roles {
            cfg.check(name)?;
        }
        Ok(Self { roles })
    }

    pub fn get(&self, role: &str) -> Result<&RoleConfig, RoleError> {
        self.roles
            .get(role)
            .ok_or_else(|| RoleError::Unknown(role.to_string()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

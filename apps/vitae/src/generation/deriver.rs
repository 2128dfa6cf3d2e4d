//! Derivation engine: (master store, role rules, length, audience) -> View.
//!
//! Pure with respect to its inputs. The master store is only ever borrowed.

use thiserror::Error;
use tracing::{debug, warn};

use crate::generation::selector::{clip_text, select_keys, trim_lines, Selected};
use crate::models::content::{display_key, Position, SkillSet};
use crate::models::master::{MasterStore, SourceKey, FALLBACK_SUMMARY_KEY};
use crate::models::role::{RoleError, RoleRegistry};
use crate::models::view::{
    sort_chronologically, AdditionalInfo, Audience, EarlierRole, Length, SkillEntry, SkillGroup,
    SourcedText, View, ViewCertification, ViewEducation, ViewPosition, ViewProject,
};

/// Abbreviated summaries keep this many characters before the ellipsis.
pub const ABBREVIATED_SUMMARY_CHARS: usize = 200;
pub const ABBREVIATED_MAX_POSITIONS: usize = 3;
pub const ABBREVIATED_MAX_PROJECTS: usize = 2;
pub const ABBREVIATED_MAX_ACHIEVEMENTS: usize = 3;

#[derive(Debug, Error)]
pub enum DeriveError {
    #[error(transparent)]
    Role(#[from] RoleError),

    #[error("master key missing: {kind} '{key}'")]
    MasterKeyMissing { kind: &'static str, key: String },
}

/// Knobs for `derive`.
#[derive(Debug, Clone, Copy)]
pub struct DeriveOptions {
    /// When true, a missing summary falls back to `comprehensive` and missing
    /// include keys are skipped with a warning. When false both are errors.
    pub allow_fallback: bool,
}

impl Default for DeriveOptions {
    fn default() -> Self {
        Self {
            allow_fallback: true,
        }
    }
}

/// Builds the view for one (role, length, audience).
pub fn derive(
    master: &MasterStore,
    roles: &RoleRegistry,
    role: &str,
    length: Length,
    audience: Audience,
    options: DeriveOptions,
) -> Result<View, DeriveError> {
    let cfg = roles.get(role)?;
    let abbreviated = length.is_abbreviated();

    // Summary
    let summary = pick_summary(master, &cfg.summary_key, role, options)?;
    let summary = if abbreviated {
        SourcedText {
            text: clip_text(&summary.text, ABBREVIATED_SUMMARY_CHARS),
            ..summary
        }
    } else {
        summary
    };

    // Positions: trim to the first N in config order, then display by date.
    let position_limit = abbreviated.then_some(ABBREVIATED_MAX_POSITIONS);
    let positions = select_keys(
        &cfg.include_positions,
        &master.positions,
        position_limit,
        "positions",
    );
    check_missing(&positions.missing, "position", role, options)?;

    let mut view_positions: Vec<ViewPosition> = positions
        .selected
        .iter()
        .map(|hit| make_position(hit, cfg.responsibility_cap(hit.key)))
        .collect();
    sort_chronologically(&mut view_positions);

    // Projects
    let project_limit = abbreviated.then_some(ABBREVIATED_MAX_PROJECTS);
    let projects = select_keys(
        &cfg.include_projects,
        &master.projects,
        project_limit,
        "projects",
    );
    check_missing(&projects.missing, "project", role, options)?;

    let view_projects: Vec<ViewProject> = projects
        .selected
        .iter()
        .map(|hit| ViewProject {
            source: SourceKey::Project(hit.key.to_string()),
            name: hit.item.name.clone(),
            dates: hit.item.dates.clone(),
            description: hit.item.description.clone(),
            technologies: hit.item.technologies.clone(),
            impact: hit.item.impact.clone(),
            technical_details: if cfg.show_technical_details {
                hit.item.technical_details.clone()
            } else {
                Vec::new()
            },
        })
        .collect();

    // Achievements: flattened into one category, capped by total_max.
    let achievement_cap = if abbreviated {
        cfg.total_max.min(ABBREVIATED_MAX_ACHIEVEMENTS)
    } else {
        cfg.total_max
    };
    let mut achievements = Vec::new();
    for category in &cfg.include_achievements {
        let Some(items) = master.achievements.get(category) else {
            check_missing(&[category.as_str()], "achievement category", role, options)?;
            continue;
        };
        for (index, text) in items.iter().enumerate() {
            if achievements.len() >= achievement_cap {
                break;
            }
            achievements.push(SourcedText {
                source: SourceKey::Achievement {
                    category: category.clone(),
                    index,
                },
                text: text.clone(),
            });
        }
    }

    // Skills
    let mut skills = Vec::new();
    for category in &cfg.include_skill_categories {
        let Some(set) = master.skills.get(category) else {
            check_missing(&[category.as_str()], "skill category", role, options)?;
            continue;
        };
        skills.push(make_skill_group(category, set));
    }

    // Education and certifications are not role-selected.
    let education = master
        .education
        .iter()
        .enumerate()
        .map(|(i, e)| ViewEducation {
            source: SourceKey::Education(i),
            degree: e.degree.clone(),
            institution: e.institution.clone(),
            location: e.location.clone(),
            dates: e.dates.clone(),
            details: e.details.clone(),
        })
        .collect();
    let certifications = master
        .certifications
        .iter()
        .enumerate()
        .map(|(i, c)| ViewCertification {
            source: SourceKey::Certification(i),
            name: c.name.clone(),
            issuer: c.issuer.clone(),
            dates: c.dates.clone(),
        })
        .collect();

    let additional = abbreviated.then(|| make_additional(&positions.overflow, master));

    debug!(
        role,
        length = %length,
        audience = %audience,
        positions = view_positions.len(),
        projects = view_projects.len(),
        achievements = achievements.len(),
        excluded = positions.excluded.len() + projects.excluded.len(),
        "View derived"
    );

    Ok(View {
        role: role.to_string(),
        length,
        audience,
        contact: master.contact.clone(),
        summary,
        achievements,
        positions: view_positions,
        projects: view_projects,
        skills,
        education,
        certifications,
        additional,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

fn pick_summary(
    master: &MasterStore,
    key: &str,
    role: &str,
    options: DeriveOptions,
) -> Result<SourcedText, DeriveError> {
    if let Some(text) = master.summaries.get(key) {
        return Ok(SourcedText {
            source: SourceKey::Summary(key.to_string()),
            text: text.clone(),
        });
    }

    let missing = |key: &str| DeriveError::MasterKeyMissing {
        kind: "summary",
        key: key.to_string(),
    };
    if !options.allow_fallback {
        return Err(missing(key));
    }

    let text = master
        .summaries
        .get(FALLBACK_SUMMARY_KEY)
        .ok_or_else(|| missing(FALLBACK_SUMMARY_KEY))?;
    warn!(
        role,
        summary_key = key,
        fallback = FALLBACK_SUMMARY_KEY,
        "Summary missing, using fallback"
    );
    Ok(SourcedText {
        source: SourceKey::Summary(FALLBACK_SUMMARY_KEY.to_string()),
        text: text.clone(),
    })
}

fn check_missing(
    missing: &[&str],
    kind: &'static str,
    role: &str,
    options: DeriveOptions,
) -> Result<(), DeriveError> {
    let Some(first) = missing.first() else {
        return Ok(());
    };
    if !options.allow_fallback {
        return Err(DeriveError::MasterKeyMissing {
            kind,
            key: first.to_string(),
        });
    }
    for key in missing {
        warn!(role, kind, key, "Master key missing, skipped");
    }
    Ok(())
}

fn make_position(hit: &Selected<'_, Position>, cap: usize) -> ViewPosition {
    let p = hit.item;
    ViewPosition {
        source: SourceKey::Position(hit.key.to_string()),
        config_rank: hit.rank,
        title: p.title.clone(),
        employer: p.employer.clone(),
        location: p.location.clone(),
        dates: p.dates.clone(),
        subtitle: p.subtitle.clone().filter(|s| !s.trim().is_empty()),
        responsibilities: trim_lines(&p.responsibilities, cap),
    }
}

fn make_skill_group(category: &str, set: &SkillSet) -> SkillGroup {
    let entries = match set {
        SkillSet::Detailed(map) => map
            .iter()
            .map(|(sub, detail)| SkillEntry {
                source: SourceKey::Skill {
                    category: category.to_string(),
                    entry: sub.clone(),
                },
                name: Some(display_key(sub)),
                detail: detail.trim().to_string(),
            })
            .collect(),
        SkillSet::Listed(list) => list
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                let (name, detail) = match raw.split_once(':') {
                    Some((name, detail)) => (Some(name.trim().to_string()), detail.trim()),
                    None => (None, raw.trim()),
                };
                SkillEntry {
                    source: SourceKey::Skill {
                        category: category.to_string(),
                        entry: i.to_string(),
                    },
                    name,
                    detail: detail.to_string(),
                }
            })
            .collect(),
    };

    SkillGroup {
        source: SourceKey::SkillCategory(category.to_string()),
        name: display_key(category),
        entries,
    }
}

fn make_additional(dropped: &[Selected<'_, Position>], master: &MasterStore) -> AdditionalInfo {
    let mut earlier: Vec<ViewPosition> = dropped.iter().map(|hit| make_position(hit, 0)).collect();
    sort_chronologically(&mut earlier);

    AdditionalInfo {
        earlier_roles: earlier
            .into_iter()
            .map(|p| EarlierRole {
                source: p.source,
                title: p.title,
                employer: p.employer,
                dates: p.dates,
            })
            .collect(),
        website: master
            .contact
            .website
            .clone()
            .filter(|w| !w.trim().is_empty()),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

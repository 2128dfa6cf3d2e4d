//! Typed master entities. Everything here is deserialized once at startup and
//! never mutated afterwards.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::models::dates::DateRange;

/// Contact block. `name` and `email` are required for emission; the validator
/// enforces that, so deserialization stays lenient.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub location: Option<String>,
    /// Header slogan under the name.
    pub tagline: Option<String>,
    /// Map link attached to the header location.
    pub location_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Position {
    pub title: String,
    #[serde(rename = "company", alias = "employer")]
    pub employer: String,
    pub location: String,
    pub dates: DateRange,
    pub subtitle: Option<String>,
    pub responsibilities: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub name: String,
    pub dates: Option<DateRange>,
    pub description: String,
    pub technologies: Vec<String>,
    pub impact: Option<String>,
    pub technical_details: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub degree: String,
    pub institution: String,
    pub location: Option<String>,
    pub dates: Option<DateRange>,
    pub details: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Certification {
    pub name: String,
    pub issuer: Option<String>,
    pub dates: Option<DateRange>,
}

/// A technical skill category: either `sub-key -> detail` pairs or a flat list
/// of `"skill: detail"` strings. Both keep insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SkillSet {
    Detailed(IndexMap<String, String>),
    Listed(Vec<String>),
}

impl SkillSet {
    pub fn len(&self) -> usize {
        match self {
            SkillSet::Detailed(map) => map.len(),
            SkillSet::Listed(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Turns a snake_case master key into a display label: `cloud_native` -> `Cloud Native`.
pub fn display_key(key: &str) -> String {
    key.split(['_', '-'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_reads_company_key() {
        let p: Position = serde_json::from_str(
            r#"{"title":"Engineer","company":"Acme","location":"Austin, TX",
                "dates":"2019 - 2021","responsibilities":["a","b"]}"#,
        )
        .unwrap();
        assert_eq!(p.employer, "Acme");
        assert_eq!(p.responsibilities.len(), 2);
        assert!(p.subtitle.is_none());
    }

    #[test]
    fn test_skill_set_detailed_keeps_order() {
        let s: SkillSet =
            serde_json::from_str(r#"{"zeta":"z","alpha":"a","mid":"m"}"#).unwrap();
        match s {
            SkillSet::Detailed(map) => {
                let keys: Vec<&str> = map.keys().map(String::as_str).collect();
                assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
            }
            SkillSet::Listed(_) => panic!("expected detailed skill set"),
        }
    }

    #[test]
    fn test_skill_set_listed() {
        let s: SkillSet = serde_json::from_str(r#"["Rust: systems", "Go: services"]"#).unwrap();
        assert_eq!(s.len(), 2);
        assert!(matches!(s, SkillSet::Listed(_)));
    }

    #[test]
    fn test_display_key() {
        assert_eq!(display_key("cloud_native"), "Cloud Native");
        assert_eq!(display_key("rust"), "Rust");
        assert_eq!(display_key("ci-cd"), "Ci Cd");
    }

    #[test]
    fn test_contact_missing_fields_default() {
        let c: Contact = serde_json::from_str(r#"{"name":"Ada"}"#).unwrap();
        assert_eq!(c.name, "Ada");
        assert!(c.email.is_empty());
        assert!(c.github.is_none());
    }
}

//! Color-scheme catalogue: eight built-in schemes, optionally layered with
//! `*.json` scheme files from a directory (file stem = scheme key).

use std::collections::BTreeMap;
use std::path::Path;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info};

use crate::layout::font_metrics::StandardFont;
use crate::theme::colors::{ColorRole, Rgb};
use crate::theme::resolver::ThemeError;
use crate::theme::typography::TypeRole;

/// Roles a built-in scheme sets; everything else falls back to role defaults.
const BUILTIN_ROLES: [ColorRole; 6] = [
    ColorRole::Name,
    ColorRole::SectionHeader,
    ColorRole::Company,
    ColorRole::Accent,
    ColorRole::CompetencyHeader,
    ColorRole::Link,
];

#[rustfmt::skip]
const BUILTIN_SCHEMES: &[(&str, [&str; 6])] = &[
    //  key                 name       section    company    accent     comp.hdr   link
    ("corporate_blue",   ["#1F3A5F", "#1F3A5F", "#1F3A5F", "#2E75B6", "#1F3A5F", "#2E75B6"]),
    ("executive_navy",   ["#0B2545", "#13315C", "#13315C", "#134074", "#0B2545", "#134074"]),
    ("forest_green",     ["#1B4332", "#2D6A4F", "#2D6A4F", "#40916C", "#1B4332", "#2D6A4F"]),
    ("burgundy",         ["#641220", "#85182A", "#641220", "#A4133C", "#641220", "#85182A"]),
    ("charcoal",         ["#222222", "#333333", "#333333", "#666666", "#222222", "#444444"]),
    ("deep_teal",        ["#0F4C5C", "#0F4C5C", "#137C8B", "#1A936F", "#0F4C5C", "#137C8B"]),
    ("slate_orange",     ["#2F3E46", "#2F3E46", "#354F52", "#CC5803", "#2F3E46", "#CC5803"]),
    ("monochrome",       ["#000000", "#000000", "#000000", "#333333", "#000000", "#000000"]),
];

// ────────────────────────────────────────────────────────────────────────────
// Scheme spec
// ────────────────────────────────────────────────────────────────────────────

/// Everything one scheme overrides. Unset fields keep the theme's values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemeSpec {
    pub colors: BTreeMap<ColorRole, Rgb>,
    pub sizes: Vec<(TypeRole, u8)>,
    pub base_font: Option<StandardFont>,
    pub bold_font: Option<StandardFont>,
    pub italic_font: Option<StandardFont>,
    pub margin_left: Option<f32>,
    pub margin_right: Option<f32>,
    pub margin_bottom: Option<f32>,
    pub spacing_base_unit: Option<f32>,
}

impl SchemeSpec {
    /// Parses a flat scheme map. Unknown keys are rejected.
    pub fn parse(scheme: &str, entries: &IndexMap<String, Value>) -> Result<Self, ThemeError> {
        let mut spec = SchemeSpec::default();
        let bad = |key: &str, reason: String| ThemeError::BadValue {
            scheme: scheme.to_string(),
            key: key.to_string(),
            reason,
        };

        for (key, value) in entries {
            if let Some(prefix) = key.strip_suffix("_COLOR") {
                let role = ColorRole::from_file_key(prefix).ok_or_else(|| unknown(scheme, key))?;
                let rgb = value
                    .as_str()
                    .and_then(Rgb::from_hex)
                    .ok_or_else(|| bad(key, format!("expected #RRGGBB, got {value}")))?;
                spec.colors.insert(role, rgb);
            } else if let Some(prefix) = key.strip_suffix("_FONT_SIZE") {
                let role = TypeRole::from_file_key(prefix).ok_or_else(|| unknown(scheme, key))?;
                let size = value
                    .as_u64()
                    .filter(|s| (4..=72).contains(s))
                    .ok_or_else(|| bad(key, format!("expected integer points 4-72, got {value}")))?;
                spec.sizes.push((role, size as u8));
            } else {
                match key.as_str() {
                    "BASE_FONT" => spec.base_font = Some(font(value).map_err(|r| bad(key, r))?),
                    "BOLD_FONT" => spec.bold_font = Some(font(value).map_err(|r| bad(key, r))?),
                    "ITALIC_FONT" => {
                        spec.italic_font = Some(font(value).map_err(|r| bad(key, r))?)
                    }
                    "MARGIN_LEFT" => spec.margin_left = Some(points(value).map_err(|r| bad(key, r))?),
                    "MARGIN_RIGHT" => {
                        spec.margin_right = Some(points(value).map_err(|r| bad(key, r))?)
                    }
                    "MARGIN_BOTTOM" => {
                        spec.margin_bottom = Some(points(value).map_err(|r| bad(key, r))?)
                    }
                    "SPACING_BASE_UNIT" => {
                        spec.spacing_base_unit = Some(points(value).map_err(|r| bad(key, r))?)
                    }
                    _ => return Err(unknown(scheme, key)),
                }
            }
        }
        Ok(spec)
    }
}

fn unknown(scheme: &str, key: &str) -> ThemeError {
    ThemeError::UnknownKey {
        scheme: scheme.to_string(),
        key: key.to_string(),
    }
}

fn font(value: &Value) -> Result<StandardFont, String> {
    value
        .as_str()
        .ok_or_else(|| format!("expected a font name, got {value}"))?
        .parse()
}

fn points(value: &Value) -> Result<f32, String> {
    value
        .as_f64()
        .filter(|v| *v >= 0.0 && *v <= 144.0)
        .map(|v| v as f32)
        .ok_or_else(|| format!("expected points 0-144, got {value}"))
}

// ────────────────────────────────────────────────────────────────────────────
// Catalogue
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SchemeCatalogue {
    schemes: IndexMap<String, SchemeSpec>,
}

impl SchemeCatalogue {
    pub fn builtin() -> Self {
        let schemes = BUILTIN_SCHEMES
            .iter()
            .map(|(key, hexes)| {
                let colors = BUILTIN_ROLES
                    .iter()
                    .zip(hexes)
                    .filter_map(|(role, hex)| Rgb::from_hex(hex).map(|rgb| (*role, rgb)))
                    .collect();
                (
                    key.to_string(),
                    SchemeSpec {
                        colors,
                        ..SchemeSpec::default()
                    },
                )
            })
            .collect();
        Self { schemes }
    }

    /// Built-ins plus every `*.json` in `dir`. A file whose stem matches a
    /// built-in replaces it.
    pub fn load_dir(dir: &Path) -> Result<Self, ThemeError> {
        let mut catalogue = Self::builtin();

        let read_err = |source| ThemeError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut files: Vec<_> = std::fs::read_dir(dir)
            .map_err(read_err)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();

        for path in files {
            let Some(key) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            let raw = std::fs::read_to_string(&path).map_err(|source| ThemeError::Io {
                path: path.clone(),
                source,
            })?;
            let entries: IndexMap<String, Value> =
                serde_json::from_str(&raw).map_err(|source| ThemeError::Parse {
                    path: path.clone(),
                    source,
                })?;
            let spec = SchemeSpec::parse(&key, &entries)?;
            debug!(scheme = %key, path = %path.display(), "Scheme file loaded");
            catalogue.schemes.insert(key, spec);
        }

        info!(dir = %dir.display(), schemes = catalogue.len(), "Color schemes loaded");
        Ok(catalogue)
    }

    pub fn get(&self, key: &str) -> Result<&SchemeSpec, ThemeError> {
        self.schemes
            .get(key)
            .ok_or_else(|| ThemeError::UnknownScheme(key.to_string()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.schemes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_entries(value: Value) -> IndexMap<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_eight_builtins() {
        let catalogue = SchemeCatalogue::builtin();
        assert_eq!(catalogue.len(), 8);
        assert_eq!(catalogue.keys().next(), Some("corporate_blue"));
        for key in catalogue.keys() {
            assert_eq!(
                catalogue.get(key).unwrap().colors.len(),
                6,
                "{key} must set all built-in roles"
            );
        }
    }

    #[test]
    fn test_parse_full_scheme() {
        let entries = make_entries(json!({
            "NAME_COLOR": "#112233",
            "LIGHT_TEXT_COLOR": "999999",
            "BODY_FONT_SIZE": 11,
            "BASE_FONT": "Helvetica",
            "MARGIN_LEFT": 50,
            "SPACING_BASE_UNIT": 2.5
        }));
        let spec = SchemeSpec::parse("custom", &entries).unwrap();
        assert_eq!(spec.colors[&ColorRole::Name], Rgb::new(0x11, 0x22, 0x33));
        assert_eq!(spec.colors[&ColorRole::LightText], Rgb::new(0x99, 0x99, 0x99));
        assert_eq!(spec.sizes, vec![(TypeRole::Body, 11)]);
        assert_eq!(spec.base_font, Some(StandardFont::Helvetica));
        assert_eq!(spec.margin_left, Some(50.0));
        assert_eq!(spec.spacing_base_unit, Some(2.5));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let entries = make_entries(json!({"BACKGROUND_COLOR": "#FFFFFF"}));
        let err = SchemeSpec::parse("custom", &entries).unwrap_err();
        assert!(matches!(err, ThemeError::UnknownKey { .. }), "got {err}");

        let entries = make_entries(json!({"PAGE_SIZE": "A4"}));
        assert!(SchemeSpec::parse("custom", &entries).is_err());
    }

    #[test]
    fn test_bad_color_rejected() {
        let entries = make_entries(json!({"NAME_COLOR": "navy"}));
        let err = SchemeSpec::parse("custom", &entries).unwrap_err();
        assert!(matches!(err, ThemeError::BadValue { .. }));
    }

    #[test]
    fn test_bad_font_rejected() {
        let entries = make_entries(json!({"BOLD_FONT": "Papyrus"}));
        assert!(SchemeSpec::parse("custom", &entries).is_err());
    }

    #[test]
    fn test_load_dir_layers_over_builtins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("charcoal.json"),
            r##"{"NAME_COLOR": "#010101"}"##,
        )
        .unwrap();
        std::fs::write(dir.path().join("sunset.json"), r##"{"ACCENT_COLOR": "#FF5500"}"##)
            .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let catalogue = SchemeCatalogue::load_dir(dir.path()).unwrap();
        assert_eq!(catalogue.len(), 9);
        let charcoal = catalogue.get("charcoal").unwrap();
        assert_eq!(charcoal.colors.len(), 1, "file replaces the built-in");
        assert!(catalogue.get("sunset").is_ok());
    }

    #[test]
    fn test_unknown_scheme_lookup() {
        let catalogue = SchemeCatalogue::builtin();
        assert!(matches!(
            catalogue.get("neon"),
            Err(ThemeError::UnknownScheme(_))
        ));
    }
}

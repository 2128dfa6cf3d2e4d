//! Theme resolver: (color scheme, theme name) -> StyleBundle.
//!
//! The bundle is the only source of colors, sizes and spacing for the layout
//! engine and the secondary emitters.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::font_metrics::StandardFont;
use crate::theme::colors::ColorTable;
use crate::theme::page::LayoutConstants;
use crate::theme::schemes::SchemeCatalogue;
use crate::theme::spacing::SpacingScale;
use crate::theme::typography::{TypeSizes, Typography};

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("unknown color scheme '{0}'")]
    UnknownScheme(String),

    #[error("scheme '{scheme}': unknown key '{key}'")]
    UnknownKey { scheme: String, key: String },

    #[error("scheme '{scheme}': bad value for '{key}': {reason}")]
    BadValue {
        scheme: String,
        key: String,
        reason: String,
    },

    #[error("cannot read scheme source {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed scheme file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown theme '{0}' (expected one of: classic, compact, ats)")]
    UnknownTheme(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    Classic,
    Compact,
    Ats,
}

impl fmt::Display for ThemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ThemeName::Classic => "classic",
            ThemeName::Compact => "compact",
            ThemeName::Ats => "ats",
        })
    }
}

impl FromStr for ThemeName {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "classic" => Ok(ThemeName::Classic),
            "compact" => Ok(ThemeName::Compact),
            "ats" => Ok(ThemeName::Ats),
            _ => Err(ThemeError::UnknownTheme(s.to_string())),
        }
    }
}

/// Resolved style for one emission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleBundle {
    pub scheme: String,
    pub theme: ThemeName,
    pub colors: ColorTable,
    pub typography: Typography,
    pub spacing: SpacingScale,
    pub layout: LayoutConstants,
}

impl StyleBundle {
    /// Canonical serialized form; identical inputs give identical bytes.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Resolves a scheme from the catalogue under the given theme.
///
/// Order: theme defaults, then scheme overrides, then the ATS flattening
/// (which wins over scheme colors and italics).
pub fn resolve(
    catalogue: &SchemeCatalogue,
    scheme: &str,
    theme: ThemeName,
) -> Result<StyleBundle, ThemeError> {
    let spec = catalogue.get(scheme)?;

    let (sizes, base_unit, leading) = match theme {
        ThemeName::Classic | ThemeName::Ats => (TypeSizes::classic(), 2.0, 1.2),
        ThemeName::Compact => (TypeSizes::compact(), 1.5, 1.15),
    };

    let mut typography = Typography {
        base_font: spec.base_font.unwrap_or(StandardFont::Helvetica),
        bold_font: spec.bold_font.unwrap_or(StandardFont::HelveticaBold),
        italic_font: spec.italic_font.unwrap_or(StandardFont::HelveticaOblique),
        sizes,
        leading,
    };
    for (role, size) in &spec.sizes {
        typography.sizes.set(*role, *size);
    }

    let mut layout = LayoutConstants::letter();
    if let Some(v) = spec.margin_left {
        layout.margin_left = v;
    }
    if let Some(v) = spec.margin_right {
        layout.margin_right = v;
    }
    if let Some(v) = spec.margin_bottom {
        layout.margin_bottom = v;
    }

    let mut colors = ColorTable::build(|role| spec.colors.get(&role).copied());
    if theme == ThemeName::Ats {
        colors = colors.flattened();
        typography.italic_font = typography.base_font;
    }

    Ok(StyleBundle {
        scheme: scheme.to_string(),
        theme,
        colors,
        typography,
        spacing: SpacingScale::new(spec.spacing_base_unit.unwrap_or(base_unit)),
        layout,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

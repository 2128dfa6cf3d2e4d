use std::path::PathBuf;

use thiserror::Error;

use crate::generation::DeriveError;
use crate::layout::LayoutError;
use crate::render::EmitError;
use crate::theme::ThemeError;
use crate::validation::{IssueKind, ValidationReport};

/// Why one emission failed. Every variant is fatal for its own emission only;
/// the batch runner collects them and keeps going.
///
/// Cloneable so a failed view can be reported against every emission that
/// would have used it.
#[derive(Debug, Clone, Error)]
pub enum EmissionError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Master key missing: {0}")]
    MasterKeyMissing(String),

    #[error("Validation failed: {0}")]
    Validation(ValidationReport),

    #[error("Layout overflow: {0}")]
    LayoutOverflow(String),

    #[error("I/O error on {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("Render error: {0}")]
    Render(String),

    #[error("Cancelled")]
    Cancelled,
}

impl EmissionError {
    /// Stable machine-readable code for reports and logs.
    pub fn code(&self) -> &'static str {
        match self {
            EmissionError::Config(_) => "CONFIG_ERROR",
            EmissionError::MasterKeyMissing(_) => "MASTER_KEY_MISSING",
            EmissionError::Validation(report) => match report.errors.first() {
                Some(issue) if issue.kind == IssueKind::PlaceholderDetected => {
                    "PLACEHOLDER_DETECTED"
                }
                Some(issue) if issue.kind == IssueKind::MissingRequiredField => {
                    "MISSING_REQUIRED_FIELD"
                }
                _ => "VALIDATION_ERROR",
            },
            EmissionError::LayoutOverflow(_) => "LAYOUT_OVERFLOW",
            EmissionError::Io { .. } => "IO_ERROR",
            EmissionError::Render(_) => "RENDER_ERROR",
            EmissionError::Cancelled => "CANCELLED",
        }
    }

    pub fn io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        EmissionError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Logs at the level the failure deserves. Cancellation is expected after
    /// Ctrl-C, so it stays quiet.
    pub fn log(&self, emission: &str) {
        match self {
            EmissionError::Cancelled => tracing::debug!(emission, "Emission cancelled"),
            EmissionError::Io { .. } | EmissionError::Render(_) => {
                tracing::error!(emission, code = self.code(), "Emission failed: {}", self)
            }
            _ => tracing::warn!(emission, code = self.code(), "Emission rejected: {}", self),
        }
    }
}

impl From<DeriveError> for EmissionError {
    fn from(err: DeriveError) -> Self {
        match err {
            DeriveError::Role(e) => EmissionError::Config(e.to_string()),
            DeriveError::MasterKeyMissing { kind, key } => {
                EmissionError::MasterKeyMissing(format!("{kind} '{key}'"))
            }
        }
    }
}

impl From<ThemeError> for EmissionError {
    fn from(err: ThemeError) -> Self {
        EmissionError::Config(err.to_string())
    }
}

impl From<EmitError> for EmissionError {
    fn from(err: EmitError) -> Self {
        match err {
            EmitError::Layout(LayoutError::Overflow { .. }) => {
                EmissionError::LayoutOverflow(err.to_string())
            }
            EmitError::Layout(LayoutError::Cancelled) | EmitError::Cancelled => {
                EmissionError::Cancelled
            }
            other => EmissionError::Render(other.to_string()),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::role::RoleError;
    use crate::validation::validator::Issue;

    fn make_report(kind: IssueKind) -> ValidationReport {
        ValidationReport {
            errors: vec![Issue {
                kind,
                field: "positions[acme].employer".to_string(),
                message: "contains 'Company Name'".to_string(),
            }],
            warnings: vec![],
        }
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(EmissionError::Config("x".into()).code(), "CONFIG_ERROR");
        assert_eq!(EmissionError::Cancelled.code(), "CANCELLED");
        assert_eq!(
            EmissionError::Validation(make_report(IssueKind::PlaceholderDetected)).code(),
            "PLACEHOLDER_DETECTED"
        );
        assert_eq!(
            EmissionError::Validation(make_report(IssueKind::MissingRequiredField)).code(),
            "MISSING_REQUIRED_FIELD"
        );
        assert_eq!(
            EmissionError::Validation(ValidationReport::default()).code(),
            "VALIDATION_ERROR"
        );
    }

    #[test]
    fn test_derive_errors_map_to_kinds() {
        let missing = EmissionError::from(DeriveError::MasterKeyMissing {
            kind: "position",
            key: "ghost".to_string(),
        });
        assert_eq!(missing.code(), "MASTER_KEY_MISSING");
        assert!(missing.to_string().contains("position 'ghost'"));

        let unknown = EmissionError::from(DeriveError::Role(RoleError::Unknown("nope".into())));
        assert_eq!(unknown.code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_emit_errors_map_to_kinds() {
        let overflow = EmissionError::from(EmitError::Layout(LayoutError::Overflow {
            unit: "globex".to_string(),
            needed: 900.0,
            available: 640.0,
        }));
        assert_eq!(overflow.code(), "LAYOUT_OVERFLOW");
        assert!(overflow.to_string().contains("globex"));

        assert_eq!(
            EmissionError::from(EmitError::Layout(LayoutError::Cancelled)).code(),
            "CANCELLED"
        );
        assert_eq!(
            EmissionError::from(EmitError::Xml("bad".into())).code(),
            "RENDER_ERROR"
        );
    }

    #[test]
    fn test_theme_errors_are_config() {
        let err = EmissionError::from(ThemeError::UnknownScheme("mauve".into()));
        assert_eq!(err.code(), "CONFIG_ERROR");
        assert!(err.to_string().contains("mauve"));
    }
}

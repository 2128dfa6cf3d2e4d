// Emission gate: a View must pass here before any emitter sees it.

pub mod placeholders;
pub mod validator;

pub use validator::{validate_view, IssueKind, ValidationReport};

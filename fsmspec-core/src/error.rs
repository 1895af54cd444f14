//! Core error types.

use serde::Serialize;
use thiserror::Error;

/// Owner id rendered when a machine id is missing or not yet linked.
pub const UNDEFINED_ID: &str = "undefined";

/// Classification of a recorded diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    /// Structural or type defect found while building a specification.
    Spec,
    /// Dangling cross-reference found by a `validate()` pass.
    Validation,
}

/// A single diagnostic recorded against a machine or state specification.
///
/// Renders as `[<ownerId>] <detail>`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("[{owner}] {detail}")]
pub struct SpecError {
    kind: DiagnosticKind,
    owner: String,
    detail: String,
}

impl SpecError {
    pub(crate) fn spec(owner: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::Spec,
            owner: owner.into(),
            detail: detail.into(),
        }
    }

    pub(crate) fn validation(owner: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::Validation,
            owner: owner.into(),
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    /// Dotted id of the entity the diagnostic was recorded against.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Message without the owner prefix.
    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Returns true for cross-reference failures.
    pub fn is_validation(&self) -> bool {
        self.kind == DiagnosticKind::Validation
    }

    /// Returns the diagnostic's class name.
    pub fn name(&self) -> &'static str {
        match self.kind {
            DiagnosticKind::Spec => "SpecError",
            DiagnosticKind::Validation => "ValidationError",
        }
    }

    /// Returns an error code suitable for machine-readable reports.
    pub fn error_code(&self) -> &'static str {
        match self.kind {
            DiagnosticKind::Spec => "SPEC_ERROR",
            DiagnosticKind::Validation => "VALIDATION_ERROR",
        }
    }
}

/// Aggregate failure returned by `parse` when any diagnostic was recorded.
#[derive(Debug, Clone, Error)]
#[error("state machine is invalid")]
pub struct ParseError {
    errors: Vec<SpecError>,
}

impl ParseError {
    pub(crate) fn new(errors: Vec<SpecError>) -> Self {
        Self { errors }
    }

    /// All diagnostics, in the order they were collected.
    pub fn errors(&self) -> &[SpecError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<SpecError> {
        self.errors
    }
}

/// Errors from launching a live instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaunchError {
    #[error("spec must be a parsed state machine")]
    NotParsed,
}

/// Returned when a channel name is not one of `event` or `transition`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown notification channel: {0}")]
pub struct UnknownChannel(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes_owner() {
        let err = SpecError::spec(UNDEFINED_ID, "the id must be type of string (got: Undefined)");
        assert_eq!(
            err.to_string(),
            "[undefined] the id must be type of string (got: Undefined)"
        );
        assert_eq!(err.name(), "SpecError");
        assert!(!err.is_validation());
    }

    #[test]
    fn test_validation_classification() {
        let err = SpecError::validation("test", "initial state does not exist");
        assert_eq!(err.kind(), DiagnosticKind::Validation);
        assert_eq!(err.owner(), "test");
        assert_eq!(err.detail(), "initial state does not exist");
        assert_eq!(err.name(), "ValidationError");
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_parse_error_message_is_fixed() {
        let err = ParseError::new(vec![SpecError::validation("m", "initial state does not exist")]);
        assert_eq!(err.to_string(), "state machine is invalid");
        assert_eq!(err.errors().len(), 1);
    }
}

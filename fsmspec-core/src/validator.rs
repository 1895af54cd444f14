//! Turns raw input into a validated [`Specification`].

use crate::error::{ParseError, UNDEFINED_ID};
use crate::spec::MachineSpec;
use serde_json::Value;
use std::ops::Deref;
use std::sync::Arc;

/// A machine specification that passed validation.
///
/// Only [`parse`] produces one, so holding a `Specification` proves every
/// trigger target and the initial state resolve. Cloning shares the
/// underlying spec.
#[derive(Debug, Clone)]
pub struct Specification(Arc<MachineSpec>);

impl Specification {
    /// Returns the shared machine spec.
    pub fn as_arc(&self) -> &Arc<MachineSpec> {
        &self.0
    }
}

impl Deref for Specification {
    type Target = MachineSpec;

    fn deref(&self) -> &MachineSpec {
        &self.0
    }
}

impl TryFrom<&Value> for Specification {
    type Error = ParseError;

    fn try_from(raw: &Value) -> Result<Self, ParseError> {
        parse(raw)
    }
}

/// Builds and validates a machine specification.
///
/// Either every diagnostic is returned in a [`ParseError`], or the spec
/// satisfies all invariants.
pub fn parse(raw: &Value) -> Result<Specification, ParseError> {
    let spec = MachineSpec::from_value(raw);
    let errors = spec.validate();

    if !errors.is_empty() {
        for error in &errors {
            tracing::debug!(kind = error.name(), "{}", error);
        }
        tracing::debug!(
            machine = spec.id().unwrap_or(UNDEFINED_ID),
            errors = errors.len(),
            "state machine rejected"
        );
        return Err(ParseError::new(errors));
    }

    tracing::debug!(
        machine = spec.id().unwrap_or(UNDEFINED_ID),
        states = spec.len(),
        "state machine parsed"
    );
    Ok(Specification(spec))
}

//! State machine specification types.
//!
//! Machines are described with a JSON shape:
//!
//! ```json
//! {
//!   "id": "toggle",
//!   "initial": "deactivated",
//!   "states": {
//!     "deactivated": { "on": { "TOGGLE": "activated" } },
//!     "activated": { "on": { "TOGGLE": "deactivated" } }
//!   }
//! }
//! ```
//!
//! Building a [`MachineSpec`] records structural defects without failing.
//! Cross-references between states are checked by a separate
//! [`MachineSpec::validate`] pass once every state exists.

use crate::error::{SpecError, UNDEFINED_ID};
use crate::value;
use serde::ser::{Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// Map keyed by name that iterates in insertion order.
#[derive(Debug, Clone)]
struct NamedMap<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

impl<V> NamedMap<V> {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Inserts a value. A repeated key keeps its first position.
    fn insert(&mut self, key: String, value: V) {
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    fn get(&self, key: &str) -> Option<&V> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    fn iter(&self) -> impl Iterator<Item = (&String, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.iter().map(|(k, _)| k)
    }

    fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Serialize> Serialize for NamedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// Specification of a single state: its trigger to target mapping.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StateSpec {
    #[serde(skip)]
    name: String,

    /// Trigger name -> target state name.
    #[serde(rename = "on")]
    triggers: NamedMap<String>,

    #[serde(skip)]
    errors: Vec<SpecError>,

    /// Owning machine. Lookup only, never followed for ownership.
    #[serde(skip)]
    machine: Weak<MachineSpec>,
}

impl StateSpec {
    /// Builds a state from its raw definition. The owning machine is linked
    /// by the caller afterwards.
    fn from_value(name: String, raw: &Value) -> Self {
        let mut state = Self {
            name,
            triggers: NamedMap::new(),
            errors: Vec::new(),
            machine: Weak::new(),
        };

        let on = raw.get("on").filter(|on| !value::is_falsy(on));
        match on {
            None => {}
            Some(on) if value::is_object_like(on) => {
                for (trigger, target) in value::entries(on) {
                    match target {
                        Value::String(target) => {
                            state.triggers.insert(trigger, target.clone());
                        }
                        other => {
                            let detail = format!(
                                "the target of event \"{}\" must be type of string (got: {})",
                                trigger,
                                value::type_name(Some(other))
                            );
                            state.errors.push(SpecError::spec(state.id(), detail));
                        }
                    }
                }
            }
            Some(other) => {
                let detail = format!(
                    "events ({}.on) must be defined as an object (got: {})",
                    state.name,
                    value::type_name(Some(other))
                );
                state.errors.push(SpecError::spec(state.id(), detail));
            }
        }

        state
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dotted id `<machineId>.<stateName>`.
    pub fn id(&self) -> String {
        format!("{}.{}", self.machine_id(), self.name)
    }

    fn machine_id(&self) -> String {
        self.machine
            .upgrade()
            .map(|machine| machine.display_id().to_string())
            .unwrap_or_else(|| UNDEFINED_ID.to_string())
    }

    /// Returns true if the trigger is handled by this state.
    pub fn has_event(&self, trigger: &str) -> bool {
        self.triggers.contains_key(trigger)
    }

    /// Looks up the target state for a trigger.
    pub fn target(&self, trigger: &str) -> Option<&str> {
        self.triggers.get(trigger).map(String::as_str)
    }

    /// Iterates over `(trigger, target)` pairs.
    pub fn triggers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.triggers
            .iter()
            .map(|(trigger, target)| (trigger.as_str(), target.as_str()))
    }

    /// Diagnostics recorded while building this state.
    pub fn errors(&self) -> &[SpecError] {
        &self.errors
    }

    /// Returns the construction diagnostics followed by one validation
    /// error per trigger whose target is not a state of the owning machine.
    pub fn validate(&self) -> Vec<SpecError> {
        let mut errors = self.errors.clone();
        let machine = self.machine.upgrade();

        for (trigger, target) in self.triggers.iter() {
            let exists = machine
                .as_ref()
                .is_some_and(|machine| machine.has_state(target));
            if !exists {
                let detail = format!(
                    "target \"{}\" of event \"{}\" does not exist in statemachine \"{}\"",
                    target,
                    trigger,
                    self.machine_id()
                );
                errors.push(SpecError::validation(self.id(), detail));
            }
        }

        errors
    }
}

/// Specification of a whole machine.
///
/// Always handed out behind an `Arc`, which the states point back into.
#[derive(Debug, serde::Serialize)]
pub struct MachineSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    initial: Option<String>,

    states: NamedMap<StateSpec>,

    #[serde(skip)]
    errors: Vec<SpecError>,
}

impl MachineSpec {
    /// Builds a machine from raw input, recording structural defects.
    ///
    /// The result is not validated yet; see [`MachineSpec::validate`].
    pub fn from_value(raw: &Value) -> Arc<Self> {
        Arc::new_cyclic(|this| Self::build(raw, this))
    }

    fn build(raw: &Value, this: &Weak<Self>) -> Self {
        let mut spec = Self {
            id: None,
            initial: None,
            states: NamedMap::new(),
            errors: Vec::new(),
        };

        if !value::is_object_like(raw) {
            let detail = format!(
                "a state machine must be an object (got: {})",
                value::type_name(Some(raw))
            );
            spec.push_error(detail);
            return spec;
        }

        match raw.get("id") {
            Some(Value::String(id)) => spec.id = Some(id.clone()),
            other => spec.push_error(format!(
                "the id must be type of string (got: {})",
                value::type_name(other)
            )),
        }

        match raw.get("initial") {
            Some(Value::String(initial)) => spec.initial = Some(initial.clone()),
            other => spec.push_error(format!(
                "the initial state must be type of string (got: {})",
                value::type_name(other)
            )),
        }

        match raw.get("states") {
            Some(states) if value::is_object_like(states) => {
                for (name, raw_state) in value::entries(states) {
                    if !value::is_object_like(raw_state) {
                        spec.push_error(format!(
                            "state \"{}\" must be defined as an object (got: {})",
                            name,
                            value::type_name(Some(raw_state))
                        ));
                        continue;
                    }

                    let mut state = StateSpec::from_value(name.clone(), raw_state);
                    state.machine = this.clone();
                    spec.states.insert(name, state);
                }
            }
            other => spec.push_error(format!(
                "states must be defined as an object (got: {})",
                value::type_name(other)
            )),
        }

        spec
    }

    fn push_error(&mut self, detail: String) {
        let owner = self.display_id().to_string();
        self.errors.push(SpecError::spec(owner, detail));
    }

    /// Machine identifier, if one was given.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Id used as diagnostic owner prefix.
    pub(crate) fn display_id(&self) -> &str {
        self.id.as_deref().unwrap_or(UNDEFINED_ID)
    }

    /// Name of the initial state, if one was given.
    pub fn initial(&self) -> Option<&str> {
        self.initial.as_deref()
    }

    /// Returns true if the given state exists.
    pub fn has_state(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    pub fn state(&self, name: &str) -> Option<&StateSpec> {
        self.states.get(name)
    }

    pub fn states(&self) -> impl Iterator<Item = &StateSpec> {
        self.states.values()
    }

    pub fn state_names(&self) -> Vec<&str> {
        self.states.keys().map(String::as_str).collect()
    }

    /// Returns all triggers handled by the given state.
    pub fn events_from(&self, state: &str) -> Vec<&str> {
        self.states
            .get(state)
            .map(|state| state.triggers().map(|(trigger, _)| trigger).collect())
            .unwrap_or_default()
    }

    /// Number of states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Diagnostics recorded while building the machine itself.
    pub fn errors(&self) -> &[SpecError] {
        &self.errors
    }

    /// Runs the cross-reference pass.
    ///
    /// Returns the machine's own diagnostics, then each state's diagnostics
    /// in state order, then the initial-state check. Does not mutate.
    pub fn validate(&self) -> Vec<SpecError> {
        let mut errors = self.errors.clone();

        for state in self.states.values() {
            errors.extend(state.validate());
        }

        let initial_exists = self
            .initial
            .as_deref()
            .is_some_and(|initial| self.has_state(initial));
        if !initial_exists {
            errors.push(SpecError::validation(
                self.display_id(),
                "initial state does not exist",
            ));
        }

        errors
    }
}

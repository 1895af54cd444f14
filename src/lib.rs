//! fsmspec - finite state machine specifications
//!
//! Validates declarative machine definitions into immutable specifications
//! and runs live instances whose transitions listeners can veto.
//!
//! ```
//! use fsmspec::{json, launch, parse, Channel, NotificationKind, Signal};
//!
//! let spec = parse(&json!({
//!     "id": "toggle",
//!     "initial": "deactivated",
//!     "states": {
//!         "deactivated": { "on": { "TOGGLE": "activated" } },
//!         "activated": { "on": { "TOGGLE": "deactivated" } }
//!     }
//! }))?;
//!
//! let mut machine = launch(&spec)?;
//! assert_eq!(machine.send("TOGGLE"), "activated");
//!
//! machine.on(Channel::Event, |signal| {
//!     if let Signal::Event(n) = signal {
//!         if n.kind() == NotificationKind::Transition {
//!             n.stop();
//!         }
//!     }
//! });
//! assert_eq!(machine.send("TOGGLE"), "activated");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod logging;

pub use fsmspec_core::*;
pub use serde_json::{json, Value};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn toggle() -> Value {
        json!({
            "id": "toggleMachine",
            "initial": "deactivated",
            "states": {
                "activated": { "on": { "TOGGLE": "deactivated" } },
                "deactivated": { "on": { "TOGGLE": "activated" } }
            }
        })
    }

    #[test]
    fn test_minimal_machine_parses() {
        let spec = parse(&json!({
            "id": "test",
            "initial": "deactivated",
            "states": { "deactivated": {} }
        }));
        assert!(spec.is_ok());
    }

    #[test]
    fn test_missing_id_is_first_error() {
        let err = parse(&json!({
            "initial": "deactivated",
            "states": { "deactivated": {} }
        }))
        .unwrap_err();

        assert_eq!(err.to_string(), "state machine is invalid");
        assert_eq!(
            err.errors()[0].to_string(),
            "[undefined] the id must be type of string (got: Undefined)"
        );
    }

    #[test]
    fn test_toggle_and_veto() {
        let spec = parse(&toggle()).unwrap();

        let mut machine = launch(&spec).unwrap();
        assert_eq!(machine.state(), "deactivated");
        machine.send("TOGGLE");
        assert_eq!(machine.state(), "activated");

        let mut vetoed = launch(&spec).unwrap();
        vetoed.on(Channel::Event, |signal| {
            if let Signal::Event(n) = signal {
                if n.kind() == NotificationKind::Transition {
                    n.stop();
                }
            }
        });
        vetoed.send("TOGGLE");
        assert_eq!(vetoed.state(), "deactivated");
    }

    #[test]
    fn test_unknown_trigger() {
        let mut machine = launch(&parse(&toggle()).unwrap()).unwrap();
        let events = Arc::new(AtomicUsize::new(0));
        let transitions = Arc::new(AtomicUsize::new(0));

        let e = events.clone();
        machine.on(Channel::Event, move |_| {
            e.fetch_add(1, Ordering::SeqCst);
        });
        let t = transitions.clone();
        machine.on(Channel::Transition, move |_| {
            t.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(machine.send("UNKNOWN_TRIGGER"), "deactivated");
        assert_eq!(events.load(Ordering::SeqCst), 1);
        assert_eq!(transitions.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_spec_shared_across_threads() {
        let spec = parse(&toggle()).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let spec = spec.clone();
                std::thread::spawn(move || {
                    let mut machine = launch(&spec).unwrap();
                    for _ in 0..=i {
                        machine.send("TOGGLE");
                    }
                    machine.state().to_string()
                })
            })
            .collect();

        let states: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(
            states,
            vec!["activated", "deactivated", "activated", "deactivated"]
        );
    }

    #[test]
    fn test_logging_init_is_repeatable() {
        logging::init();
        logging::init();
    }
}

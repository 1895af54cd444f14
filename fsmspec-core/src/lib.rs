//! # fsmspec-core
//!
//! Finite state machine specifications and their live instances.
//!
//! This crate provides:
//! - Validation of raw machine definitions into immutable specifications
//! - Aggregated diagnostics for every defect found
//! - Live machines with synchronous, vetoable transitions
//! - A pluggable notification bus

pub mod bus;
pub mod config;
pub mod error;
pub mod machine;
pub mod spec;
pub mod validator;
pub mod value;

pub use bus::{Channel, Handler, ListenerBus, ListenerId, NotificationBus, Signal};
pub use config::{BusConfig, ConfigError, EngineConfig};
pub use error::{DiagnosticKind, LaunchError, ParseError, SpecError, UnknownChannel};
pub use machine::{launch, launch_with_config, Notification, NotificationKind, StateMachine};
pub use spec::{MachineSpec, StateSpec};
pub use validator::{parse, Specification};

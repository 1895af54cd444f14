//! Live machine instances and the transition protocol.
//!
//! [`StateMachine::send`] runs fully synchronously:
//!
//! 1. An unknown trigger publishes an `event`-kind [`Notification`] on
//!    [`Channel::Event`] and leaves the state alone.
//! 2. A known trigger publishes a `transition`-kind notification on
//!    [`Channel::Event`]. Once every listener ran, the transition is
//!    committed unless one of them called [`Notification::stop`]. A
//!    committed transition is then published on [`Channel::Transition`].

use crate::bus::{Channel, ListenerBus, ListenerId, NotificationBus, Signal};
use crate::config::EngineConfig;
use crate::error::LaunchError;
use crate::validator::Specification;
use serde::Serialize;
use std::cell::Cell;
use std::fmt;

/// Kind of a notification published on the event channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// The trigger is not handled by the current state.
    Event,
    /// The trigger would move the machine; may be vetoed.
    Transition,
}

/// Notification handed to every event-channel listener in turn.
#[derive(Debug)]
pub struct Notification {
    kind: NotificationKind,
    trigger: String,
    from: Option<String>,
    to: Option<String>,
    stopped: Cell<bool>,
}

impl Notification {
    fn event(trigger: &str) -> Self {
        Self {
            kind: NotificationKind::Event,
            trigger: trigger.to_string(),
            from: None,
            to: None,
            stopped: Cell::new(false),
        }
    }

    fn transition(trigger: &str, from: &str, to: &str) -> Self {
        Self {
            kind: NotificationKind::Transition,
            trigger: trigger.to_string(),
            from: Some(from.to_string()),
            to: Some(to.to_string()),
            stopped: Cell::new(false),
        }
    }

    pub fn kind(&self) -> NotificationKind {
        self.kind
    }

    /// The trigger name passed to `send`.
    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    /// Current state, for transition notifications.
    pub fn from(&self) -> Option<&str> {
        self.from.as_deref()
    }

    /// Pending target state, for transition notifications.
    pub fn to(&self) -> Option<&str> {
        self.to.as_deref()
    }

    /// Vetoes the pending transition. No effect on `event` notifications.
    pub fn stop(&self) {
        self.stopped.set(true);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.get()
    }
}

/// A live instance of a validated machine.
pub struct StateMachine<B = ListenerBus> {
    spec: Specification,
    bus: B,
    instance_id: String,
    state: String,
}

impl<B: NotificationBus> StateMachine<B> {
    /// Launches an instance that publishes through the given bus.
    ///
    /// A `Specification` always resolves its initial state, so
    /// `LaunchError::NotParsed` is a defensive guard only.
    pub fn with_bus(spec: &Specification, bus: B) -> Result<Self, LaunchError> {
        let initial = spec
            .initial()
            .filter(|initial| spec.has_state(initial))
            .ok_or(LaunchError::NotParsed)?;

        let instance_id = format!("inst-{}", uuid::Uuid::new_v4());
        tracing::debug!(
            instance = %instance_id,
            machine = spec.id().unwrap_or_default(),
            state = initial,
            "machine launched"
        );

        Ok(Self {
            state: initial.to_string(),
            spec: spec.clone(),
            bus,
            instance_id,
        })
    }

    /// Current state name.
    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn spec(&self) -> &Specification {
        &self.spec
    }

    /// Unique id of this instance, used in log output.
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Returns true if the current state handles the trigger.
    pub fn can(&self, trigger: &str) -> bool {
        self.spec
            .state(&self.state)
            .is_some_and(|state| state.has_event(trigger))
    }

    /// Processes a trigger and returns the resulting state.
    pub fn send(&mut self, trigger: &str) -> &str {
        let target = self
            .spec
            .state(&self.state)
            .and_then(|state| state.target(trigger))
            .map(str::to_string);

        let Some(target) = target else {
            let notification = Notification::event(trigger);
            tracing::debug!(
                instance = %self.instance_id,
                state = %self.state,
                trigger,
                "trigger not handled"
            );
            self.publish(Channel::Event, &Signal::Event(&notification));
            return &self.state;
        };

        let notification = Notification::transition(trigger, &self.state, &target);
        self.publish(Channel::Event, &Signal::Event(&notification));

        if notification.is_stopped() {
            tracing::debug!(
                instance = %self.instance_id,
                from = %self.state,
                to = %target,
                trigger,
                "transition vetoed"
            );
            return &self.state;
        }

        let from = std::mem::replace(&mut self.state, target);
        tracing::debug!(
            instance = %self.instance_id,
            from = %from,
            to = %self.state,
            trigger,
            "transition committed"
        );
        self.bus.publish(
            Channel::Transition,
            &Signal::Transition {
                from: &from,
                to: &self.state,
            },
        );

        &self.state
    }

    fn publish(&mut self, channel: Channel, signal: &Signal<'_>) {
        tracing::trace!(
            instance = %self.instance_id,
            channel = %channel,
            listeners = self.bus.listener_count(channel),
            "publishing notification"
        );
        self.bus.publish(channel, signal);
    }

    /// Subscribes a listener to a channel.
    pub fn on<F>(&mut self, channel: Channel, handler: F) -> ListenerId
    where
        F: FnMut(&Signal<'_>) + Send + 'static,
    {
        self.bus.subscribe(channel, Box::new(handler))
    }

    /// Subscribes a listener that is removed after its first invocation.
    pub fn once<F>(&mut self, channel: Channel, handler: F) -> ListenerId
    where
        F: FnMut(&Signal<'_>) + Send + 'static,
    {
        self.bus.subscribe_once(channel, Box::new(handler))
    }

    /// Removes a listener. Returns true if it was still subscribed.
    pub fn remove_listener(&mut self, channel: Channel, id: ListenerId) -> bool {
        self.bus.unsubscribe(channel, id)
    }

    pub fn remove_all_listeners(&mut self, channel: Channel) {
        self.bus.clear(channel);
    }

    pub fn listener_count(&self, channel: Channel) -> usize {
        self.bus.listener_count(channel)
    }
}

impl<B: fmt::Debug> fmt::Debug for StateMachine<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("instance_id", &self.instance_id)
            .field("machine", &self.spec.id())
            .field("state", &self.state)
            .field("bus", &self.bus)
            .finish()
    }
}

/// Launches a live instance with default configuration.
///
/// Only a [`Specification`] returned by [`parse`](crate::parse) can be
/// launched; a raw spec does not type-check:
///
/// ```compile_fail
/// let raw = fsmspec_core::MachineSpec::from_value(&serde_json::json!({}));
/// let _ = fsmspec_core::launch(&raw);
/// ```
pub fn launch(spec: &Specification) -> Result<StateMachine, LaunchError> {
    launch_with_config(spec, &EngineConfig::default())
}

/// Launches a live instance using the given configuration.
pub fn launch_with_config(
    spec: &Specification,
    config: &EngineConfig,
) -> Result<StateMachine, LaunchError> {
    StateMachine::with_bus(spec, ListenerBus::new(&config.bus))
}

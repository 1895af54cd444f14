//! Synchronous notification channels for live machines.

use crate::config::BusConfig;
use crate::error::UnknownChannel;
use crate::machine::Notification;
use std::fmt;
use std::str::FromStr;

/// Channel a listener subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Every trigger sent, before any transition is applied.
    Event,
    /// Committed transitions only.
    Transition,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Event => "event",
            Channel::Transition => "transition",
        }
    }

    fn index(self) -> usize {
        match self {
            Channel::Event => 0,
            Channel::Transition => 1,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = UnknownChannel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "event" => Ok(Channel::Event),
            "transition" => Ok(Channel::Transition),
            other => Err(UnknownChannel(other.to_string())),
        }
    }
}

/// Payload delivered to listeners.
#[derive(Debug, Clone, Copy)]
pub enum Signal<'a> {
    /// Delivered on [`Channel::Event`]. Listeners may veto a pending
    /// transition through [`Notification::stop`].
    Event(&'a Notification),
    /// Delivered on [`Channel::Transition`] after the state changed.
    Transition { from: &'a str, to: &'a str },
}

/// Boxed listener callback.
pub type Handler = Box<dyn FnMut(&Signal<'_>) + Send>;

/// Identifies a subscription for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Publish/subscribe primitive a machine emits through.
///
/// Implementations must invoke handlers synchronously, in subscription order.
pub trait NotificationBus {
    /// Adds a listener that stays until removed.
    fn subscribe(&mut self, channel: Channel, handler: Handler) -> ListenerId;

    /// Adds a listener that is removed after its first invocation.
    fn subscribe_once(&mut self, channel: Channel, handler: Handler) -> ListenerId;

    /// Removes a listener. Returns true if it was still subscribed.
    fn unsubscribe(&mut self, channel: Channel, id: ListenerId) -> bool;

    /// Delivers a signal to every listener of the channel.
    fn publish(&mut self, channel: Channel, signal: &Signal<'_>);

    fn listener_count(&self, channel: Channel) -> usize;

    /// Removes every listener of the channel.
    fn clear(&mut self, channel: Channel);
}

struct Listener {
    id: ListenerId,
    channel: Channel,
    once: bool,
    handler: Handler,
}

/// Default in-process bus.
pub struct ListenerBus {
    listeners: Vec<Listener>,
    next_id: u64,
    max_listeners: usize,
    warned: [bool; 2],
}

impl ListenerBus {
    /// Creates a bus with the given configuration.
    pub fn new(config: &BusConfig) -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
            max_listeners: config.max_listeners,
            warned: [false; 2],
        }
    }

    fn add(&mut self, channel: Channel, handler: Handler, once: bool) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push(Listener {
            id,
            channel,
            once,
            handler,
        });

        let count = self.listener_count(channel);
        if self.max_listeners > 0 && count > self.max_listeners && !self.warned[channel.index()] {
            self.warned[channel.index()] = true;
            tracing::warn!(
                channel = %channel,
                count,
                max = self.max_listeners,
                "possible listener leak: more listeners than configured maximum"
            );
        }

        id
    }
}

impl Default for ListenerBus {
    fn default() -> Self {
        Self::new(&BusConfig::default())
    }
}

impl fmt::Debug for ListenerBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerBus")
            .field("event", &self.listener_count(Channel::Event))
            .field("transition", &self.listener_count(Channel::Transition))
            .field("max_listeners", &self.max_listeners)
            .finish()
    }
}

impl NotificationBus for ListenerBus {
    fn subscribe(&mut self, channel: Channel, handler: Handler) -> ListenerId {
        self.add(channel, handler, false)
    }

    fn subscribe_once(&mut self, channel: Channel, handler: Handler) -> ListenerId {
        self.add(channel, handler, true)
    }

    fn unsubscribe(&mut self, channel: Channel, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners
            .retain(|listener| !(listener.id == id && listener.channel == channel));
        self.listeners.len() != before
    }

    fn publish(&mut self, channel: Channel, signal: &Signal<'_>) {
        self.listeners.retain_mut(|listener| {
            if listener.channel != channel {
                return true;
            }
            (listener.handler)(signal);
            !listener.once
        });
    }

    fn listener_count(&self, channel: Channel) -> usize {
        self.listeners
            .iter()
            .filter(|listener| listener.channel == channel)
            .count()
    }

    fn clear(&mut self, channel: Channel) {
        self.listeners.retain(|listener| listener.channel != channel);
    }
}

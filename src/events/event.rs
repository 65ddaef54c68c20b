//! # Typed events delivered to a supervisor's mailbox.
//!
//! A supervisor is a state machine driven by an external dispatcher that
//! delivers one [`Event`] at a time. Events fall into four groups:
//! - **Control**: `Start` and `Stop`, the lifecycle commands.
//! - **Transport completions**: [`Connected`], [`NotConnected`],
//!   [`Listening`], [`NotListening`], [`Accepted`], [`Closed`],
//!   [`Abandoned`] — the deferred results of earlier fire-and-forget
//!   transport requests.
//! - **Timers**: `RetryTimer` (T1) and `CloseTimer` (T2), injected by the
//!   supervisor's own one-shot timers.
//! - **Payload**: [`Payload`], arbitrary application traffic relayed
//!   transparently while established.
//!
//! [`Handle`] is the opaque actor address of the enclosing framework:
//! equality and use as a map key are the only operations supervisors need.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use bytes::Bytes;

use crate::endpoint::Endpoint;

/// Global counter backing [`Handle::next`].
static HANDLE_SEQ: AtomicU64 = AtomicU64::new(1);

/// Opaque address of a peer, listener, or any other actor.
///
/// Handles are compared and used as map keys; nothing else. A transport
/// implementation mints them with [`Handle::next`] when a connection or
/// listener comes into existence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u64);

impl Handle {
    /// Mints a fresh, process-unique handle.
    pub fn next() -> Self {
        Handle(HANDLE_SEQ.fetch_add(1, AtomicOrdering::Relaxed))
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque session identifier supplied at supervisor construction and echoed
/// back in [`Connected`], [`Listening`] and [`Accepted`] events.
pub type Tag = Arc<str>;

/// Outbound connect succeeded. Return address is the new peer.
#[derive(Clone, Debug)]
pub struct Connected {
    /// The connected peer.
    pub peer: Handle,
    /// Session tag echoed from the connect request.
    pub tag: Tag,
}

/// Outbound connect failed.
#[derive(Clone, Debug)]
pub struct NotConnected {
    /// Why the attempt failed.
    pub reason: Arc<str>,
    /// Session tag echoed from the connect request.
    pub tag: Tag,
}

/// Bind/listen succeeded. Return address is the listener.
#[derive(Clone, Debug)]
pub struct Listening {
    /// The bound listener.
    pub listener: Handle,
    /// Session tag echoed from the listen request.
    pub tag: Tag,
}

/// Bind/listen failed.
#[derive(Clone, Debug)]
pub struct NotListening {
    /// Why the attempt failed.
    pub reason: Arc<str>,
    /// Session tag echoed from the listen request.
    pub tag: Tag,
}

/// A listener accepted an inbound peer. Return address is that peer.
#[derive(Clone, Debug)]
pub struct Accepted {
    /// The accepted peer.
    pub peer: Handle,
    /// Remote endpoint of the peer.
    pub remote: Endpoint,
    /// Session tag echoed from the listen request.
    pub tag: Tag,
}

/// A connection ended cleanly (remote or local close).
#[derive(Clone, Debug)]
pub struct Closed {
    /// The peer that closed.
    pub peer: Handle,
    /// Optional value carried by the closure.
    pub value: Option<Bytes>,
}

/// A connection dropped uncleanly (peer lost).
#[derive(Clone, Debug)]
pub struct Abandoned {
    /// The peer that was lost.
    pub peer: Handle,
    /// Why the connection dropped.
    pub reason: Arc<str>,
}

/// Arbitrary application traffic, relayed transparently while established.
#[derive(Clone, Debug)]
pub struct Payload {
    /// Return address of the sender.
    pub from: Handle,
    /// Opaque body; supervisors never parse it.
    pub body: Bytes,
}

/// One event delivered to a supervisor's mailbox.
#[derive(Clone, Debug)]
pub enum Event {
    /// Begin supervising (first connect/listen request).
    Start,
    /// Shut down; honoured in every state.
    Stop,
    /// Transport: outbound connect succeeded.
    Connected(Connected),
    /// Transport: outbound connect failed.
    NotConnected(NotConnected),
    /// Transport: bind/listen succeeded.
    Listening(Listening),
    /// Transport: bind/listen failed.
    NotListening(NotListening),
    /// Transport: listener accepted an inbound peer.
    Accepted(Accepted),
    /// Transport: connection ended cleanly.
    Closed(Closed),
    /// Transport: connection dropped uncleanly.
    Abandoned(Abandoned),
    /// Application traffic.
    Message(Payload),
    /// T1 fired: the retry delay elapsed.
    RetryTimer,
    /// T2 fired: the graceful-close grace period elapsed.
    CloseTimer,
}

impl Event {
    /// Short stable label (snake_case) for logs and traces.
    pub fn as_label(&self) -> &'static str {
        match self {
            Event::Start => "start",
            Event::Stop => "stop",
            Event::Connected(_) => "connected",
            Event::NotConnected(_) => "not_connected",
            Event::Listening(_) => "listening",
            Event::NotListening(_) => "not_listening",
            Event::Accepted(_) => "accepted",
            Event::Closed(_) => "closed",
            Event::Abandoned(_) => "abandoned",
            Event::Message(_) => "message",
            Event::RetryTimer => "retry_timer",
            Event::CloseTimer => "close_timer",
        }
    }
}

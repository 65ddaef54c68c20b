//! # Upward notifications: the supervisor-to-parent contract.
//!
//! A supervisor reports to its parent through exactly five deliveries:
//! - [`ServiceUp`] — once per successful connect/accept, carrying the raw
//!   [`Connected`]/[`Accepted`] event;
//! - [`ServiceDown`] — once per termination of an established connection,
//!   carrying the raw [`Closed`]/[`Abandoned`] event;
//! - [`ServiceNotUp`] — once per failed connect/listen attempt that did not
//!   exhaust the retry budget, carrying the raw failure event;
//! - relayed [`Payload`] traffic while established;
//! - a final [`Notice::Completed`] with the supervisor's [`Outcome`].
//!
//! These are idempotent descriptions of observed events. The supervisor
//! hands them to the parent and retains no reference; parents may treat
//! them as immutable. The peer handle travels embedded in the wrapped event
//! (standing in for the source framework's return-address channel), so the
//! parent can reply to the peer directly.

use crate::events::event::{
    Abandoned, Accepted, Closed, Connected, Handle, Listening, NotConnected, NotListening, Payload,
};

/// A connection or accept succeeded.
#[derive(Clone, Debug)]
pub enum ServiceUp {
    /// Client supervisor: outbound connect completed.
    Connected(Connected),
    /// Listener supervisor: inbound peer accepted.
    Accepted(Accepted),
}

impl ServiceUp {
    /// The peer this notification is about (its return address).
    pub fn peer(&self) -> Handle {
        match self {
            ServiceUp::Connected(c) => c.peer,
            ServiceUp::Accepted(a) => a.peer,
        }
    }
}

/// An established connection terminated.
#[derive(Clone, Debug)]
pub enum ServiceDown {
    /// Clean close.
    Closed(Closed),
    /// Unclean loss.
    Abandoned(Abandoned),
}

impl ServiceDown {
    /// The peer this notification is about.
    pub fn peer(&self) -> Handle {
        match self {
            ServiceDown::Closed(c) => c.peer,
            ServiceDown::Abandoned(a) => a.peer,
        }
    }
}

/// A connect/listen attempt failed; the supervisor is backing off.
#[derive(Clone, Debug)]
pub enum ServiceNotUp {
    /// Client supervisor: connect attempt failed.
    NotConnected(NotConnected),
    /// Listener supervisor: bind/listen attempt failed.
    NotListening(NotListening),
}

/// Final result of a supervisor, delivered once via [`Notice::Completed`].
#[derive(Clone, Debug)]
pub enum Outcome {
    /// Stopped, gave up retrying, or was forced out by the close timeout.
    Aborted,
    /// A clean close ended the client supervisor; carries the closure value.
    Closed(Closed),
}

impl Outcome {
    /// True for [`Outcome::Aborted`].
    #[inline]
    pub fn is_aborted(&self) -> bool {
        matches!(self, Outcome::Aborted)
    }
}

/// One delivery from a supervisor to its parent.
#[derive(Clone, Debug)]
pub enum Notice {
    /// Connection/accept succeeded.
    Up(ServiceUp),
    /// Established connection terminated.
    Down(ServiceDown),
    /// Connect/listen attempt failed (retry pending).
    NotUp(ServiceNotUp),
    /// Listener only: the listen completed; passthrough of the raw event.
    Listening(Listening),
    /// Relayed application traffic; `from` is the originating peer.
    Message(Payload),
    /// The supervisor finished; no further deliveries follow.
    Completed(Outcome),
}

impl Notice {
    /// Short stable label (snake_case) for logs and traces.
    pub fn as_label(&self) -> &'static str {
        match self {
            Notice::Up(_) => "service_up",
            Notice::Down(_) => "service_down",
            Notice::NotUp(_) => "service_not_up",
            Notice::Listening(_) => "listening",
            Notice::Message(_) => "message",
            Notice::Completed(_) => "completed",
        }
    }
}

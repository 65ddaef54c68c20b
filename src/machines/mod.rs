//! Supervision state machines.
//!
//! The machines are pure: [`Machine::handle`] consumes one event and returns
//! the effects to perform, without touching I/O, timers, or clocks. The
//! async driver in [`core`](crate::core) executes those effects, which keeps
//! every transition deterministic and unit-testable.
//!
//! - [`ClientSupervisor`]: one logical outbound connection (connect,
//!   reconnect on loss, orderly shutdown).
//! - [`ListenerSupervisor`]: one listening endpoint plus the set of peers
//!   accepted through it.

mod action;
mod client;
mod listener;

pub use action::Action;
pub use client::ClientSupervisor;
pub use listener::ListenerSupervisor;

/// Current phase of a supervisor.
///
/// Exactly one state holds at a time; transitions are restricted to the
/// tables implemented by each machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// Constructed; waiting for `Start`.
    Initial,
    /// Client: a connect request is in flight.
    Connecting,
    /// Listener: a listen request is in flight.
    Starting,
    /// Connected/listening; payload traffic relays transparently.
    Established,
    /// Backing off; T1 armed, waiting to retry.
    Pausing,
    /// Orderly shutdown in progress; T2 armed.
    Closing,
    /// Terminal; the completion notice has been issued.
    Completed,
}

/// A pure supervision state machine driven by mailbox events.
pub trait Machine: Send + 'static {
    /// Consumes one event and returns the effects to perform, in order.
    fn handle(&mut self, event: crate::events::Event) -> Vec<Action>;

    /// The machine's current state.
    fn state(&self) -> State;

    /// True once the machine reached [`State::Completed`].
    fn is_finished(&self) -> bool {
        self.state() == State::Completed
    }
}

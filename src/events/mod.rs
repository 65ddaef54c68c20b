//! Events, upward notifications, and observability traces.
//!
//! - [`Event`]: typed mailbox events driving a supervisor (transport
//!   completions, timers, control, payload) and the opaque [`Handle`].
//! - [`Notice`]: the supervisor-to-parent contract
//!   ([`ServiceUp`]/[`ServiceDown`]/[`ServiceNotUp`], [`Outcome`]).
//! - [`Trace`] / [`Bus`]: fire-and-forget observability records and their
//!   broadcast channel.

mod bus;
mod event;
mod notice;
mod trace;

pub use bus::Bus;
pub use event::{
    Abandoned, Accepted, Closed, Connected, Event, Handle, Listening, NotConnected, NotListening,
    Payload, Tag,
};
pub use notice::{Notice, Outcome, ServiceDown, ServiceNotUp, ServiceUp};
pub use trace::{Trace, TraceKind};

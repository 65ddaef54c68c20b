//! Runtime core: driving machines against a transport.
//!
//! This module contains the async half of the crate. The only public API is
//! the [`Transport`] contract, the [`ServiceActor`] driver, and the spawn
//! helpers returning a [`ServiceHandle`].
//!
//! Internal modules:
//! - [`transport`]: the fire-and-forget I/O contract;
//! - [`timers`]: one-shot T1/T2 timers feeding the mailbox;
//! - [`actor`]: the mailbox loop executing machine actions;
//! - [`service`]: spawn wiring (bus, subscribers, cancellation).

mod actor;
mod service;
mod timers;
mod transport;

pub use actor::ServiceActor;
pub use service::{ServiceHandle, spawn_client, spawn_listener};
pub use transport::{Mailbox, Transport};

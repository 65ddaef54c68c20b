//! # Transport contract consumed by the driver.
//!
//! The supervisor core never touches sockets. It asks a [`Transport`] to
//! connect, listen, close, or send, and the transport reports back later by
//! delivering completion events into the supervisor's mailbox:
//!
//! | Request   | Completion events                          |
//! |-----------|--------------------------------------------|
//! | `connect` | `Connected` (success) / `NotConnected`     |
//! | `listen`  | `Listening` / `NotListening`, then `Accepted` per inbound peer |
//! | `close`   | `Closed` (clean) / `Abandoned` (lost)      |
//! | `send`    | none                                       |
//!
//! ## Contract
//! - Every method is **fire-and-forget**: it must only enqueue work and
//!   return promptly; the driver awaits it inline.
//! - The `reply` mailbox identifies the requesting supervisor; completions
//!   for a request go to the mailbox that made it.
//! - Peer handles minted for `Connected`/`Accepted` are owned by the
//!   requesting supervisor; nobody else closes or sends on them.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::endpoint::Endpoint;
use crate::events::{Event, Handle, Payload, Tag};

/// Sender half of a supervisor's mailbox; where completions are delivered.
pub type Mailbox = mpsc::UnboundedSender<Event>;

/// Asynchronous, non-blocking connection primitives.
///
/// Implementations wrap the actual I/O layer (TCP, in-process pipes, test
/// doubles). A single transport may serve many supervisors; requests carry
/// the caller's mailbox.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Requests an outbound connection to `endpoint`.
    ///
    /// Completion arrives in `reply` as `Connected` (whose `peer` is the new
    /// handle) or `NotConnected`, with `tag` echoed back.
    async fn connect(&self, endpoint: &Endpoint, tag: Tag, reply: Mailbox);

    /// Requests a bind/listen on `endpoint`.
    ///
    /// Completion arrives in `reply` as `Listening` or `NotListening`;
    /// subsequent inbound peers arrive as `Accepted` events.
    async fn listen(&self, endpoint: &Endpoint, tag: Tag, reply: Mailbox);

    /// Requests an orderly close of `peer`.
    ///
    /// Completion arrives in `reply` as `Closed` or `Abandoned`.
    async fn close(&self, peer: Handle, reply: Mailbox);

    /// Sends a payload to `peer`, preserving `payload.from` as the return
    /// address. No completion event.
    async fn send(&self, peer: Handle, payload: Payload);
}

//! # Effects requested by a state machine.
//!
//! Handlers never block: requesting a connect, close, timer, or delivery is
//! fire-and-forget, expressed as an [`Action`] the driver executes after the
//! handler returns. Completions come back later as ordinary mailbox events.

use std::time::Duration;

use crate::endpoint::Endpoint;
use crate::events::{Handle, Notice, Outcome, Payload, Tag};

/// One effect to perform, in the order returned by the handler.
#[derive(Clone, Debug)]
pub enum Action {
    /// Request an outbound connection; completion arrives as
    /// `Connected`/`NotConnected`.
    Connect {
        /// Where to connect.
        endpoint: Endpoint,
        /// Session tag echoed back in the completion.
        tag: Tag,
    },

    /// Request a bind/listen; completion arrives as
    /// `Listening`/`NotListening`.
    Listen {
        /// Where to bind.
        endpoint: Endpoint,
        /// Session tag echoed back in the completion.
        tag: Tag,
    },

    /// Request an orderly close of a peer; completion arrives as
    /// `Closed`/`Abandoned`.
    Close(Handle),

    /// Relay a payload to a peer, preserving the original sender as the
    /// return address.
    Send {
        /// Destination peer.
        to: Handle,
        /// The payload, `from` untouched.
        payload: Payload,
    },

    /// Deliver a notification or relayed payload to the parent.
    Deliver(Notice),

    /// Arm T1 (retry delay). Re-arming cancels the prior timer.
    ArmRetry(Duration),

    /// Arm T2 (graceful-close grace). Re-arming cancels the prior timer.
    ArmClose(Duration),

    /// Finish: deliver `Completed(outcome)` to the parent and stop.
    Complete(Outcome),
}

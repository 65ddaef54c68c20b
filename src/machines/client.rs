//! # ClientSupervisor: a self-reconnecting outbound connection.
//!
//! Maintains, on behalf of a parent, a single logical connection to a remote
//! endpoint: initial connect, reconnection on loss, orderly shutdown, and
//! upward lifecycle notifications. While established it relays payload
//! traffic transparently in both directions.
//!
//! ## State machine
//! ```text
//! Initial ──Start──► Connecting ──Connected──► Established
//!                        │  ▲                     │  │
//!            NotConnected│  │RetryTimer  Abandoned│  │Closed → Completed(value)
//!                        ▼  │                     ▼  │
//!                       Pausing ◄─────────────────┘  │Stop
//!                                                    ▼
//!                                                 Closing ──Closed/Abandoned/CloseTimer──► Completed
//! ```
//!
//! ## Rules
//! - `Abandoned` (unclean drop) reconnects with a **fresh** retry schedule;
//!   `Closed` (clean close) completes with the closure value.
//! - At most one connect attempt is in flight at a time.
//! - `Stop` is honoured in every state; from `Established` it requests an
//!   orderly close capped by the T2 grace.
//! - Payload traffic is never parsed: peer traffic goes up to the parent
//!   with the peer as return address, anything else goes down to the peer.

use std::time::Duration;

use crate::config::Config;
use crate::endpoint::Endpoint;
use crate::events::{
    Event, Handle, Notice, Outcome, Payload, ServiceDown, ServiceNotUp, ServiceUp, Tag,
};
use crate::machines::{Action, Machine, State};
use crate::policies::{RetryPolicy, RetrySchedule};

/// Supervises one logical outbound connection.
///
/// Pure state machine: drive it with [`Machine::handle`]; execute the
/// returned [`Action`]s elsewhere.
pub struct ClientSupervisor {
    endpoint: Endpoint,
    tag: Tag,
    policy: RetryPolicy,
    close_grace: Duration,
    state: State,
    peer: Option<Handle>,
    schedule: Option<RetrySchedule>,
}

impl ClientSupervisor {
    /// Creates a client supervisor for `endpoint` with scope-derived retry
    /// defaults and the default close grace.
    pub fn new(endpoint: Endpoint, tag: impl Into<Tag>) -> Self {
        let policy = RetryPolicy::for_scope(endpoint.scope());
        Self::with_policy(endpoint, tag, policy, Config::default().close_grace)
    }

    /// Creates a client supervisor with an explicit retry policy and close
    /// grace (T2).
    pub fn with_policy(
        endpoint: Endpoint,
        tag: impl Into<Tag>,
        policy: RetryPolicy,
        close_grace: Duration,
    ) -> Self {
        Self {
            endpoint,
            tag: tag.into(),
            policy,
            close_grace,
            state: State::Initial,
            peer: None,
            schedule: None,
        }
    }

    /// The endpoint this supervisor maintains a connection to.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// The current peer, defined only while established or closing.
    pub fn peer(&self) -> Option<Handle> {
        self.peer
    }

    fn connect(&self) -> Action {
        Action::Connect {
            endpoint: self.endpoint.clone(),
            tag: self.tag.clone(),
        }
    }

    fn complete(&mut self, outcome: Outcome) -> Vec<Action> {
        self.state = State::Completed;
        self.peer = None;
        self.schedule = None;
        vec![Action::Complete(outcome)]
    }

    /// Draws the next retry delay; `None` means the budget is exhausted.
    fn next_delay(&mut self) -> Option<Duration> {
        self.schedule.as_mut().and_then(|s| s.next())
    }

    fn relay(&self, payload: Payload) -> Vec<Action> {
        // Peer handle is always defined in Established.
        let Some(peer) = self.peer else {
            return Vec::new();
        };
        if payload.from == peer {
            vec![Action::Deliver(Notice::Message(payload))]
        } else {
            vec![Action::Send { to: peer, payload }]
        }
    }
}

impl Machine for ClientSupervisor {
    fn handle(&mut self, event: Event) -> Vec<Action> {
        match (self.state, event) {
            (State::Initial, Event::Start) => {
                self.schedule = Some(self.policy.schedule());
                self.state = State::Connecting;
                vec![self.connect()]
            }
            (State::Initial, Event::Stop) => self.complete(Outcome::Aborted),

            (State::Connecting, Event::Connected(c)) => {
                self.peer = Some(c.peer);
                self.state = State::Established;
                vec![Action::Deliver(Notice::Up(ServiceUp::Connected(c)))]
            }
            (State::Connecting, Event::NotConnected(nc)) => match self.next_delay() {
                Some(delay) => {
                    self.state = State::Pausing;
                    vec![
                        Action::Deliver(Notice::NotUp(ServiceNotUp::NotConnected(nc))),
                        Action::ArmRetry(delay),
                    ]
                }
                None => self.complete(Outcome::Aborted),
            },
            (State::Connecting, Event::Stop) => self.complete(Outcome::Aborted),

            (State::Established, Event::Closed(c)) => {
                // Stale completions from a previous incarnation are dropped.
                if Some(c.peer) != self.peer {
                    return Vec::new();
                }
                let mut actions = vec![Action::Deliver(Notice::Down(ServiceDown::Closed(
                    c.clone(),
                )))];
                actions.extend(self.complete(Outcome::Closed(c)));
                actions
            }
            (State::Established, Event::Abandoned(a)) => {
                if Some(a.peer) != self.peer {
                    return Vec::new();
                }
                self.peer = None;
                self.schedule = Some(self.policy.schedule());
                let down = Action::Deliver(Notice::Down(ServiceDown::Abandoned(a)));
                match self.next_delay() {
                    Some(delay) => {
                        self.state = State::Pausing;
                        vec![down, Action::ArmRetry(delay)]
                    }
                    None => {
                        let mut actions = vec![down];
                        actions.extend(self.complete(Outcome::Aborted));
                        actions
                    }
                }
            }
            (State::Established, Event::Stop) => match self.peer {
                // Peer handle is always defined in Established.
                Some(peer) => {
                    self.state = State::Closing;
                    vec![Action::Close(peer), Action::ArmClose(self.close_grace)]
                }
                None => self.complete(Outcome::Aborted),
            },
            (State::Established, Event::Message(payload)) => self.relay(payload),

            (State::Closing, Event::Closed(_))
            | (State::Closing, Event::Abandoned(_))
            | (State::Closing, Event::CloseTimer) => self.complete(Outcome::Aborted),
            // Stop while already closing is absorbed; no second close.
            (State::Closing, Event::Stop) => Vec::new(),

            (State::Pausing, Event::RetryTimer) => {
                self.state = State::Connecting;
                vec![self.connect()]
            }
            (State::Pausing, Event::Stop) => self.complete(Outcome::Aborted),

            _ => Vec::new(),
        }
    }

    fn state(&self) -> State {
        self.state
    }
}

//! # ListenerSupervisor: a self-restarting listening endpoint.
//!
//! Maintains, on behalf of a parent, a bound listening endpoint and the set
//! of peers accepted through it. The listen itself is retried with backoff;
//! accepted peers are not reconnected — on loss they are simply removed and
//! reported upward.
//!
//! ## State machine
//! ```text
//! Initial ──Start──► Starting ──Listening──► Established ◄──┐
//!                       │  ▲                  │ │ │         │Accepted/
//!           NotListening│  │RetryTimer    Stop│ │ └─────────┘Closed/Abandoned
//!                       ▼  │                  │ │
//!                      Pausing                │ │(no peers) → Completed
//!                                             ▼
//!                                          Closing ──last Closed/Abandoned or CloseTimer──► Completed
//! ```
//!
//! ## Rules
//! - The accepted-peer map is keyed by peer handle; events for unknown
//!   peers are dropped.
//! - `Stop` sends a close to every accepted peer and waits for the
//!   outstanding count to drain, capped by the T2 grace. With no peers,
//!   completion is immediate and T2 is never armed.
//! - Payload traffic relays upward with the sender as return address;
//!   parents reply directly to peer handles.

use std::collections::HashMap;
use std::time::Duration;

use crate::config::Config;
use crate::endpoint::Endpoint;
use crate::events::{
    Accepted, Event, Handle, Notice, Outcome, ServiceDown, ServiceNotUp, ServiceUp, Tag,
};
use crate::machines::{Action, Machine, State};
use crate::policies::{RetryPolicy, RetrySchedule};

/// Supervises one listening endpoint and its accepted peers.
///
/// Pure state machine: drive it with [`Machine::handle`]; execute the
/// returned [`Action`]s elsewhere.
pub struct ListenerSupervisor {
    endpoint: Endpoint,
    tag: Tag,
    policy: RetryPolicy,
    close_grace: Duration,
    state: State,
    listener: Option<Handle>,
    accepted: HashMap<Handle, Accepted>,
    closing: usize,
    schedule: Option<RetrySchedule>,
}

impl ListenerSupervisor {
    /// Creates a listener supervisor for `endpoint` with scope-derived retry
    /// defaults and the default close grace.
    pub fn new(endpoint: Endpoint, tag: impl Into<Tag>) -> Self {
        let policy = RetryPolicy::for_scope(endpoint.scope());
        Self::with_policy(endpoint, tag, policy, Config::default().close_grace)
    }

    /// Creates a listener supervisor with an explicit retry policy and close
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
            listener: None,
            accepted: HashMap::new(),
            closing: 0,
            schedule: None,
        }
    }

    /// The endpoint this supervisor listens on.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// The listener handle, defined only while established or closing.
    pub fn listener(&self) -> Option<Handle> {
        self.listener
    }

    /// Number of peers currently accepted.
    pub fn accepted_len(&self) -> usize {
        self.accepted.len()
    }

    fn listen(&self) -> Action {
        Action::Listen {
            endpoint: self.endpoint.clone(),
            tag: self.tag.clone(),
        }
    }

    fn complete(&mut self, outcome: Outcome) -> Vec<Action> {
        self.state = State::Completed;
        self.listener = None;
        self.accepted.clear();
        self.closing = 0;
        self.schedule = None;
        vec![Action::Complete(outcome)]
    }

    fn next_delay(&mut self) -> Option<Duration> {
        self.schedule.as_mut().and_then(|s| s.next())
    }

    /// One outstanding close acknowledged; completes once all have drained.
    fn drain_close(&mut self) -> Vec<Action> {
        self.closing = self.closing.saturating_sub(1);
        if self.closing == 0 {
            self.complete(Outcome::Aborted)
        } else {
            Vec::new()
        }
    }
}

impl Machine for ListenerSupervisor {
    fn handle(&mut self, event: Event) -> Vec<Action> {
        match (self.state, event) {
            (State::Initial, Event::Start) => {
                self.schedule = Some(self.policy.schedule());
                self.state = State::Starting;
                vec![self.listen()]
            }
            (State::Initial, Event::Stop) => self.complete(Outcome::Aborted),

            (State::Starting, Event::Listening(l)) => {
                self.listener = Some(l.listener);
                self.state = State::Established;
                vec![Action::Deliver(Notice::Listening(l))]
            }
            (State::Starting, Event::NotListening(nl)) => match self.next_delay() {
                Some(delay) => {
                    self.state = State::Pausing;
                    vec![
                        Action::Deliver(Notice::NotUp(ServiceNotUp::NotListening(nl))),
                        Action::ArmRetry(delay),
                    ]
                }
                None => self.complete(Outcome::Aborted),
            },
            (State::Starting, Event::Stop) => self.complete(Outcome::Aborted),

            (State::Established, Event::Accepted(a)) => {
                self.accepted.insert(a.peer, a.clone());
                vec![Action::Deliver(Notice::Up(ServiceUp::Accepted(a)))]
            }
            (State::Established, Event::Closed(c)) => {
                // Unknown peers (already removed or never recorded) are dropped.
                if self.accepted.remove(&c.peer).is_none() {
                    return Vec::new();
                }
                vec![Action::Deliver(Notice::Down(ServiceDown::Closed(c)))]
            }
            (State::Established, Event::Abandoned(a)) => {
                if self.accepted.remove(&a.peer).is_none() {
                    return Vec::new();
                }
                vec![Action::Deliver(Notice::Down(ServiceDown::Abandoned(a)))]
            }
            (State::Established, Event::Message(payload)) => {
                vec![Action::Deliver(Notice::Message(payload))]
            }
            (State::Established, Event::Stop) => {
                if self.accepted.is_empty() {
                    return self.complete(Outcome::Aborted);
                }
                self.closing = self.accepted.len();
                self.state = State::Closing;
                let mut actions: Vec<Action> =
                    self.accepted.keys().copied().map(Action::Close).collect();
                actions.push(Action::ArmClose(self.close_grace));
                actions
            }

            (State::Closing, Event::Closed(_)) | (State::Closing, Event::Abandoned(_)) => {
                self.drain_close()
            }
            (State::Closing, Event::CloseTimer) => self.complete(Outcome::Aborted),
            // Stop while already closing is absorbed; no second round of closes.
            (State::Closing, Event::Stop) => Vec::new(),

            (State::Pausing, Event::RetryTimer) => {
                self.state = State::Starting;
                vec![self.listen()]
            }
            (State::Pausing, Event::Stop) => self.complete(Outcome::Aborted),

            _ => Vec::new(),
        }
    }

    fn state(&self) -> State {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Abandoned, Closed, Listening, NotListening, Payload};
    use bytes::Bytes;

    fn endpoint() -> Endpoint {
        Endpoint::new("0.0.0.0", 9001).unwrap()
    }

    fn exact_policy(limit: Option<u32>) -> RetryPolicy {
        RetryPolicy::new(vec![2.0, 4.0], 8.0, limit, 0.0, 0.0).unwrap()
    }

    fn listener(limit: Option<u32>) -> ListenerSupervisor {
        ListenerSupervisor::with_policy(
            endpoint(),
            "L",
            exact_policy(limit),
            Duration::from_secs(3),
        )
    }

    fn listening(handle: Handle) -> Event {
        Event::Listening(Listening {
            listener: handle,
            tag: "L".into(),
        })
    }

    fn accepted(peer: Handle) -> Event {
        Event::Accepted(Accepted {
            peer,
            remote: Endpoint::new("10.0.0.7", 40000).unwrap(),
            tag: "L".into(),
        })
    }

    fn established() -> (ListenerSupervisor, Handle) {
        let mut m = listener(None);
        m.handle(Event::Start);
        let handle = Handle::next();
        m.handle(listening(handle));
        (m, handle)
    }

    #[test]
    fn test_start_requests_listen() {
        let mut m = listener(None);
        let actions = m.handle(Event::Start);
        assert_eq!(m.state(), State::Starting);
        assert!(matches!(&actions[..], [Action::Listen { endpoint: e, .. }]
            if e.port() == 9001));
    }

    #[test]
    fn test_listening_forwards_to_parent() {
        let mut m = listener(None);
        m.handle(Event::Start);
        let handle = Handle::next();
        let actions = m.handle(listening(handle));
        assert_eq!(m.state(), State::Established);
        assert_eq!(m.listener(), Some(handle));
        assert!(matches!(&actions[..],
            [Action::Deliver(Notice::Listening(l))] if l.listener == handle));
    }

    #[test]
    fn test_not_listening_backs_off_then_retries() {
        let mut m = listener(None);
        m.handle(Event::Start);
        let actions = m.handle(Event::NotListening(NotListening {
            reason: "in use".into(),
            tag: "L".into(),
        }));
        assert_eq!(m.state(), State::Pausing);
        assert!(matches!(&actions[..], [
            Action::Deliver(Notice::NotUp(ServiceNotUp::NotListening(_))),
            Action::ArmRetry(d),
        ] if *d == Duration::from_secs_f64(2.0)));

        let actions = m.handle(Event::RetryTimer);
        assert_eq!(m.state(), State::Starting);
        assert!(matches!(&actions[..], [Action::Listen { .. }]));
    }

    #[test]
    fn test_listen_retry_exhaustion_aborts() {
        let mut m = listener(Some(1));
        m.handle(Event::Start);
        m.handle(Event::NotListening(NotListening {
            reason: "in use".into(),
            tag: "L".into(),
        }));
        m.handle(Event::RetryTimer);

        let actions = m.handle(Event::NotListening(NotListening {
            reason: "in use".into(),
            tag: "L".into(),
        }));
        assert!(matches!(&actions[..], [Action::Complete(Outcome::Aborted)]));
        assert!(m.is_finished());
    }

    #[test]
    fn test_accept_records_peer_and_notifies() {
        let (mut m, _) = established();
        let peer = Handle::next();
        let actions = m.handle(accepted(peer));
        assert_eq!(m.accepted_len(), 1);
        assert!(matches!(&actions[..],
            [Action::Deliver(Notice::Up(up))] if up.peer() == peer));
    }

    #[test]
    fn test_peer_loss_removes_and_reports() {
        let (mut m, _) = established();
        let peer = Handle::next();
        m.handle(accepted(peer));

        let actions = m.handle(Event::Abandoned(Abandoned {
            peer,
            reason: "reset".into(),
        }));
        assert_eq!(m.accepted_len(), 0);
        assert_eq!(m.state(), State::Established, "listener does not reconnect peers");
        assert!(matches!(&actions[..],
            [Action::Deliver(Notice::Down(down))] if down.peer() == peer));

        // A second event for the same peer is unknown by now: dropped.
        let actions = m.handle(Event::Closed(Closed { peer, value: None }));
        assert!(actions.is_empty());
    }

    #[test]
    fn test_stop_with_two_peers_closes_both() {
        let (mut m, _) = established();
        let p1 = Handle::next();
        let p2 = Handle::next();
        m.handle(accepted(p1));
        m.handle(accepted(p2));

        let actions = m.handle(Event::Stop);
        assert_eq!(m.state(), State::Closing);
        let closes: Vec<Handle> = actions
            .iter()
            .filter_map(|a| match a {
                Action::Close(h) => Some(*h),
                _ => None,
            })
            .collect();
        assert_eq!(closes.len(), 2);
        assert!(closes.contains(&p1) && closes.contains(&p2));
        assert!(matches!(actions.last(), Some(Action::ArmClose(d))
            if *d == Duration::from_secs(3)));

        // First close drains the counter, second completes.
        assert!(m.handle(Event::Closed(Closed { peer: p1, value: None })).is_empty());
        let actions = m.handle(Event::Closed(Closed { peer: p2, value: None }));
        assert!(matches!(&actions[..], [Action::Complete(Outcome::Aborted)]));
    }

    #[test]
    fn test_stop_with_no_peers_completes_immediately() {
        let (mut m, _) = established();
        let actions = m.handle(Event::Stop);
        assert!(matches!(&actions[..], [Action::Complete(Outcome::Aborted)]));
        assert!(
            !actions.iter().any(|a| matches!(a, Action::ArmClose(_))),
            "no T2 when there is nothing to close"
        );
    }

    #[test]
    fn test_close_timeout_forces_completion() {
        let (mut m, _) = established();
        m.handle(accepted(Handle::next()));
        m.handle(Event::Stop);

        let actions = m.handle(Event::CloseTimer);
        assert!(matches!(&actions[..], [Action::Complete(Outcome::Aborted)]));
    }

    #[test]
    fn test_stop_in_closing_is_absorbed() {
        let (mut m, _) = established();
        m.handle(accepted(Handle::next()));
        m.handle(Event::Stop);
        assert!(m.handle(Event::Stop).is_empty());
        assert_eq!(m.state(), State::Closing);
    }

    #[test]
    fn test_payload_relays_upward_with_sender() {
        let (mut m, _) = established();
        let peer = Handle::next();
        m.handle(accepted(peer));

        let actions = m.handle(Event::Message(Payload {
            from: peer,
            body: Bytes::from_static(b"hi"),
        }));
        assert!(matches!(&actions[..],
            [Action::Deliver(Notice::Message(p))] if p.from == peer));
    }

    #[test]
    fn test_accepted_in_starting_is_dropped() {
        let mut m = listener(None);
        m.handle(Event::Start);
        let actions = m.handle(accepted(Handle::next()));
        assert!(actions.is_empty());
        assert_eq!(m.accepted_len(), 0);
    }

    #[test]
    fn test_stop_in_pausing_aborts() {
        let mut m = listener(None);
        m.handle(Event::Start);
        m.handle(Event::NotListening(NotListening {
            reason: "in use".into(),
            tag: "L".into(),
        }));
        let actions = m.handle(Event::Stop);
        assert!(matches!(&actions[..], [Action::Complete(Outcome::Aborted)]));
    }
}

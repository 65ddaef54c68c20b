//! # ServiceActor: drives a supervision machine.
//!
//! The actor owns a machine's mailbox and executes the [`Action`]s each
//! handled event produces: transport requests, timer arming, upward
//! deliveries, and the final completion. One actor per supervisor; events
//! are processed strictly in mailbox order.
//!
//! ## Event flow
//! ```text
//! mailbox ──► Machine::handle(event) ──► [Action, ...]
//!                                          ├─ Connect/Listen/Close/Send ──► Transport
//!                                          ├─ ArmRetry/ArmClose ──► OneShot ──► mailbox (T1/T2)
//!                                          ├─ Deliver ──► parent channel
//!                                          └─ Complete ──► parent channel, actor exits
//! ```
//!
//! Each significant transition also publishes a [`Trace`] to the bus for
//! observers; trace delivery is fire-and-forget and never affects
//! supervision.
//!
//! ## Cancellation
//! The runtime token is an external stop request: on cancellation the actor
//! injects a single `Stop` event and then drains the mailbox normally, so
//! an orderly close (bounded by T2) still runs.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::core::timers::OneShot;
use crate::core::transport::{Mailbox, Transport};
use crate::events::{Bus, Event, Notice, Outcome, ServiceNotUp, Trace, TraceKind};
use crate::machines::{Action, Machine, State};

/// Drives one supervision machine over its mailbox until completion.
pub struct ServiceActor<M: Machine> {
    machine: M,
    rx: mpsc::UnboundedReceiver<Event>,
    tx: Mailbox,
    parent: mpsc::UnboundedSender<Notice>,
    transport: Arc<dyn Transport>,
    bus: Bus,
    t1: OneShot,
    t2: OneShot,
    attempts: u32,
}

impl<M: Machine> ServiceActor<M> {
    /// Creates an actor and its mailbox sender.
    ///
    /// Hand the returned [`Mailbox`] to the dispatcher (and transport) that
    /// will deliver this supervisor's events.
    pub fn new(
        machine: M,
        transport: Arc<dyn Transport>,
        parent: mpsc::UnboundedSender<Notice>,
        bus: Bus,
    ) -> (Self, Mailbox) {
        let (tx, rx) = mpsc::unbounded_channel();
        let actor = Self {
            machine,
            rx,
            tx: tx.clone(),
            parent,
            transport,
            bus,
            t1: OneShot::default(),
            t2: OneShot::default(),
            attempts: 0,
        };
        (actor, tx)
    }

    /// Runs the actor: delivers `Start`, then processes mailbox events until
    /// the machine completes. Returns the final outcome.
    ///
    /// Cancelling `token` injects one `Stop`; completion is then bounded by
    /// the machine's close grace (T2).
    pub async fn run(mut self, token: CancellationToken) -> Outcome {
        if let Some(outcome) = self.step(Event::Start).await {
            return outcome;
        }
        let mut stop_injected = false;
        loop {
            let event = if stop_injected {
                // Only mailbox traffic (incl. T2) can finish the machine now.
                match self.rx.recv().await {
                    Some(ev) => ev,
                    None => return Outcome::Aborted,
                }
            } else {
                tokio::select! {
                    ev = self.rx.recv() => match ev {
                        Some(ev) => ev,
                        None => {
                            stop_injected = true;
                            Event::Stop
                        }
                    },
                    _ = token.cancelled() => {
                        stop_injected = true;
                        Event::Stop
                    }
                }
            };
            if let Some(outcome) = self.step(event).await {
                return outcome;
            }
        }
    }

    /// Handles one event and executes the resulting actions in order.
    async fn step(&mut self, event: Event) -> Option<Outcome> {
        let retry_failure = matches!(event, Event::NotConnected(_) | Event::NotListening(_));
        let grace_expiry =
            matches!(event, Event::CloseTimer) && self.machine.state() == State::Closing;

        let mut outcome = None;
        for action in self.machine.handle(event) {
            match action {
                Action::Connect { endpoint, tag } => {
                    self.attempts += 1;
                    self.bus.publish(
                        Trace::new(TraceKind::ConnectRequested).with_attempt(self.attempts),
                    );
                    self.transport.connect(&endpoint, tag, self.tx.clone()).await;
                }
                Action::Listen { endpoint, tag } => {
                    self.attempts += 1;
                    self.bus.publish(
                        Trace::new(TraceKind::ListenRequested).with_attempt(self.attempts),
                    );
                    self.transport.listen(&endpoint, tag, self.tx.clone()).await;
                }
                Action::Close(peer) => {
                    self.bus
                        .publish(Trace::new(TraceKind::CloseRequested).with_peer(peer));
                    self.transport.close(peer, self.tx.clone()).await;
                }
                Action::Send { to, payload } => {
                    self.transport.send(to, payload).await;
                }
                Action::Deliver(notice) => {
                    self.trace_notice(&notice);
                    let _ = self.parent.send(notice);
                }
                Action::ArmRetry(delay) => {
                    self.bus.publish(
                        Trace::new(TraceKind::BackoffScheduled)
                            .with_delay(delay)
                            .with_attempt(self.attempts),
                    );
                    self.t1.arm(delay, self.tx.clone(), Event::RetryTimer);
                }
                Action::ArmClose(delay) => {
                    self.t2.arm(delay, self.tx.clone(), Event::CloseTimer);
                }
                Action::Complete(o) => {
                    if retry_failure {
                        self.bus.publish(
                            Trace::new(TraceKind::RetryExhausted).with_attempt(self.attempts),
                        );
                    }
                    if grace_expiry {
                        self.bus.publish(Trace::new(TraceKind::GraceExceeded));
                    }
                    self.bus.publish(Trace::new(TraceKind::Completed).with_reason(
                        if o.is_aborted() { "aborted" } else { "closed" },
                    ));
                    let _ = self.parent.send(Notice::Completed(o.clone()));
                    outcome = Some(o);
                }
            }
        }
        if outcome.is_some() {
            self.t1.disarm();
            self.t2.disarm();
        }
        outcome
    }

    fn trace_notice(&self, notice: &Notice) {
        let trace = match notice {
            Notice::Up(up) => Trace::new(TraceKind::ServiceUp).with_peer(up.peer()),
            Notice::Down(down) => Trace::new(TraceKind::ServiceDown).with_peer(down.peer()),
            Notice::NotUp(not_up) => {
                let reason = match not_up {
                    ServiceNotUp::NotConnected(nc) => nc.reason.clone(),
                    ServiceNotUp::NotListening(nl) => nl.reason.clone(),
                };
                Trace::new(TraceKind::ServiceNotUp).with_reason(reason)
            }
            Notice::Listening(l) => Trace::new(TraceKind::Listening).with_peer(l.listener),
            // Payload relays and the completion are not traced here.
            Notice::Message(_) | Notice::Completed(_) => return,
        };
        self.bus.publish(trace);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use bytes::Bytes;

    use crate::endpoint::Endpoint;
    use crate::events::{
        Closed, Connected, Handle, NotConnected, Payload, ServiceUp, Tag,
    };
    use crate::machines::ClientSupervisor;
    use crate::policies::RetryPolicy;

    #[derive(Debug)]
    enum Op {
        Connect(Endpoint),
        Listen(Endpoint),
        Close(Handle),
        Send(Handle, Bytes),
    }

    /// Records every transport request for the test to assert on.
    struct MockTransport {
        ops: mpsc::UnboundedSender<Op>,
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn connect(&self, endpoint: &Endpoint, _tag: Tag, _reply: Mailbox) {
            let _ = self.ops.send(Op::Connect(endpoint.clone()));
        }
        async fn listen(&self, endpoint: &Endpoint, _tag: Tag, _reply: Mailbox) {
            let _ = self.ops.send(Op::Listen(endpoint.clone()));
        }
        async fn close(&self, peer: Handle, _reply: Mailbox) {
            let _ = self.ops.send(Op::Close(peer));
        }
        async fn send(&self, peer: Handle, payload: Payload) {
            let _ = self.ops.send(Op::Send(peer, payload.body));
        }
    }

    struct Rig {
        ops: mpsc::UnboundedReceiver<Op>,
        parent: mpsc::UnboundedReceiver<Notice>,
        mailbox: Mailbox,
        token: CancellationToken,
        join: tokio::task::JoinHandle<Outcome>,
        bus: Bus,
    }

    fn rig() -> Rig {
        let (ops_tx, ops) = mpsc::unbounded_channel();
        let (parent_tx, parent) = mpsc::unbounded_channel();
        let bus = Bus::new(64);
        let machine = ClientSupervisor::with_policy(
            Endpoint::new("127.0.0.1", 9000).unwrap(),
            "T",
            RetryPolicy::new(vec![2.0, 4.0], 8.0, None, 0.0, 0.0).unwrap(),
            Duration::from_secs(3),
        );
        let (actor, mailbox) = ServiceActor::new(
            machine,
            Arc::new(MockTransport { ops: ops_tx }),
            parent_tx,
            bus.clone(),
        );
        let token = CancellationToken::new();
        let join = tokio::spawn(actor.run(token.clone()));
        Rig {
            ops,
            parent,
            mailbox,
            token,
            join,
            bus,
        }
    }

    fn connected(peer: Handle) -> Event {
        Event::Connected(Connected {
            peer,
            tag: "T".into(),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_up_stop_close_completes() {
        let mut r = rig();

        assert!(matches!(r.ops.recv().await, Some(Op::Connect(_))));
        let peer = Handle::next();
        r.mailbox.send(connected(peer)).unwrap();

        match r.parent.recv().await.unwrap() {
            Notice::Up(ServiceUp::Connected(c)) => assert_eq!(c.peer, peer),
            other => panic!("expected ServiceUp, got {other:?}"),
        }

        r.mailbox.send(Event::Stop).unwrap();
        match r.ops.recv().await.unwrap() {
            Op::Close(h) => assert_eq!(h, peer),
            other => panic!("expected close, got {other:?}"),
        }
        r.mailbox.send(Event::Closed(Closed { peer, value: None })).unwrap();

        assert!(matches!(
            r.parent.recv().await.unwrap(),
            Notice::Completed(Outcome::Aborted)
        ));
        assert!(r.join.await.unwrap().is_aborted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_connect_retries_after_backoff() {
        let mut r = rig();
        assert!(matches!(r.ops.recv().await, Some(Op::Connect(_))));

        r.mailbox
            .send(Event::NotConnected(NotConnected {
                reason: "refused".into(),
                tag: "T".into(),
            }))
            .unwrap();
        assert!(matches!(r.parent.recv().await.unwrap(), Notice::NotUp(_)));

        // The paused clock auto-advances through the 2s T1 delay.
        assert!(matches!(r.ops.recv().await, Some(Op::Connect(_))));

        let peer = Handle::next();
        r.mailbox.send(connected(peer)).unwrap();
        assert!(matches!(r.parent.recv().await.unwrap(), Notice::Up(_)));
        r.token.cancel();
        let _ = r.join.await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_unacknowledged_close_is_bounded_by_grace() {
        let mut r = rig();
        assert!(matches!(r.ops.recv().await, Some(Op::Connect(_))));
        r.mailbox.send(connected(Handle::next())).unwrap();
        assert!(matches!(r.parent.recv().await.unwrap(), Notice::Up(_)));

        r.mailbox.send(Event::Stop).unwrap();
        assert!(matches!(r.ops.recv().await, Some(Op::Close(_))));

        // No Closed ever arrives; T2 (3s) forces completion.
        assert!(matches!(
            r.parent.recv().await.unwrap(),
            Notice::Completed(Outcome::Aborted)
        ));
        assert!(r.join.await.unwrap().is_aborted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_token_maps_to_stop() {
        let mut r = rig();
        assert!(matches!(r.ops.recv().await, Some(Op::Connect(_))));

        r.token.cancel();
        assert!(matches!(
            r.parent.recv().await.unwrap(),
            Notice::Completed(Outcome::Aborted)
        ));
        assert!(r.join.await.unwrap().is_aborted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_established_relay_reaches_transport() {
        let mut r = rig();
        assert!(matches!(r.ops.recv().await, Some(Op::Connect(_))));
        let peer = Handle::next();
        r.mailbox.send(connected(peer)).unwrap();
        assert!(matches!(r.parent.recv().await.unwrap(), Notice::Up(_)));

        // Parent-originated payload goes down to the peer.
        let parent_handle = Handle::next();
        r.mailbox
            .send(Event::Message(Payload {
                from: parent_handle,
                body: Bytes::from_static(b"ping"),
            }))
            .unwrap();
        match r.ops.recv().await.unwrap() {
            Op::Send(to, body) => {
                assert_eq!(to, peer);
                assert_eq!(&body[..], b"ping");
            }
            other => panic!("expected send, got {other:?}"),
        }

        // Peer-originated payload goes up to the parent.
        r.mailbox
            .send(Event::Message(Payload {
                from: peer,
                body: Bytes::from_static(b"pong"),
            }))
            .unwrap();
        match r.parent.recv().await.unwrap() {
            Notice::Message(p) => assert_eq!(p.from, peer),
            other => panic!("expected relayed message, got {other:?}"),
        }

        r.token.cancel();
        let _ = r.ops.recv().await; // close request
        r.mailbox.send(Event::Closed(Closed { peer, value: None })).unwrap();
        let _ = r.join.await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_traces_follow_the_lifecycle() {
        let mut r = rig();
        let mut traces = r.bus.subscribe();

        assert!(matches!(r.ops.recv().await, Some(Op::Connect(_))));
        r.mailbox
            .send(Event::NotConnected(NotConnected {
                reason: "refused".into(),
                tag: "T".into(),
            }))
            .unwrap();
        assert!(matches!(r.parent.recv().await.unwrap(), Notice::NotUp(_)));

        // ServiceNotUp and BackoffScheduled (with the 2s delay) were traced.
        let mut kinds = Vec::new();
        while let Ok(t) = traces.try_recv() {
            if t.kind == TraceKind::BackoffScheduled {
                assert_eq!(t.delay_ms, Some(2000));
            }
            kinds.push(t.kind);
        }
        assert!(kinds.contains(&TraceKind::ServiceNotUp));
        assert!(kinds.contains(&TraceKind::BackoffScheduled));

        r.token.cancel();
        let _ = r.join.await;
    }
}

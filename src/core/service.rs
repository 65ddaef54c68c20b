//! # Spawning supervisors.
//!
//! [`spawn_client`] and [`spawn_listener`] build the machine from an
//! endpoint plus [`Config`], wire up the trace bus and optional subscribers,
//! and run a [`ServiceActor`](crate::core::actor::ServiceActor) on the tokio
//! runtime. The returned [`ServiceHandle`] is the parent's side of the
//! supervisor: the event mailbox for the dispatcher, a stop control, trace
//! subscription, and the final outcome via [`ServiceHandle::join`].
//!
//! Two supervisors spawned against the same endpoint are fully independent
//! state machines; nothing is shared between handles.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::actor::ServiceActor;
use crate::core::transport::{Mailbox, Transport};
use crate::endpoint::Endpoint;
use crate::events::{Bus, Event, Notice, Outcome, Tag, Trace};
use crate::machines::{ClientSupervisor, ListenerSupervisor, Machine};
use crate::subscribers::{Subscribe, SubscriberSet};

/// Parent-side handle to a running supervisor.
pub struct ServiceHandle {
    events: Mailbox,
    bus: Bus,
    token: CancellationToken,
    join: JoinHandle<Outcome>,
}

impl ServiceHandle {
    /// The supervisor's mailbox sender; hand it to the dispatcher and
    /// transport delivering this supervisor's events.
    pub fn events(&self) -> Mailbox {
        self.events.clone()
    }

    /// Delivers one event; returns false once the supervisor is gone.
    pub fn deliver(&self, event: Event) -> bool {
        self.events.send(event).is_ok()
    }

    /// Requests an orderly shutdown (delivers `Stop`).
    pub fn stop(&self) {
        let _ = self.events.send(Event::Stop);
    }

    /// External cancellation: same effect as [`ServiceHandle::stop`], usable
    /// from contexts that hold only the token.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Subscribes to this supervisor's observability traces.
    pub fn traces(&self) -> broadcast::Receiver<Trace> {
        self.bus.subscribe()
    }

    /// Waits for the supervisor to finish and returns its outcome.
    pub async fn join(self) -> Outcome {
        self.join.await.unwrap_or(Outcome::Aborted)
    }
}

/// Spawns a client supervisor maintaining an outbound connection to
/// `endpoint`.
///
/// The retry policy comes from `cfg.retry` or, when unset, from the
/// endpoint's address scope. Upward notices are delivered to `parent`.
pub fn spawn_client(
    endpoint: Endpoint,
    tag: impl Into<Tag>,
    cfg: &Config,
    transport: Arc<dyn Transport>,
    parent: mpsc::UnboundedSender<Notice>,
    subscribers: Vec<Arc<dyn Subscribe>>,
) -> ServiceHandle {
    let policy = cfg.retry_for(&endpoint);
    let machine = ClientSupervisor::with_policy(endpoint, tag, policy, cfg.close_grace);
    launch(machine, cfg, transport, parent, subscribers)
}

/// Spawns a listener supervisor maintaining a bound endpoint and its
/// accepted peers.
pub fn spawn_listener(
    endpoint: Endpoint,
    tag: impl Into<Tag>,
    cfg: &Config,
    transport: Arc<dyn Transport>,
    parent: mpsc::UnboundedSender<Notice>,
    subscribers: Vec<Arc<dyn Subscribe>>,
) -> ServiceHandle {
    let policy = cfg.retry_for(&endpoint);
    let machine = ListenerSupervisor::with_policy(endpoint, tag, policy, cfg.close_grace);
    launch(machine, cfg, transport, parent, subscribers)
}

/// Wires the bus, subscriber fan-out, and actor task for one machine.
fn launch<M: Machine>(
    machine: M,
    cfg: &Config,
    transport: Arc<dyn Transport>,
    parent: mpsc::UnboundedSender<Notice>,
    subscribers: Vec<Arc<dyn Subscribe>>,
) -> ServiceHandle {
    let bus = Bus::new(cfg.bus_capacity_clamped());

    if !subscribers.is_empty() {
        let set = SubscriberSet::new(subscribers);
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(trace) => set.emit(&trace),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    let (actor, events) = ServiceActor::new(machine, transport, parent, bus.clone());
    let token = CancellationToken::new();
    let join = tokio::spawn(actor.run(token.clone()));
    ServiceHandle {
        events,
        bus,
        token,
        join,
    }
}

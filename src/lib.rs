//! # connvisor
//!
//! **Connvisor** is a lightweight connection supervision library for Rust.
//!
//! It provides primitives to maintain reliable, self-healing connection
//! endpoints: a self-reconnecting client and a self-restarting listener,
//! each a finite-state supervisor driven by typed events, with retry
//! schedules tuned to how far away the endpoint is.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!            parent (your code)
//!      ▲  Notices: ServiceUp / ServiceDown /            │ Event mailbox:
//!      │  ServiceNotUp / Message / Completed            │ Stop, payloads
//!      │                                                ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  ServiceActor (per supervisor)                                    │
//! │  - mailbox (one event at a time, strict order)                    │
//! │  - Machine: ClientSupervisor | ListenerSupervisor (pure FSM)      │
//! │  - OneShot timers: T1 (retry delay), T2 (close grace)             │
//! │  - Bus (broadcast Trace records to observers)                     │
//! └──────┬────────────────────────────────────────────────────▲───────┘
//!        │ connect / listen / close / send                    │ Connected,
//!        ▼                                                    │ Accepted,
//! ┌──────────────┐                                            │ Closed, ...
//! │  Transport   │ ───── completion events ───────────────────┘
//! │ (your I/O)   │
//! └──────────────┘
//! ```
//!
//! ### Client lifecycle
//! ```text
//! Initial ──Start──► Connecting ──Connected──► Established
//!                        │  ▲                    │  │  │
//!            NotConnected│  │T1 (jittered,       │  │  └─Closed──► Completed(value)
//!                        ▼  │ scope-tuned)       │  │Stop
//!                       Pausing ◄───Abandoned────┘  ▼
//!                                                Closing ──T2 cap──► Completed
//! ```
//!
//! ## Features
//! | Area            | Description                                                   | Key types / traits                          |
//! |-----------------|---------------------------------------------------------------|---------------------------------------------|
//! | **Supervisors** | Self-reconnecting client, self-restarting listener.           | [`ClientSupervisor`], [`ListenerSupervisor`]|
//! | **Policies**    | Scope-aware, jittered, truncated retry schedules.             | [`RetryPolicy`], [`AddressScope`]           |
//! | **Transport**   | Pluggable fire-and-forget I/O contract.                       | [`Transport`]                               |
//! | **Notices**     | Upward lifecycle contract to the parent.                      | [`Notice`], [`ServiceUp`], [`Outcome`]      |
//! | **Observability**| Broadcast trace records with subscriber fan-out.             | [`Trace`], [`Bus`], [`Subscribe`]           |
//! | **Errors**      | Construction-time validation only.                            | [`ConfigError`]                             |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use tokio::sync::mpsc;
//!
//! use connvisor::{
//!     Closed, Config, Connected, Endpoint, Event, Handle, Mailbox, Notice, Payload, Tag,
//!     Transport, spawn_client,
//! };
//!
//! /// Toy transport: every connect succeeds instantly, closes are clean.
//! struct Pipe;
//!
//! #[async_trait]
//! impl Transport for Pipe {
//!     async fn connect(&self, _endpoint: &Endpoint, tag: Tag, reply: Mailbox) {
//!         let peer = Handle::next();
//!         let _ = reply.send(Event::Connected(Connected { peer, tag }));
//!     }
//!     async fn listen(&self, _endpoint: &Endpoint, _tag: Tag, _reply: Mailbox) {}
//!     async fn close(&self, peer: Handle, reply: Mailbox) {
//!         let _ = reply.send(Event::Closed(Closed { peer, value: None }));
//!     }
//!     async fn send(&self, _peer: Handle, _payload: Payload) {}
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (parent_tx, mut parent) = mpsc::unbounded_channel();
//!
//!     let handle = spawn_client(
//!         Endpoint::new("127.0.0.1", 9000)?,
//!         "session-1",
//!         &Config::default(),
//!         Arc::new(Pipe),
//!         parent_tx,
//!         Vec::new(),
//!     );
//!
//!     if let Some(Notice::Up(up)) = parent.recv().await {
//!         println!("connected, peer {}", up.peer());
//!     }
//!
//!     handle.stop();
//!     while let Some(notice) = parent.recv().await {
//!         if let Notice::Completed(outcome) = notice {
//!             println!("finished: {outcome:?}");
//!             break;
//!         }
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod endpoint;
mod error;
mod events;
mod machines;
mod policies;
mod subscribers;

// ---- Public re-exports ----

pub use config::Config;
pub use self::core::{
    Mailbox, ServiceActor, ServiceHandle, Transport, spawn_client, spawn_listener,
};
pub use endpoint::{AddressScope, Endpoint};
pub use error::ConfigError;
pub use events::{
    Abandoned, Accepted, Bus, Closed, Connected, Event, Handle, Listening, NotConnected,
    NotListening, Notice, Outcome, Payload, ServiceDown, ServiceNotUp, ServiceUp, Tag, Trace,
    TraceKind,
};
pub use machines::{Action, ClientSupervisor, ListenerSupervisor, Machine, State};
pub use policies::{RetryPolicy, RetrySchedule};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logging subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;

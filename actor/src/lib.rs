// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Rook Actor Runtime
//!
//! An actor-model runtime on top of tokio. Actors are isolated units of state and behavior
//! that interact only through asynchronous messages. Each actor handles one message at a
//! time, under a behavior it can replace, and is supervised by its parent.
//!
//! ## Overview
//!
//! In response to a message, an actor can:
//! - Update its state, which the runtime threads from one message to the next
//! - Reply to the sender or send messages to any actor it knows
//! - Spawn child actors it owns and supervises
//! - Install the behavior for its next message
//! - Stop itself
//!
//! ## Core Architecture
//!
//! ### Mailbox and Scheduler
//!
//! Every actor owns a FIFO [`Mailbox`]. Its scheduler pops one envelope at a time and runs
//! the current [`Behavior`] on it. Each step is a separate task submitted to the system's
//! [`ExecutionContext`], so actors interleave fairly and a busy actor never grows its stack.
//! An actor with a receive timeout gets a [`ReceiveTimeout`] message whenever it stays idle
//! that long.
//!
//! ### Hierarchy
//!
//! Actors form a tree named by [`ActorPath`]s:
//!
//! - `/user` is the parent of every actor spawned through [`SystemRef::spawn`]
//! - `/system/deadLetters` receives every message no behavior matched, and every message sent
//!   to a stopped actor
//!
//! Stopping an actor stops its whole subtree first. Parents learn about terminated children
//! through [`Exited`] messages.
//!
//! ### Supervision
//!
//! When a behavior fails or panics, the actor halts and reports a crash to its parent. The
//! parent's [`SupervisionStrategy`] decides, with a per-child [`FailureCounter`], whether the
//! child restarts with its initial behavior and state or stops for good.
//!
//! ## Getting Started
//!
//! ```ignore
//! use actor::{ActorContext, ActorSystem, Behavior, Props, SystemConfig};
//! use tokio_util::sync::CancellationToken;
//! use std::time::Duration;
//!
//! #[derive(Debug, Clone)]
//! struct Increment(u64);
//!
//! #[derive(Debug, Clone)]
//! struct GetValue;
//!
//! fn counter() -> Behavior<u64> {
//!     Behavior::new()
//!         .on(|_ctx, value, Increment(by)| async move { Ok(value + by) })
//!         .on(|ctx: ActorContext<u64>, value, _: GetValue| async move {
//!             ctx.reply(value);
//!             Ok(value)
//!         })
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), actor::Error> {
//!     let token = CancellationToken::new();
//!     let (system, mut runner) = ActorSystem::create(SystemConfig::default(), token.clone())?;
//!
//!     let counter = system.spawn(Props::new(counter(), 0).named("counter"))?;
//!     counter.send(Increment(5));
//!     counter.send(Increment(3));
//!
//!     let value: u64 = counter.ask_as(GetValue, Duration::from_secs(1)).await?;
//!     assert_eq!(value, 8);
//!
//!     token.cancel();
//!     runner.run().await;
//!     Ok(())
//! }
//! ```
//!
//! ## API Organization
//!
//! - **Actors**: [`ActorRef`], [`ActorContext`], [`Props`], [`Hooks`], [`Behavior`]
//! - **Messages**: [`Message`], [`AnyMessage`], [`Envelope`], [`Identify`], [`ActorIdentity`],
//!   [`ReceiveTimeout`], [`Exited`], [`ExitReason`]
//! - **System**: [`ActorSystem`], [`SystemRef`], [`SystemRunner`], [`SystemConfig`],
//!   [`DeadLetter`]
//! - **Fault Tolerance**: [`SupervisionStrategy`], [`FailureCounter`], [`ChildAction`]
//! - **Plumbing**: [`Mailbox`], [`ExecutionContext`], [`IdGenerator`], [`Sink`], [`Subscriber`]
//!

// Private modules containing the implementation
mod actor;
mod ask;
mod behavior;
mod error;
mod execution;
mod ids;
mod mailbox;
mod message;
mod path;
mod scheduler;
mod sink;
mod supervision;
mod system;

//
// Actors
//

/// Handle used to send messages to an actor from anywhere.
///
/// See [`ActorRef::tell`], [`ActorRef::send`] and [`ActorRef::ask`].
pub use actor::ActorRef;

/// Context handed to a behavior for the message being handled.
///
/// It gives access to the sender, the parent and children, and lets the behavior spawn
/// children, switch behavior, change its receive timeout or stop.
pub use actor::ActorContext;

/// Lifecycle hooks run around start, restart and stop.
pub use actor::Hooks;

/// Name, behavior, initial state and options used to spawn an actor.
pub use actor::Props;

/// Factory of the initial actor state.
pub use actor::StateFactory;

/// Ordered list of message handling cases; the first match wins.
pub use behavior::Behavior;

/// Future returned by behavior handlers.
pub use behavior::HandlerFuture;

//
// Messages
//

/// Trait implemented by every type that can be sent to actors.
pub use message::Message;

/// Erased message payload.
pub use message::AnyMessage;

/// Message plus sender, recipient and correlation metadata.
pub use message::Envelope;

/// Runtime messages.
pub use message::{ActorIdentity, ExitReason, Exited, Identify, ReceiveTimeout};

//
// System
//

/// Entry point to create an actor system.
pub use system::ActorSystem;

/// Handle to a running actor system.
pub use system::SystemRef;

/// Future that completes when the actor system stops.
pub use system::SystemRunner;

/// Builder to inject collaborators into an actor system.
pub use system::SystemBuilder;

/// Serializable actor system configuration.
pub use system::SystemConfig;

/// System level events and callbacks.
pub use system::{DeadLetter, ShutdownCallback, SystemEvent};

//
// Fault tolerance
//

/// Supervision strategies and the per-child failure tally.
pub use supervision::{ChildAction, FailureCounter, MaxRetries, OneForOne, SupervisionStrategy};

//
// Plumbing
//

/// Per-actor FIFO queue with pause, resume and stop.
pub use mailbox::{Mailbox, MailboxError};

/// Task submission primitive the schedulers run on.
pub use execution::{ExecutionContext, Task, TokioExecutionContext};

/// Identifier generators.
pub use ids::{IdGenerator, RandomIdGenerator, SequentialIdGenerator};

/// Hierarchical actor addressing.
pub use path::ActorPath;

/// Event subscription.
pub use sink::{Event, Sink, Subscriber};

/// Error type of the actor runtime.
pub use error::Error;

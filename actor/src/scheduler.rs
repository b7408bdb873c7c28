// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Actor scheduler
//!
//! The scheduler drives one actor. Each iteration is a separate task submitted to the
//! execution context: it waits for the next envelope (or for the receive timeout), runs the
//! internal layer and then the current behavior, and finally submits the next iteration.
//! Only one iteration of a given actor exists at any time, which is what makes an actor
//! single-threaded.
//!

use crate::{
    actor::{lock, ActorCell, ActorContext, ActorRef, StateFactory},
    behavior::Behavior,
    execution::ExecutionContext,
    mailbox::MailboxError,
    message::{Envelope, Exited},
    Error,
};

use futures::FutureExt;

use tracing::debug;

use std::{
    any::Any,
    panic::AssertUnwindSafe,
    sync::{Arc, Mutex, MutexGuard, Weak},
};

/// Loop states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Status {
    /// Created, never started.
    Idle,
    /// An iteration is queued or running.
    Running,
    /// Left after a crash or a pause, waiting for an explicit start.
    Halted,
    /// Terminal.
    Stopped,
}

/// Scheduler operations the actor cell needs, independent of the state type.
pub(crate) trait Scheduling: Send + Sync {
    /// Starts the loop. No-op when running or stopped.
    fn start(self: Arc<Self>);
    /// Marks a running loop as halted; the current iteration submits nothing more.
    fn halt(&self);
    /// Stops the loop for good.
    fn stop(&self);
    /// Reinstalls the initial behavior and a fresh initial state.
    fn reset(&self);
}

/// Scheduler of an actor with state `S`.
pub(crate) struct ActorScheduler<S> {
    cell: Weak<ActorCell>,
    execution: Arc<dyn ExecutionContext>,
    status: Mutex<Status>,
    behavior: Mutex<Behavior<S>>,
    initial_behavior: Behavior<S>,
    state: Mutex<Option<S>>,
    initial_state: StateFactory<S>,
}

impl<S: Send + 'static> ActorScheduler<S> {
    pub(crate) fn new(
        actor: &ActorRef,
        execution: Arc<dyn ExecutionContext>,
        behavior: Behavior<S>,
        initial_state: StateFactory<S>,
    ) -> Arc<Self> {
        let state = initial_state();
        Arc::new(Self {
            cell: Arc::downgrade(&actor.0),
            execution,
            status: Mutex::new(Status::Idle),
            behavior: Mutex::new(behavior.clone()),
            initial_behavior: behavior,
            state: Mutex::new(Some(state)),
            initial_state,
        })
    }

    fn status(&self) -> MutexGuard<'_, Status> {
        lock(&self.status)
    }

    fn is_running(&self) -> bool {
        *self.status() == Status::Running
    }

    /// Replaces the behavior for the next iteration. The running one keeps the old one.
    pub(crate) fn become_behavior(&self, behavior: Behavior<S>) {
        if *self.status() == Status::Stopped {
            return;
        }
        *lock(&self.behavior) = behavior;
    }

    fn submit(self: Arc<Self>) {
        let execution = self.execution.clone();
        execution.submit(self.iteration().boxed());
    }

    async fn iteration(self: Arc<Self>) {
        if !self.is_running() {
            return;
        }
        let Some(cell) = self.cell.upgrade() else {
            return;
        };
        let actor = ActorRef(cell);

        let envelope = match self.next(&actor).await {
            Ok(envelope) => envelope,
            Err(signal) => {
                debug!("Actor {} leaves its loop: {}.", actor.path(), signal);
                self.halt();
                return;
            }
        };

        if !actor.handle_internal(&envelope).await {
            if let Err(error) = self.invoke(&actor, envelope).await {
                // The actor decides when the loop runs again.
                actor.crashed(&error);
                return;
            }
        }

        if self.is_running() {
            self.submit();
        }
    }

    /// Next envelope, or a receive timeout envelope if the actor stays idle too long.
    async fn next(&self, actor: &ActorRef) -> Result<Envelope, MailboxError> {
        let Some(timeout) = actor.receive_timeout() else {
            return actor.mailbox().pop().await;
        };
        match tokio::time::timeout(timeout, actor.mailbox().pop()).await {
            Ok(popped) => popped,
            Err(_) => {
                debug!("Actor {} idle for {:?}.", actor.path(), timeout);
                Ok(actor.receive_timeout_envelope(timeout))
            }
        }
    }

    /// Runs the current behavior. Failures and panics come back as errors.
    async fn invoke(self: &Arc<Self>, actor: &ActorRef, envelope: Envelope) -> Result<(), Error> {
        let behavior = lock(&self.behavior).clone();
        let Some(handler) = behavior.select(envelope.message()) else {
            if let Some(exit) = envelope.message().downcast_ref::<Exited>() {
                // Includes the second notice of a child stopped by supervision.
                debug!("Actor {} does not handle exits, dropping: {}.", actor.path(), exit);
            } else {
                actor.forward_to_dead_letters(&envelope);
            }
            return Ok(());
        };
        let Some(state) = lock(&self.state).take() else {
            return Err(Error::Functional(format!(
                "state of {} is unavailable",
                actor.path()
            )));
        };

        let message = envelope.message().clone();
        let ctx = ActorContext::new(actor.clone(), self.clone(), envelope);
        let outcome = AssertUnwindSafe(async move { handler(ctx, state, message).await })
            .catch_unwind()
            .await;
        match outcome {
            Ok(Ok(state)) => {
                *lock(&self.state) = Some(state);
                Ok(())
            }
            Ok(Err(error)) => Err(error),
            Err(panic) => Err(Error::Panicked(panic_message(panic.as_ref()))),
        }
    }
}

impl<S: Send + 'static> Scheduling for ActorScheduler<S> {
    fn start(self: Arc<Self>) {
        {
            let mut status = self.status();
            match *status {
                Status::Idle | Status::Halted => *status = Status::Running,
                Status::Running | Status::Stopped => return,
            }
        }
        self.submit();
    }

    fn halt(&self) {
        let mut status = self.status();
        if *status == Status::Running {
            *status = Status::Halted;
        }
    }

    fn stop(&self) {
        *self.status() = Status::Stopped;
    }

    fn reset(&self) {
        *lock(&self.behavior) = self.initial_behavior.clone();
        *lock(&self.state) = Some((self.initial_state)());
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_owned()
    }
}

// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Actor system
//!
//! The `system` module provides the `ActorSystem` type. The `ActorSystem` type is the responsible for
//! creating the root actors and owning the collaborators every actor shares: the execution
//! context, the id generator and the dead-letter actor.
//!
//! The tree of a running system looks like this:
//!
//! ```text
//! rook://<name>
//! ├── user              parent of every actor spawned through `SystemRef::spawn`
//! └── system
//!     └── deadLetters   receives every message nobody could handle
//! ```
//!

use crate::{
    actor::{self, lock},
    sink::{Event, Sink},
    ActorContext, ActorPath, ActorRef, AnyMessage, Behavior, Error, ExecutionContext,
    Exited, IdGenerator, Props, RandomIdGenerator, SupervisionStrategy,
    TokioExecutionContext,
};

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

use tracing::{debug, info};

use std::{
    fmt::{Debug, Formatter},
    sync::{Arc, Mutex},
};

/// Callback run once the system has shut down, with the exit of `/user`.
pub type ShutdownCallback = Box<dyn FnOnce(&Exited) + Send>;

/// Actor system configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Name of the system, the first segment of every path.
    pub name: String,
    /// Strategy of actors spawned without one.
    pub supervision: SupervisionStrategy,
    /// Dead-letter events buffered per subscriber before it lags.
    pub dead_letter_capacity: usize,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            name: "rook".to_owned(),
            supervision: SupervisionStrategy::default(),
            dead_letter_capacity: 1024,
        }
    }
}

impl SystemConfig {
    /// Default configuration with the given system name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Self::default()
        }
    }
}

/// Actor system.
///
pub struct ActorSystem {}

/// Default implementation for `ActorSystem`.
impl ActorSystem {
    /// Create a new actor system running on the current tokio runtime.
    ///
    /// Cancelling `token` shuts the system down.
    ///
    /// # Returns
    ///
    /// Returns a tuple with the system reference and the system runner.
    ///
    /// # Errors
    ///
    /// Returns `Error::Start` outside of a tokio runtime.
    ///
    pub fn create(
        config: SystemConfig,
        token: CancellationToken,
    ) -> Result<(SystemRef, SystemRunner), Error> {
        Self::builder(config).token(token).build()
    }

    /// Builder to inject the execution context or the id generator.
    pub fn builder(config: SystemConfig) -> SystemBuilder {
        SystemBuilder {
            config,
            execution: None,
            ids: None,
            token: None,
        }
    }
}

/// Actor system builder.
pub struct SystemBuilder {
    config: SystemConfig,
    execution: Option<Arc<dyn ExecutionContext>>,
    ids: Option<Arc<dyn IdGenerator>>,
    token: Option<CancellationToken>,
}

impl SystemBuilder {
    /// Runs every actor on `execution`. Defaults to the current tokio runtime.
    pub fn execution_context(mut self, execution: Arc<dyn ExecutionContext>) -> Self {
        self.execution = Some(execution);
        self
    }

    /// Draws identifiers from `ids`. Defaults to random ids.
    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Shuts the system down when `token` is cancelled.
    pub fn token(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Creates the system and its root actors.
    ///
    /// # Errors
    ///
    /// Returns `Error::Start` when no execution context is given and there is no tokio
    /// runtime.
    ///
    pub fn build(self) -> Result<(SystemRef, SystemRunner), Error> {
        let execution: Arc<dyn ExecutionContext> = match self.execution {
            Some(execution) => execution,
            None => Arc::new(TokioExecutionContext::current()?),
        };
        let ids = self.ids.unwrap_or_else(|| Arc::new(RandomIdGenerator));
        let token = self.token.unwrap_or_default();
        let (dead_letter_events, _) =
            broadcast::channel(self.config.dead_letter_capacity.max(1));
        let (event_sender, event_receiver) = mpsc::channel(4);
        let root = ActorPath::new_root(&self.config.name, ids.next_id());

        let system = SystemRef {
            inner: Arc::new(SystemInner {
                config: self.config,
                ids,
                execution,
                root,
                roots: Mutex::new(None),
                user_exit: Mutex::new(None),
                shutdown_callbacks: Mutex::new(Vec::new()),
                token,
                terminated: CancellationToken::new(),
                dead_letter_events,
            }),
        };
        system.start_roots()?;

        let watcher = system.clone();
        system.inner.execution.submit(
            async move {
                watcher.inner.token.cancelled().await;
                watcher.shutdown(event_sender).await;
            }
            .boxed(),
        );

        debug!("Actor system {} created.", system.name());
        Ok((system, SystemRunner::new(event_receiver)))
    }
}

/// System event.
///
#[derive(Debug, Clone)]
pub enum SystemEvent {
    /// Stop the actor system.
    StopSystem,
}

/// A message nobody could handle, with the actor that sent it.
#[derive(Clone, Debug)]
pub struct DeadLetter {
    /// The undelivered message.
    pub message: AnyMessage,
    /// Its original sender.
    pub sender: ActorRef,
}

impl Event for DeadLetter {}

#[derive(Clone)]
struct Roots {
    user: ActorRef,
    system: ActorRef,
    dead_letters: ActorRef,
}

struct SystemInner {
    config: SystemConfig,
    ids: Arc<dyn IdGenerator>,
    execution: Arc<dyn ExecutionContext>,
    root: ActorPath,
    /// Cleared on shutdown, which also releases the actors holding this system.
    roots: Mutex<Option<Roots>>,
    user_exit: Mutex<Option<Exited>>,
    shutdown_callbacks: Mutex<Vec<ShutdownCallback>>,
    token: CancellationToken,
    terminated: CancellationToken,
    dead_letter_events: broadcast::Sender<DeadLetter>,
}

/// System reference.
///
#[derive(Clone)]
pub struct SystemRef {
    inner: Arc<SystemInner>,
}

impl SystemRef {
    fn start_roots(&self) -> Result<(), Error> {
        let user = actor::spawn(
            self,
            None,
            &self.inner.root,
            Props::stateless(Behavior::ignore()).named("user"),
        )?;
        let system = actor::spawn(
            self,
            None,
            &self.inner.root,
            Props::stateless(Behavior::ignore()).named("system"),
        )?;
        let dead_letters = actor::spawn(
            self,
            Some(&system),
            system.path(),
            dead_letters(self.inner.dead_letter_events.clone()),
        )?;
        *lock(&self.inner.roots) = Some(Roots {
            user,
            system,
            dead_letters,
        });
        Ok(())
    }

    fn roots(&self) -> Option<Roots> {
        lock(&self.inner.roots).clone()
    }

    /// The name of the system.
    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    /// The root of the naming tree.
    pub fn root_path(&self) -> &ActorPath {
        &self.inner.root
    }

    /// Launches a new top level actor under `/user`.
    ///
    /// # Arguments
    ///
    /// * `props` - Name, behavior, initial state and options of the actor.
    ///
    /// # Returns
    ///
    /// Returns the actor reference.
    ///
    /// # Error
    ///
    /// * `Error::Exists` - A top level actor with the same name is alive.
    /// * `Error::SystemTerminated` - The system is shutting down.
    /// * `Error::Start` - The `pre_start` hook failed.
    ///
    pub fn spawn<S: Send + 'static>(&self, props: Props<S>) -> Result<ActorRef, Error> {
        if self.inner.token.is_cancelled() {
            return Err(Error::SystemTerminated);
        }
        let user = self.user_root().ok_or(Error::SystemTerminated)?;
        actor::spawn(self, Some(&user), user.path(), props).map_err(|e| match e {
            Error::Terminated(_) => Error::SystemTerminated,
            e => e,
        })
    }

    /// Registers a callback run after shutdown with the exit of `/user`. Runs it right away
    /// if the system is already terminated.
    pub fn on_shutdown<F>(&self, callback: F)
    where
        F: FnOnce(&Exited) + Send + 'static,
    {
        if self.inner.terminated.is_cancelled() {
            if let Some(exit) = lock(&self.inner.user_exit).clone() {
                callback(&exit);
                return;
            }
        }
        lock(&self.inner.shutdown_callbacks).push(Box::new(callback));
    }

    /// The dead-letter actor, `None` once the system is terminated.
    pub fn dead_letters(&self) -> Option<ActorRef> {
        self.roots().map(|roots| roots.dead_letters)
    }

    /// The `/user` actor, parent of all top level actors.
    pub fn user_root(&self) -> Option<ActorRef> {
        self.roots().map(|roots| roots.user)
    }

    /// The `/system` actor.
    pub fn system_root(&self) -> Option<ActorRef> {
        self.roots().map(|roots| roots.system)
    }

    /// The execution context every actor runs on.
    pub fn execution_context(&self) -> Arc<dyn ExecutionContext> {
        self.inner.execution.clone()
    }

    /// Receives every dead letter from now on.
    pub fn subscribe_dead_letters(&self) -> broadcast::Receiver<DeadLetter> {
        self.inner.dead_letter_events.subscribe()
    }

    /// Run a sink on the execution context.
    pub async fn run_sink<E>(&self, mut sink: Sink<E>)
    where
        E: Event,
    {
        self.inner.execution.submit(
            async move {
                sink.run().await;
            }
            .boxed(),
        );
    }

    /// Shuts the system down. Same as cancelling its token.
    pub fn stop_system(&self) {
        self.inner.token.cancel();
    }

    /// True once shutdown is complete.
    pub fn is_terminated(&self) -> bool {
        self.inner.terminated.is_cancelled()
    }

    /// Waits until shutdown is complete.
    pub async fn terminated(&self) {
        self.inner.terminated.cancelled().await;
    }

    pub(crate) fn ids(&self) -> &dyn IdGenerator {
        self.inner.ids.as_ref()
    }

    pub(crate) fn next_id(&self) -> String {
        self.inner.ids.next_id()
    }

    pub(crate) fn default_supervision(&self) -> SupervisionStrategy {
        self.inner.config.supervision
    }

    /// A root actor has no parent to notify; its exit ends up here.
    pub(crate) fn root_exited(&self, exit: &Exited) {
        debug!("Root actor {}.", exit);
        let Some(user) = self.user_root() else {
            return;
        };
        if exit.actor == user {
            let mut user_exit = lock(&self.inner.user_exit);
            if user_exit.is_none() {
                *user_exit = Some(exit.clone());
            }
            drop(user_exit);
            self.inner.token.cancel();
        }
    }

    async fn shutdown(&self, events: mpsc::Sender<SystemEvent>) {
        debug!("Stopping actor system...");
        if let Some(roots) = self.roots() {
            for root in [&roots.user, &roots.system] {
                root.stop(Exited::normal(
                    root.clone(),
                    Some("system shutdown".to_owned()),
                ));
                root.terminated().await;
            }
        }
        lock(&self.inner.roots).take();

        let exit = lock(&self.inner.user_exit).clone();
        let callbacks = std::mem::take(&mut *lock(&self.inner.shutdown_callbacks));
        if let Some(exit) = exit {
            for callback in callbacks {
                callback(&exit);
            }
        }
        self.inner.terminated.cancel();
        info!("Actor system {} stopped.", self.name());
        let _ = events.send(SystemEvent::StopSystem).await;
    }
}

impl Debug for SystemRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SystemRef({})", self.inner.root)
    }
}

fn dead_letters(
    events: broadcast::Sender<DeadLetter>,
) -> Props<broadcast::Sender<DeadLetter>> {
    let behavior = Behavior::new().otherwise(
        |ctx: ActorContext<broadcast::Sender<DeadLetter>>,
         events: broadcast::Sender<DeadLetter>,
         message: AnyMessage| async move {
            info!("Dead letter from {}: {:?}.", ctx.sender().path(), message);
            // Nobody listening is fine.
            let _ = events.send(DeadLetter {
                message,
                sender: ctx.sender().clone(),
            });
            Ok(events)
        },
    );
    Props::new(behavior, events).named("deadLetters")
}

/// System runner.
pub struct SystemRunner {
    /// The event receiver.
    event_receiver: mpsc::Receiver<SystemEvent>,
}

impl SystemRunner {
    /// Create a new system runner.
    pub(crate) fn new(event_receiver: mpsc::Receiver<SystemEvent>) -> Self {
        Self { event_receiver }
    }

    /// Run the actor system until it stops.
    pub async fn run(&mut self) {
        debug!("Running actor system...");
        while let Some(event) = self.event_receiver.recv().await {
            match event {
                SystemEvent::StopSystem => {
                    debug!("Actor system stopped.");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    use crate::SequentialIdGenerator;

    use tracing_test::traced_test;

    #[tokio::test]
    #[traced_test]
    async fn test_stop_actor_system() {
        let token = CancellationToken::new();
        let (system, mut runner) =
            ActorSystem::create(SystemConfig::default(), token.clone()).unwrap();
        let (sender, receiver) = tokio::sync::oneshot::channel();
        system.on_shutdown(move |exit| {
            let _ = sender.send(exit.clone());
        });

        token.cancel();
        runner.run().await;
        assert!(logs_contain("Running actor system..."));
        assert!(logs_contain("Actor system stopped."));

        let exit = receiver.await.unwrap();
        assert_eq!(exit.actor.path().to_string(), "rook://rook/user");
        assert!(exit.is_normal());
        assert!(system.is_terminated());
        assert!(system.dead_letters().is_none());
        assert_eq!(
            system.spawn(Props::stateless(Behavior::ignore())).unwrap_err(),
            Error::SystemTerminated
        );
    }

    #[tokio::test]
    async fn test_root_layout() {
        let (system, _runner) = ActorSystem::builder(SystemConfig::new("app"))
            .id_generator(Arc::new(SequentialIdGenerator::new("id-")))
            .build()
            .unwrap();

        let user = system.user_root().unwrap();
        let guardian = system.system_root().unwrap();
        let dead_letters = system.dead_letters().unwrap();
        assert_eq!(user.path().to_string(), "rook://app/user");
        assert_eq!(guardian.path().to_string(), "rook://app/system");
        assert_eq!(dead_letters.path().to_string(), "rook://app/system/deadLetters");
        assert_eq!(system.root_path().uid(), "id-1");
        assert!(guardian.path().is_parent_of(dead_letters.path()));
    }

    #[tokio::test]
    async fn test_duplicate_top_level_name() {
        let (system, _runner) =
            ActorSystem::create(SystemConfig::default(), CancellationToken::new())
                .unwrap();
        system
            .spawn(Props::stateless(Behavior::ignore()).named("a"))
            .unwrap();
        let duplicate = system.spawn(Props::stateless(Behavior::ignore()).named("a"));
        assert_eq!(
            duplicate.unwrap_err(),
            Error::Exists("rook://rook/user/a".to_owned())
        );
    }

    #[test]
    fn test_config_defaults() {
        let config = SystemConfig::default();
        assert_eq!(config.name, "rook");
        assert_eq!(config.supervision, SupervisionStrategy::default());
        assert_eq!(config.dead_letter_capacity, 1024);
    }
}

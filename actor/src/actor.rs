// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Actor
//!
//! The `actor` module ties a mailbox, a scheduler, a path and a set of children together into
//! an actor. It provides the [`ActorRef`] handle used to talk to an actor from anywhere, the
//! [`ActorContext`] handed to the behavior while it handles a message, and the [`Props`] and
//! [`Hooks`] used to spawn one.
//!
//! Every actor wraps its user behavior with an internal layer checked first:
//!
//! - control messages the actor sends to itself (stop, restart),
//! - [`Identify`] requests, answered with an [`ActorIdentity`],
//! - [`Exited`] notifications from its children, which drive supervision.
//!

use crate::{
    ask,
    behavior::Behavior,
    mailbox::Mailbox,
    message::{
        ActorIdentity, AnyMessage, Control, Envelope, Exited, Identify, Message,
        ReceiveTimeout,
    },
    scheduler::{ActorScheduler, Scheduling},
    supervision::{ChildAction, FailureCounter, SupervisionStrategy},
    ActorPath, Error, SystemRef,
};

use futures::{future::BoxFuture, FutureExt};
use tokio_util::sync::CancellationToken;

use tracing::{debug, error, warn};

use std::{
    fmt::{Debug, Display, Formatter},
    hash::{Hash, Hasher},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard, OnceLock, PoisonError,
    },
    time::Duration,
};

/// Builds the initial state of an actor, on spawn and on every restart.
pub type StateFactory<S> = Arc<dyn Fn() -> S + Send + Sync>;

type StartHook = Arc<dyn Fn(&ActorRef) -> Result<(), Error> + Send + Sync>;
type Hook = Arc<dyn Fn(&ActorRef) + Send + Sync>;
type StopHook = Arc<dyn Fn(&ActorRef, &Exited) + Send + Sync>;

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Lifecycle hooks of an actor.
///
/// Hooks run inside the actor's own execution, so they never race with the behavior.
///
/// # Examples
///
/// ```ignore
/// let hooks = Hooks::new()
///     .pre_start(|me| {
///         tracing::info!("{} starting", me.path());
///         Ok(())
///     })
///     .post_stop(|me, exit| tracing::info!("{} gone: {}", me.path(), exit.reason));
/// ```
///
#[derive(Clone, Default)]
pub struct Hooks {
    pre_start: Option<StartHook>,
    pre_restart: Option<Hook>,
    post_restart: Option<Hook>,
    post_stop: Option<StopHook>,
}

impl Hooks {
    /// No hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs once the actor is registered, before its first message. An error aborts the
    /// spawn.
    pub fn pre_start<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ActorRef) -> Result<(), Error> + Send + Sync + 'static,
    {
        self.pre_start = Some(Arc::new(hook));
        self
    }

    /// Runs when a restart begins.
    pub fn pre_restart<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ActorRef) + Send + Sync + 'static,
    {
        self.pre_restart = Some(Arc::new(hook));
        self
    }

    /// Runs when a restart is complete.
    pub fn post_restart<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ActorRef) + Send + Sync + 'static,
    {
        self.post_restart = Some(Arc::new(hook));
        self
    }

    /// Runs last during a stop, with the exit reported to the parent.
    pub fn post_stop<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ActorRef, &Exited) + Send + Sync + 'static,
    {
        self.post_stop = Some(Arc::new(hook));
        self
    }

    fn run_pre_start(&self, actor: &ActorRef) -> Result<(), Error> {
        self.pre_start.as_ref().map_or(Ok(()), |hook| hook(actor))
    }

    fn run_pre_restart(&self, actor: &ActorRef) {
        if let Some(hook) = &self.pre_restart {
            hook(actor);
        }
    }

    fn run_post_restart(&self, actor: &ActorRef) {
        if let Some(hook) = &self.post_restart {
            hook(actor);
        }
    }

    fn run_post_stop(&self, actor: &ActorRef, exit: &Exited) {
        if let Some(hook) = &self.post_stop {
            hook(actor, exit);
        }
    }
}

/// Everything needed to spawn an actor.
///
/// # Type Parameters
///
/// * `S` - The actor state threaded through the behavior.
///
/// # Examples
///
/// ```ignore
/// let props = Props::new(counter_behavior(), 0_u64)
///     .named("counter")
///     .receive_timeout(Duration::from_secs(30))
///     .supervision(SupervisionStrategy::one_for_one(3, Duration::from_secs(1)));
/// let counter = system.spawn(props)?;
/// ```
///
pub struct Props<S> {
    name: Option<String>,
    behavior: Behavior<S>,
    state: StateFactory<S>,
    supervision: Option<SupervisionStrategy>,
    receive_timeout: Option<Duration>,
    hooks: Hooks,
}

impl<S: Send + 'static> Props<S> {
    /// Props starting from `state`, cloned again on every restart.
    pub fn new(behavior: Behavior<S>, state: S) -> Self
    where
        S: Clone + Sync,
    {
        Self::with_state(behavior, move || state.clone())
    }

    /// Props whose initial state comes from `factory`.
    pub fn with_state<F>(behavior: Behavior<S>, factory: F) -> Self
    where
        F: Fn() -> S + Send + Sync + 'static,
    {
        Self {
            name: None,
            behavior,
            state: Arc::new(factory),
            supervision: None,
            receive_timeout: None,
            hooks: Hooks::default(),
        }
    }

    /// Sets the name. Without one a unique name is generated.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets how this actor supervises its children. Without one the system default applies.
    pub fn supervision(mut self, strategy: SupervisionStrategy) -> Self {
        self.supervision = Some(strategy);
        self
    }

    /// Sets the initial receive timeout. Without one the actor waits forever.
    pub fn receive_timeout(mut self, timeout: Duration) -> Self {
        self.receive_timeout = Some(timeout);
        self
    }

    /// Sets the lifecycle hooks.
    pub fn hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }
}

impl Props<()> {
    /// Props for an actor without state.
    pub fn stateless(behavior: Behavior<()>) -> Self {
        Self::new(behavior, ())
    }
}

/// A child as seen by its parent.
struct Child {
    actor: ActorRef,
    failures: FailureCounter,
}

/// Shared part of an actor, behind every `ActorRef`.
pub(crate) struct ActorCell {
    path: ActorPath,
    system: SystemRef,
    parent: Option<ActorRef>,
    mailbox: Mailbox<Envelope>,
    children: Mutex<Vec<Child>>,
    supervision: SupervisionStrategy,
    initial_timeout: Option<Duration>,
    receive_timeout: Mutex<Option<Duration>>,
    terminated: AtomicBool,
    termination: CancellationToken,
    hooks: Hooks,
    scheduler: OnceLock<Arc<dyn Scheduling>>,
}

/// Handle to an actor.
///
/// An `ActorRef` is the only way to reach an actor. It is cheap to clone and can be sent
/// anywhere; all of its sending operations enqueue without waiting for the actor.
///
/// # Examples
///
/// ```ignore
/// // Fire and forget, the sender is the dead-letter actor.
/// counter.send(Increment(1));
///
/// // Explicit sender, replies go to `me`.
/// counter.tell(GetCount, &me);
///
/// // Request and reply.
/// let count: u64 = counter.ask_as(GetCount, Duration::from_secs(1)).await?;
/// ```
///
#[derive(Clone)]
pub struct ActorRef(pub(crate) Arc<ActorCell>);

impl ActorRef {
    /// The path of the actor.
    pub fn path(&self) -> &ActorPath {
        &self.0.path
    }

    /// The name of the actor, unique among its siblings.
    pub fn name(&self) -> &str {
        self.0.path.name()
    }

    /// Sends `message` on behalf of `sender`.
    ///
    /// If the actor is already gone the message goes to the dead letters.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to deliver.
    /// * `sender` - The actor the recipient sees as sender, and replies to.
    ///
    pub fn tell<M: Message>(&self, message: M, sender: &ActorRef) {
        let envelope = Envelope::new(
            self.0.system.ids(),
            AnyMessage::new(message),
            sender.clone(),
            self.clone(),
            None,
        );
        self.deliver(envelope);
    }

    /// Sends `message` without a sender. Replies go to the dead letters.
    pub fn send<M: Message>(&self, message: M) {
        match self.0.system.dead_letters() {
            Some(dead_letters) => self.tell(message, &dead_letters),
            None => debug!(
                "Actor system is terminated, dropping message for {}.",
                self.path()
            ),
        }
    }

    /// Sends `message` and waits for the first message sent back.
    ///
    /// A short-lived helper actor sends the request on the caller's behalf and stops after
    /// the first reply or after `timeout`, whichever comes first. A target that never
    /// replies holds the helper until the timeout, so avoid very long timeouts.
    ///
    /// # Arguments
    ///
    /// * `message` - The request.
    /// * `timeout` - How long to wait for the reply.
    ///
    /// # Returns
    ///
    /// Returns the reply message.
    ///
    /// # Errors
    ///
    /// * `Error::TimedOut` - No reply arrived in time.
    /// * `Error::SystemTerminated` - The actor system is shutting down.
    ///
    pub fn ask<M: Message>(
        &self,
        message: M,
        timeout: Duration,
    ) -> BoxFuture<'static, Result<AnyMessage, Error>> {
        ask::ask(self, AnyMessage::new(message), timeout)
    }

    /// Like [`ActorRef::ask`], downcasting the reply to `R`.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnexpectedReply` if the reply is not an `R`, plus the errors of
    /// [`ActorRef::ask`].
    ///
    pub fn ask_as<M, R>(
        &self,
        message: M,
        timeout: Duration,
    ) -> BoxFuture<'static, Result<R, Error>>
    where
        M: Message,
        R: Message + Clone,
    {
        let reply = self.ask(message, timeout);
        async move {
            let reply = reply.await?;
            reply.downcast::<R>().ok_or_else(|| {
                Error::UnexpectedReply(std::any::type_name::<R>().to_owned())
            })
        }
        .boxed()
    }

    /// True once the actor was asked to stop.
    pub fn is_terminated(&self) -> bool {
        self.0.terminated.load(Ordering::SeqCst)
    }

    /// Waits until the actor has stopped, including its children and its `post_stop` hook.
    pub async fn terminated(&self) {
        self.0.termination.cancelled().await;
    }

    pub(crate) fn system(&self) -> &SystemRef {
        &self.0.system
    }

    pub(crate) fn parent(&self) -> Option<&ActorRef> {
        self.0.parent.as_ref()
    }

    pub(crate) fn mailbox(&self) -> &Mailbox<Envelope> {
        &self.0.mailbox
    }

    pub(crate) fn children(&self) -> Vec<ActorRef> {
        lock(&self.0.children)
            .iter()
            .map(|child| child.actor.clone())
            .collect()
    }

    pub(crate) fn receive_timeout(&self) -> Option<Duration> {
        *lock(&self.0.receive_timeout)
    }

    pub(crate) fn set_receive_timeout(&self, timeout: Option<Duration>) {
        *lock(&self.0.receive_timeout) = timeout;
    }

    fn scheduler(&self) -> Option<&Arc<dyn Scheduling>> {
        self.0.scheduler.get()
    }

    /// Pushes an envelope, rerouting it to the dead letters if the mailbox is stopped.
    pub(crate) fn deliver(&self, envelope: Envelope) {
        if self.0.mailbox.is_stopped() {
            self.forward_to_dead_letters(&envelope);
            return;
        }
        self.0.mailbox.push(envelope);
    }

    /// Hands an undeliverable envelope to the dead letters, keeping its sender.
    pub(crate) fn forward_to_dead_letters(&self, envelope: &Envelope) {
        if envelope.message().is::<Control>() {
            return;
        }
        let Some(dead_letters) = self.0.system.dead_letters() else {
            debug!("Dropping message {:?}, no dead letters.", envelope.message());
            return;
        };
        if dead_letters == *self {
            debug!("Dropping message {:?}, dead letters stopped.", envelope.message());
            return;
        }
        debug!(
            "Message {:?} for {} forwarded to dead letters.",
            envelope.message(),
            self.path()
        );
        dead_letters.deliver(envelope.redirect(self.0.system.ids(), dead_letters.clone()));
    }

    pub(crate) fn receive_timeout_envelope(&self, timeout: Duration) -> Envelope {
        Envelope::new(
            self.0.system.ids(),
            AnyMessage::new(ReceiveTimeout(timeout)),
            self.clone(),
            self.clone(),
            None,
        )
    }

    fn control(&self, control: Control) -> Envelope {
        Envelope::new(
            self.0.system.ids(),
            AnyMessage::new(control),
            self.clone(),
            self.clone(),
            None,
        )
    }

    /// Makes sure the loop runs, even after a crash left it halted.
    fn wake(&self) {
        self.0.mailbox.resume();
        if let Some(scheduler) = self.scheduler() {
            scheduler.clone().start();
        }
    }

    /// Requests a stop, ahead of every queued message.
    pub(crate) fn stop(&self, exit: Exited) {
        if self.0.terminated.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!("Stop requested for actor {}: {}.", self.path(), exit.reason);
        self.set_receive_timeout(None);
        self.0.mailbox.unshift(self.control(Control::Stop(exit)));
        self.wake();
    }

    /// Requests a restart, ahead of every queued message.
    pub(crate) fn restart(&self) {
        if self.is_terminated() {
            return;
        }
        self.0.mailbox.unshift(self.control(Control::Restart));
        self.wake();
    }

    /// Registers a child. Fails once a stop was requested: `stop` raises the flag before
    /// `handle_stop` drains the children under the same lock, so no child is added after
    /// the drain.
    fn adopt(&self, child: &ActorRef) -> Result<(), Error> {
        let mut children = lock(&self.0.children);
        if self.is_terminated() {
            return Err(Error::Terminated(self.path().to_string()));
        }
        children.push(Child {
            actor: child.clone(),
            failures: self.0.supervision.counter(),
        });
        Ok(())
    }

    /// Undoes a spawn that never started.
    fn abort_start(&self, scheduler: &Arc<dyn Scheduling>) {
        self.0.terminated.store(true, Ordering::SeqCst);
        self.0.mailbox.stop();
        scheduler.stop();
        self.0.path.dispose();
        self.0.termination.cancel();
    }

    fn disown(&self, child: &ActorRef) {
        lock(&self.0.children).retain(|entry| entry.actor != *child);
    }

    fn take_children(&self) -> Vec<ActorRef> {
        lock(&self.0.children)
            .drain(..)
            .map(|child| child.actor)
            .collect()
    }

    fn is_dead_letters(&self) -> bool {
        self.0
            .system
            .dead_letters()
            .is_some_and(|dead_letters| dead_letters == *self)
    }

    fn notify_parent(&self, exit: &Exited) {
        match &self.0.parent {
            Some(parent) => parent.tell(exit.clone(), self),
            None => self.0.system.root_exited(exit),
        }
    }

    /// Internal layer. Returns `true` when the envelope was consumed.
    pub(crate) async fn handle_internal(&self, envelope: &Envelope) -> bool {
        let message = envelope.message();
        if let Some(control) = message.downcast_ref::<Control>() {
            if envelope.sender() != self {
                warn!(
                    "Actor {} ignores control message from {}.",
                    self.path(),
                    envelope.sender().path()
                );
                return true;
            }
            match control {
                Control::Stop(exit) => self.handle_stop(exit.clone()).await,
                Control::Restart => self.handle_restart(),
            }
            return true;
        }
        if let Some(Identify(id)) = message.downcast_ref::<Identify>() {
            if self.is_dead_letters() {
                // An undeliverable request stays a dead letter.
                return false;
            }
            let identity = ActorIdentity {
                actor: self.clone(),
                id: id.clone(),
            };
            let reply = Envelope::respond_to(
                self.0.system.ids(),
                envelope,
                AnyMessage::new(identity),
                self.clone(),
            );
            envelope.sender().deliver(reply);
            return true;
        }
        if let Some(exited) = message.downcast_ref::<Exited>() {
            return self.supervise(exited);
        }
        false
    }

    /// Child exit bookkeeping. Crashes of live children are consumed here, every other exit
    /// of a child is also shown to the behavior.
    fn supervise(&self, exited: &Exited) -> bool {
        let mut children = lock(&self.0.children);
        let Some(index) = children.iter().position(|child| child.actor == exited.actor)
        else {
            return false;
        };
        if !exited.is_crashed() || exited.actor.is_terminated() {
            children.remove(index);
            return false;
        }
        let action = children[index].failures.decide();
        match action {
            ChildAction::Restart => {
                drop(children);
                warn!("Restarting actor {} after a crash.", exited.actor.path());
                exited.actor.restart();
            }
            ChildAction::Stop => {
                let child = children.remove(index);
                drop(children);
                error!(
                    "Actor {} crashed too often, stopping it.",
                    exited.actor.path()
                );
                child.actor.stop(exited.clone());
            }
        }
        true
    }

    async fn handle_stop(&self, exit: Exited) {
        debug!("Actor {} is stopping.", self.path());
        self.0.mailbox.pause();

        let children = self.take_children();
        for child in &children {
            child.stop(Exited::killed(child.clone(), exit.clone()));
        }
        for child in &children {
            child.terminated().await;
        }

        let undelivered = self.0.mailbox.stop();
        if let Some(scheduler) = self.scheduler() {
            scheduler.stop();
        }
        for envelope in &undelivered {
            self.forward_to_dead_letters(envelope);
        }

        self.notify_parent(&exit);
        self.0.hooks.run_post_stop(self, &exit);
        self.0.path.dispose();
        self.0.termination.cancel();
        debug!("Actor {} is terminated.", self.path());
    }

    fn handle_restart(&self) {
        debug!("Actor {} is restarting.", self.path());
        self.0.hooks.run_pre_restart(self);
        // Restarts only follow a crash, and `crashed` already stopped every child.
        self.0.mailbox.pause();
        if let Some(scheduler) = self.scheduler() {
            scheduler.reset();
        }
        self.set_receive_timeout(self.0.initial_timeout);
        self.0.mailbox.resume();
        self.0.hooks.run_post_restart(self);
        debug!("Actor {} is restarted.", self.path());
    }

    /// Called by the scheduler when the behavior failed. The loop is left halted with the
    /// mailbox paused until the parent decides.
    pub(crate) fn crashed(&self, error: &Error) {
        self.0.mailbox.pause();
        if let Some(scheduler) = self.scheduler() {
            scheduler.halt();
        }
        if self.is_terminated() {
            // A stop is already queued.
            self.wake();
            return;
        }
        error!("Actor {} crashed: {}", self.path(), error);
        let exit = Exited::crashed(self.clone(), error);
        self.notify_parent(&exit);
        for child in self.take_children() {
            child.stop(Exited::killed(child.clone(), exit.clone()));
        }
    }
}

impl PartialEq for ActorRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ActorRef {}

impl Hash for ActorRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.path.hash(state);
    }
}

impl Debug for ActorRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ActorRef({})", self.0.path)
    }
}

impl Display for ActorRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0.path, f)
    }
}

/// Spawns an actor under `parent_path`, registered as a child of `parent` when given.
pub(crate) fn spawn<S: Send + 'static>(
    system: &SystemRef,
    parent: Option<&ActorRef>,
    parent_path: &ActorPath,
    props: Props<S>,
) -> Result<ActorRef, Error> {
    if let Some(parent) = parent {
        if parent.is_terminated() {
            return Err(Error::Terminated(parent.path().to_string()));
        }
    }
    let Props {
        name,
        behavior,
        state,
        supervision,
        receive_timeout,
        hooks,
    } = props;
    let name = name.unwrap_or_else(|| system.next_id());
    let path = parent_path.add(&name, system.next_id())?;

    let actor = ActorRef(Arc::new(ActorCell {
        path,
        system: system.clone(),
        parent: parent.cloned(),
        mailbox: Mailbox::new(),
        children: Mutex::new(Vec::new()),
        supervision: supervision.unwrap_or_else(|| system.default_supervision()),
        initial_timeout: receive_timeout,
        receive_timeout: Mutex::new(receive_timeout),
        terminated: AtomicBool::new(false),
        termination: CancellationToken::new(),
        hooks,
        scheduler: OnceLock::new(),
    }));
    let scheduler: Arc<dyn Scheduling> =
        ActorScheduler::new(&actor, system.execution_context(), behavior, state);
    if actor.0.scheduler.set(scheduler.clone()).is_err() {
        return Err(Error::Start(format!("{} already has a scheduler", actor.path())));
    }
    if let Some(parent) = parent {
        if let Err(e) = parent.adopt(&actor) {
            debug!("Actor {} not started, parent is stopping.", actor.path());
            actor.abort_start(&scheduler);
            return Err(e);
        }
    }

    if let Err(e) = actor.0.hooks.run_pre_start(&actor) {
        error!("Actor {} failed to start: {}", actor.path(), e);
        if let Some(parent) = parent {
            parent.disown(&actor);
        }
        actor.abort_start(&scheduler);
        return Err(Error::Start(format!("{}: {}", actor.path(), e)));
    }

    scheduler.start();
    debug!("Actor {} is started.", actor.path());
    Ok(actor)
}

/// Context handed to a behavior for the message being handled.
///
/// # Type Parameters
///
/// * `S` - The actor state, needed to install a new behavior.
///
pub struct ActorContext<S> {
    actor: ActorRef,
    scheduler: Arc<ActorScheduler<S>>,
    envelope: Envelope,
}

impl<S> Clone for ActorContext<S> {
    fn clone(&self) -> Self {
        Self {
            actor: self.actor.clone(),
            scheduler: self.scheduler.clone(),
            envelope: self.envelope.clone(),
        }
    }
}

impl<S: Send + 'static> ActorContext<S> {
    pub(crate) fn new(
        actor: ActorRef,
        scheduler: Arc<ActorScheduler<S>>,
        envelope: Envelope,
    ) -> Self {
        Self {
            actor,
            scheduler,
            envelope,
        }
    }

    /// The actor handling the message.
    pub fn myself(&self) -> &ActorRef {
        &self.actor
    }

    /// The path of the actor handling the message.
    pub fn path(&self) -> &ActorPath {
        self.actor.path()
    }

    /// The actor system.
    pub fn system(&self) -> &SystemRef {
        self.actor.system()
    }

    /// The parent, `None` for the system roots.
    pub fn parent(&self) -> Option<&ActorRef> {
        self.actor.parent()
    }

    /// The live children, in spawn order.
    pub fn children(&self) -> Vec<ActorRef> {
        self.actor.children()
    }

    /// The live child named `name`.
    pub fn child(&self, name: &str) -> Option<ActorRef> {
        self.children().into_iter().find(|child| child.name() == name)
    }

    /// The sender of the message being handled.
    pub fn sender(&self) -> &ActorRef {
        self.envelope.sender()
    }

    /// The envelope being handled.
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Installs the behavior used from the next message on.
    pub fn become_behavior(&self, behavior: Behavior<S>) {
        if self.actor.is_terminated() {
            return;
        }
        self.scheduler.become_behavior(behavior);
    }

    /// Spawns a child.
    ///
    /// # Errors
    ///
    /// * `Error::Exists` - A live child already has the requested name.
    /// * `Error::Terminated` - This actor is stopping.
    /// * `Error::Start` - The `pre_start` hook of the child failed.
    ///
    pub fn spawn<C: Send + 'static>(&self, props: Props<C>) -> Result<ActorRef, Error> {
        spawn(self.system(), Some(&self.actor), self.actor.path(), props)
    }

    /// Stops this actor once the current message is handled.
    pub fn stop(&self, reason: Option<String>) {
        self.actor.stop(Exited::normal(self.actor.clone(), reason));
    }

    /// Sets the receive timeout for the next waits. `None` waits forever.
    pub fn set_receive_timeout(&self, timeout: Option<Duration>) {
        if self.actor.is_terminated() {
            return;
        }
        self.actor.set_receive_timeout(timeout);
    }

    /// The current receive timeout.
    pub fn receive_timeout(&self) -> Option<Duration> {
        self.actor.receive_timeout()
    }

    /// Replies to the sender of the message being handled.
    pub fn reply<M: Message>(&self, message: M) {
        let reply = Envelope::respond_to(
            self.system().ids(),
            &self.envelope,
            AnyMessage::new(message),
            self.actor.clone(),
        );
        self.envelope.sender().deliver(reply);
    }

    /// Sends `message` to `to` with this actor as sender.
    pub fn send<M: Message>(&self, to: &ActorRef, message: M) {
        to.tell(message, &self.actor);
    }

    /// Passes the message being handled on to `to`, keeping its original sender.
    pub fn forward(&self, to: &ActorRef) {
        to.deliver(self.envelope.redirect(self.system().ids(), to.clone()));
    }
}

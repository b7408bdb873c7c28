// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Messages
//!
//! Actors exchange erased payloads wrapped in [`Envelope`]s. Any
//! `Debug + Send + Sync + 'static` type is a [`Message`]; behaviors recover the
//! concrete type by matching on it. This module also holds the messages the
//! runtime itself produces: timeouts, identification and exit notifications.
//!

use crate::{ActorRef, IdGenerator};

use std::{
    any::Any,
    fmt::{Debug, Display, Formatter},
    sync::Arc,
    time::Duration,
};

/// Marker for types that can travel between actors.
pub trait Message: Any + Debug + Send + Sync {
    /// Upcast used for downcasting the erased payload.
    fn as_any(&self) -> &dyn Any;
}

impl<T> Message for T
where
    T: Any + Debug + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Erased, cheaply cloneable message payload.
#[derive(Clone)]
pub struct AnyMessage(Arc<dyn Message>);

impl AnyMessage {
    /// Wraps a message. Wrapping an `AnyMessage` returns it unchanged.
    pub fn new<M: Message>(message: M) -> Self {
        if let Some(erased) = (&message as &dyn Any).downcast_ref::<AnyMessage>() {
            return erased.clone();
        }
        Self(Arc::new(message))
    }

    // `Arc<dyn Message>` is itself a `Message`, so `as_any` must be reached through the
    // trait object and not through the `Arc`.
    fn payload(&self) -> &dyn Any {
        (*self.0).as_any()
    }

    /// True if the payload is an `M`.
    pub fn is<M: Message>(&self) -> bool {
        self.payload().is::<M>()
    }

    /// Borrows the payload as an `M`.
    pub fn downcast_ref<M: Message>(&self) -> Option<&M> {
        self.payload().downcast_ref::<M>()
    }

    /// Clones the payload out as an `M`.
    pub fn downcast<M: Message + Clone>(&self) -> Option<M> {
        self.downcast_ref::<M>().cloned()
    }
}

impl Debug for AnyMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&*self.0, f)
    }
}

/// Immutable message wrapper carrying routing metadata.
#[derive(Clone, Debug)]
pub struct Envelope {
    message: AnyMessage,
    sender: ActorRef,
    recipient: ActorRef,
    message_id: String,
    correlation_id: String,
}

impl Envelope {
    /// Creates an envelope. Without a correlation id a fresh one is drawn.
    pub(crate) fn new(
        ids: &dyn IdGenerator,
        message: AnyMessage,
        sender: ActorRef,
        recipient: ActorRef,
        correlation_id: Option<String>,
    ) -> Self {
        let message_id = ids.next_id();
        let correlation_id = correlation_id.unwrap_or_else(|| ids.next_id());
        Self {
            message,
            sender,
            recipient,
            message_id,
            correlation_id,
        }
    }

    /// Creates the reply to `original`: addressed to its sender, same
    /// correlation id.
    pub(crate) fn respond_to(
        ids: &dyn IdGenerator,
        original: &Envelope,
        message: AnyMessage,
        sender: ActorRef,
    ) -> Self {
        Self::new(
            ids,
            message,
            sender,
            original.sender.clone(),
            Some(original.correlation_id.clone()),
        )
    }

    /// Same payload and correlation, new recipient.
    pub(crate) fn redirect(&self, ids: &dyn IdGenerator, recipient: ActorRef) -> Self {
        Self::new(
            ids,
            self.message.clone(),
            self.sender.clone(),
            recipient,
            Some(self.correlation_id.clone()),
        )
    }

    /// The payload.
    pub fn message(&self) -> &AnyMessage {
        &self.message
    }

    /// The sending actor, the dead-letter actor for anonymous sends.
    pub fn sender(&self) -> &ActorRef {
        &self.sender
    }

    /// The receiving actor.
    pub fn recipient(&self) -> &ActorRef {
        &self.recipient
    }

    /// Unique id of this envelope.
    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    /// Id shared by a request and its replies.
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }
}

/// Delivered to an actor that stayed idle for its whole receive timeout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReceiveTimeout(pub Duration);

/// Asks an actor for its reference. Answered with an [`ActorIdentity`]
/// carrying the same id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identify(pub String);

/// Reply to [`Identify`].
#[derive(Clone, Debug, PartialEq)]
pub struct ActorIdentity {
    /// The identified actor.
    pub actor: ActorRef,
    /// The id of the request.
    pub id: String,
}

/// Why an actor terminated.
#[derive(Clone, Debug, PartialEq)]
pub enum ExitReason {
    /// The actor stopped itself, optionally saying why.
    Normal(Option<String>),
    /// A behavior failed with the given cause.
    Crashed(String),
    /// An ancestor stopped; carries the ancestor's exit.
    Killed(Box<Exited>),
}

impl Display for ExitReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitReason::Normal(None) => write!(f, "normal"),
            ExitReason::Normal(Some(reason)) => write!(f, "normal ({})", reason),
            ExitReason::Crashed(cause) => write!(f, "crashed ({})", cause),
            ExitReason::Killed(by) => write!(f, "killed by {}", by.actor.path()),
        }
    }
}

/// Exit notification, sent by an actor to its parent when it terminates or
/// crashes.
#[derive(Clone, Debug, PartialEq)]
pub struct Exited {
    /// The actor that exited.
    pub actor: ActorRef,
    /// Why it exited.
    pub reason: ExitReason,
}

impl Exited {
    /// Normal exit of `actor`.
    pub fn normal(actor: ActorRef, reason: Option<String>) -> Self {
        Self {
            actor,
            reason: ExitReason::Normal(reason),
        }
    }

    /// Crash of `actor` caused by `cause`.
    pub fn crashed(actor: ActorRef, cause: impl Display) -> Self {
        Self {
            actor,
            reason: ExitReason::Crashed(cause.to_string()),
        }
    }

    /// Exit of `actor` caused by the exit `by` of an ancestor.
    pub fn killed(actor: ActorRef, by: Exited) -> Self {
        Self {
            actor,
            reason: ExitReason::Killed(Box::new(by)),
        }
    }

    /// True for a normal exit.
    pub fn is_normal(&self) -> bool {
        matches!(self.reason, ExitReason::Normal(_))
    }

    /// True for a crash.
    pub fn is_crashed(&self) -> bool {
        matches!(self.reason, ExitReason::Crashed(_))
    }

    /// True when an ancestor caused the exit.
    pub fn is_killed(&self) -> bool {
        matches!(self.reason, ExitReason::Killed(_))
    }
}

impl Display for Exited {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} exited: {}", self.actor.path(), self.reason)
    }
}

/// Control messages an actor sends to itself.
#[derive(Clone, Debug)]
pub(crate) enum Control {
    Stop(Exited),
    Restart,
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::Behavior;

    #[derive(Debug, Clone, PartialEq)]
    struct Ping(u32);

    #[test]
    fn test_downcast() {
        let message = AnyMessage::new(Ping(3));
        assert!(message.is::<Ping>());
        assert!(!message.is::<u32>());
        assert_eq!(message.downcast::<Ping>(), Some(Ping(3)));
        assert_eq!(message.downcast_ref::<String>(), None);
        assert_eq!(format!("{:?}", message), "Ping(3)");
    }

    #[test]
    fn test_wrapping_is_not_nested() {
        let message = AnyMessage::new(Ping(1));
        let again = AnyMessage::new(message.clone());
        assert!(again.is::<Ping>());
        assert!(!again.is::<AnyMessage>());
    }

    #[test]
    fn test_downcast_reaches_payload_not_pointer() {
        let message = AnyMessage::new(Ping(7));
        assert!(!message.is::<Arc<dyn Message>>());
        assert_eq!(message.downcast_ref::<Ping>(), Some(&Ping(7)));

        let exit = AnyMessage::new(ReceiveTimeout(Duration::from_millis(5)));
        assert_eq!(
            exit.downcast::<ReceiveTimeout>(),
            Some(ReceiveTimeout(Duration::from_millis(5)))
        );
        assert!(Behavior::<()>::new()
            .on(|_, state, _: Ping| async move { Ok(state) })
            .select(&message)
            .is_some());
    }
}

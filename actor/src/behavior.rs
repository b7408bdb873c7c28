// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Behaviors
//!
//! A [`Behavior`] is the message handling policy of an actor: an ordered list
//! of cases, each a matcher plus a handler. The first case whose matcher
//! accepts the incoming message handles it; later cases are not consulted.
//! A message no case accepts is forwarded to the dead letters.
//!
//! Handlers receive the actor state by value and hand back the state for the
//! next message, so a behavior itself holds no mutable data.
//!
//! ```ignore
//! let counter = Behavior::<u64>::new()
//!     .on(|_ctx, count, Increment(by)| async move { Ok(count + by) })
//!     .on(|ctx, count, _: GetCount| async move {
//!         ctx.reply(count);
//!         Ok(count)
//!     })
//!     .otherwise(|_ctx, count, message| async move {
//!         tracing::warn!("Ignoring {:?}", message);
//!         Ok(count)
//!     });
//! ```
//!

use crate::{ActorContext, AnyMessage, Error, Message};

use futures::{future::BoxFuture, FutureExt};

use std::{future::Future, sync::Arc};

/// Future returned by a handler, resolving to the next state.
pub type HandlerFuture<S> = BoxFuture<'static, Result<S, Error>>;

type Matcher = Arc<dyn Fn(&AnyMessage) -> bool + Send + Sync>;

pub(crate) type Handler<S> =
    Arc<dyn Fn(ActorContext<S>, S, AnyMessage) -> HandlerFuture<S> + Send + Sync>;

struct Case<S> {
    matcher: Matcher,
    handler: Handler<S>,
}

impl<S> Clone for Case<S> {
    fn clone(&self) -> Self {
        Self {
            matcher: self.matcher.clone(),
            handler: self.handler.clone(),
        }
    }
}

/// Ordered list of message handling cases.
///
/// # Type Parameters
///
/// * `S` - The actor state threaded through the handlers.
///
pub struct Behavior<S> {
    cases: Vec<Case<S>>,
}

impl<S> Clone for Behavior<S> {
    fn clone(&self) -> Self {
        Self {
            cases: self.cases.clone(),
        }
    }
}

impl<S: Send + 'static> Default for Behavior<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Send + 'static> Behavior<S> {
    /// A behavior without cases: every message goes to the dead letters.
    pub fn new() -> Self {
        Self { cases: Vec::new() }
    }

    /// A behavior that accepts and drops every message.
    pub fn ignore() -> Self {
        Self::new().otherwise(|_, state, _| async move { Ok(state) })
    }

    fn case(mut self, matcher: Matcher, handler: Handler<S>) -> Self {
        self.cases.push(Case { matcher, handler });
        self
    }

    /// Handles messages of type `M`.
    pub fn on<M, F, Fut>(self, handler: F) -> Self
    where
        M: Message + Clone,
        F: Fn(ActorContext<S>, S, M) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<S, Error>> + Send + 'static,
    {
        self.on_when(|_: &M| true, handler)
    }

    /// Handles messages of type `M` accepted by `guard`.
    pub fn on_when<M, G, F, Fut>(self, guard: G, handler: F) -> Self
    where
        M: Message + Clone,
        G: Fn(&M) -> bool + Send + Sync + 'static,
        F: Fn(ActorContext<S>, S, M) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<S, Error>> + Send + 'static,
    {
        let matcher: Matcher =
            Arc::new(move |message| message.downcast_ref::<M>().is_some_and(&guard));
        let handler: Handler<S> = Arc::new(move |ctx, state, message| {
            match message.downcast::<M>() {
                Some(message) => handler(ctx, state, message).boxed(),
                None => futures::future::ready(Ok(state)).boxed(),
            }
        });
        self.case(matcher, handler)
    }

    /// Handles the erased messages accepted by `predicate`.
    pub fn when<P, F, Fut>(self, predicate: P, handler: F) -> Self
    where
        P: Fn(&AnyMessage) -> bool + Send + Sync + 'static,
        F: Fn(ActorContext<S>, S, AnyMessage) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<S, Error>> + Send + 'static,
    {
        let handler: Handler<S> =
            Arc::new(move |ctx, state, message| handler(ctx, state, message).boxed());
        self.case(Arc::new(predicate), handler)
    }

    /// Handles every message. Cases added after this one are unreachable.
    pub fn otherwise<F, Fut>(self, handler: F) -> Self
    where
        F: Fn(ActorContext<S>, S, AnyMessage) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<S, Error>> + Send + 'static,
    {
        self.when(|_| true, handler)
    }

    /// Appends the cases of `fallback` after the cases of `self`.
    pub fn or_else(mut self, fallback: Behavior<S>) -> Self {
        self.cases.extend(fallback.cases);
        self
    }

    /// Number of cases.
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// True when no case is declared.
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// The handler of the first case accepting `message`.
    pub(crate) fn select(&self, message: &AnyMessage) -> Option<Handler<S>> {
        self.cases
            .iter()
            .find(|case| (case.matcher)(message))
            .map(|case| case.handler.clone())
    }
}

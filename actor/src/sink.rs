// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! Event sink and subscriber pattern implementation.
//!
//! Runtime events, such as dead letters, are published on broadcast channels. A [`Sink`]
//! drains one receiver in its own task and hands every event to a [`Subscriber`].
//!

use async_trait::async_trait;
use tokio::sync::broadcast::{error::RecvError, Receiver as EventReceiver};

use tracing::{debug, warn};

use std::fmt::Debug;

/// Event published by the runtime.
pub trait Event: Debug + Clone + Send + Sync + 'static {}

/// Drives a [`Subscriber`] with the events of a broadcast receiver.
///
/// # Type Parameters
///
/// * `E` - The event type that this sink will process.
///
pub struct Sink<E: Event> {
    /// The subscriber that will be notified of events.
    subscriber: Box<dyn Subscriber<E>>,
    /// The broadcast receiver for events.
    event_receiver: EventReceiver<E>,
}

impl<E: Event> Sink<E> {
    /// Creates a new Sink with the given event receiver and subscriber.
    ///
    /// # Arguments
    ///
    /// * `event_receiver` - Broadcast receiver, for instance from
    ///   `SystemRef::subscribe_dead_letters`.
    /// * `subscriber` - Called for each event received.
    ///
    pub fn new(event_receiver: EventReceiver<E>, subscriber: impl Subscriber<E>) -> Self {
        Sink {
            subscriber: Box::new(subscriber),
            event_receiver,
        }
    }

    /// Processes events until the channel is closed.
    ///
    /// Events missed while the subscriber was lagging are skipped.
    ///
    pub async fn run(&mut self) {
        loop {
            match self.event_receiver.recv().await {
                Ok(event) => {
                    debug!("Received event: {:?}. Notify to the subscriber.", event);
                    self.subscriber.notify(event).await;
                }
                Err(RecvError::Closed) => break,
                Err(RecvError::Lagged(missed)) => {
                    warn!("Sink lagged behind, {} events skipped.", missed);
                }
            }
        }
    }
}

/// Trait for types that process the events of a [`Sink`].
///
/// # Type Parameters
///
/// * `E` - The event type this subscriber can process.
///
#[async_trait]
pub trait Subscriber<E: Event>: Send + Sync + 'static {
    /// Called when an event is received by the sink.
    async fn notify(&self, event: E);
}

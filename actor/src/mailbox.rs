// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Mailbox
//!
//! Per-actor FIFO queue. Any number of producers may push, a single consumer
//! (the actor scheduler) pops. The consumer can be interrupted with
//! [`Mailbox::pause`] and released with [`Mailbox::resume`]; [`Mailbox::stop`]
//! locks the queue for good and hands back whatever was still queued.
//!

use thiserror::Error;
use tokio::sync::Notify;

use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard, PoisonError},
};

/// Signals returned by [`Mailbox::pop`] instead of an item.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum MailboxError {
    /// The mailbox was paused while the pop was pending.
    #[error("mailbox paused")]
    Paused,
    /// The mailbox is stopped.
    #[error("mailbox stopped")]
    Stopped,
}

/// Queue plus control flags, guarded together.
struct State<T> {
    queue: VecDeque<T>,
    paused: bool,
    stopped: bool,
    /// Incremented on every effective pause.
    pauses: u64,
}

/// Actor mailbox.
///
/// # Type Parameters
///
/// * `T` - The queued item, an envelope for actors.
///
pub struct Mailbox<T> {
    state: Mutex<State<T>>,
    notify: Notify,
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Mailbox<T> {
    /// Creates an empty, running mailbox.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                queue: VecDeque::new(),
                paused: false,
                stopped: false,
                pauses: 0,
            }),
            notify: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends an item. Dropped if the mailbox is stopped.
    pub fn push(&self, item: T) {
        let mut state = self.lock();
        if state.stopped {
            return;
        }
        state.queue.push_back(item);
        let wake = !state.paused;
        drop(state);
        if wake {
            self.notify.notify_waiters();
        }
    }

    /// Prepends an item so it is popped before anything already queued.
    /// Dropped if the mailbox is stopped.
    pub fn unshift(&self, item: T) {
        let mut state = self.lock();
        if state.stopped {
            return;
        }
        state.queue.push_front(item);
        let wake = !state.paused;
        drop(state);
        if wake {
            self.notify.notify_waiters();
        }
    }

    /// Waits until the mailbox is running and holds an item, then removes
    /// and returns the head.
    ///
    /// A pop started while paused keeps waiting for [`Mailbox::resume`] even
    /// if items arrive. Dropping the returned future never loses an item.
    ///
    /// # Errors
    ///
    /// * `MailboxError::Paused` - the mailbox was paused after the pop began.
    /// * `MailboxError::Stopped` - the mailbox is or became stopped.
    ///
    pub async fn pop(&self) -> Result<T, MailboxError> {
        let pauses = self.lock().pauses;
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register before checking the state so no wake-up is missed.
            notified.as_mut().enable();
            {
                let mut state = self.lock();
                if state.stopped {
                    return Err(MailboxError::Stopped);
                }
                if state.pauses != pauses {
                    return Err(MailboxError::Paused);
                }
                if !state.paused {
                    if let Some(item) = state.queue.pop_front() {
                        return Ok(item);
                    }
                }
            }
            notified.await;
        }
    }

    /// Pauses the consumer. A pending pop fails with `MailboxError::Paused`.
    pub fn pause(&self) {
        let mut state = self.lock();
        if state.paused || state.stopped {
            return;
        }
        state.paused = true;
        state.pauses += 1;
        drop(state);
        self.notify.notify_waiters();
    }

    /// Lets pending and future pops proceed again.
    pub fn resume(&self) {
        let mut state = self.lock();
        if !state.paused || state.stopped {
            return;
        }
        state.paused = false;
        drop(state);
        self.notify.notify_waiters();
    }

    /// Stops the mailbox for good and returns the queued items in order.
    /// A second call returns nothing.
    pub fn stop(&self) -> Vec<T> {
        let mut state = self.lock();
        if state.stopped {
            return Vec::new();
        }
        state.stopped = true;
        let drained = state.queue.drain(..).collect();
        drop(state);
        self.notify.notify_waiters();
        drained
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    /// True if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.lock().queue.is_empty()
    }

    /// True while paused.
    pub fn is_paused(&self) -> bool {
        self.lock().paused
    }

    /// True once stopped.
    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::{sync::Arc, time::Duration};

    #[tokio::test]
    async fn test_fifo_order() {
        let mailbox = Mailbox::new();
        for i in 0..100 {
            mailbox.push(i);
        }
        for i in 0..100 {
            assert_eq!(mailbox.pop().await, Ok(i));
        }
        assert!(mailbox.is_empty());
    }

    #[tokio::test]
    async fn test_unshift_preempts() {
        let mailbox = Mailbox::new();
        mailbox.push("a");
        mailbox.push("b");
        mailbox.unshift("control");
        assert_eq!(mailbox.pop().await, Ok("control"));
        assert_eq!(mailbox.pop().await, Ok("a"));
        assert_eq!(mailbox.pop().await, Ok("b"));
    }

    #[tokio::test]
    async fn test_pending_pop_wakes_on_push() {
        let mailbox = Arc::new(Mailbox::new());
        let consumer = mailbox.clone();
        let handle = tokio::spawn(async move { consumer.pop().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        mailbox.push(7);
        assert_eq!(handle.await.unwrap(), Ok(7));
    }

    #[tokio::test]
    async fn test_pause_blocks_resume_releases() {
        let mailbox = Arc::new(Mailbox::new());
        mailbox.pause();
        let consumer = mailbox.clone();
        let handle = tokio::spawn(async move { consumer.pop().await });

        mailbox.push(1);
        mailbox.push(2);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!handle.is_finished());

        mailbox.resume();
        assert_eq!(handle.await.unwrap(), Ok(1));
        assert_eq!(mailbox.len(), 1);
    }

    #[tokio::test]
    async fn test_pause_fails_pending_pop() {
        let mailbox = Arc::new(Mailbox::<u32>::new());
        let consumer = mailbox.clone();
        let handle = tokio::spawn(async move { consumer.pop().await });
        tokio::time::sleep(Duration::from_millis(10)).await;

        mailbox.pause();
        assert_eq!(handle.await.unwrap(), Err(MailboxError::Paused));
        assert!(mailbox.is_paused());
    }

    #[tokio::test]
    async fn test_stop_fails_pending_pop() {
        let mailbox = Arc::new(Mailbox::<u32>::new());
        mailbox.pause();
        let consumer = mailbox.clone();
        let handle = tokio::spawn(async move { consumer.pop().await });
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(mailbox.stop().is_empty());
        assert_eq!(handle.await.unwrap(), Err(MailboxError::Stopped));
        assert_eq!(mailbox.pop().await, Err(MailboxError::Stopped));
    }

    #[tokio::test]
    async fn test_stop_drains_and_locks() {
        let mailbox = Mailbox::new();
        mailbox.push("a");
        mailbox.push("b");
        mailbox.push("c");
        assert_eq!(mailbox.stop(), vec!["a", "b", "c"]);

        mailbox.push("d");
        mailbox.unshift("e");
        assert!(mailbox.is_empty());
        assert!(mailbox.is_stopped());
        assert!(mailbox.stop().is_empty());
    }

    #[tokio::test]
    async fn test_pause_and_resume_are_idempotent() {
        let mailbox = Mailbox::new();
        mailbox.resume();
        mailbox.pause();
        mailbox.pause();
        assert!(mailbox.is_paused());
        mailbox.resume();
        mailbox.resume();
        assert!(!mailbox.is_paused());
        mailbox.push(1);
        assert_eq!(mailbox.pop().await, Ok(1));
    }

    #[tokio::test]
    async fn test_cancelled_pop_keeps_items() {
        let mailbox = Mailbox::new();
        let timed_out =
            tokio::time::timeout(Duration::from_millis(10), mailbox.pop())
                .await;
        assert!(timed_out.is_err());
        mailbox.push(3);
        assert_eq!(mailbox.pop().await, Ok(3));
    }
}

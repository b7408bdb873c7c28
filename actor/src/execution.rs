// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Execution context
//!
//! Every scheduler iteration is a task handed to an [`ExecutionContext`].
//! Implementations must run the task later, fairly, and never inside the
//! `submit` call itself, otherwise a busy actor would recurse on its own
//! stack.
//!

use crate::Error;

use futures::future::BoxFuture;
use tokio::runtime::Handle;

use tracing::debug;

/// Unit of work submitted to an execution context.
pub type Task = BoxFuture<'static, ()>;

/// Fair task submission primitive shared by all actors of a system.
pub trait ExecutionContext: Send + Sync + 'static {
    /// Schedules `task` to run at a later point.
    fn submit(&self, task: Task);
}

/// Execution context backed by a tokio runtime.
///
/// Each submitted task is spawned on the runtime. Receive timeouts rely on
/// tokio timers, so the runtime must have the time driver enabled.
#[derive(Debug, Clone)]
pub struct TokioExecutionContext {
    handle: Handle,
}

impl TokioExecutionContext {
    /// Creates an execution context for the given runtime handle.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Creates an execution context for the runtime we are running in.
    ///
    /// # Errors
    ///
    /// Returns `Error::Start` when called outside of a tokio runtime.
    ///
    pub fn current() -> Result<Self, Error> {
        let handle = Handle::try_current().map_err(|e| {
            debug!("No tokio runtime available: {}", e);
            Error::Start(e.to_string())
        })?;
        Ok(Self::new(handle))
    }
}

impl ExecutionContext for TokioExecutionContext {
    fn submit(&self, task: Task) {
        // The join handle is not needed, the task reports through the actor.
        drop(self.handle.spawn(task));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use futures::FutureExt;
    use tokio::sync::oneshot;

    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    #[tokio::test]
    async fn test_submit_is_never_synchronous() {
        let ec = TokioExecutionContext::current().unwrap();
        let ran = Arc::new(AtomicBool::new(false));
        let (sender, receiver) = oneshot::channel();
        let flag = ran.clone();
        ec.submit(
            async move {
                flag.store(true, Ordering::SeqCst);
                let _ = sender.send(());
            }
            .boxed(),
        );
        assert!(!ran.load(Ordering::SeqCst));
        receiver.await.unwrap();
        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn test_current_outside_runtime() {
        assert!(TokioExecutionContext::current().is_err());
    }
}

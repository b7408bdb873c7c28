// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Errors module
//!

use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::time::Duration;

/// Error type for the actor system.
#[derive(Clone, Debug, Error, PartialEq, Serialize, Deserialize)]
pub enum Error {
    /// A sibling with the same name is already alive.
    #[error("Actor {0} exists.")]
    Exists(String),
    /// An error occurred while starting an actor or the actor system.
    #[error("An error occurred while starting: {0}.")]
    Start(String),
    /// The actor is terminated and can not perform the operation.
    #[error("Actor {0} is terminated.")]
    Terminated(String),
    /// The actor system has been shut down.
    #[error("The actor system is terminated.")]
    SystemTerminated,
    /// No reply arrived before the ask deadline.
    #[error("No reply received within {0:?}.")]
    TimedOut(Duration),
    /// The reply channel of an ask was dropped.
    #[error("An error occurred while receiving a reply: {0}.")]
    Receive(String),
    /// The reply of a typed ask has another type.
    #[error("Unexpected reply, expected {0}.")]
    UnexpectedReply(String),
    /// A behavior panicked while handling a message.
    #[error("Behavior panicked: {0}")]
    Panicked(String),
    /// Error raised by a behavior.
    #[error("Error: {0}")]
    Functional(String),
}

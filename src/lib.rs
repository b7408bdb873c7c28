// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! Core library for the Rook actor runtime.
//! Re-exports the actor model: spawning, message passing, supervision and the ask pattern.

pub use actor::{
    ActorContext, ActorIdentity, ActorPath, ActorRef, ActorSystem, AnyMessage, Behavior,
    ChildAction, DeadLetter, Envelope, Error as ActorError, Event, ExecutionContext,
    ExitReason, Exited, FailureCounter, Hooks, IdGenerator, Identify, Mailbox, MaxRetries,
    Message, Props, RandomIdGenerator, ReceiveTimeout, SequentialIdGenerator, Sink,
    Subscriber, SupervisionStrategy, SystemBuilder, SystemConfig, SystemEvent, SystemRef,
    SystemRunner, TokioExecutionContext,
};

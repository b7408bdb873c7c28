// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Identifier generation
//!
//! Every envelope, correlation, path node and unnamed actor needs a fresh
//! identifier. The generator is handed to the actor system when it is built,
//! so tests can swap in a deterministic one.
//!

use uuid::Uuid;

use std::sync::atomic::{AtomicU64, Ordering};

/// Source of process-unique identifiers.
pub trait IdGenerator: Send + Sync + 'static {
    /// Returns an identifier never returned before by this generator.
    fn next_id(&self) -> String;
}

/// Random identifiers backed by uuid v4, shortened to 16 hex characters.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self) -> String {
        let mut id = Uuid::new_v4().simple().to_string();
        id.truncate(16);
        id
    }
}

/// Monotonic identifiers `<prefix><n>`, starting at 1.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdGenerator {
    /// Creates a generator whose identifiers start with `prefix`.
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_owned(),
            next: AtomicU64::new(0),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}{}", self.prefix, n)
    }
}

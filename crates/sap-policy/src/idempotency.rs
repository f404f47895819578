// idempotency.rs - Process-wide duplicate suppression by idempotency key.
//
// A key is *committed* only when an evaluation finishes with a non-denied
// decision. While an evaluation runs, its key is held *in flight*; a
// concurrent evaluation of the same key waits until that hold ends and then
// checks again, so it sees a duplicate only if the first one committed.
// Both sets live behind one mutex; the critical sections are a few hash
// lookups, so evaluations of different keys do not wait on each other for
// longer than that.
//
// Committed keys are never evicted.

use std::collections::HashSet;
use std::sync::{Condvar, Mutex, MutexGuard};

use crate::error::PolicyError;

#[derive(Debug, Default)]
struct GuardState {
    committed: HashSet<String>,
    in_flight: HashSet<String>,
}

/// Set of committed idempotency keys, plus keys currently being evaluated.
#[derive(Debug, Default)]
pub struct IdempotencyGuard {
    state: Mutex<GuardState>,
    /// Signalled whenever an in-flight key is committed or released.
    settled: Condvar,
}

/// Result of trying to start an evaluation for a key.
#[derive(Debug)]
pub enum Admission<'a> {
    /// The key is free; the reservation holds it until committed or dropped.
    Admitted(KeyReservation<'a>),
    /// The key was committed by an earlier evaluation.
    AlreadyCommitted,
}

impl IdempotencyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` has been committed. Does not mutate.
    pub fn has_processed(&self, key: &str) -> Result<bool, PolicyError> {
        Ok(self.lock()?.committed.contains(key))
    }

    /// Mark `key` as committed. Inserting an already-committed key is a no-op.
    pub fn commit(&self, key: &str) -> Result<(), PolicyError> {
        let mut state = self.lock()?;
        state.in_flight.remove(key);
        state.committed.insert(key.to_string());
        drop(state);
        self.settled.notify_all();
        Ok(())
    }

    /// Atomically check the key and, if free, hold it for one evaluation.
    ///
    /// Blocks while another evaluation holds the same key. Must not be
    /// called twice for one key from a thread that still holds it.
    pub fn reserve(&self, key: &str) -> Result<Admission<'_>, PolicyError> {
        let mut state = self.lock()?;
        loop {
            if state.committed.contains(key) {
                return Ok(Admission::AlreadyCommitted);
            }
            if !state.in_flight.contains(key) {
                break;
            }
            state = self
                .settled
                .wait(state)
                .map_err(|_| PolicyError::poisoned("idempotency guard"))?;
        }
        state.in_flight.insert(key.to_string());
        Ok(Admission::Admitted(KeyReservation {
            guard: self,
            key: key.to_string(),
            released: false,
        }))
    }

    /// Number of committed keys.
    pub fn committed_count(&self) -> Result<usize, PolicyError> {
        Ok(self.lock()?.committed.len())
    }

    /// Forget every committed key. Intended for tests and simulations.
    pub fn reset(&self) -> Result<(), PolicyError> {
        let mut state = self.lock()?;
        state.committed.clear();
        state.in_flight.clear();
        drop(state);
        self.settled.notify_all();
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, GuardState>, PolicyError> {
        self.state
            .lock()
            .map_err(|_| PolicyError::poisoned("idempotency guard"))
    }

    fn release(&self, key: &str) {
        // Runs from Drop, so recover the state rather than fail.
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.in_flight.remove(key);
        drop(state);
        self.settled.notify_all();
    }
}

/// An in-flight hold on an idempotency key.
///
/// Dropping it without calling [`commit`](Self::commit) releases the key so
/// a later evaluation may try again (denied and faulted evaluations never
/// consume a key).
#[derive(Debug)]
pub struct KeyReservation<'a> {
    guard: &'a IdempotencyGuard,
    key: String,
    released: bool,
}

impl KeyReservation<'_> {
    /// Commit the key, consuming the reservation.
    pub fn commit(mut self) -> Result<(), PolicyError> {
        self.guard.commit(&self.key)?;
        self.released = true;
        Ok(())
    }
}

impl Drop for KeyReservation<'_> {
    fn drop(&mut self) {
        if !self.released {
            self.guard.release(&self.key);
        }
    }
}

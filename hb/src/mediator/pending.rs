//! Pending request table
//!
//! One entry per outstanding `request()` call, keyed by correlation id. The
//! receive path resolves an entry exactly once; a caller that gives up first
//! abandons it, and its id is remembered for a while so a late response can
//! be told apart from a forged or stale one.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use serde_json::Value;
use tokio::sync::oneshot;
use tracing::debug;

use crate::message::CorrelationId;

/// Outcome of delivering a response body to the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolution {
    /// Handed to the waiting caller
    Delivered,
    /// The caller already gave up on this id
    Late,
    /// The id was never pending here, or was forgotten
    Unknown,
}

/// Why a waiter was not inserted
#[derive(Debug)]
pub(crate) enum InsertError {
    /// The id is already pending; the waiter is handed back
    Duplicate(oneshot::Sender<Value>),
    /// The table was released and accepts no more waiters
    Closed,
}

struct PendingState {
    waiters: HashMap<CorrelationId, oneshot::Sender<Value>>,
    abandoned: HashSet<CorrelationId>,
    abandoned_order: VecDeque<CorrelationId>,
    abandoned_capacity: usize,
    closed: bool,
}

impl PendingState {
    fn remember_abandoned(&mut self, id: CorrelationId) {
        if self.abandoned_capacity == 0 || !self.abandoned.insert(id) {
            return;
        }
        self.abandoned_order.push_back(id);
        while self.abandoned_order.len() > self.abandoned_capacity {
            if let Some(oldest) = self.abandoned_order.pop_front() {
                self.abandoned.remove(&oldest);
            }
        }
    }
}

pub(crate) struct PendingTable {
    state: Mutex<PendingState>,
}

impl PendingTable {
    pub fn new(abandoned_capacity: usize) -> Self {
        Self {
            state: Mutex::new(PendingState {
                waiters: HashMap::new(),
                abandoned: HashSet::new(),
                abandoned_order: VecDeque::new(),
                abandoned_capacity,
                closed: false,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PendingState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert a waiter for `id`
    ///
    /// Fails once [`release_all`](Self::release_all) has run, so no waiter can
    /// be parked after the release.
    pub fn insert(&self, id: CorrelationId, waiter: oneshot::Sender<Value>) -> Result<(), InsertError> {
        let mut state = self.lock();
        if state.closed {
            return Err(InsertError::Closed);
        }
        if state.waiters.contains_key(&id) {
            return Err(InsertError::Duplicate(waiter));
        }
        state.waiters.insert(id, waiter);
        Ok(())
    }

    /// Deliver `body` to the waiter for `id`
    pub fn resolve(&self, id: CorrelationId, body: Value) -> Resolution {
        let mut state = self.lock();
        match state.waiters.remove(&id) {
            Some(waiter) => {
                if waiter.send(body).is_ok() {
                    Resolution::Delivered
                } else {
                    // Caller dropped its receiver before its guard ran
                    state.remember_abandoned(id);
                    Resolution::Late
                }
            }
            None if state.abandoned.remove(&id) => Resolution::Late,
            None => Resolution::Unknown,
        }
    }

    /// Remove `id` on behalf of a caller that stopped waiting
    ///
    /// Returns true if the entry was still pending.
    pub fn abandon(&self, id: CorrelationId) -> bool {
        let mut state = self.lock();
        if state.waiters.remove(&id).is_some() {
            state.remember_abandoned(id);
            debug!(correlation_id = id, "PendingTable::abandon: abandoned");
            true
        } else {
            false
        }
    }

    /// Drop every waiter and close the table
    ///
    /// Released callers observe a missing response; later inserts fail.
    pub fn release_all(&self) -> usize {
        let mut state = self.lock();
        state.closed = true;
        let count = state.waiters.len();
        state.waiters.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.lock().waiters.len()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

/// Removes its entry from the table when the waiting caller goes away
pub(crate) struct PendingGuard<'a> {
    table: &'a PendingTable,
    id: CorrelationId,
}

impl<'a> PendingGuard<'a> {
    pub fn new(table: &'a PendingTable, id: CorrelationId) -> Self {
        Self { table, id }
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        // No-op once the receive path has resolved the entry
        self.table.abandon(self.id);
    }
}

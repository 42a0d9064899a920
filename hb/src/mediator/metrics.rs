//! Mediator counters

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Mediator metrics for observability
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MediatorMetrics {
    pub requests_sent: u64,
    pub responses_received: u64,
    pub requests_handled: u64,
    pub handler_failures: u64,
    pub unknown_correlation_ids: u64,
    pub unrecognized_messages: u64,
    pub missing_handlers: u64,
    pub late_responses: u64,
    pub timeouts: u64,
    pub pending_requests: usize,
    pub registered_handlers: usize,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub requests_sent: AtomicU64,
    pub responses_received: AtomicU64,
    pub requests_handled: AtomicU64,
    pub handler_failures: AtomicU64,
    pub unknown_correlation_ids: AtomicU64,
    pub unrecognized_messages: AtomicU64,
    pub missing_handlers: AtomicU64,
    pub late_responses: AtomicU64,
    pub timeouts: AtomicU64,
}

impl Counters {
    pub fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, pending_requests: usize, registered_handlers: usize) -> MediatorMetrics {
        MediatorMetrics {
            requests_sent: self.requests_sent.load(Ordering::Relaxed),
            responses_received: self.responses_received.load(Ordering::Relaxed),
            requests_handled: self.requests_handled.load(Ordering::Relaxed),
            handler_failures: self.handler_failures.load(Ordering::Relaxed),
            unknown_correlation_ids: self.unknown_correlation_ids.load(Ordering::Relaxed),
            unrecognized_messages: self.unrecognized_messages.load(Ordering::Relaxed),
            missing_handlers: self.missing_handlers.load(Ordering::Relaxed),
            late_responses: self.late_responses.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            pending_requests,
            registered_handlers,
        }
    }
}

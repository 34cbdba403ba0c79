// src/utils/refresh.rs

use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one refresh request. Later requests get larger tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// "Latest request wins" gate for overlapping refreshes of one view.
///
/// A result is accepted unless a request issued after it has already
/// resolved; stale results arriving late are discarded.
#[derive(Debug, Default)]
pub struct RefreshGate {
    issued: AtomicU64,
    resolved: AtomicU64,
}

impl RefreshGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new in-flight request.
    pub fn begin(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Marks `ticket` as resolved. Returns `false` if its result is stale.
    pub fn resolve(&self, ticket: Ticket) -> bool {
        let previous = self.resolved.fetch_max(ticket.0, Ordering::SeqCst);
        previous < ticket.0
    }
}

//! Shared vertex id allocation.
//!
//! A graph and every clone taken from it must assign compatible ids, so the
//! allocator is injected at construction and shared by `Arc` rather than
//! living inside any single graph instance. Ids are monotonically increasing
//! and never reused, including ids burned by rejected merge attempts.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::VertexId;

/// Monotonic allocator for [`VertexId`]s.
///
/// Cheap to share: clone the surrounding `Arc`, not the allocator itself.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: AtomicU64,
}

impl IdAllocator {
    /// Create a fresh allocator starting at id 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next id. Never returns the same id twice.
    pub fn next_id(&self) -> VertexId {
        VertexId::new(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Number of ids issued so far.
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

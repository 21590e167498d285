//! # Identity Allocator
//!
//! Issues the raw identifiers used by both nodes and links of a graph.

use crate::types::invariant_violation;

/// Largest identifier an object may hold. `u64::MAX` marks an exhausted
/// allocator and is never issued.
pub const MAX_OBJECT_ID: u64 = u64::MAX - 1;

/// A monotonic identifier allocator.
///
/// Identifiers start at 1 (0 is never issued) and are never reused, even
/// after the object that held them is removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityAllocator {
    /// The next identifier to issue.
    next: u64,
}

impl IdentityAllocator {
    /// Create an allocator starting from 1.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Create an allocator whose first issued identifier is `next`.
    #[must_use]
    pub const fn starting_at(next: u64) -> Self {
        Self {
            next: if next == 0 { 1 } else { next },
        }
    }

    /// Issue a previously unissued identifier.
    ///
    /// Panics once every identifier up to [`MAX_OBJECT_ID`] has been used.
    pub fn next_id(&mut self) -> u64 {
        if self.is_exhausted() {
            invariant_violation(format_args!("identifier space exhausted"));
        }
        let id = self.next;
        self.next += 1;
        id
    }

    /// Whether no identifier is left to issue.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.next > MAX_OBJECT_ID
    }

    /// Advance past `id` so it is never issued.
    ///
    /// Has no effect if `id` is already below the counter.
    pub fn mark_used(&mut self, id: u64) {
        if id >= self.next {
            self.next = id.saturating_add(1);
        }
    }

    /// The identifier that the next call to [`next_id`](Self::next_id) returns.
    #[must_use]
    pub const fn peek(&self) -> u64 {
        self.next
    }
}

impl Default for IdentityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

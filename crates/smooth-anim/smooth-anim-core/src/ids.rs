//! Dense animation indices and the sequential allocator that hands them out.

use serde::{Deserialize, Serialize};

/// Position of an animation in the registry and bit in the persisted active set.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AnimIndex(pub usize);

impl AnimIndex {
    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for AnimIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic allocator for [`AnimIndex`]. Indices follow configuration order.
#[derive(Default, Debug)]
pub struct IndexAllocator {
    next: usize,
}

impl IndexAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc(&mut self) -> AnimIndex {
        let idx = AnimIndex(self.next);
        self.next += 1;
        idx
    }

    /// Number of indices handed out so far.
    #[inline]
    pub fn allocated(&self) -> usize {
        self.next
    }
}

use tidebot_core::UnitId;

/// Monotonic source of locally allocated unit identifiers.
///
/// Identifiers are handed out in strictly increasing order for the lifetime
/// of the allocator and are never returned, even when the engine ignores the
/// spawn they were allocated for.
#[derive(Clone, Debug)]
pub struct IdAllocator {
    next: Option<u64>,
}

impl IdAllocator {
    /// Creates an allocator whose first candidate is `first`.
    #[must_use]
    pub const fn new(first: u64) -> Self {
        Self { next: Some(first) }
    }

    /// Next candidate value, `None` once the id space is exhausted.
    #[must_use]
    pub const fn peek(&self) -> Option<u64> {
        self.next
    }

    /// Allocates the next identifier for which `in_use` returns `false`.
    ///
    /// Skipped values are consumed. Returns `None` once the id space is
    /// exhausted.
    pub fn allocate<F>(&mut self, in_use: F) -> Option<UnitId>
    where
        F: Fn(UnitId) -> bool,
    {
        loop {
            let candidate = UnitId::new(self.next?);
            self.next = candidate.get().checked_add(1);
            if !in_use(candidate) {
                return Some(candidate);
            }
        }
    }
}

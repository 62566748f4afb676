use thiserror::Error;

/// An allocation request the arena cannot satisfy.
///
/// Returned when the aligned block would run past the end of the buffer, or
/// when the requested alignment is not a power of two. Both cases mean the
/// same thing to the caller and are not told apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error(
    "cannot allocate {size} bytes aligned to {align}: {remaining} of {capacity} bytes remaining"
)]
pub struct AllocError {
    size: usize,
    align: usize,
    remaining: usize,
    capacity: usize,
}

impl AllocError {
    pub(crate) const fn new(size: usize, align: usize, remaining: usize, capacity: usize) -> Self {
        Self {
            size,
            align,
            remaining,
            capacity,
        }
    }

    /// Requested size in bytes, as passed by the caller.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Requested alignment in bytes.
    #[must_use]
    pub const fn align(&self) -> usize {
        self.align
    }

    /// Free bytes left in the arena when the request failed.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.remaining
    }

    /// Total capacity of the arena.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

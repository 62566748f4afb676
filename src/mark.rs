/// Saved arena cursor for rewinding.
///
/// Created by [`Arena::mark`](crate::Arena::mark). Rewinding to a mark
/// releases every byte allocated after it and keeps everything before.
///
/// A mark carries no arena identity. Rewinding a different arena with it,
/// or rewinding past a reset that already discarded its position, is
/// accepted as long as the offset fits the arena's capacity.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Mark {
    offset: usize,
}

impl Mark {
    /// Creates a mark from a saved byte offset.
    ///
    /// The caller must ensure the offset is meaningful for the target arena.
    #[must_use]
    pub const fn from_offset(offset: usize) -> Self {
        Self { offset }
    }

    /// Returns the saved byte offset.
    #[must_use]
    pub const fn offset(self) -> usize {
        self.offset
    }

    /// Returns `true` if the mark was taken at an empty arena.
    #[must_use]
    pub const fn is_start(self) -> bool {
        self.offset == 0
    }
}

impl std::fmt::Debug for Mark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Mark({})", self.offset)
    }
}

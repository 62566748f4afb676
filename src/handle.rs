use std::marker::PhantomData;

/// Checked handle to a value stored in an [`Arena`](crate::Arena).
///
/// Obtained from [`Arena::alloc_handle`](crate::Arena::alloc_handle).
/// Implements [`Copy`], so it can be freely duplicated and stored in data
/// structures.
///
/// A handle records the byte offset of its value, the identity of the arena
/// that produced it, and the arena generation at allocation time. It stays
/// valid until that arena reclaims memory through
/// [`reset`](crate::Arena::reset) or [`rewind`](crate::Arena::rewind).
/// Reclaiming bumps the generation, so stale handles are rejected instead of
/// read.
///
/// # Panics
///
/// Indexing an arena with a stale or foreign `Handle` panics.
pub struct Handle<T> {
    offset: usize,
    generation: u64,
    arena: u64,
    _marker: PhantomData<T>,
}

impl<T> Handle<T> {
    pub(crate) const fn from_parts(offset: usize, generation: u64, arena: u64) -> Self {
        Self {
            offset,
            generation,
            arena,
            _marker: PhantomData,
        }
    }

    /// Returns the byte offset of the value from the start of the buffer.
    #[must_use]
    pub const fn offset(self) -> usize {
        self.offset
    }

    /// Returns the arena generation the handle was issued in.
    #[must_use]
    pub const fn generation(self) -> u64 {
        self.generation
    }

    pub(crate) const fn arena_id(self) -> u64 {
        self.arena
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset
            && self.generation == other.generation
            && self.arena == other.arena
    }
}

impl<T> Eq for Handle<T> {}

impl<T> std::hash::Hash for Handle<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.offset.hash(state);
        self.generation.hash(state);
        self.arena.hash(state);
    }
}

impl<T> std::fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Handle({}@{})", self.offset, self.generation)
    }
}

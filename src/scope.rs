use std::ops::{Deref, DerefMut};

use crate::{Arena, Mark};

/// Guard that rewinds an [`Arena`] when it goes out of scope.
///
/// Captures a [`Mark`] on creation and rewinds to it exactly once, on drop.
/// Early returns, `?` and unwinding all run the rewind. The guard derefs to
/// the arena, so allocations go through it and borrow from it: nothing made
/// inside the scope can outlive it.
///
/// Moving a `Scope` moves the obligation to rewind. Assigning over a live
/// scope drops it first, rewinding its arena before the new one takes over.
///
/// # Example
///
/// ```
/// use linear_arena::{Arena, Scope};
///
/// let mut arena = Arena::new(4096);
/// let before = arena.used();
/// {
///     let scope = Scope::new(&mut arena);
///     let a = scope.make(10_i32)?;
///     let b = scope.make(20_i32)?;
///     assert_eq!(*a + *b, 30);
///     assert!(scope.used() >= before + 8);
/// }
/// assert_eq!(arena.used(), before);
/// # Ok::<(), linear_arena::AllocError>(())
/// ```
pub struct Scope<'a> {
    arena: &'a mut Arena,
    mark: Mark,
}

impl<'a> Scope<'a> {
    /// Binds to `arena` and records its current cursor.
    pub fn new(arena: &'a mut Arena) -> Self {
        let mark = arena.mark();
        Self { arena, mark }
    }

    /// Returns the mark this scope rewinds to.
    #[must_use]
    pub const fn checkpoint(&self) -> Mark {
        self.mark
    }

    /// Rewinds the arena now instead of at the end of the block.
    pub fn release(self) {
        drop(self);
    }
}

impl Deref for Scope<'_> {
    type Target = Arena;

    fn deref(&self) -> &Arena {
        self.arena
    }
}

impl DerefMut for Scope<'_> {
    fn deref_mut(&mut self) -> &mut Arena {
        self.arena
    }
}

impl Drop for Scope<'_> {
    fn drop(&mut self) {
        self.arena.rewind(self.mark);
    }
}

impl std::fmt::Debug for Scope<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("mark", &self.mark)
            .field("used", &self.arena.used())
            .finish()
    }
}

use std::alloc::Layout;
use std::cell::Cell;
use std::mem::{self, MaybeUninit};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{AllocError, Handle, Mark, Scope};

/// Alignment used when the caller has no stronger requirement.
///
/// Matches `max_align_t` on mainstream 64-bit targets. The arena buffer
/// itself starts on this boundary.
pub const DEFAULT_ALIGN: usize = 16;

static NEXT_ARENA_ID: AtomicU64 = AtomicU64::new(0);

/// Fixed-capacity linear arena.
///
/// Owns a byte buffer of exactly the requested capacity and a cursor
/// splitting it into used and free bytes. Every allocation bumps the cursor
/// past a freshly aligned block. Memory comes back only in bulk, through
/// [`reset`](Arena::reset), [`rewind`](Arena::rewind) or a [`Scope`].
///
/// Allocation takes `&self`, so any number of references from
/// [`make`](Arena::make) and friends can be alive at once. Reclaiming takes
/// `&mut self`, which guarantees none of them survive it. Raw pointers from
/// [`allocate`](Arena::allocate) are not tracked: using one after the memory
/// behind it was reclaimed is the caller's bug.
///
/// The arena never runs destructors. Values that own resources must be
/// cleaned up by the caller before their memory is reclaimed, or leaked.
///
/// `Arena` is neither `Send` nor `Sync`.
///
/// # Example
///
/// ```
/// use linear_arena::{Arena, DEFAULT_ALIGN};
///
/// let mut arena = Arena::new(1024);
/// let a = arena.allocate(32, DEFAULT_ALIGN)?;
/// let _b = arena.allocate(64, DEFAULT_ALIGN)?;
///
/// assert!(arena.owns(a.as_ptr()));
/// assert_eq!(arena.used(), 96);
///
/// arena.reset();
/// assert!(arena.is_empty());
/// # Ok::<(), linear_arena::AllocError>(())
/// ```
pub struct Arena {
    /// Start of the buffer. Dangling when `cap == 0`.
    base: NonNull<u8>,
    /// Buffer length in bytes. Never changes.
    cap: usize,
    /// Bytes in use: `0 <= offset <= cap`.
    offset: Cell<usize>,
    /// Bumped whenever reset/rewind moves the cursor backward.
    generation: Cell<u64>,
    /// Identity stamped into handles.
    id: u64,
}

impl Arena {
    /// Creates an arena backed by a buffer of exactly `capacity` bytes.
    ///
    /// A zero capacity is allowed; every allocation from such an arena fails.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` exceeds `isize::MAX` rounded down to
    /// [`DEFAULT_ALIGN`].
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let base = if capacity == 0 {
            NonNull::dangling()
        } else {
            let layout = buffer_layout(capacity);
            // SAFETY: layout has a non-zero size.
            let ptr = unsafe { std::alloc::alloc(layout) };
            NonNull::new(ptr).unwrap_or_else(|| std::alloc::handle_alloc_error(layout))
        };
        tracing::debug!(capacity, "arena created");
        Self {
            base,
            cap: capacity,
            offset: Cell::new(0),
            generation: Cell::new(0),
            id: NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Returns the buffer size in bytes.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.cap
    }

    /// Returns the number of bytes in use, alignment padding included.
    #[must_use]
    pub const fn used(&self) -> usize {
        self.offset.get()
    }

    /// Returns the number of free bytes after the cursor.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.cap - self.used()
    }

    /// Returns `true` if no bytes are in use.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.used() == 0
    }

    /// Returns the reclaim generation.
    ///
    /// Starts at zero and grows every time a reset or rewind moves the cursor
    /// backward.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation.get()
    }

    /// Reserves `size` bytes aligned to `align`, or returns `None`.
    ///
    /// A `size` of zero is treated as one, so two allocations never share an
    /// address. Fails without touching the cursor if `align` is not a power
    /// of two or the aligned block does not fit in the remaining space.
    ///
    /// The returned memory is uninitialized.
    #[must_use]
    pub fn try_allocate(&self, size: usize, align: usize) -> Option<NonNull<u8>> {
        if !align.is_power_of_two() {
            return None;
        }
        let size = size.max(1);
        let base = self.base.as_ptr().addr();
        let aligned = align_up(base + self.offset.get(), align)?;
        let start = aligned - base;
        let end = start.checked_add(size)?;
        if end > self.cap {
            return None;
        }
        self.offset.set(end);
        // SAFETY: start < end <= cap, so the block lies inside the buffer.
        Some(unsafe { self.base.add(start) })
    }

    /// Reserves `size` bytes aligned to `align`.
    ///
    /// Same contract as [`try_allocate`](Arena::try_allocate), reported as
    /// an error for callers that treat exhaustion as exceptional.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if `align` is not a power of two or the block
    /// does not fit.
    pub fn allocate(&self, size: usize, align: usize) -> Result<NonNull<u8>, AllocError> {
        self.try_allocate(size, align)
            .ok_or_else(|| self.alloc_error(size, align))
    }

    /// Reserves a block described by `layout`, or returns `None`.
    #[must_use]
    pub fn try_allocate_layout(&self, layout: Layout) -> Option<NonNull<u8>> {
        self.try_allocate(layout.size(), layout.align())
    }

    /// Reserves a block described by `layout`.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if the block does not fit.
    pub fn allocate_layout(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        self.allocate(layout.size(), layout.align())
    }

    /// Moves `value` into the arena and returns a reference to it.
    ///
    /// The value is never dropped by the arena.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if there is no room for a `T`.
    #[allow(clippy::mut_from_ref)]
    pub fn make<T>(&self, value: T) -> Result<&mut T, AllocError> {
        let slot = self.reserve::<T>()?;
        // SAFETY: `slot` is a fresh block, aligned and sized for `T`, that no
        // other reference points into.
        unsafe {
            slot.write(value);
            Ok(&mut *slot.as_ptr())
        }
    }

    /// Reserves room for a `T`, then builds it with `f`.
    ///
    /// Nothing is built if the reservation fails.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if there is no room for a `T`.
    #[allow(clippy::mut_from_ref)]
    pub fn make_with<T>(&self, f: impl FnOnce() -> T) -> Result<&mut T, AllocError> {
        let slot = self.reserve::<T>()?;
        // SAFETY: same as `make`.
        unsafe {
            slot.write(f());
            Ok(&mut *slot.as_ptr())
        }
    }

    /// Allocates `count` default-initialized values.
    ///
    /// Returns an empty slice without allocating when `count == 0`. Use
    /// [`make_array_uninit`](Arena::make_array_uninit) to skip initialization.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if `count` values of `T` do not fit.
    #[allow(clippy::mut_from_ref)]
    pub fn make_array<T: Default>(&self, count: usize) -> Result<&mut [T], AllocError> {
        let slots = self.make_array_uninit::<T>(count)?;
        for slot in slots.iter_mut() {
            slot.write(T::default());
        }
        // SAFETY: every slot was initialized above.
        Ok(unsafe { std::slice::from_raw_parts_mut(slots.as_mut_ptr().cast::<T>(), slots.len()) })
    }

    /// Allocates room for `count` values of `T` and leaves it uninitialized.
    ///
    /// Returns an empty slice without allocating when `count == 0`.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if `count` values of `T` do not fit.
    #[allow(clippy::mut_from_ref)]
    pub fn make_array_uninit<T>(&self, count: usize) -> Result<&mut [MaybeUninit<T>], AllocError> {
        if count == 0 {
            return Ok(&mut []);
        }
        let size = mem::size_of::<T>().saturating_mul(count);
        let ptr = self.allocate(size, mem::align_of::<T>())?;
        // SAFETY: the block is aligned for `T` and holds `count` elements.
        // `MaybeUninit` needs no initialization.
        Ok(unsafe { std::slice::from_raw_parts_mut(ptr.cast::<MaybeUninit<T>>().as_ptr(), count) })
    }

    /// Copies `src` into the arena.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if the copy does not fit.
    #[allow(clippy::mut_from_ref)]
    pub fn make_slice_copy<T: Copy>(&self, src: &[T]) -> Result<&mut [T], AllocError> {
        let dst = self.make_array_uninit::<T>(src.len())?;
        let dst = dst.as_mut_ptr().cast::<T>();
        // SAFETY: `dst` is a fresh block of `src.len()` slots, so it cannot
        // overlap `src`.
        unsafe {
            std::ptr::copy_nonoverlapping(src.as_ptr(), dst, src.len());
            Ok(std::slice::from_raw_parts_mut(dst, src.len()))
        }
    }

    /// Copies `s` into the arena.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if the copy does not fit.
    #[allow(clippy::mut_from_ref)]
    pub fn make_str(&self, s: &str) -> Result<&mut str, AllocError> {
        let bytes = self.make_slice_copy(s.as_bytes())?;
        // SAFETY: the bytes are a verbatim copy of a `str`.
        Ok(unsafe { std::str::from_utf8_unchecked_mut(bytes) })
    }

    /// Moves `value` into the arena and returns a checked handle to it.
    ///
    /// The handle can be stored without borrowing the arena. It stops
    /// resolving once the arena moves its cursor backward.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if there is no room for a `T`.
    pub fn alloc_handle<T>(&self, value: T) -> Result<Handle<T>, AllocError> {
        let slot = self.reserve::<T>()?;
        // SAFETY: same as `make`.
        unsafe { slot.write(value) };
        let offset = slot.as_ptr().addr() - self.base.as_ptr().addr();
        Ok(Handle::from_parts(offset, self.generation.get(), self.id))
    }

    /// Returns `true` if `handle` was issued by this arena and its memory has
    /// not been reclaimed since.
    #[must_use]
    pub const fn is_valid<T>(&self, handle: Handle<T>) -> bool {
        handle.arena_id() == self.id && handle.generation() == self.generation.get()
    }

    /// Returns the value behind `handle`, or `None` if the handle is stale
    /// or belongs to another arena.
    #[must_use]
    pub fn get<T>(&self, handle: Handle<T>) -> Option<&T> {
        if !self.is_valid(handle) {
            return None;
        }
        // SAFETY: the handle is current, so its slot still holds the `T`
        // written by `alloc_handle`.
        Some(unsafe { self.base.add(handle.offset()).cast::<T>().as_ref() })
    }

    /// Returns the value behind `handle` mutably, or `None` if the handle is
    /// stale or belongs to another arena.
    #[must_use]
    pub fn get_mut<T>(&mut self, handle: Handle<T>) -> Option<&mut T> {
        if !self.is_valid(handle) {
            return None;
        }
        // SAFETY: as in `get`; `&mut self` makes the access exclusive.
        Some(unsafe { self.base.add(handle.offset()).cast::<T>().as_mut() })
    }

    /// Returns `true` if `ptr` points into the buffer.
    ///
    /// Checks the address only; it says nothing about whether the memory is
    /// still live.
    #[must_use]
    pub fn owns<T: ?Sized>(&self, ptr: *const T) -> bool {
        let addr = ptr.cast::<u8>().addr();
        let start = self.base.as_ptr().addr();
        addr >= start && addr - start < self.cap
    }

    /// Saves the current cursor.
    ///
    /// Use with [`rewind`](Arena::rewind) to release allocations made after
    /// this point.
    #[must_use]
    pub const fn mark(&self) -> Mark {
        Mark::from_offset(self.offset.get())
    }

    /// Moves the cursor back to `mark`.
    ///
    /// Everything allocated after the mark was taken is released. A mark
    /// beyond the capacity is ignored. O(1).
    pub fn rewind(&mut self, mark: Mark) {
        let target = mark.offset();
        if target > self.cap {
            tracing::debug!(
                offset = target,
                capacity = self.cap,
                "ignoring out-of-range mark"
            );
            return;
        }
        self.move_cursor(target);
    }

    /// Releases every allocation. O(1).
    pub fn reset(&mut self) {
        self.move_cursor(0);
    }

    /// Opens a [`Scope`] that rewinds this arena when dropped.
    pub fn scope(&mut self) -> Scope<'_> {
        Scope::new(self)
    }

    /// Runs `f` and rewinds everything it allocated.
    ///
    /// Nothing allocated inside `f` can escape through its return value.
    pub fn scoped<R>(&mut self, f: impl FnOnce(&Self) -> R) -> R {
        let scope = self.scope();
        let arena: &Self = &scope;
        f(arena)
    }

    fn reserve<T>(&self) -> Result<NonNull<T>, AllocError> {
        self.allocate(mem::size_of::<T>(), mem::align_of::<T>())
            .map(NonNull::cast)
    }

    fn alloc_error(&self, size: usize, align: usize) -> AllocError {
        let err = AllocError::new(size, align, self.remaining(), self.cap);
        tracing::debug!(%err, "arena allocation failed");
        err
    }

    fn move_cursor(&mut self, target: usize) {
        let previous = mem::replace(self.offset.get_mut(), target);
        if target < previous {
            let generation = self.generation.get_mut();
            *generation = generation.wrapping_add(1);
        }
        tracing::trace!(from = previous, to = target, "arena cursor moved");
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        if self.cap > 0 {
            // SAFETY: `base` was allocated in `new` with this exact layout.
            unsafe { std::alloc::dealloc(self.base.as_ptr(), buffer_layout(self.cap)) };
        }
    }
}

impl std::fmt::Debug for Arena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("capacity", &self.cap)
            .field("used", &self.used())
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}

impl<T> std::ops::Index<Handle<T>> for Arena {
    type Output = T;

    fn index(&self, handle: Handle<T>) -> &T {
        self.get(handle)
            .unwrap_or_else(|| panic!("stale arena handle {handle:?}"))
    }
}

impl<T> std::ops::IndexMut<Handle<T>> for Arena {
    fn index_mut(&mut self, handle: Handle<T>) -> &mut T {
        self.get_mut(handle)
            .unwrap_or_else(|| panic!("stale arena handle {handle:?}"))
    }
}

/// Rounds `value` up to a multiple of `align`, a power of two.
const fn align_up(value: usize, align: usize) -> Option<usize> {
    let mask = align - 1;
    match value.checked_add(mask) {
        Some(bumped) => Some(bumped & !mask),
        None => None,
    }
}

/// Layout of a `capacity`-byte buffer.
///
/// # Panics
///
/// Panics if `capacity` is too large for a [`Layout`].
fn buffer_layout(capacity: usize) -> Layout {
    Layout::from_size_align(capacity, DEFAULT_ALIGN).expect("arena capacity overflow")
}

//! Fixed-capacity linear arena allocator.
//!
//! `linear-arena` carves memory out of one fixed buffer by bumping a cursor.
//! There is no per-allocation bookkeeping and no individual free: memory is
//! released in bulk with [`Arena::reset`], or back to a saved [`Mark`] with
//! [`Arena::rewind`] or a [`Scope`] guard.
//!
//! # Key properties
//!
//! - **Fixed capacity**: the buffer is sized once and never grows
//! - **Aligned bump allocation**: any power-of-two alignment, O(1)
//! - **Checkpoints**: [`Mark`] + [`Arena::rewind`] for nested, LIFO lifetimes
//! - **Scoped rewind**: [`Scope`] rewinds on every exit path
//! - **Checked handles**: [`Handle<T>`] detects use after reset/rewind
//! - **No destructors**: values placed in the arena are never dropped
//!
//! # Example
//!
//! ```
//! use linear_arena::Arena;
//!
//! let mut arena = Arena::new(4096);
//! let user = arena.make((1_u32, "Alice"))?;
//! let numbers = arena.make_array::<i32>(5)?;
//! numbers[4] = 40;
//! assert_eq!(user.0, 1);
//!
//! let mark = arena.mark();
//! arena.make_str("temporary")?;
//! arena.rewind(mark); // releases the string
//! assert_eq!(arena.used(), mark.offset());
//! # Ok::<(), linear_arena::AllocError>(())
//! ```

#![deny(missing_docs)]

mod arena;
mod error;
mod handle;
mod mark;
mod scope;

pub use arena::{Arena, DEFAULT_ALIGN};
pub use error::AllocError;
pub use handle::Handle;
pub use mark::Mark;
pub use scope::Scope;

#[cfg(test)]
mod tests;

//! Cursor writers.
//!
//! Every writer mutably borrows the vector it writes to, and nested writers borrow their parent,
//! so at most one writer is active per vector and no writer outlives its vector.

mod fixed_size_list;
mod list;
mod map;
mod promotable;
mod struct_;

pub use fixed_size_list::*;
pub use list::*;
pub use map::*;
pub use promotable::*;
pub use struct_::*;

/// Options shared by a writer and every nested writer it opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterOptions {
    /// Whether a write of a new type turns a single-typed vector into a union. When disabled
    /// such a write fails with `UnsupportedOperation`.
    pub promote_to_union: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            promote_to_union: true,
        }
    }
}

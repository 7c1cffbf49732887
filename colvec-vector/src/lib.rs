#![deny(missing_docs)]

//! Buffer-backed columnar vectors and the cursors that fill and traverse them.
//!
//! A [`Vector`] stores one column: a validity bitmap plus the buffers its type needs. Vectors
//! are written through cursor writers, starting from [`Vector::writer`], and read through
//! cursor readers, starting from [`Vector::reader`].
//!
//! # Promotion
//!
//! A writer over an untyped vector types it with the first value it writes. Writing a value of
//! another type later promotes the vector to a [`UnionVector`] that keeps the existing rows as
//! its first variant. See [`WriterOptions`] to turn this off.
//!
//! # List encodings
//!
//! Classic lists share one monotonic offset buffer, list-views carry an independent offset and
//! size per row, and fixed-size lists have a constant stride and no offsets at all.

#[macro_use]
mod macros;

#[doc(hidden)]
pub use paste;
pub use reader::*;
pub use value::*;
pub use vectors::*;
pub use writer::*;

mod reader;
mod validity;
mod value;
mod vectors;
mod writer;

#![deny(missing_docs)]

//! Byte buffers and allocators for colvec.
//!
//! Every vector holds its data in a set of [`BufferHandle`]s: a validity bitmap, and depending on
//! the encoding an offset buffer, a size buffer, a type-id buffer or a data buffer. Handles are
//! obtained from a [`BufferAllocator`] and are returned to it exactly once, either explicitly
//! through [`BufferHandle::release`] or when the handle is dropped.
//!
//! Buffers are always zero-initialised, so a freshly grown validity bitmap marks every new row
//! as null.

pub use allocator::*;
pub use buffer::*;
pub use handle::*;
pub use native::*;

mod allocator;
mod buffer;
mod debug;
mod handle;
mod native;

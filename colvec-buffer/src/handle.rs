use std::fmt::{Debug, Formatter};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use colvec_error::ColvecResult;

use crate::{BufferAllocator, ByteBuffer};

/// A [`ByteBuffer`] together with the allocator it must be returned to.
///
/// The buffer goes back to the allocator exactly once: on [`BufferHandle::release`], on
/// [`BufferHandle::allocate`] (which replaces it), or on drop. Releasing an empty handle does
/// nothing, so release is idempotent.
pub struct BufferHandle {
    buffer: ByteBuffer,
    allocator: Arc<dyn BufferAllocator>,
}

impl BufferHandle {
    /// An unallocated handle.
    pub fn new(allocator: Arc<dyn BufferAllocator>) -> Self {
        Self {
            buffer: ByteBuffer::empty(),
            allocator,
        }
    }

    /// The allocator backing this handle.
    pub fn allocator(&self) -> &Arc<dyn BufferAllocator> {
        &self.allocator
    }

    /// Release the current buffer and replace it with a fresh zeroed one of at least
    /// `min_capacity` bytes.
    pub fn allocate(&mut self, min_capacity: usize) -> ColvecResult<()> {
        let fresh = self.allocator.allocate(min_capacity)?;
        self.release();
        self.buffer = fresh;
        Ok(())
    }

    /// Make sure at least `min_capacity` bytes are addressable, growing by at least a factor of
    /// two when a grow is needed.
    pub fn ensure_capacity(&mut self, min_capacity: usize) -> ColvecResult<()> {
        let current = self.buffer.capacity();
        if current >= min_capacity {
            return Ok(());
        }
        if current == 0 {
            self.buffer = self.allocator.allocate(min_capacity)?;
            return Ok(());
        }
        self.allocator
            .grow(&mut self.buffer, min_capacity.max(current * 2))
    }

    /// Return the buffer to the allocator, leaving the handle unallocated.
    pub fn release(&mut self) {
        if !self.buffer.is_empty() {
            let buffer = std::mem::replace(&mut self.buffer, ByteBuffer::empty());
            self.allocator.release(buffer);
        }
    }
}

impl Deref for BufferHandle {
    type Target = ByteBuffer;

    fn deref(&self) -> &Self::Target {
        &self.buffer
    }
}

impl DerefMut for BufferHandle {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buffer
    }
}

impl Drop for BufferHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl Debug for BufferHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.buffer, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RootAllocator;

    #[test]
    fn released_exactly_once() {
        let allocator = Arc::new(RootAllocator::new());
        let mut handle = BufferHandle::new(allocator.clone());
        assert_eq!(handle.capacity(), 0);
        assert_eq!(allocator.allocated_bytes(), 0);

        handle.ensure_capacity(3).unwrap();
        assert_eq!(handle.capacity(), 4);
        handle.ensure_capacity(5).unwrap();
        assert_eq!(handle.capacity(), 8);
        assert_eq!(allocator.allocated_bytes(), 8);

        handle.release();
        handle.release();
        assert_eq!(allocator.allocated_bytes(), 0);

        handle.allocate(16).unwrap();
        drop(handle);
        assert_eq!(allocator.allocated_bytes(), 0);
    }

    #[test]
    fn allocate_replaces_contents() {
        let allocator = Arc::new(RootAllocator::new());
        let mut handle = BufferHandle::new(allocator.clone());
        handle.allocate(4).unwrap();
        handle.set(0, 1u32).unwrap();
        handle.allocate(4).unwrap();
        assert_eq!(handle.get::<u32>(0).unwrap(), 0);
        assert_eq!(allocator.allocated_bytes(), 4);
    }
}

use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};

use colvec_error::{ColvecResult, colvec_err};

use crate::ByteBuffer;

/// The source of every buffer owned by a vector.
///
/// Vectors only ever call these three operations; they never allocate memory themselves.
pub trait BufferAllocator: Debug + Send + Sync {
    /// Hand out a zeroed buffer with at least `min_capacity` bytes.
    fn allocate(&self, min_capacity: usize) -> ColvecResult<ByteBuffer>;

    /// Grow `buffer` to at least `new_capacity` bytes, preserving its contents and zeroing the
    /// new tail. On failure the buffer is left untouched.
    fn grow(&self, buffer: &mut ByteBuffer, new_capacity: usize) -> ColvecResult<()>;

    /// Take back a buffer previously handed out by this allocator.
    fn release(&self, buffer: ByteBuffer);

    /// The number of bytes currently handed out.
    fn allocated_bytes(&self) -> usize;
}

/// Round a requested capacity up to the size the allocator hands out.
#[inline]
pub fn rounded_capacity(min_capacity: usize) -> usize {
    if min_capacity == 0 {
        0
    } else {
        min_capacity.next_power_of_two()
    }
}

/// An allocator backed by the global heap with an optional limit on outstanding bytes.
#[derive(Debug)]
pub struct RootAllocator {
    limit: usize,
    allocated: AtomicUsize,
    peak: AtomicUsize,
}

impl RootAllocator {
    /// An allocator without a limit.
    pub fn new() -> Self {
        Self::with_limit(usize::MAX)
    }

    /// An allocator that refuses to hand out more than `limit` bytes at any one time.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            allocated: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// The configured limit in bytes.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// The highest number of bytes that were outstanding at once.
    pub fn peak_bytes(&self) -> usize {
        self.peak.load(Ordering::Relaxed)
    }

    fn reserve(&self, bytes: usize) -> ColvecResult<()> {
        let limit = self.limit;
        let previous = self
            .allocated
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                current.checked_add(bytes).filter(|total| *total <= limit)
            })
            .map_err(|current| {
                log::debug!("refusing to allocate {bytes} bytes, {current} of {limit} in use");
                colvec_err!(AllocationFailure: bytes, current, limit)
            })?;
        self.peak.fetch_max(previous + bytes, Ordering::Relaxed);
        Ok(())
    }

    fn unreserve(&self, bytes: usize) {
        self.allocated.fetch_sub(bytes, Ordering::AcqRel);
    }
}

impl Default for RootAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferAllocator for RootAllocator {
    fn allocate(&self, min_capacity: usize) -> ColvecResult<ByteBuffer> {
        let capacity = rounded_capacity(min_capacity);
        if capacity == 0 {
            return Ok(ByteBuffer::empty());
        }
        self.reserve(capacity)?;
        log::trace!("allocated buffer of {capacity} bytes");
        Ok(ByteBuffer::zeroed(capacity))
    }

    fn grow(&self, buffer: &mut ByteBuffer, new_capacity: usize) -> ColvecResult<()> {
        let current = buffer.capacity();
        if new_capacity <= current {
            return Ok(());
        }
        let capacity = rounded_capacity(new_capacity);
        self.reserve(capacity - current)?;
        log::trace!("growing buffer from {current} to {capacity} bytes");
        buffer.resize_zeroed(capacity);
        Ok(())
    }

    fn release(&self, buffer: ByteBuffer) {
        self.unreserve(buffer.capacity());
    }

    fn allocated_bytes(&self) -> usize {
        self.allocated.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use colvec_error::ColvecError;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, 0)]
    #[case(1, 1)]
    #[case(5, 8)]
    #[case(64, 64)]
    #[case(65, 128)]
    fn rounding(#[case] requested: usize, #[case] expected: usize) {
        assert_eq!(rounded_capacity(requested), expected);
    }

    #[test]
    fn accounting() {
        let allocator = RootAllocator::new();
        let mut buffer = allocator.allocate(10).unwrap();
        assert_eq!(buffer.capacity(), 16);
        assert_eq!(allocator.allocated_bytes(), 16);

        allocator.grow(&mut buffer, 20).unwrap();
        assert_eq!(buffer.capacity(), 32);
        assert_eq!(allocator.allocated_bytes(), 32);

        allocator.release(buffer);
        assert_eq!(allocator.allocated_bytes(), 0);
        assert_eq!(allocator.peak_bytes(), 32);
    }

    #[test]
    fn limit_is_enforced() {
        let allocator = RootAllocator::with_limit(64);
        let mut buffer = allocator.allocate(64).unwrap();
        buffer.set(0, 9u8).unwrap();

        let err = allocator.grow(&mut buffer, 65).unwrap_err();
        assert!(matches!(
            err,
            ColvecError::AllocationFailure {
                requested: 64,
                allocated: 64,
                limit: 64,
                ..
            }
        ));
        assert_eq!(buffer.capacity(), 64);
        assert_eq!(buffer.get::<u8>(0).unwrap(), 9);
        assert!(allocator.allocate(1).is_err());
    }
}

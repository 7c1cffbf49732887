use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;

use colvec_buffer::{BufferAllocator, BufferHandle};
use colvec_dtype::NativePType;
use colvec_error::{ColvecResult, colvec_bail, colvec_err};
use num_traits::{AsPrimitive, FromPrimitive, PrimInt};

/// The integer type of an offset or size buffer.
pub trait OffsetType:
    NativePType + PrimInt + AsPrimitive<usize> + FromPrimitive + Display
{
}

impl<T> OffsetType for T where
    T: NativePType + PrimInt + AsPrimitive<usize> + FromPrimitive + Display
{
}

/// Convert a child index to the offset type, failing when it does not fit.
pub(crate) fn to_offset<O: OffsetType>(value: usize) -> ColvecResult<O> {
    O::from_usize(value)
        .ok_or_else(|| colvec_err!("{} does not fit into a {} offset", value, O::PTYPE))
}

/// Read a stored offset as a child index. Offsets are never negative.
pub(crate) fn offset_to_index<O: OffsetType>(value: O) -> ColvecResult<usize> {
    if value < O::zero() {
        colvec_bail!(
            CorruptEncoding: "negative offset {} in a {} offset buffer",
            value,
            O::PTYPE
        );
    }
    Ok(value.as_())
}

/// A buffer of `O` entries: list offsets, list-view sizes or string offsets.
#[derive(Debug)]
pub(crate) struct OffsetBuffer<O> {
    buffer: BufferHandle,
    _type: PhantomData<O>,
}

impl<O: OffsetType> OffsetBuffer<O> {
    pub fn new(allocator: Arc<dyn BufferAllocator>) -> Self {
        Self {
            buffer: BufferHandle::new(allocator),
            _type: PhantomData,
        }
    }

    pub fn allocate(&mut self, entries: usize) -> ColvecResult<()> {
        self.buffer.allocate(entries * O::WIDTH)
    }

    /// The number of entries the buffer holds without growing.
    pub fn capacity(&self) -> usize {
        self.buffer.capacity() / O::WIDTH
    }

    pub fn ensure_entries(&mut self, entries: usize) -> ColvecResult<()> {
        self.buffer.ensure_capacity(entries * O::WIDTH)
    }

    /// The entry at `index`; entries beyond the capacity read as zero.
    pub fn get(&self, index: usize) -> ColvecResult<O> {
        if index >= self.capacity() {
            return Ok(O::zero());
        }
        self.buffer.get(index * O::WIDTH)
    }

    pub fn set(&mut self, index: usize, value: O) -> ColvecResult<()> {
        self.ensure_entries(index + 1)?;
        self.buffer.set(index * O::WIDTH, value)
    }

    /// Store a child index.
    pub fn set_index(&mut self, index: usize, value: usize) -> ColvecResult<()> {
        self.set(index, to_offset(value)?)
    }

    /// Read an entry that must be a valid child index.
    pub fn get_index(&self, index: usize) -> ColvecResult<usize> {
        offset_to_index(self.get(index)?)
    }

    pub fn release(&mut self) {
        self.buffer.release();
    }
}

#[cfg(test)]
mod tests {
    use colvec_buffer::RootAllocator;
    use colvec_error::ColvecError;

    use super::*;

    #[test]
    fn negative_offsets_are_corrupt() {
        let mut offsets = OffsetBuffer::<i64>::new(Arc::new(RootAllocator::new()));
        offsets.set(2, -4).unwrap();
        assert_eq!(offsets.get(2).unwrap(), -4);
        assert!(matches!(
            offsets.get_index(2),
            Err(ColvecError::CorruptEncoding(..))
        ));
        assert_eq!(offsets.get_index(1).unwrap(), 0);
        assert_eq!(offsets.get(1000).unwrap(), 0);
    }

    #[test]
    fn narrow_offsets_overflow() {
        let mut offsets = OffsetBuffer::<i32>::new(Arc::new(RootAllocator::new()));
        assert!(offsets.set_index(0, usize::MAX).is_err());
        offsets.set_index(0, 7).unwrap();
        assert_eq!(offsets.get_index(0).unwrap(), 7);
    }
}

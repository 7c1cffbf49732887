use std::sync::Arc;

use arrow_buffer::bit_util;
use colvec_buffer::{BufferAllocator, BufferHandle};
use colvec_error::ColvecResult;

/// The validity bitmap of a vector: one bit per row, set when the row holds a value.
///
/// The bitmap grows lazily; rows beyond its capacity read as null.
#[derive(Debug)]
pub(crate) struct Validity {
    bits: BufferHandle,
}

impl Validity {
    pub fn new(allocator: Arc<dyn BufferAllocator>) -> Self {
        Self {
            bits: BufferHandle::new(allocator),
        }
    }

    pub fn allocate(&mut self, rows: usize) -> ColvecResult<()> {
        self.bits.allocate(bit_util::ceil(rows, 8))
    }

    /// The number of rows the bitmap can describe without growing.
    pub fn capacity(&self) -> usize {
        self.bits.capacity() * 8
    }

    pub fn ensure_rows(&mut self, rows: usize) -> ColvecResult<()> {
        self.bits.ensure_capacity(bit_util::ceil(rows, 8))
    }

    #[inline]
    pub fn is_valid(&self, index: usize) -> bool {
        self.bits.get_bit(index)
    }

    pub fn set_valid(&mut self, index: usize) -> ColvecResult<()> {
        self.ensure_rows(index + 1)?;
        self.bits.set_bit(index, true)
    }

    pub fn set_null(&mut self, index: usize) -> ColvecResult<()> {
        if index < self.capacity() {
            self.bits.set_bit(index, false)?;
        }
        Ok(())
    }

    /// Mark every row at or after `from` as null.
    pub fn truncate(&mut self, from: usize) -> ColvecResult<()> {
        for index in from..self.capacity() {
            self.bits.set_bit(index, false)?;
        }
        Ok(())
    }

    pub fn release(&mut self) {
        self.bits.release();
    }
}

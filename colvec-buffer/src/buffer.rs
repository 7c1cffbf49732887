use std::fmt::{Debug, Formatter};

use arrow_buffer::{MutableBuffer, bit_util};
use colvec_error::{ColvecResult, colvec_bail, colvec_err};

use crate::NativeType;
use crate::debug::HexPreview;

/// A zero-initialised byte region whose length is its capacity.
///
/// `ByteBuffer`s are created by a [`crate::BufferAllocator`], which is also the only thing that
/// can change their capacity. All reads and writes are bounds checked against the capacity.
pub struct ByteBuffer {
    inner: MutableBuffer,
}

impl ByteBuffer {
    /// A buffer with zero capacity. Creating one does not allocate.
    pub fn empty() -> Self {
        Self {
            inner: MutableBuffer::new(0),
        }
    }

    pub(crate) fn zeroed(capacity: usize) -> Self {
        Self {
            inner: MutableBuffer::from_len_zeroed(capacity),
        }
    }

    pub(crate) fn resize_zeroed(&mut self, capacity: usize) {
        self.inner.resize(capacity, 0);
    }

    /// The number of addressable bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.inner.len()
    }

    /// Whether the buffer has zero capacity.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Access the whole buffer as bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        self.inner.as_slice()
    }

    /// Access the whole buffer as mutable bytes.
    #[inline]
    pub fn as_slice_mut(&mut self) -> &mut [u8] {
        self.inner.as_slice_mut()
    }

    /// Set every byte to zero.
    pub fn zero(&mut self) {
        self.inner.as_slice_mut().fill(0);
    }

    fn checked_range(&self, offset: usize, len: usize) -> ColvecResult<(usize, usize)> {
        let end = offset
            .checked_add(len)
            .ok_or_else(|| colvec_err!("byte range {} + {} overflows", offset, len))?;
        if end > self.capacity() {
            colvec_bail!(OutOfBounds: end, 0, self.capacity());
        }
        Ok((offset, end))
    }

    /// Read the value stored at `byte_offset`.
    #[inline]
    pub fn get<T: NativeType>(&self, byte_offset: usize) -> ColvecResult<T> {
        let (start, end) = self.checked_range(byte_offset, T::WIDTH)?;
        Ok(T::read_le(&self.as_slice()[start..end]))
    }

    /// Store `value` at `byte_offset`.
    #[inline]
    pub fn set<T: NativeType>(&mut self, byte_offset: usize, value: T) -> ColvecResult<()> {
        let (start, end) = self.checked_range(byte_offset, T::WIDTH)?;
        value.write_le(&mut self.as_slice_mut()[start..end]);
        Ok(())
    }

    /// Borrow `len` bytes starting at `offset`.
    pub fn bytes(&self, offset: usize, len: usize) -> ColvecResult<&[u8]> {
        let (start, end) = self.checked_range(offset, len)?;
        Ok(&self.as_slice()[start..end])
    }

    /// Copy `src` into the buffer starting at `offset`.
    pub fn set_bytes(&mut self, offset: usize, src: &[u8]) -> ColvecResult<()> {
        let (start, end) = self.checked_range(offset, src.len())?;
        self.as_slice_mut()[start..end].copy_from_slice(src);
        Ok(())
    }

    /// The bit at `index`, treating the buffer as a little-endian bitmap.
    ///
    /// Bits beyond the capacity read as unset.
    #[inline]
    pub fn get_bit(&self, index: usize) -> bool {
        index < self.capacity() * 8 && bit_util::get_bit(self.as_slice(), index)
    }

    /// Set or unset the bit at `index`.
    #[inline]
    pub fn set_bit(&mut self, index: usize, value: bool) -> ColvecResult<()> {
        if index >= self.capacity() * 8 {
            colvec_bail!(OutOfBounds: index, 0, self.capacity() * 8);
        }
        if value {
            bit_util::set_bit(self.as_slice_mut(), index);
        } else {
            bit_util::unset_bit(self.as_slice_mut(), index);
        }
        Ok(())
    }
}

impl Debug for ByteBuffer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteBuffer")
            .field("capacity", &self.capacity())
            .field("bytes", &HexPreview(self.as_slice()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use colvec_error::ColvecError;

    use super::*;

    #[test]
    fn typed_access() {
        let mut buffer = ByteBuffer::zeroed(16);
        buffer.set(4, 7i32).unwrap();
        buffer.set(8, -1i64).unwrap();
        assert_eq!(buffer.get::<i32>(0).unwrap(), 0);
        assert_eq!(buffer.get::<i32>(4).unwrap(), 7);
        assert_eq!(buffer.get::<i64>(8).unwrap(), -1);
    }

    #[test]
    fn out_of_bounds_is_an_error() {
        let mut buffer = ByteBuffer::zeroed(8);
        assert!(matches!(
            buffer.get::<i64>(4),
            Err(ColvecError::OutOfBounds(12, 0, 8, _))
        ));
        assert!(buffer.set(6, 1u32).is_err());
        assert_eq!(buffer.as_slice(), &[0u8; 8]);
    }

    #[test]
    fn bits() {
        let mut buffer = ByteBuffer::zeroed(2);
        buffer.set_bit(0, true).unwrap();
        buffer.set_bit(9, true).unwrap();
        assert!(buffer.get_bit(0));
        assert!(!buffer.get_bit(1));
        assert!(buffer.get_bit(9));
        buffer.set_bit(9, false).unwrap();
        assert!(!buffer.get_bit(9));
        assert!(!buffer.get_bit(1000));
        assert!(buffer.set_bit(16, true).is_err());
    }

    #[test]
    fn grow_keeps_contents_and_zeroes_tail() {
        let mut buffer = ByteBuffer::zeroed(4);
        buffer.set_bytes(0, b"abcd").unwrap();
        buffer.resize_zeroed(8);
        assert_eq!(buffer.bytes(0, 8).unwrap(), b"abcd\0\0\0\0");
    }
}

use std::sync::Arc;

use colvec_buffer::{BufferAllocator, BufferHandle};
use colvec_dtype::{DType, Field, FieldName, MinorType, Nullability};
use colvec_error::{ColvecResult, colvec_bail, colvec_err};

use crate::validity::Validity;
use crate::vectors::check_nullable;
use crate::vectors::offsets::{OffsetBuffer, OffsetType};
use crate::{Value, ValueVector};

/// Strings or binary values addressed through `n + 1` monotonic offsets into a data buffer.
///
/// Rows must be written in increasing order. Skipped rows become empty nulls, and writing a
/// row at or before the last written row discards every row after it.
#[derive(Debug)]
pub struct VariableWidthVector<O> {
    name: FieldName,
    dtype: DType,
    nullability: Nullability,
    validity: Validity,
    offsets: OffsetBuffer<O>,
    data: BufferHandle,
    value_count: usize,
    last_set: Option<usize>,
    allocator: Arc<dyn BufferAllocator>,
}

impl<O: OffsetType> VariableWidthVector<O> {
    /// An empty vector of `dtype`, which must be a string or binary type.
    pub fn try_new(
        name: impl Into<FieldName>,
        dtype: DType,
        nullability: Nullability,
        allocator: Arc<dyn BufferAllocator>,
    ) -> ColvecResult<Self> {
        if !dtype.is_variable_width() {
            colvec_bail!("{} is not a variable-width type", dtype);
        }
        Ok(Self {
            name: name.into(),
            dtype,
            nullability,
            validity: Validity::new(allocator.clone()),
            offsets: OffsetBuffer::new(allocator.clone()),
            data: BufferHandle::new(allocator.clone()),
            value_count: 0,
            last_set: None,
            allocator,
        })
    }

    pub(crate) fn rename(&mut self, name: FieldName) {
        self.name = name;
    }

    /// The type of the stored values.
    pub fn dtype(&self) -> &DType {
        &self.dtype
    }

    /// Point every row after the last written one up to `index` at an empty range.
    fn fill_holes(&mut self, index: usize) -> ColvecResult<()> {
        let mut next = self.last_set.map_or(0, |last| last + 1);
        while next < index {
            let end = self.offsets.get(next)?;
            self.offsets.set(next + 1, end)?;
            next += 1;
        }
        Ok(())
    }

    /// Store the bytes of row `index`.
    pub fn set_bytes(&mut self, index: usize, bytes: &[u8]) -> ColvecResult<()> {
        self.offsets.ensure_entries(index + 2)?;
        self.validity.ensure_rows(index + 1)?;
        if self.last_set.is_some_and(|last| index <= last) {
            self.validity.truncate(index)?;
            self.value_count = index;
            self.last_set = index.checked_sub(1);
        }
        self.fill_holes(index)?;

        let start = self.offsets.get_index(index)?;
        let end = start + bytes.len();
        let end_offset = O::from_usize(end)
            .ok_or_else(|| colvec_err!("{} bytes overflow a {} offset", end, O::PTYPE))?;
        self.data.ensure_capacity(end)?;
        self.data.set_bytes(start, bytes)?;
        self.offsets.set(index + 1, end_offset)?;
        self.validity.set_valid(index)?;
        self.last_set = Some(index);
        self.value_count = self.value_count.max(index + 1);
        Ok(())
    }

    /// The bytes of row `index`, or `None` for null rows.
    pub fn get_bytes(&self, index: usize) -> ColvecResult<Option<&[u8]>> {
        if self.is_null(index) {
            return Ok(None);
        }
        let start = self.offsets.get_index(index)?;
        let end = self.offsets.get_index(index + 1)?;
        if end < start {
            colvec_bail!(
                CorruptEncoding: "offsets of row {} run backwards from {} to {}",
                index,
                start,
                end
            );
        }
        self.data.bytes(start, end - start).map(Some)
    }

    /// Store a string or binary [`Value`] matching this vector's type.
    pub fn set_value(&mut self, index: usize, value: &Value) -> ColvecResult<()> {
        match (&self.dtype, value) {
            (DType::Utf8, Value::Utf8(s)) | (DType::LargeUtf8, Value::LargeUtf8(s)) => {
                self.set_bytes(index, s.as_bytes())
            }
            (DType::Binary, Value::Binary(b)) | (DType::LargeBinary, Value::LargeBinary(b)) => {
                self.set_bytes(index, b)
            }
            (dtype, value) => Err(colvec_err!(MismatchedTypes: dtype, value.dtype())),
        }
    }
}

impl<O: OffsetType> ValueVector for VariableWidthVector<O> {
    fn name(&self) -> &FieldName {
        &self.name
    }

    fn field(&self) -> Field {
        Field::new(self.name.clone(), self.dtype.clone(), self.nullability)
    }

    fn minor_type(&self) -> MinorType {
        self.dtype.minor_type()
    }

    fn allocator(&self) -> &Arc<dyn BufferAllocator> {
        &self.allocator
    }

    fn allocate_with_capacity(&mut self, rows: usize) -> ColvecResult<()> {
        self.offsets.allocate(rows + 1)?;
        self.validity.allocate(rows)?;
        self.data.allocate(rows * 8)?;
        self.value_count = 0;
        self.last_set = None;
        Ok(())
    }

    fn value_capacity(&self) -> usize {
        self.offsets
            .capacity()
            .saturating_sub(1)
            .min(self.validity.capacity())
    }

    fn value_count(&self) -> usize {
        self.value_count
    }

    fn set_value_count(&mut self, count: usize) -> ColvecResult<()> {
        if count < self.value_count {
            self.validity.truncate(count)?;
            if self.last_set.is_some_and(|last| last >= count) {
                self.last_set = count.checked_sub(1);
            }
        } else {
            self.offsets.ensure_entries(count + 1)?;
            self.fill_holes(count)?;
        }
        self.value_count = count;
        Ok(())
    }

    fn clear(&mut self) {
        self.offsets.release();
        self.data.release();
        self.validity.release();
        self.value_count = 0;
        self.last_set = None;
    }

    fn is_null(&self, index: usize) -> bool {
        index >= self.value_count || !self.validity.is_valid(index)
    }

    fn set_null(&mut self, index: usize) -> ColvecResult<()> {
        check_nullable(&self.name, self.nullability)?;
        self.validity.set_null(index)?;
        self.value_count = self.value_count.max(index + 1);
        Ok(())
    }

    fn get_object(&self, index: usize) -> ColvecResult<Value> {
        let Some(bytes) = self.get_bytes(index)? else {
            return Ok(Value::Null);
        };
        Ok(match self.dtype {
            DType::Utf8 | DType::LargeUtf8 => {
                let s = std::str::from_utf8(bytes)
                    .map_err(|e| colvec_err!(CorruptEncoding: "row {} is not UTF-8: {}", index, e))?
                    .to_string();
                if self.dtype == DType::Utf8 {
                    Value::Utf8(s)
                } else {
                    Value::LargeUtf8(s)
                }
            }
            DType::LargeBinary => Value::LargeBinary(bytes.to_vec()),
            _ => Value::Binary(bytes.to_vec()),
        })
    }
}

#[cfg(test)]
mod tests {
    use colvec_buffer::RootAllocator;

    use super::*;

    fn strings() -> VariableWidthVector<i32> {
        VariableWidthVector::try_new(
            "s",
            DType::Utf8,
            Nullability::Nullable,
            Arc::new(RootAllocator::new()),
        )
        .unwrap()
    }

    #[test]
    fn holes_are_empty_nulls() {
        let mut vector = strings();
        vector.set_bytes(0, b"ab").unwrap();
        vector.set_bytes(3, b"cde").unwrap();
        assert_eq!(vector.value_count(), 4);
        assert_eq!(vector.get_bytes(0).unwrap(), Some(&b"ab"[..]));
        assert_eq!(vector.get_bytes(1).unwrap(), None);
        assert_eq!(vector.offsets.get_index(2).unwrap(), 2);
        assert_eq!(vector.get_object(3).unwrap(), Value::Utf8("cde".to_string()));
    }

    #[test]
    fn rewriting_truncates() {
        let mut vector = strings();
        vector.set_bytes(0, b"one").unwrap();
        vector.set_bytes(1, b"two").unwrap();
        vector.set_bytes(2, b"three").unwrap();
        vector.set_bytes(1, b"2").unwrap();
        assert_eq!(vector.get_bytes(1).unwrap(), Some(&b"2"[..]));
        assert_eq!(vector.value_count(), 2);
        assert_eq!(vector.get_bytes(2).unwrap(), None);
        vector.set_bytes(2, b"3").unwrap();
        assert_eq!(vector.offsets.get_index(3).unwrap(), 5);
    }

    #[test]
    fn large_binary() {
        let mut vector = VariableWidthVector::<i64>::try_new(
            "b",
            DType::LargeBinary,
            Nullability::Nullable,
            Arc::new(RootAllocator::new()),
        )
        .unwrap();
        vector
            .set_value(0, &Value::LargeBinary(vec![0, 1]))
            .unwrap();
        assert!(vector.set_value(1, &Value::Binary(vec![2])).is_err());
        assert_eq!(vector.get_object(0).unwrap(), Value::LargeBinary(vec![0, 1]));
    }
}

use std::sync::Arc;

use arrow_buffer::bit_util;
use colvec_buffer::{BufferAllocator, BufferHandle};
use colvec_dtype::{DType, Field, FieldName, MinorType, Nullability};
use colvec_error::ColvecResult;

use crate::validity::Validity;
use crate::vectors::check_nullable;
use crate::{Value, ValueVector};

/// Booleans, stored one bit per row next to the validity bitmap.
#[derive(Debug)]
pub struct BitVector {
    name: FieldName,
    nullability: Nullability,
    validity: Validity,
    values: BufferHandle,
    value_count: usize,
    allocator: Arc<dyn BufferAllocator>,
}

impl BitVector {
    /// An empty boolean vector.
    pub fn new(
        name: impl Into<FieldName>,
        nullability: Nullability,
        allocator: Arc<dyn BufferAllocator>,
    ) -> Self {
        Self {
            name: name.into(),
            nullability,
            validity: Validity::new(allocator.clone()),
            values: BufferHandle::new(allocator.clone()),
            value_count: 0,
            allocator,
        }
    }

    pub(crate) fn rename(&mut self, name: FieldName) {
        self.name = name;
    }

    /// Store `value` at row `index`, growing the buffers as needed.
    pub fn set(&mut self, index: usize, value: bool) -> ColvecResult<()> {
        self.values.ensure_capacity(bit_util::ceil(index + 1, 8))?;
        self.validity.ensure_rows(index + 1)?;
        self.values.set_bit(index, value)?;
        self.validity.set_valid(index)?;
        self.value_count = self.value_count.max(index + 1);
        Ok(())
    }

    /// The value at row `index`, or `None` for null rows.
    pub fn get(&self, index: usize) -> Option<bool> {
        (!self.is_null(index)).then(|| self.values.get_bit(index))
    }
}

impl ValueVector for BitVector {
    fn name(&self) -> &FieldName {
        &self.name
    }

    fn field(&self) -> Field {
        Field::new(self.name.clone(), DType::Bool, self.nullability)
    }

    fn minor_type(&self) -> MinorType {
        MinorType::Bit
    }

    fn allocator(&self) -> &Arc<dyn BufferAllocator> {
        &self.allocator
    }

    fn allocate_with_capacity(&mut self, rows: usize) -> ColvecResult<()> {
        self.values.allocate(bit_util::ceil(rows, 8))?;
        self.validity.allocate(rows)?;
        self.value_count = 0;
        Ok(())
    }

    fn value_capacity(&self) -> usize {
        (self.values.capacity() * 8).min(self.validity.capacity())
    }

    fn value_count(&self) -> usize {
        self.value_count
    }

    fn set_value_count(&mut self, count: usize) -> ColvecResult<()> {
        if count < self.value_count {
            self.validity.truncate(count)?;
        }
        self.value_count = count;
        Ok(())
    }

    fn clear(&mut self) {
        self.values.release();
        self.validity.release();
        self.value_count = 0;
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
        Ok(self.get(index).map_or(Value::Null, Value::Bool))
    }
}

#[cfg(test)]
mod tests {
    use colvec_buffer::RootAllocator;

    use super::*;

    #[test]
    fn set_and_get() {
        let mut vector = BitVector::new("b", Nullability::Nullable, Arc::new(RootAllocator::new()));
        vector.set(0, true).unwrap();
        vector.set(2, false).unwrap();
        assert_eq!(vector.value_count(), 3);
        assert_eq!(vector.get(0), Some(true));
        assert_eq!(vector.get(1), None);
        assert_eq!(vector.get(2), Some(false));
        assert_eq!(vector.get(3), None);
    }

    #[test]
    fn non_nullable_rejects_nulls() {
        let mut vector =
            BitVector::new("b", Nullability::NonNullable, Arc::new(RootAllocator::new()));
        assert!(vector.set_null(0).is_err());
        assert_eq!(vector.value_count(), 0);
    }
}

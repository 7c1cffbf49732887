use std::ops::Range;
use std::sync::Arc;

use colvec_buffer::BufferAllocator;
use colvec_dtype::{DATA_VECTOR_NAME, DType, Field, FieldName, MinorType, Nullability};
use colvec_error::{ColvecResult, colvec_bail};

use crate::validity::Validity;
use crate::vectors::check_nullable;
use crate::{Value, ValueVector, Vector};

/// A list where every row spans exactly `list_size` child slots: row `i` holds the child
/// elements `[i * list_size, (i + 1) * list_size)`. There is no offset buffer.
#[derive(Debug)]
pub struct FixedSizeListVector {
    name: FieldName,
    nullability: Nullability,
    list_size: usize,
    validity: Validity,
    data: Box<Vector>,
    value_count: usize,
    allocator: Arc<dyn BufferAllocator>,
}

impl FixedSizeListVector {
    /// An empty fixed-size list vector whose element vector is still untyped.
    pub fn try_new(
        name: impl Into<FieldName>,
        list_size: usize,
        nullability: Nullability,
        allocator: Arc<dyn BufferAllocator>,
    ) -> ColvecResult<Self> {
        let data = Vector::untyped(DATA_VECTOR_NAME, allocator.clone());
        Self::try_with_data(name, list_size, nullability, data, allocator)
    }

    /// An empty fixed-size list vector over the given element vector.
    pub fn try_with_data(
        name: impl Into<FieldName>,
        list_size: usize,
        nullability: Nullability,
        data: Vector,
        allocator: Arc<dyn BufferAllocator>,
    ) -> ColvecResult<Self> {
        if list_size == 0 {
            colvec_bail!("fixed-size lists must have a positive list size");
        }
        Ok(Self {
            name: name.into(),
            nullability,
            list_size,
            validity: Validity::new(allocator.clone()),
            data: Box::new(data),
            value_count: 0,
            allocator,
        })
    }

    pub(crate) fn rename(&mut self, name: FieldName) {
        self.name = name;
    }

    /// The number of child slots of every row.
    pub fn list_size(&self) -> usize {
        self.list_size
    }

    /// The element vector.
    pub fn data(&self) -> &Vector {
        &self.data
    }

    /// The element vector, mutably.
    pub fn data_mut(&mut self) -> &mut Vector {
        &mut self.data
    }

    /// Open row `index`: mark it valid, make sure its child slots exist (unwritten slots read
    /// as null) and return its first child slot.
    pub fn start_new_value(&mut self, index: usize) -> ColvecResult<usize> {
        let end = (index + 1) * self.list_size;
        if end > self.data.value_count() {
            self.data.set_value_count(end)?;
        }
        self.validity.set_valid(index)?;
        self.value_count = self.value_count.max(index + 1);
        Ok(index * self.list_size)
    }

    /// The child elements of row `index`.
    pub fn element_range(&self, index: usize) -> Range<usize> {
        index * self.list_size..(index + 1) * self.list_size
    }
}

impl ValueVector for FixedSizeListVector {
    fn name(&self) -> &FieldName {
        &self.name
    }

    fn field(&self) -> Field {
        Field::new(
            self.name.clone(),
            DType::FixedSizeList(self.list_size),
            self.nullability,
        )
        .with_children([self.data.field()])
    }

    fn minor_type(&self) -> MinorType {
        MinorType::FixedSizeList
    }

    fn allocator(&self) -> &Arc<dyn BufferAllocator> {
        &self.allocator
    }

    fn allocate_with_capacity(&mut self, rows: usize) -> ColvecResult<()> {
        self.validity.allocate(rows)?;
        self.data.allocate_with_capacity(rows * self.list_size)?;
        self.value_count = 0;
        Ok(())
    }

    fn value_capacity(&self) -> usize {
        (self.data.value_capacity() / self.list_size).min(self.validity.capacity())
    }

    fn value_count(&self) -> usize {
        self.value_count
    }

    fn set_value_count(&mut self, count: usize) -> ColvecResult<()> {
        if count < self.value_count {
            self.validity.truncate(count)?;
        }
        self.data.set_value_count(count * self.list_size)?;
        self.value_count = count;
        Ok(())
    }

    fn clear(&mut self) {
        self.validity.release();
        self.data.clear();
        self.value_count = 0;
    }

    fn is_null(&self, index: usize) -> bool {
        index >= self.value_count || !self.validity.is_valid(index)
    }

    fn set_null(&mut self, index: usize) -> ColvecResult<()> {
        check_nullable(&self.name, self.nullability)?;
        self.validity.set_null(index)?;
        self.value_count = self.value_count.max(index + 1);
        let end = (index + 1) * self.list_size;
        if end > self.data.value_count() {
            self.data.set_value_count(end)?;
        }
        Ok(())
    }

    fn get_object(&self, index: usize) -> ColvecResult<Value> {
        if self.is_null(index) {
            return Ok(Value::Null);
        }
        self.element_range(index)
            .map(|i| self.data.get_object(i))
            .collect::<ColvecResult<Vec<_>>>()
            .map(Value::List)
    }
}

#[cfg(test)]
mod tests {
    use colvec_buffer::RootAllocator;

    use super::*;

    #[test]
    fn start_pads_the_row_with_nulls() {
        let allocator = Arc::new(RootAllocator::new());
        let mut vector =
            FixedSizeListVector::try_new("f", 3, Nullability::Nullable, allocator).unwrap();
        assert_eq!(vector.start_new_value(1).unwrap(), 3);
        assert_eq!(vector.data().value_count(), 6);
        assert!(vector.is_null(0));
        assert_eq!(
            vector.get_object(1).unwrap(),
            Value::List(vec![Value::Null, Value::Null, Value::Null])
        );
    }

    #[test]
    fn zero_list_size_is_rejected() {
        let allocator = Arc::new(RootAllocator::new());
        assert!(FixedSizeListVector::try_new("f", 0, Nullability::Nullable, allocator).is_err());
    }
}

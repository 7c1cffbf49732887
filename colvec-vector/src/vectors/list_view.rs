use std::ops::Range;
use std::sync::Arc;

use colvec_buffer::BufferAllocator;
use colvec_dtype::{DATA_VECTOR_NAME, DType, Field, FieldName, MinorType, Nullability};
use colvec_error::{ColvecResult, colvec_bail};

use crate::validity::Validity;
use crate::vectors::check_nullable;
use crate::vectors::offsets::{OffsetBuffer, OffsetType, offset_to_index};
use crate::{Value, ValueVector, Vector};

/// A list-view over 32-bit offsets and sizes.
pub type ListViewVector = GenericListViewVector<i32>;
/// A list-view over 64-bit offsets and sizes.
pub type LargeListViewVector = GenericListViewVector<i64>;

/// A list encoded with independent offset and size buffers: row `i` holds the child elements
/// `[offset[i], offset[i] + size[i])`.
///
/// Ranges of different rows may overlap, leave gaps or appear in any order. Rows are not
/// appended through `start_new_value`; callers record each row's range with
/// [`GenericListViewVector::set_row`].
#[derive(Debug)]
pub struct GenericListViewVector<O> {
    name: FieldName,
    nullability: Nullability,
    validity: Validity,
    offsets: OffsetBuffer<O>,
    sizes: OffsetBuffer<O>,
    data: Box<Vector>,
    value_count: usize,
    allocator: Arc<dyn BufferAllocator>,
}

impl<O: OffsetType> GenericListViewVector<O> {
    /// An empty list-view vector whose element vector is still untyped.
    pub fn new(
        name: impl Into<FieldName>,
        nullability: Nullability,
        allocator: Arc<dyn BufferAllocator>,
    ) -> Self {
        let data = Vector::untyped(DATA_VECTOR_NAME, allocator.clone());
        Self::with_data(name, nullability, data, allocator)
    }

    /// An empty list-view vector over the given element vector.
    pub fn with_data(
        name: impl Into<FieldName>,
        nullability: Nullability,
        data: Vector,
        allocator: Arc<dyn BufferAllocator>,
    ) -> Self {
        Self {
            name: name.into(),
            nullability,
            validity: Validity::new(allocator.clone()),
            offsets: OffsetBuffer::new(allocator.clone()),
            sizes: OffsetBuffer::new(allocator.clone()),
            data: Box::new(data),
            value_count: 0,
            allocator,
        }
    }

    pub(crate) fn rename(&mut self, name: FieldName) {
        self.name = name;
    }

    /// The list encoding of this vector.
    pub fn dtype(&self) -> DType {
        if O::WIDTH == 8 {
            DType::LargeListView
        } else {
            DType::ListView
        }
    }

    /// The element vector.
    pub fn data(&self) -> &Vector {
        &self.data
    }

    /// The element vector, mutably.
    pub fn data_mut(&mut self) -> &mut Vector {
        &mut self.data
    }

    /// Record the first child element of row `index`.
    pub fn set_offset(&mut self, index: usize, offset: usize) -> ColvecResult<()> {
        self.offsets.set_index(index, offset)?;
        self.value_count = self.value_count.max(index + 1);
        Ok(())
    }

    /// Record the number of child elements of row `index`.
    pub fn set_size(&mut self, index: usize, size: usize) -> ColvecResult<()> {
        self.sizes.set_index(index, size)?;
        self.value_count = self.value_count.max(index + 1);
        Ok(())
    }

    /// Store `size` for row `index` as is. Readers decide how to treat negative sizes.
    pub fn set_raw_size(&mut self, index: usize, size: O) -> ColvecResult<()> {
        self.sizes.ensure_entries(index + 1)?;
        self.sizes.set(index, size)
    }

    /// Mark row `index` valid and point it at `[offset, offset + size)` of the element vector.
    pub fn set_row(&mut self, index: usize, offset: usize, size: usize) -> ColvecResult<()> {
        self.offsets.ensure_entries(index + 1)?;
        self.sizes.ensure_entries(index + 1)?;
        self.validity.ensure_rows(index + 1)?;
        self.set_offset(index, offset)?;
        self.set_size(index, size)?;
        self.set_valid(index)?;
        if offset + size > self.data.value_count() {
            self.data.set_value_count(offset + size)?;
        }
        Ok(())
    }

    pub(crate) fn set_valid(&mut self, index: usize) -> ColvecResult<()> {
        self.validity.set_valid(index)?;
        self.value_count = self.value_count.max(index + 1);
        Ok(())
    }

    /// The raw offset of row `index`. Offsets beyond the buffer read as zero.
    pub fn offset(&self, index: usize) -> ColvecResult<O> {
        self.offsets.get(index)
    }

    /// The raw size of row `index`, which a corrupt buffer may hold as a negative number.
    pub fn size(&self, index: usize) -> ColvecResult<O> {
        self.sizes.get(index)
    }

    /// The number of rows the offset buffer holds.
    pub fn offset_capacity(&self) -> usize {
        self.offsets.capacity()
    }

    /// The child elements of row `index`, treating negative sizes as empty.
    pub fn element_range(&self, index: usize) -> ColvecResult<Range<usize>> {
        if index >= self.value_count {
            return Ok(0..0);
        }
        let start = offset_to_index(self.offset(index)?)?;
        let size = self.size(index)?;
        if size < O::zero() {
            log::warn!(
                "list-view {} row {} has negative size {}, reading it as empty",
                self.name,
                index,
                size
            );
            return Ok(start..start);
        }
        let size: usize = size.as_();
        let end = start + size;
        if end > self.data.value_count() {
            colvec_bail!(OutOfBounds: end, 0, self.data.value_count());
        }
        Ok(start..end)
    }
}

impl<O: OffsetType> ValueVector for GenericListViewVector<O> {
    fn name(&self) -> &FieldName {
        &self.name
    }

    fn field(&self) -> Field {
        Field::new(self.name.clone(), self.dtype(), self.nullability)
            .with_children([self.data.field()])
    }

    fn minor_type(&self) -> MinorType {
        self.dtype().minor_type()
    }

    fn allocator(&self) -> &Arc<dyn BufferAllocator> {
        &self.allocator
    }

    fn allocate_with_capacity(&mut self, rows: usize) -> ColvecResult<()> {
        self.offsets.allocate(rows)?;
        self.sizes.allocate(rows)?;
        self.validity.allocate(rows)?;
        self.data.allocate_with_capacity(rows)?;
        self.value_count = 0;
        Ok(())
    }

    fn value_capacity(&self) -> usize {
        self.offsets
            .capacity()
            .min(self.sizes.capacity())
            .min(self.validity.capacity())
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
        self.offsets.release();
        self.sizes.release();
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
        if index < self.sizes.capacity() {
            self.sizes.set(index, O::zero())?;
        }
        self.value_count = self.value_count.max(index + 1);
        Ok(())
    }

    fn get_object(&self, index: usize) -> ColvecResult<Value> {
        if self.is_null(index) {
            return Ok(Value::Null);
        }
        self.element_range(index)?
            .map(|i| self.data.get_object(i))
            .collect::<ColvecResult<Vec<_>>>()
            .map(Value::List)
    }
}

#[cfg(test)]
mod tests {
    use colvec_buffer::RootAllocator;
    use colvec_error::ColvecError;

    use super::*;

    fn letters() -> LargeListViewVector {
        let allocator: Arc<dyn BufferAllocator> = Arc::new(RootAllocator::new());
        let mut data = Vector::try_new(DATA_VECTOR_NAME, &DType::Utf8, allocator.clone()).unwrap();
        for (i, letter) in ["a", "b", "c", "d", "e", "f", "g", "h"].iter().enumerate() {
            data.set_value(i, &Value::from(*letter)).unwrap();
        }
        LargeListViewVector::with_data("v", Nullability::Nullable, data, allocator)
    }

    fn strings(values: &[&str]) -> Value {
        Value::List(values.iter().map(|s| Value::from(*s)).collect())
    }

    #[test]
    fn overlapping_and_reversed_ranges() {
        let mut vector = letters();
        vector.set_row(0, 5, 3).unwrap();
        vector.set_row(1, 0, 2).unwrap();
        vector.set_row(2, 1, 6).unwrap();
        assert_eq!(vector.get_object(0).unwrap(), strings(&["f", "g", "h"]));
        assert_eq!(vector.get_object(1).unwrap(), strings(&["a", "b"]));
        assert_eq!(
            vector.get_object(2).unwrap(),
            strings(&["b", "c", "d", "e", "f", "g"])
        );
    }

    #[test]
    fn start_new_value_is_not_defined() {
        let mut vector = Vector::LargeListView(letters());
        assert!(matches!(
            vector.start_new_value(0),
            Err(ColvecError::UnsupportedOperation(..))
        ));
    }

    #[test]
    fn negative_sizes_read_as_empty() {
        let mut vector = letters();
        vector.set_row(0, 2, 1).unwrap();
        vector.sizes.set(0, -3).unwrap();
        assert_eq!(vector.size(0).unwrap(), -3);
        assert_eq!(vector.get_object(0).unwrap(), Value::List(vec![]));
    }

    #[test]
    fn ranges_past_the_data_are_rejected() {
        let mut vector = letters();
        vector.set_row(0, 6, 2).unwrap();
        vector.offsets.set(0, 7).unwrap();
        assert!(matches!(
            vector.element_range(0),
            Err(ColvecError::OutOfBounds(9, 0, 8, _))
        ));
    }
}

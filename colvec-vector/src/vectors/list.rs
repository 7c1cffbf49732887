use std::ops::Range;
use std::sync::Arc;

use colvec_buffer::BufferAllocator;
use colvec_dtype::{DATA_VECTOR_NAME, DType, Field, FieldName, MinorType, Nullability};
use colvec_error::{ColvecResult, colvec_bail};

use crate::validity::Validity;
use crate::vectors::check_nullable;
use crate::vectors::offsets::{OffsetBuffer, OffsetType};
use crate::{Value, ValueVector, Vector};

/// A classic list over 32-bit offsets.
pub type ListVector = GenericListVector<i32>;
/// A classic list over 64-bit offsets.
pub type LargeListVector = GenericListVector<i64>;

/// A list encoded with a single monotonic offset buffer: row `i` holds the child elements
/// `[offset[i], offset[i + 1])`.
///
/// Rows are appended through [`GenericListVector::start_new_value`] and
/// [`GenericListVector::end_value`]. Rows that are skipped become empty nulls so the offsets
/// stay monotonic.
#[derive(Debug)]
pub struct GenericListVector<O> {
    name: FieldName,
    nullability: Nullability,
    validity: Validity,
    offsets: OffsetBuffer<O>,
    data: Box<Vector>,
    value_count: usize,
    last_set: Option<usize>,
    allocator: Arc<dyn BufferAllocator>,
}

impl<O: OffsetType> GenericListVector<O> {
    /// An empty list vector whose element vector is still untyped.
    pub fn new(
        name: impl Into<FieldName>,
        nullability: Nullability,
        allocator: Arc<dyn BufferAllocator>,
    ) -> Self {
        let data = Vector::untyped(DATA_VECTOR_NAME, allocator.clone());
        Self::with_data(name, nullability, data, allocator)
    }

    /// An empty list vector over the given element vector.
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
            data: Box::new(data),
            value_count: 0,
            last_set: None,
            allocator,
        }
    }

    pub(crate) fn rename(&mut self, name: FieldName) {
        self.name = name;
    }

    /// The list encoding of this vector.
    pub fn dtype(&self) -> DType {
        if O::WIDTH == 8 {
            DType::LargeList
        } else {
            DType::List
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

    fn fill_holes(&mut self, index: usize) -> ColvecResult<()> {
        let mut next = self.last_set.map_or(0, |last| last + 1);
        while next < index {
            let end = self.offsets.get(next)?;
            self.offsets.set(next + 1, end)?;
            next += 1;
        }
        Ok(())
    }

    /// Open row `index` and return the first child slot it may write to.
    ///
    /// Rewriting a row at or before the last opened one discards the rows after it.
    pub fn start_new_value(&mut self, index: usize) -> ColvecResult<usize> {
        self.offsets.ensure_entries(index + 2)?;
        self.validity.ensure_rows(index + 1)?;
        if self.last_set.is_some_and(|last| index <= last) {
            self.validity.truncate(index)?;
            self.value_count = index;
            self.last_set = index.checked_sub(1);
        }
        self.fill_holes(index)?;
        let start = self.offsets.get(index)?;
        self.offsets.set(index + 1, start)?;
        self.validity.set_valid(index)?;
        self.last_set = Some(index);
        self.value_count = self.value_count.max(index + 1);
        self.offsets.get_index(index)
    }

    /// Close row `index` after `size` elements were written from its start.
    pub fn end_value(&mut self, index: usize, size: usize) -> ColvecResult<()> {
        let start = self.offsets.get_index(index)?;
        self.offsets.set_index(index + 1, start + size)
    }

    /// The child elements of row `index`.
    pub fn element_range(&self, index: usize) -> ColvecResult<Range<usize>> {
        if index >= self.value_count || index >= self.offsets.capacity() {
            return Ok(0..0);
        }
        let start = self.offsets.get_index(index)?;
        let end = self.offsets.get_index(index + 1)?;
        if end < start {
            colvec_bail!(
                CorruptEncoding: "list offsets of row {} run backwards from {} to {}",
                index,
                start,
                end
            );
        }
        Ok(start..end)
    }

    /// The raw offset entry `index`. There are `value_count + 1` entries.
    pub fn offset(&self, index: usize) -> ColvecResult<O> {
        self.offsets.get(index)
    }

    #[allow(dead_code)]
    pub(crate) fn set_valid(&mut self, index: usize) -> ColvecResult<()> {
        self.validity.set_valid(index)?;
        self.value_count = self.value_count.max(index + 1);
        Ok(())
    }
}

impl<O: OffsetType> ValueVector for GenericListVector<O> {
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
        self.offsets.allocate(rows + 1)?;
        self.validity.allocate(rows)?;
        self.data.allocate_with_capacity(rows)?;
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
        let child_count = self.offsets.get_index(count)?;
        if child_count > self.data.value_count() {
            self.data.set_value_count(child_count)?;
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.offsets.release();
        self.validity.release();
        self.data.clear();
        self.value_count = 0;
        self.last_set = None;
    }

    fn is_null(&self, index: usize) -> bool {
        index >= self.value_count || !self.validity.is_valid(index)
    }

    fn set_null(&mut self, index: usize) -> ColvecResult<()> {
        check_nullable(&self.name, self.nullability)?;
        self.offsets.ensure_entries(index + 2)?;
        self.fill_holes(index)?;
        self.validity.set_null(index)?;
        if self.last_set.is_none_or(|last| last < index) {
            let start = self.offsets.get(index)?;
            self.offsets.set(index + 1, start)?;
            self.last_set = Some(index);
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

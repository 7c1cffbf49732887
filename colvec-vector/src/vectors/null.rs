use std::sync::Arc;

use colvec_buffer::BufferAllocator;
use colvec_dtype::{DType, Field, FieldName, MinorType};
use colvec_error::ColvecResult;

use crate::{Value, ValueVector};

/// A vector whose every row is null. It owns no buffers.
///
/// Writers start every untyped slot as a `NullVector` and replace it once the first typed
/// value arrives.
#[derive(Debug)]
pub struct NullVector {
    name: FieldName,
    value_count: usize,
    allocator: Arc<dyn BufferAllocator>,
}

impl NullVector {
    /// An empty null vector.
    pub fn new(name: impl Into<FieldName>, allocator: Arc<dyn BufferAllocator>) -> Self {
        Self::with_value_count(name, 0, allocator)
    }

    /// A null vector that already holds `value_count` rows.
    pub fn with_value_count(
        name: impl Into<FieldName>,
        value_count: usize,
        allocator: Arc<dyn BufferAllocator>,
    ) -> Self {
        Self {
            name: name.into(),
            value_count,
            allocator,
        }
    }

    pub(crate) fn rename(&mut self, name: FieldName) {
        self.name = name;
    }
}

impl ValueVector for NullVector {
    fn name(&self) -> &FieldName {
        &self.name
    }

    fn field(&self) -> Field {
        Field::nullable(self.name.clone(), DType::Null)
    }

    fn minor_type(&self) -> MinorType {
        MinorType::Null
    }

    fn allocator(&self) -> &Arc<dyn BufferAllocator> {
        &self.allocator
    }

    fn allocate_with_capacity(&mut self, _rows: usize) -> ColvecResult<()> {
        self.value_count = 0;
        Ok(())
    }

    fn value_capacity(&self) -> usize {
        usize::MAX
    }

    fn value_count(&self) -> usize {
        self.value_count
    }

    fn set_value_count(&mut self, count: usize) -> ColvecResult<()> {
        self.value_count = count;
        Ok(())
    }

    fn clear(&mut self) {
        self.value_count = 0;
    }

    fn is_null(&self, _index: usize) -> bool {
        true
    }

    fn set_null(&mut self, index: usize) -> ColvecResult<()> {
        self.value_count = self.value_count.max(index + 1);
        Ok(())
    }

    fn get_object(&self, _index: usize) -> ColvecResult<Value> {
        Ok(Value::Null)
    }
}

use std::sync::Arc;

use colvec_buffer::BufferAllocator;
use colvec_dtype::{
    DType, Field, FieldName, MAP_ENTRIES_NAME, MAP_KEY_NAME, MAP_VALUE_NAME, MinorType,
    Nullability,
};
use colvec_error::{ColvecResult, colvec_err};

use crate::vectors::{ListVector, StructVector};
use crate::{Value, ValueVector, Vector};

/// A list of `entries: struct<key, value>` rows.
#[derive(Debug)]
pub struct MapVector {
    list: ListVector,
    keys_sorted: bool,
}

impl MapVector {
    /// An empty map vector with untyped keys and values.
    pub fn new(
        name: impl Into<FieldName>,
        keys_sorted: bool,
        nullability: Nullability,
        allocator: Arc<dyn BufferAllocator>,
    ) -> Self {
        let mut entries =
            StructVector::new(MAP_ENTRIES_NAME, Nullability::NonNullable, allocator.clone());
        entries.push_untyped(MAP_KEY_NAME);
        entries.push_untyped(MAP_VALUE_NAME);
        Self::with_entries(name, keys_sorted, nullability, entries, allocator)
    }

    /// An empty map vector over the given entries struct.
    pub fn with_entries(
        name: impl Into<FieldName>,
        keys_sorted: bool,
        nullability: Nullability,
        entries: StructVector,
        allocator: Arc<dyn BufferAllocator>,
    ) -> Self {
        Self {
            list: ListVector::with_data(name, nullability, Vector::Struct(entries), allocator),
            keys_sorted,
        }
    }

    pub(crate) fn rename(&mut self, name: FieldName) {
        self.list.rename(name);
    }

    /// Whether the keys of every row are sorted.
    pub fn keys_sorted(&self) -> bool {
        self.keys_sorted
    }

    /// The map type of this vector.
    pub fn dtype(&self) -> DType {
        DType::Map {
            keys_sorted: self.keys_sorted,
        }
    }

    /// The entries as a classic list of structs.
    pub fn as_list(&self) -> &ListVector {
        &self.list
    }

    /// The entries as a classic list of structs, mutably.
    pub fn as_list_mut(&mut self) -> &mut ListVector {
        &mut self.list
    }

    /// The struct of keys and values.
    pub fn entries(&self) -> ColvecResult<&StructVector> {
        match self.list.data() {
            Vector::Struct(entries) => Ok(entries),
            other => Err(colvec_err!(MismatchedTypes: DType::Struct, other.dtype())),
        }
    }

    /// The struct of keys and values, mutably.
    pub fn entries_mut(&mut self) -> ColvecResult<&mut StructVector> {
        match self.list.data_mut() {
            Vector::Struct(entries) => Ok(entries),
            other => Err(colvec_err!(MismatchedTypes: DType::Struct, other.dtype())),
        }
    }
}

impl ValueVector for MapVector {
    fn name(&self) -> &FieldName {
        self.list.name()
    }

    fn field(&self) -> Field {
        let list = self.list.field();
        Field::new(list.name().clone(), self.dtype(), list.nullability())
            .with_children(list.children().iter().cloned())
    }

    fn minor_type(&self) -> MinorType {
        MinorType::Map
    }

    fn allocator(&self) -> &Arc<dyn BufferAllocator> {
        self.list.allocator()
    }

    fn allocate_with_capacity(&mut self, rows: usize) -> ColvecResult<()> {
        self.list.allocate_with_capacity(rows)
    }

    fn value_capacity(&self) -> usize {
        self.list.value_capacity()
    }

    fn value_count(&self) -> usize {
        self.list.value_count()
    }

    fn set_value_count(&mut self, count: usize) -> ColvecResult<()> {
        self.list.set_value_count(count)
    }

    fn clear(&mut self) {
        self.list.clear()
    }

    fn is_null(&self, index: usize) -> bool {
        self.list.is_null(index)
    }

    fn set_null(&mut self, index: usize) -> ColvecResult<()> {
        self.list.set_null(index)
    }

    fn get_object(&self, index: usize) -> ColvecResult<Value> {
        if self.is_null(index) {
            return Ok(Value::Null);
        }
        let entries = self.entries()?;
        let keys = entries.child(MAP_KEY_NAME);
        let values = entries.child(MAP_VALUE_NAME);
        self.list
            .element_range(index)?
            .map(|i| {
                let key = keys.map_or(Ok(Value::Null), |k| k.get_object(i))?;
                let value = values.map_or(Ok(Value::Null), |v| v.get_object(i))?;
                Ok((key, value))
            })
            .collect::<ColvecResult<Vec<_>>>()
            .map(Value::Map)
    }
}

#[cfg(test)]
mod tests {
    use colvec_buffer::RootAllocator;

    use super::*;

    #[test]
    fn layout() {
        let map = MapVector::new("m", true, Nullability::Nullable, Arc::new(RootAllocator::new()));
        assert_eq!(
            map.field().to_string(),
            "m: map[sorted]?<entries: struct<key: null?, value: null?>>"
        );
        map.field().validate().unwrap();
        assert_eq!(map.get_object(0).unwrap(), Value::Null);
    }
}

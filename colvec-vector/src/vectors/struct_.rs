use std::sync::Arc;

use colvec_buffer::BufferAllocator;
use colvec_dtype::{DType, Field, FieldName, MinorType, Nullability};
use colvec_error::ColvecResult;

use crate::validity::Validity;
use crate::vectors::{NullVector, check_nullable};
use crate::{Value, ValueVector, Vector};

/// An ordered set of named child vectors sharing the struct's row index.
#[derive(Debug)]
pub struct StructVector {
    name: FieldName,
    nullability: Nullability,
    validity: Validity,
    children: Vec<Vector>,
    value_count: usize,
    allocator: Arc<dyn BufferAllocator>,
}

impl StructVector {
    /// An empty struct vector without fields.
    pub fn new(
        name: impl Into<FieldName>,
        nullability: Nullability,
        allocator: Arc<dyn BufferAllocator>,
    ) -> Self {
        Self {
            name: name.into(),
            nullability,
            validity: Validity::new(allocator.clone()),
            children: Vec::new(),
            value_count: 0,
            allocator,
        }
    }

    pub(crate) fn rename(&mut self, name: FieldName) {
        self.name = name;
    }

    /// The child vectors, in field order.
    pub fn children(&self) -> &[Vector] {
        &self.children
    }

    /// The child vector called `name`.
    pub fn child(&self, name: &str) -> Option<&Vector> {
        self.children.iter().find(|c| c.name().as_ref() == name)
    }

    /// Append `child` as a new field, padded with nulls to the struct's row count.
    pub fn push_child(&mut self, mut child: Vector) -> ColvecResult<&mut Vector> {
        if child.value_count() < self.value_count {
            child.set_value_count(self.value_count)?;
        }
        let position = self.children.len();
        self.children.push(child);
        Ok(&mut self.children[position])
    }

    /// Append an untyped field, null in every existing row.
    pub(crate) fn push_untyped(&mut self, name: &str) -> &mut Vector {
        let child = NullVector::with_value_count(name, self.value_count, self.allocator.clone());
        let position = self.children.len();
        self.children.push(Vector::Null(child));
        &mut self.children[position]
    }

    /// The child vector called `name`, created as an untyped vector when it does not exist yet.
    pub fn child_slot_mut(&mut self, name: &str) -> &mut Vector {
        match self.children.iter().position(|c| c.name().as_ref() == name) {
            Some(position) => &mut self.children[position],
            None => self.push_untyped(name),
        }
    }

    /// The child vector called `name`, created with `dtype` when it does not exist yet.
    pub fn typed_child_slot_mut(&mut self, name: &str, dtype: &DType) -> ColvecResult<&mut Vector> {
        match self.children.iter().position(|c| c.name().as_ref() == name) {
            Some(position) => Ok(&mut self.children[position]),
            None => {
                let child = Vector::try_new(name, dtype, self.allocator.clone())?;
                self.push_child(child)
            }
        }
    }

    /// Mark row `index` as holding a struct value.
    pub fn set_valid(&mut self, index: usize) -> ColvecResult<()> {
        self.validity.set_valid(index)?;
        self.value_count = self.value_count.max(index + 1);
        Ok(())
    }
}

impl ValueVector for StructVector {
    fn name(&self) -> &FieldName {
        &self.name
    }

    fn field(&self) -> Field {
        Field::new(self.name.clone(), DType::Struct, self.nullability)
            .with_children(self.children.iter().map(Vector::field))
    }

    fn minor_type(&self) -> MinorType {
        MinorType::Struct
    }

    fn allocator(&self) -> &Arc<dyn BufferAllocator> {
        &self.allocator
    }

    fn allocate_with_capacity(&mut self, rows: usize) -> ColvecResult<()> {
        self.validity.allocate(rows)?;
        for child in self.children.iter_mut() {
            child.allocate_with_capacity(rows)?;
        }
        self.value_count = 0;
        Ok(())
    }

    fn value_capacity(&self) -> usize {
        self.children
            .iter()
            .map(Vector::value_capacity)
            .fold(self.validity.capacity(), usize::min)
    }

    fn value_count(&self) -> usize {
        self.value_count
    }

    fn set_value_count(&mut self, count: usize) -> ColvecResult<()> {
        if count < self.value_count {
            self.validity.truncate(count)?;
        }
        for child in self.children.iter_mut() {
            child.set_value_count(count)?;
        }
        self.value_count = count;
        Ok(())
    }

    fn clear(&mut self) {
        self.validity.release();
        self.children.iter_mut().for_each(Vector::clear);
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
        if self.is_null(index) {
            return Ok(Value::Null);
        }
        self.children
            .iter()
            .map(|child| {
                child
                    .get_object(index)
                    .map(|value| (child.name().clone(), value))
            })
            .collect::<ColvecResult<Vec<_>>>()
            .map(Value::Struct)
    }
}

#[cfg(test)]
mod tests {
    use colvec_buffer::RootAllocator;
    use colvec_dtype::PType;

    use super::*;

    #[test]
    fn late_children_are_padded() {
        let allocator = Arc::new(RootAllocator::new());
        let mut vector = StructVector::new("s", Nullability::Nullable, allocator);
        vector.set_valid(0).unwrap();
        vector.set_valid(1).unwrap();
        vector
            .typed_child_slot_mut("a", &PType::I64.into())
            .unwrap()
            .set_value(1, &Value::I64(4))
            .unwrap();
        let b = vector.child_slot_mut("b");
        assert_eq!(b.value_count(), 2);
        assert_eq!(
            vector.get_object(1).unwrap(),
            Value::Struct(vec![("a".into(), Value::I64(4)), ("b".into(), Value::Null)])
        );
        assert_eq!(vector.field().to_string(), "s: struct?<a: i64?, b: null?>");
    }
}

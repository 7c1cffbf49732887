use colvec_dtype::{DType, Field};
use colvec_error::ColvecResult;

use crate::vectors::StructVector;
use crate::writer::{PromotableWriter, WriterOptions};
use crate::ValueVector;

/// Writes rows of a struct vector, one named field at a time.
#[derive(Debug)]
pub struct StructWriter<'a> {
    vector: &'a mut StructVector,
    position: usize,
    options: WriterOptions,
}

impl<'a> StructWriter<'a> {
    /// A writer at row `position` of `vector`.
    pub fn new(vector: &'a mut StructVector, position: usize, options: WriterOptions) -> Self {
        Self {
            vector,
            position,
            options,
        }
    }

    /// The row the writer is at.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Move to row `index`.
    pub fn set_position(&mut self, index: usize) {
        self.position = index;
    }

    /// Mark the current row as holding a struct value.
    pub fn start(&mut self) -> ColvecResult<()> {
        self.vector.set_valid(self.position)
    }

    /// Finish the current row and move to the next one.
    pub fn end(&mut self) {
        self.position += 1;
    }

    /// A writer for field `name` of the current row. Unknown fields are added untyped.
    pub fn field(&mut self, name: &str) -> PromotableWriter<'_> {
        PromotableWriter::with_position(
            self.vector.child_slot_mut(name),
            self.position,
            self.options,
        )
    }

    /// A writer for field `name` of the current row, added with `dtype` when it is unknown.
    pub fn typed_field(&mut self, name: &str, dtype: &DType) -> ColvecResult<PromotableWriter<'_>> {
        Ok(PromotableWriter::with_position(
            self.vector.typed_child_slot_mut(name, dtype)?,
            self.position,
            self.options,
        ))
    }

    /// Turn this writer into a writer for field `name` of the current row.
    pub fn into_field(self, name: &str) -> PromotableWriter<'a> {
        PromotableWriter::with_position(
            self.vector.child_slot_mut(name),
            self.position,
            self.options,
        )
    }

    /// The descriptor of the struct vector.
    pub fn struct_field(&self) -> Field {
        self.vector.field()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use colvec_buffer::RootAllocator;
    use colvec_dtype::{Nullability, PType};

    use super::*;
    use crate::Value;

    #[test]
    fn writes_fields_per_row() {
        let mut vector =
            StructVector::new("s", Nullability::Nullable, Arc::new(RootAllocator::new()));
        let mut writer = StructWriter::new(&mut vector, 0, WriterOptions::default());
        writer.start().unwrap();
        writer.field("a").write_int(1).unwrap();
        writer.end();
        writer.end();
        writer.start().unwrap();
        writer
            .typed_field("b", &PType::I64.into())
            .unwrap()
            .write_big_int(2)
            .unwrap();
        writer.field("a").write_int(3).unwrap();
        writer.end();
        assert_eq!(
            writer.struct_field().to_string(),
            "s: struct?<a: i32?, b: i64?>"
        );

        assert_eq!(vector.value_count(), 3);
        assert!(vector.is_null(1));
        assert_eq!(
            vector.get_object(2).unwrap(),
            Value::Struct(vec![("a".into(), Value::I32(3)), ("b".into(), Value::I64(2))])
        );
        assert_eq!(
            vector.get_object(0).unwrap(),
            Value::Struct(vec![("a".into(), Value::I32(1)), ("b".into(), Value::Null)])
        );
    }
}

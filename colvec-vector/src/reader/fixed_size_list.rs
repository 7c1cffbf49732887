use colvec_dtype::{Field, MinorType};
use colvec_error::ColvecResult;

use crate::reader::cursor::ElementCursor;
use crate::reader::{FieldReader, UnionHolder};
use crate::vectors::FixedSizeListVector;
use crate::{Value, ValueVector};

/// A cursor over the rows of a fixed-size list vector. Row `i` spans `[i * n, (i + 1) * n)`.
#[derive(Debug, Clone, Copy)]
pub struct FixedSizeListReader<'a> {
    vector: &'a FixedSizeListVector,
    elements: ElementCursor<'a>,
    position: usize,
}

impl<'a> FixedSizeListReader<'a> {
    /// A reader positioned at row `index` of `vector`.
    pub fn new(vector: &'a FixedSizeListVector, index: usize) -> Self {
        let mut reader = Self {
            vector,
            elements: ElementCursor::new(vector.data()),
            position: index,
        };
        reader.set_position(index);
        reader
    }

    /// Load row `index`. Null rows have no elements.
    pub fn set_position(&mut self, index: usize) {
        self.position = index;
        if self.vector.is_null(index) {
            self.elements.reset(0..0);
        } else {
            self.elements.reset(self.vector.element_range(index));
        }
    }

    /// The row the reader is at.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Advance the element reader; `false` once the row is exhausted.
    pub fn next(&mut self) -> bool {
        self.elements.next()
    }

    /// Position the element reader at element `index` of the row, replaying from its start.
    pub fn read(&mut self, index: usize, holder: &mut UnionHolder<'a>) -> ColvecResult<()> {
        self.elements.read(index, holder)
    }

    /// The number of elements of the row: the list size, or zero for a null row.
    pub fn size(&self) -> usize {
        self.elements.size()
    }

    /// Whether the row is non-null.
    pub fn is_set(&self) -> bool {
        !self.vector.is_null(self.position)
    }

    /// The element reader.
    pub fn reader(&self) -> FieldReader<'a> {
        self.elements.data()
    }

    /// Materialise the row.
    pub fn read_object(&self) -> ColvecResult<Value> {
        self.vector.get_object(self.position)
    }

    /// The type of the vector being read.
    pub fn minor_type(&self) -> MinorType {
        self.vector.minor_type()
    }

    /// The descriptor of the vector being read.
    pub fn field(&self) -> Field {
        self.vector.field()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use colvec_buffer::RootAllocator;
    use colvec_dtype::DType;

    use super::*;
    use crate::Vector;

    #[test]
    fn rows_have_a_fixed_stride() {
        let mut vector = Vector::try_new(
            "f",
            &DType::FixedSizeList(2),
            Arc::new(RootAllocator::new()),
        )
        .unwrap();
        let mut writer = vector.writer().into_fixed_size_list(2).unwrap();
        writer.start_list().unwrap();
        writer.write_big_int(4).unwrap();
        writer.end_list().unwrap();
        writer.set_position(2);
        writer.start_list().unwrap();
        writer.write_null().unwrap();
        writer.write_big_int(6).unwrap();
        writer.end_list().unwrap();

        let mut reader = vector.reader().fixed_size_list().unwrap();
        assert_eq!(reader.size(), 2);
        assert!(reader.next());
        assert_eq!(reader.reader().read_big_int().unwrap(), Some(4));
        assert!(reader.next());
        assert_eq!(reader.reader().read_big_int().unwrap(), None);
        assert!(!reader.next());

        reader.set_position(1);
        assert!(!reader.is_set());
        assert_eq!(reader.size(), 0);
        assert_eq!(reader.read_object().unwrap(), Value::Null);

        reader.set_position(2);
        let mut holder = UnionHolder::default();
        reader.read(1, &mut holder).unwrap();
        assert!(holder.is_set);
        assert_eq!(holder.reader.unwrap().position(), 5);
        reader.read(0, &mut holder).unwrap();
        assert!(!holder.is_set);
        assert_eq!(
            reader.read_object().unwrap(),
            Value::List(vec![Value::Null, Value::I64(6)])
        );
    }
}

use colvec_dtype::{Field, MinorType};
use colvec_error::ColvecResult;

use crate::reader::cursor::ElementCursor;
use crate::reader::{FieldReader, UnionHolder};
use crate::vectors::offsets::OffsetType;
use crate::vectors::GenericListVector;
use crate::{Value, ValueVector};

/// Reads rows of a list vector with 32-bit offsets.
pub type ListReader<'a> = GenericListReader<'a, i32>;
/// Reads rows of a list vector with 64-bit offsets.
pub type LargeListReader<'a> = GenericListReader<'a, i64>;

/// A cursor over the rows of a classic list vector, where row `i` spans
/// `[offset[i], offset[i + 1])`.
#[derive(Debug, Clone, Copy)]
pub struct GenericListReader<'a, O> {
    vector: &'a GenericListVector<O>,
    elements: ElementCursor<'a>,
    position: usize,
}

impl<'a, O: OffsetType> GenericListReader<'a, O> {
    /// A reader positioned at row `index` of `vector`.
    pub fn try_new(vector: &'a GenericListVector<O>, index: usize) -> ColvecResult<Self> {
        let mut reader = Self {
            vector,
            elements: ElementCursor::new(vector.data()),
            position: index,
        };
        reader.set_position(index)?;
        Ok(reader)
    }

    /// Load row `index`.
    pub fn set_position(&mut self, index: usize) -> ColvecResult<()> {
        self.position = index;
        self.elements.reset(self.vector.element_range(index)?);
        Ok(())
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

    /// The number of elements of the row.
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

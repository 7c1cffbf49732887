use colvec_dtype::{Field, MinorType};
use colvec_error::{ColvecResult, colvec_bail};

use crate::reader::cursor::ElementCursor;
use crate::reader::{FieldReader, NegativeSizePolicy, ReaderOptions, UnionHolder};
use crate::vectors::GenericListViewVector;
use crate::vectors::offsets::{OffsetType, offset_to_index};
use crate::{Value, ValueVector};

/// Reads rows of a list-view vector with 32-bit offsets.
pub type ListViewReader<'a> = GenericListViewReader<'a, i32>;
/// Reads rows of a list-view vector with 64-bit offsets.
pub type LargeListViewReader<'a> = GenericListViewReader<'a, i64>;

/// A cursor over the rows of a list-view vector.
///
/// Each row is loaded from its own offset and size, so rows may be read in any order and their
/// element ranges may overlap.
#[derive(Debug, Clone, Copy)]
pub struct GenericListViewReader<'a, O> {
    vector: &'a GenericListViewVector<O>,
    elements: ElementCursor<'a>,
    position: usize,
    options: ReaderOptions,
}

impl<'a, O: OffsetType> GenericListViewReader<'a, O> {
    /// A reader positioned at row `index` of `vector`.
    pub fn try_new(
        vector: &'a GenericListViewVector<O>,
        index: usize,
        options: ReaderOptions,
    ) -> ColvecResult<Self> {
        let mut reader = Self {
            vector,
            elements: ElementCursor::new(vector.data()),
            position: index,
            options,
        };
        reader.set_position(index)?;
        Ok(reader)
    }

    /// Load row `index`. Fails with `OutOfBounds` when the row reaches past the element vector.
    pub fn set_position(&mut self, index: usize) -> ColvecResult<()> {
        self.position = index;
        if self.vector.offset_capacity() == 0 {
            self.elements.reset(0..0);
            return Ok(());
        }
        let start = offset_to_index(self.vector.offset(index)?)?;
        let size = self.vector.size(index)?;
        let size: usize = if size < O::zero() {
            match self.options.negative_sizes {
                NegativeSizePolicy::Reject => colvec_bail!(
                    CorruptEncoding: "list-view {} row {} has negative size {}",
                    self.vector.name(),
                    index,
                    size
                ),
                NegativeSizePolicy::Clamp => {
                    log::warn!(
                        "list-view {} row {} has negative size {}, reading it as empty",
                        self.vector.name(),
                        index,
                        size
                    );
                    0
                }
            }
        } else {
            size.as_()
        };
        let end = start + size;
        let element_count = self.vector.data().value_count();
        if end > element_count {
            colvec_bail!(OutOfBounds: end, 0, element_count);
        }
        self.elements.reset(start..end);
        Ok(())
    }

    /// The row the reader is at.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Position the element reader at the next element of the row, or return `false` once the
    /// row is exhausted.
    pub fn next(&mut self) -> bool {
        self.elements.next()
    }

    /// Position the element reader at element `index` of the row and hand it to `holder`.
    ///
    /// The row is replayed from its first element, so this takes O(index) steps.
    pub fn read(&mut self, index: usize, holder: &mut UnionHolder<'a>) -> ColvecResult<()> {
        self.elements.read(index, holder)
    }

    /// The number of elements of the row.
    pub fn size(&self) -> usize {
        self.elements.size()
    }

    /// Whether the row is non-null. An empty row is still set.
    pub fn is_set(&self) -> bool {
        !self.vector.is_null(self.position)
    }

    /// The element reader.
    pub fn reader(&self) -> FieldReader<'a> {
        self.elements.data()
    }

    /// Materialise the row.
    pub fn read_object(&self) -> ColvecResult<Value> {
        if !self.is_set() {
            return Ok(Value::Null);
        }
        let data = self.vector.data();
        self.elements
            .range()
            .map(|i| data.get_object(i))
            .collect::<ColvecResult<Vec<_>>>()
            .map(Value::List)
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

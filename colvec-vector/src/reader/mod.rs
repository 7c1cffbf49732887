//! Cursor readers.
//!
//! Readers borrow their vector immutably and are `Copy`, so any number of them can traverse a
//! vector at once.

mod cursor;
mod fixed_size_list;
mod list;
mod list_view;

use colvec_dtype::{Field, MinorType};
use colvec_error::{ColvecResult, colvec_bail, colvec_err};
pub use fixed_size_list::*;
pub use list::*;
pub use list_view::*;

use crate::{Value, ValueVector, Vector};

/// How list-view readers treat a negative size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NegativeSizePolicy {
    /// Read the row as empty and log a warning.
    #[default]
    Clamp,
    /// Fail with `CorruptEncoding`.
    Reject,
}

/// Options of the list readers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderOptions {
    /// What to do with a row whose size is negative.
    pub negative_sizes: NegativeSizePolicy,
}

/// Receives the element reader of a random-access list read.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnionHolder<'a> {
    /// The element reader, positioned at the requested element.
    pub reader: Option<FieldReader<'a>>,
    /// Whether the requested element is non-null.
    pub is_set: bool,
}

/// A cursor over the rows of any vector.
#[derive(Debug, Clone, Copy)]
pub struct FieldReader<'a> {
    vector: &'a Vector,
    position: usize,
}

impl<'a> FieldReader<'a> {
    /// A reader at row zero of `vector`.
    pub fn new(vector: &'a Vector) -> Self {
        Self {
            vector,
            position: 0,
        }
    }

    /// The vector being read.
    pub fn vector(&self) -> &'a Vector {
        self.vector
    }

    /// Move to row `index`.
    pub fn set_position(&mut self, index: usize) {
        self.position = index;
    }

    /// The row the reader is at.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Whether the current row is non-null.
    pub fn is_set(&self) -> bool {
        !self.vector.is_null(self.position)
    }

    /// Materialise the current row.
    pub fn read_object(&self) -> ColvecResult<Value> {
        self.vector.get_object(self.position)
    }

    /// The type of the current row. For unions this is the type of the row's variant.
    pub fn minor_type(&self) -> ColvecResult<MinorType> {
        match self.vector {
            Vector::Union(union) => union.type_id(self.position),
            vector => Ok(vector.minor_type()),
        }
    }

    /// The union type id of the current row.
    pub fn union_type_id(&self) -> ColvecResult<MinorType> {
        match self.vector {
            Vector::Union(union) => union.type_id(self.position),
            vector => colvec_bail!(
                UnsupportedOperation: "{} vector {} is not a union",
                vector.dtype(),
                vector.name()
            ),
        }
    }

    /// The number of elements of the current list-like row.
    pub fn size(&self) -> ColvecResult<usize> {
        if self.vector.is_null(self.position) {
            return Ok(0);
        }
        match self.vector {
            Vector::List(v) => v.element_range(self.position).map(|r| r.len()),
            Vector::LargeList(v) => v.element_range(self.position).map(|r| r.len()),
            Vector::ListView(v) => v.element_range(self.position).map(|r| r.len()),
            Vector::LargeListView(v) => v.element_range(self.position).map(|r| r.len()),
            Vector::FixedSizeList(v) => Ok(v.list_size()),
            Vector::Map(v) => v.as_list().element_range(self.position).map(|r| r.len()),
            vector => colvec_bail!(
                UnsupportedOperation: "{} vectors have no list rows",
                vector.dtype()
            ),
        }
    }

    /// The descriptor of the vector being read.
    pub fn field(&self) -> Field {
        self.vector.field()
    }

    impl_scalar_reads!();

    /// A list reader at the current row of a classic list vector.
    pub fn list(&self) -> ColvecResult<ListReader<'a>> {
        match self.vector {
            Vector::List(v) => ListReader::try_new(v, self.position),
            vector => colvec_bail!(UnsupportedOperation: "{} is not a list", vector.dtype()),
        }
    }

    /// A list reader at the current row of a large list vector.
    pub fn large_list(&self) -> ColvecResult<LargeListReader<'a>> {
        match self.vector {
            Vector::LargeList(v) => LargeListReader::try_new(v, self.position),
            vector => colvec_bail!(UnsupportedOperation: "{} is not a large list", vector.dtype()),
        }
    }

    /// A list-view reader at the current row of a list-view vector.
    pub fn list_view(&self, options: ReaderOptions) -> ColvecResult<ListViewReader<'a>> {
        match self.vector {
            Vector::ListView(v) => ListViewReader::try_new(v, self.position, options),
            vector => colvec_bail!(UnsupportedOperation: "{} is not a list-view", vector.dtype()),
        }
    }

    /// A list-view reader at the current row of a large list-view vector.
    pub fn large_list_view(&self, options: ReaderOptions) -> ColvecResult<LargeListViewReader<'a>> {
        match self.vector {
            Vector::LargeListView(v) => LargeListViewReader::try_new(v, self.position, options),
            vector => colvec_bail!(
                UnsupportedOperation: "{} is not a large list-view",
                vector.dtype()
            ),
        }
    }

    /// A fixed-size list reader at the current row of a fixed-size list vector.
    pub fn fixed_size_list(&self) -> ColvecResult<FixedSizeListReader<'a>> {
        match self.vector {
            Vector::FixedSizeList(v) => Ok(FixedSizeListReader::new(v, self.position)),
            vector => colvec_bail!(
                UnsupportedOperation: "{} is not a fixed-size list",
                vector.dtype()
            ),
        }
    }

    /// A reader of field `name` at the current row of a struct vector.
    pub fn child(&self, name: &str) -> ColvecResult<FieldReader<'a>> {
        let Vector::Struct(vector) = self.vector else {
            colvec_bail!(
                UnsupportedOperation: "{} vectors have no named children",
                self.vector.dtype()
            );
        };
        let child = vector.child(name).ok_or_else(|| {
            colvec_err!("struct {} has no field {}", vector.name(), name)
        })?;
        let mut reader = Self::new(child);
        reader.set_position(self.position);
        Ok(reader)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use colvec_buffer::RootAllocator;
    use colvec_dtype::{DType, PType};
    use colvec_error::ColvecError;

    use super::*;

    fn allocator() -> Arc<RootAllocator> {
        Arc::new(RootAllocator::new())
    }

    #[test]
    fn typed_reads() {
        let mut vector = Vector::try_new("v", &PType::I16.into(), allocator()).unwrap();
        vector.set_value(1, &Value::I16(-4)).unwrap();
        let mut reader = vector.reader();
        assert!(!reader.is_set());
        assert_eq!(reader.read_small_int().unwrap(), None);
        reader.set_position(1);
        assert!(reader.is_set());
        assert_eq!(reader.read_small_int().unwrap(), Some(-4));
        assert!(matches!(
            reader.read_int(),
            Err(ColvecError::MismatchedTypes(..))
        ));
        assert!(matches!(
            reader.union_type_id(),
            Err(ColvecError::UnsupportedOperation(..))
        ));
        assert!(reader.size().is_err());
    }

    #[test]
    fn union_rows_report_their_type() {
        let mut vector = Vector::untyped("u", allocator());
        let mut writer = vector.writer();
        writer.write_var_char("a").unwrap();
        writer.set_position(1);
        writer.write_float4(1.5).unwrap();
        writer.set_position(2);
        writer.write_null().unwrap();

        let mut reader = vector.reader();
        assert_eq!(reader.minor_type().unwrap(), MinorType::VarChar);
        assert_eq!(reader.read_var_char().unwrap(), Some("a".to_string()));
        reader.set_position(1);
        assert_eq!(reader.union_type_id().unwrap(), MinorType::Float4);
        assert_eq!(reader.read_float4().unwrap(), Some(1.5));
        reader.set_position(2);
        assert_eq!(reader.minor_type().unwrap(), MinorType::Null);
        assert!(!reader.is_set());
        assert_eq!(reader.field().dtype(), &DType::Union);
    }

    #[test]
    fn struct_children() {
        let mut vector = Vector::untyped("s", allocator());
        vector
            .writer()
            .write_value(&Value::Struct(vec![("a".into(), Value::Bool(true))]))
            .unwrap();
        let reader = vector.reader();
        assert_eq!(reader.child("a").unwrap().read_bit().unwrap(), Some(true));
        assert!(reader.child("b").is_err());
    }
}

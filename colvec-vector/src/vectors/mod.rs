//! The concrete vectors and the [`Vector`] enum over them.

use std::fmt::Debug;
use std::sync::Arc;

use colvec_buffer::BufferAllocator;
use colvec_dtype::{DType, Field, FieldName, MinorType, Nullability};
use colvec_error::{ColvecResult, colvec_bail, colvec_err};

pub use bit::*;
pub use fixed_size_list::*;
pub use fixed_width::*;
pub use list::*;
pub use list_view::*;
pub use map::*;
pub use null::*;
pub use offsets::OffsetType;
pub use struct_::*;
pub use union::*;
pub use variable_width::*;

use crate::Value;
use crate::reader::FieldReader;

mod bit;
mod fixed_size_list;
mod fixed_width;
mod list;
mod list_view;
mod map;
mod null;
pub(crate) mod offsets;
mod struct_;
mod union;
mod variable_width;

/// The number of rows [`ValueVector::allocate`] reserves room for.
pub const DEFAULT_VALUE_CAPACITY: usize = 3970;

/// The operations every vector supports.
pub trait ValueVector: Debug + Send {
    /// The field name of this vector.
    fn name(&self) -> &FieldName;

    /// A descriptor of this vector and all of its children.
    fn field(&self) -> Field;

    /// The type tag of this vector, as used by unions.
    fn minor_type(&self) -> MinorType;

    /// The allocator all buffers of this vector come from.
    fn allocator(&self) -> &Arc<dyn BufferAllocator>;

    /// Reset the vector and reserve room for [`DEFAULT_VALUE_CAPACITY`] rows.
    fn allocate(&mut self) -> ColvecResult<()> {
        self.allocate_with_capacity(DEFAULT_VALUE_CAPACITY)
    }

    /// Reset the vector and reserve room for `rows` rows.
    fn allocate_with_capacity(&mut self, rows: usize) -> ColvecResult<()>;

    /// The number of rows that can be stored without growing a buffer.
    fn value_capacity(&self) -> usize;

    /// The number of visible rows.
    fn value_count(&self) -> usize;

    /// Fix the number of visible rows. Growing pads with nulls, shrinking hides the trailing
    /// rows without releasing memory.
    fn set_value_count(&mut self, count: usize) -> ColvecResult<()>;

    /// Release every buffer, here and in all children. Calling it again does nothing.
    fn clear(&mut self);

    /// Release the vector's memory. Equivalent to [`ValueVector::clear`].
    fn close(&mut self) {
        self.clear()
    }

    /// Whether row `index` is null. Rows at or beyond the value count are null.
    fn is_null(&self, index: usize) -> bool;

    /// Mark row `index` as null.
    fn set_null(&mut self, index: usize) -> ColvecResult<()>;

    /// Materialise row `index`.
    fn get_object(&self, index: usize) -> ColvecResult<Value>;
}

pub(crate) fn check_nullable(name: &FieldName, nullability: Nullability) -> ColvecResult<()> {
    if !nullability.is_nullable() {
        colvec_bail!("vector {} is not nullable", name);
    }
    Ok(())
}

/// Any vector.
#[derive(Debug)]
pub enum Vector {
    /// A vector that has not seen a typed value yet
    Null(NullVector),
    /// Booleans
    Bit(BitVector),
    /// Fixed-width scalars
    FixedWidth(FixedWidthVector),
    /// Strings or binary with 32-bit offsets
    VarWidth(VariableWidthVector<i32>),
    /// Strings or binary with 64-bit offsets
    LargeVarWidth(VariableWidthVector<i64>),
    /// Classic list
    List(ListVector),
    /// Classic list with 64-bit offsets
    LargeList(LargeListVector),
    /// List-view
    ListView(ListViewVector),
    /// List-view with 64-bit offsets and sizes
    LargeListView(LargeListViewVector),
    /// Fixed-size list
    FixedSizeList(FixedSizeListVector),
    /// Struct
    Struct(StructVector),
    /// Map
    Map(MapVector),
    /// Sparse union
    Union(UnionVector),
}

/// Run `$body` with `$v` bound to the concrete vector inside a [`Vector`].
#[macro_export]
macro_rules! match_each_vector {
    ($self:expr, | $v:ident | $body:block) => {{
        match $self {
            $crate::Vector::Null($v) => $body,
            $crate::Vector::Bit($v) => $body,
            $crate::Vector::FixedWidth($v) => $body,
            $crate::Vector::VarWidth($v) => $body,
            $crate::Vector::LargeVarWidth($v) => $body,
            $crate::Vector::List($v) => $body,
            $crate::Vector::LargeList($v) => $body,
            $crate::Vector::ListView($v) => $body,
            $crate::Vector::LargeListView($v) => $body,
            $crate::Vector::FixedSizeList($v) => $body,
            $crate::Vector::Struct($v) => $body,
            $crate::Vector::Map($v) => $body,
            $crate::Vector::Union($v) => $body,
        }
    }};
}

impl ValueVector for Vector {
    fn name(&self) -> &FieldName {
        match_each_vector!(self, |v| { v.name() })
    }

    fn field(&self) -> Field {
        match_each_vector!(self, |v| { v.field() })
    }

    fn minor_type(&self) -> MinorType {
        match_each_vector!(self, |v| { v.minor_type() })
    }

    fn allocator(&self) -> &Arc<dyn BufferAllocator> {
        match_each_vector!(self, |v| { v.allocator() })
    }

    fn allocate(&mut self) -> ColvecResult<()> {
        match_each_vector!(self, |v| { v.allocate() })
    }

    fn allocate_with_capacity(&mut self, rows: usize) -> ColvecResult<()> {
        match_each_vector!(self, |v| { v.allocate_with_capacity(rows) })
    }

    fn value_capacity(&self) -> usize {
        match_each_vector!(self, |v| { v.value_capacity() })
    }

    fn value_count(&self) -> usize {
        match_each_vector!(self, |v| { v.value_count() })
    }

    fn set_value_count(&mut self, count: usize) -> ColvecResult<()> {
        match_each_vector!(self, |v| { v.set_value_count(count) })
    }

    fn clear(&mut self) {
        match_each_vector!(self, |v| { v.clear() })
    }

    fn close(&mut self) {
        match_each_vector!(self, |v| { v.close() })
    }

    fn is_null(&self, index: usize) -> bool {
        match_each_vector!(self, |v| { v.is_null(index) })
    }

    fn set_null(&mut self, index: usize) -> ColvecResult<()> {
        match_each_vector!(self, |v| { v.set_null(index) })
    }

    fn get_object(&self, index: usize) -> ColvecResult<Value> {
        match_each_vector!(self, |v| { v.get_object(index) })
    }
}

impl Vector {
    /// An empty vector that has not seen a typed value yet.
    pub fn untyped(name: impl Into<FieldName>, allocator: Arc<dyn BufferAllocator>) -> Self {
        Self::Null(NullVector::new(name, allocator))
    }

    /// An empty nullable vector of `dtype`. Nested element vectors start untyped.
    pub fn try_new(
        name: impl Into<FieldName>,
        dtype: &DType,
        allocator: Arc<dyn BufferAllocator>,
    ) -> ColvecResult<Self> {
        let name = name.into();
        let nullable = Nullability::Nullable;
        Ok(match dtype {
            DType::Null => Self::untyped(name, allocator),
            DType::Bool => Self::Bit(BitVector::new(name, nullable, allocator)),
            DType::Primitive(_)
            | DType::Decimal(_)
            | DType::Decimal256(_)
            | DType::Timestamp(..)
            | DType::Duration(_)
            | DType::FixedSizeBinary(_) => Self::FixedWidth(FixedWidthVector::try_new(
                name,
                dtype.clone(),
                nullable,
                allocator,
            )?),
            DType::Utf8 | DType::Binary => Self::VarWidth(VariableWidthVector::try_new(
                name,
                dtype.clone(),
                nullable,
                allocator,
            )?),
            DType::LargeUtf8 | DType::LargeBinary => Self::LargeVarWidth(
                VariableWidthVector::try_new(name, dtype.clone(), nullable, allocator)?,
            ),
            DType::List => Self::List(ListVector::new(name, nullable, allocator)),
            DType::LargeList => Self::LargeList(LargeListVector::new(name, nullable, allocator)),
            DType::ListView => Self::ListView(ListViewVector::new(name, nullable, allocator)),
            DType::LargeListView => {
                Self::LargeListView(LargeListViewVector::new(name, nullable, allocator))
            }
            DType::FixedSizeList(list_size) => Self::FixedSizeList(FixedSizeListVector::try_new(
                name, *list_size, nullable, allocator,
            )?),
            DType::Struct => Self::Struct(StructVector::new(name, nullable, allocator)),
            DType::Map { keys_sorted } => {
                Self::Map(MapVector::new(name, *keys_sorted, nullable, allocator))
            }
            DType::Union => Self::Union(UnionVector::new(name, allocator)),
        })
    }

    /// Build an empty vector tree matching `field` and all of its children.
    pub fn from_field(field: &Field, allocator: Arc<dyn BufferAllocator>) -> ColvecResult<Self> {
        field.validate()?;
        let name = field.name().clone();
        let nullability = field.nullability();
        let element = || -> ColvecResult<Vector> {
            let child = field
                .children()
                .first()
                .ok_or_else(|| colvec_err!("{} has no element field", field))?;
            Self::from_field(child, allocator.clone())
        };
        Ok(match field.dtype() {
            DType::Bool => Self::Bit(BitVector::new(name, nullability, allocator)),
            DType::Primitive(_)
            | DType::Decimal(_)
            | DType::Decimal256(_)
            | DType::Timestamp(..)
            | DType::Duration(_)
            | DType::FixedSizeBinary(_) => Self::FixedWidth(FixedWidthVector::try_new(
                name,
                field.dtype().clone(),
                nullability,
                allocator,
            )?),
            DType::Utf8 | DType::Binary => Self::VarWidth(VariableWidthVector::try_new(
                name,
                field.dtype().clone(),
                nullability,
                allocator,
            )?),
            DType::LargeUtf8 | DType::LargeBinary => {
                Self::LargeVarWidth(VariableWidthVector::try_new(
                    name,
                    field.dtype().clone(),
                    nullability,
                    allocator,
                )?)
            }
            DType::List => Self::List(ListVector::with_data(
                name,
                nullability,
                element()?,
                allocator,
            )),
            DType::LargeList => Self::LargeList(LargeListVector::with_data(
                name,
                nullability,
                element()?,
                allocator,
            )),
            DType::ListView => Self::ListView(ListViewVector::with_data(
                name,
                nullability,
                element()?,
                allocator,
            )),
            DType::LargeListView => Self::LargeListView(LargeListViewVector::with_data(
                name,
                nullability,
                element()?,
                allocator,
            )),
            DType::FixedSizeList(list_size) => {
                Self::FixedSizeList(FixedSizeListVector::try_with_data(
                    name,
                    *list_size,
                    nullability,
                    element()?,
                    allocator,
                )?)
            }
            DType::Struct => {
                let mut vector = StructVector::new(name, nullability, allocator.clone());
                for child in field.children().iter() {
                    vector.push_child(Self::from_field(child, allocator.clone())?)?;
                }
                Self::Struct(vector)
            }
            DType::Map { keys_sorted } => match element()? {
                Self::Struct(entries) => Self::Map(MapVector::with_entries(
                    name,
                    *keys_sorted,
                    nullability,
                    entries,
                    allocator,
                )),
                other => colvec_bail!(MismatchedTypes: DType::Struct, other.dtype()),
            },
            DType::Union => {
                let mut vector = UnionVector::new(name, allocator.clone());
                for child in field.children().iter() {
                    vector.push_variant(Self::from_field(child, allocator.clone())?)?;
                }
                Self::Union(vector)
            }
            DType::Null => Self::untyped(name, allocator),
        })
    }

    /// The logical type of this vector.
    pub fn dtype(&self) -> DType {
        match self {
            Self::Null(_) => DType::Null,
            Self::Bit(_) => DType::Bool,
            Self::FixedWidth(v) => v.dtype().clone(),
            Self::VarWidth(v) => v.dtype().clone(),
            Self::LargeVarWidth(v) => v.dtype().clone(),
            Self::List(v) => v.dtype(),
            Self::LargeList(v) => v.dtype(),
            Self::ListView(v) => v.dtype(),
            Self::LargeListView(v) => v.dtype(),
            Self::FixedSizeList(v) => DType::FixedSizeList(v.list_size()),
            Self::Struct(_) => DType::Struct,
            Self::Map(v) => v.dtype(),
            Self::Union(_) => DType::Union,
        }
    }

    /// Whether values of `dtype` can be stored here without promotion.
    pub fn accepts(&self, dtype: &DType) -> bool {
        self.dtype() == *dtype
    }

    /// Store a scalar value at row `index`. Nested values go through the writers.
    pub fn set_value(&mut self, index: usize, value: &Value) -> ColvecResult<()> {
        match (self, value) {
            (this, Value::Null) => this.set_null(index),
            (Self::Bit(v), Value::Bool(b)) => v.set(index, *b),
            (_, Value::List(_) | Value::Struct(_) | Value::Map(_)) => colvec_bail!(
                UnsupportedOperation: "nested values are written through a writer"
            ),
            (Self::FixedWidth(v), value) => v.set_value(index, value),
            (Self::VarWidth(v), value) => v.set_value(index, value),
            (Self::LargeVarWidth(v), value) => v.set_value(index, value),
            (Self::Union(v), value) => {
                let dtype = value.dtype();
                v.variant_mut(&dtype)?.set_value(index, value)?;
                v.set_type_id(index, dtype.minor_type())
            }
            (this, value) => Err(colvec_err!(MismatchedTypes: this.dtype(), value.dtype())),
        }
    }

    pub(crate) fn rename(&mut self, name: FieldName) {
        match_each_vector!(self, |v| { v.rename(name) })
    }

    /// Open row `index` of a classic or fixed-size list and return its first child slot.
    pub fn start_new_value(&mut self, index: usize) -> ColvecResult<usize> {
        match self {
            Self::List(v) => v.start_new_value(index),
            Self::LargeList(v) => v.start_new_value(index),
            Self::FixedSizeList(v) => v.start_new_value(index),
            Self::Map(v) => v.as_list_mut().start_new_value(index),
            Self::ListView(_) | Self::LargeListView(_) => colvec_bail!(
                UnsupportedOperation: "list-view rows are opened by setting their offset and size"
            ),
            other => colvec_bail!(
                UnsupportedOperation: "{} vectors have no list rows",
                other.dtype()
            ),
        }
    }

    /// The element vector of a list-like vector.
    pub fn child_data(&self) -> Option<&Vector> {
        match self {
            Self::List(v) => Some(v.data()),
            Self::LargeList(v) => Some(v.data()),
            Self::ListView(v) => Some(v.data()),
            Self::LargeListView(v) => Some(v.data()),
            Self::FixedSizeList(v) => Some(v.data()),
            Self::Map(v) => Some(v.as_list().data()),
            _ => None,
        }
    }

    /// The element vector of a list-like vector, mutably.
    pub fn child_data_mut(&mut self) -> ColvecResult<&mut Vector> {
        match self {
            Self::List(v) => Ok(v.data_mut()),
            Self::LargeList(v) => Ok(v.data_mut()),
            Self::ListView(v) => Ok(v.data_mut()),
            Self::LargeListView(v) => Ok(v.data_mut()),
            Self::FixedSizeList(v) => Ok(v.data_mut()),
            Self::Map(v) => Ok(v.as_list_mut().data_mut()),
            other => colvec_bail!(
                UnsupportedOperation: "{} vectors have no element vector",
                other.dtype()
            ),
        }
    }

    /// A reader positioned at row zero.
    pub fn reader(&self) -> FieldReader<'_> {
        FieldReader::new(self)
    }

    /// The vector as a struct, if it is one.
    pub fn as_struct(&self) -> Option<&StructVector> {
        match self {
            Self::Struct(v) => Some(v),
            _ => None,
        }
    }

    /// The vector as a mutable struct, if it is one.
    pub fn as_struct_mut(&mut self) -> Option<&mut StructVector> {
        match self {
            Self::Struct(v) => Some(v),
            _ => None,
        }
    }

    /// The vector as a fixed-size list, if it is one.
    pub fn as_fixed_size_list(&self) -> Option<&FixedSizeListVector> {
        match self {
            Self::FixedSizeList(v) => Some(v),
            _ => None,
        }
    }

    /// The vector as a mutable fixed-size list, if it is one.
    pub fn as_fixed_size_list_mut(&mut self) -> Option<&mut FixedSizeListVector> {
        match self {
            Self::FixedSizeList(v) => Some(v),
            _ => None,
        }
    }

    /// The vector as a union, if it is one.
    pub fn as_union(&self) -> Option<&UnionVector> {
        match self {
            Self::Union(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use colvec_buffer::RootAllocator;
    use colvec_dtype::{DecimalDType, PType, TimeUnit};
    use colvec_error::ColvecError;
    use rstest::rstest;

    use super::*;

    fn allocator() -> Arc<dyn BufferAllocator> {
        Arc::new(RootAllocator::new())
    }

    #[rstest]
    #[case(DType::Null, MinorType::Null)]
    #[case(DType::Bool, MinorType::Bit)]
    #[case(PType::I8.into(), MinorType::TinyInt)]
    #[case(PType::U64.into(), MinorType::UInt8)]
    #[case(DType::Utf8, MinorType::VarChar)]
    #[case(DType::LargeBinary, MinorType::LargeVarBinary)]
    #[case(
        DType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
        MinorType::TimeStampMicroTz
    )]
    #[case(DType::LargeListView, MinorType::LargeListView)]
    #[case(DType::FixedSizeList(2), MinorType::FixedSizeList)]
    #[case(DType::Map { keys_sorted: false }, MinorType::Map)]
    #[case(DType::Union, MinorType::Union)]
    fn creates_vector_of_type(#[case] dtype: DType, #[case] minor_type: MinorType) {
        let vector = Vector::try_new("v", &dtype, allocator()).unwrap();
        assert_eq!(vector.minor_type(), minor_type);
        assert_eq!(vector.dtype(), dtype);
        assert_eq!(vector.value_count(), 0);
    }

    #[test]
    fn invalid_types_are_rejected() {
        assert!(Vector::try_new("v", &DType::FixedSizeList(0), allocator()).is_err());
        assert!(Vector::try_new("v", &DType::FixedSizeBinary(0), allocator()).is_err());
    }

    #[test]
    fn from_field_round_trips() {
        let decimal = DType::Decimal(DecimalDType::try_new(12, 2).unwrap());
        let field = Field::nullable("root", DType::Struct).with_children([
            Field::not_null("id", PType::I64.into()),
            Field::list_of("tags", DType::LargeListView, Field::nullable("$data$", DType::Utf8)),
            Field::map_of(
                "attrs",
                true,
                Field::not_null("key", DType::Utf8),
                Field::nullable("value", decimal),
            ),
            Field::nullable("grid", DType::FixedSizeList(3))
                .with_children([Field::nullable("$data$", PType::F32.into())]),
        ]);
        let vector = Vector::from_field(&field, allocator()).unwrap();
        assert_eq!(vector.field(), field);
    }

    #[test]
    fn from_field_rejects_malformed_lists() {
        let field = Field::nullable("l", DType::List);
        assert!(Vector::from_field(&field, allocator()).is_err());
    }

    #[test]
    fn set_value_checks_types() {
        let mut vector = Vector::try_new("v", &PType::I32.into(), allocator()).unwrap();
        vector.set_value(0, &Value::I32(7)).unwrap();
        vector.set_value(1, &Value::Null).unwrap();
        assert!(matches!(
            vector.set_value(2, &Value::from("x")),
            Err(ColvecError::MismatchedTypes(..))
        ));
        assert!(matches!(
            vector.set_value(2, &Value::List(vec![])),
            Err(ColvecError::UnsupportedOperation(..))
        ));
        assert_eq!(vector.get_object(0).unwrap(), Value::I32(7));
        assert!(vector.is_null(1));
        assert_eq!(vector.value_count(), 2);
    }

    #[test]
    fn non_nullable_vectors_reject_nulls() {
        let field = Field::not_null("n", PType::I16.into());
        let mut vector = Vector::from_field(&field, allocator()).unwrap();
        assert!(matches!(
            vector.set_null(0),
            Err(ColvecError::InvalidArgument(..))
        ));
    }

    #[test]
    fn allocate_reserves_default_capacity() {
        let mut vector = Vector::try_new("v", &PType::I64.into(), allocator()).unwrap();
        vector.allocate().unwrap();
        assert!(vector.value_capacity() >= DEFAULT_VALUE_CAPACITY);
        vector.close();
        assert_eq!(vector.value_capacity(), 0);
    }
}

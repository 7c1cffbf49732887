use colvec_dtype::{DType, MinorType};
use colvec_error::{ColvecResult, colvec_bail, colvec_err};

use crate::vectors::UnionVector;
use crate::writer::{FixedSizeListWriter, ListWriter, MapWriter, StructWriter, WriterOptions};
use crate::{Value, ValueVector, Vector};

const LIST_TYPES: &[MinorType] = &[
    MinorType::List,
    MinorType::LargeList,
    MinorType::ListView,
    MinorType::LargeListView,
    MinorType::FixedSizeList,
];

/// What a [`PromotableWriter`]'s slot currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// Nothing typed has been written yet.
    Untyped,
    /// A vector of a single type.
    Single(MinorType),
    /// A union of one or more variants.
    Union,
}

impl WriterState {
    /// The state of a writer over `vector`.
    pub fn of(vector: &Vector) -> Self {
        match vector {
            Vector::Null(_) => Self::Untyped,
            Vector::Union(_) => Self::Union,
            other => Self::Single(other.minor_type()),
        }
    }
}

/// A writer over one vector slot that changes the slot's type as values arrive.
///
/// The first typed write replaces an untyped slot with a vector of that type. A write of
/// another type promotes the slot to a union that keeps the old vector as a variant, unless
/// [`WriterOptions::promote_to_union`] is off. Writes go to the row at [`Self::position`];
/// the writer never advances on its own.
#[derive(Debug)]
pub struct PromotableWriter<'a> {
    slot: &'a mut Vector,
    position: usize,
    options: WriterOptions,
}

impl<'a> PromotableWriter<'a> {
    /// A writer at row zero of `slot`.
    pub fn new(slot: &'a mut Vector, options: WriterOptions) -> Self {
        Self::with_position(slot, 0, options)
    }

    /// A writer at row `position` of `slot`.
    pub fn with_position(slot: &'a mut Vector, position: usize, options: WriterOptions) -> Self {
        Self {
            slot,
            position,
            options,
        }
    }

    /// The same writer, borrowed for a shorter time.
    pub fn reborrow(&mut self) -> PromotableWriter<'_> {
        PromotableWriter {
            slot: &mut *self.slot,
            position: self.position,
            options: self.options,
        }
    }

    /// The vector currently in the slot.
    pub fn vector(&self) -> &Vector {
        self.slot
    }

    /// What the slot currently holds.
    pub fn state(&self) -> WriterState {
        WriterState::of(self.slot)
    }

    /// The row the next write goes to.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Move to row `index`.
    pub fn set_position(&mut self, index: usize) {
        self.position = index;
    }

    /// Write `value` at the current row. Nested values are written through the nested writers
    /// and keep the list or map encoding the slot already uses.
    pub fn write_value(&mut self, value: &Value) -> ColvecResult<()> {
        match value {
            Value::Null => self.write_null(),
            Value::List(items) => match self.existing_dtype(LIST_TYPES) {
                Some(DType::FixedSizeList(list_size)) => {
                    let mut writer = self.reborrow().into_fixed_size_list(list_size)?;
                    writer.start_list()?;
                    for item in items {
                        writer.write_value(item)?;
                    }
                    writer.end_list()
                }
                dtype => {
                    let mut writer = self
                        .reborrow()
                        .into_list_of(&dtype.unwrap_or(DType::List))?;
                    writer.start_list()?;
                    for item in items {
                        writer.write_value(item)?;
                    }
                    writer.end_list()
                }
            },
            Value::Struct(fields) => {
                let mut writer = self.struct_()?;
                writer.start()?;
                for (name, field) in fields {
                    writer.field(name).write_value(field)?;
                }
                writer.end();
                Ok(())
            }
            Value::Map(entries) => {
                let keys_sorted = matches!(
                    self.existing_dtype(&[MinorType::Map]),
                    Some(DType::Map { keys_sorted: true })
                );
                let mut writer = self.map(keys_sorted)?;
                writer.start_map()?;
                for (key, value) in entries {
                    writer.write_entry(key, value)?;
                }
                writer.end_map()
            }
            scalar => write_scalar(self.slot, self.position, self.options, scalar),
        }
    }

    /// Write a null at the current row. Nulls never change the slot's type.
    pub fn write_null(&mut self) -> ColvecResult<()> {
        self.slot.set_null(self.position)
    }

    impl_scalar_writes!();

    /// Open a classic list at the current row.
    pub fn list(&mut self) -> ColvecResult<ListWriter<'_>> {
        self.reborrow().into_list_of(&DType::List)
    }

    /// Open a classic list with 64-bit offsets at the current row.
    pub fn large_list(&mut self) -> ColvecResult<ListWriter<'_>> {
        self.reborrow().into_list_of(&DType::LargeList)
    }

    /// Open a list-view at the current row.
    pub fn list_view(&mut self) -> ColvecResult<ListWriter<'_>> {
        self.reborrow().into_list_of(&DType::ListView)
    }

    /// Open a list-view with 64-bit offsets and sizes at the current row.
    pub fn large_list_view(&mut self) -> ColvecResult<ListWriter<'_>> {
        self.reborrow().into_list_of(&DType::LargeListView)
    }

    /// Open a struct at the current row.
    pub fn struct_(&mut self) -> ColvecResult<StructWriter<'_>> {
        self.reborrow().into_struct()
    }

    /// Open a map at the current row.
    pub fn map(&mut self, keys_sorted: bool) -> ColvecResult<MapWriter<'_>> {
        self.reborrow().into_map(keys_sorted)
    }

    /// Open a fixed-size list of `list_size` elements at the current row.
    pub fn fixed_size_list(&mut self, list_size: usize) -> ColvecResult<FixedSizeListWriter<'_>> {
        self.reborrow().into_fixed_size_list(list_size)
    }

    /// Turn this writer into a writer of list type `dtype` at the current row.
    pub fn into_list_of(self, dtype: &DType) -> ColvecResult<ListWriter<'a>> {
        if !matches!(
            dtype,
            DType::List | DType::LargeList | DType::ListView | DType::LargeListView
        ) {
            colvec_bail!("{} is not a variable-size list type", dtype);
        }
        let vector = resolve(self.slot, self.position, self.options, dtype)?;
        ListWriter::try_new(vector, self.position, self.options)
    }

    /// Turn this writer into a struct writer at the current row.
    pub fn into_struct(self) -> ColvecResult<StructWriter<'a>> {
        match resolve(self.slot, self.position, self.options, &DType::Struct)? {
            Vector::Struct(vector) => Ok(StructWriter::new(vector, self.position, self.options)),
            other => Err(colvec_err!(MismatchedTypes: DType::Struct, other.dtype())),
        }
    }

    /// Turn this writer into a map writer at the current row.
    pub fn into_map(self, keys_sorted: bool) -> ColvecResult<MapWriter<'a>> {
        let dtype = DType::Map { keys_sorted };
        match resolve(self.slot, self.position, self.options, &dtype)? {
            Vector::Map(vector) => Ok(MapWriter::new(vector, self.position, self.options)),
            other => Err(colvec_err!(MismatchedTypes: dtype, other.dtype())),
        }
    }

    /// Turn this writer into a fixed-size list writer at the current row.
    pub fn into_fixed_size_list(self, list_size: usize) -> ColvecResult<FixedSizeListWriter<'a>> {
        let dtype = DType::FixedSizeList(list_size);
        match resolve(self.slot, self.position, self.options, &dtype)? {
            Vector::FixedSizeList(vector) => {
                let mut writer = FixedSizeListWriter::new(vector, self.options);
                writer.set_position(self.position);
                Ok(writer)
            }
            other => Err(colvec_err!(MismatchedTypes: dtype, other.dtype())),
        }
    }

    /// The type of the vector, or union variant, whose minor type is one of `minor_types`.
    fn existing_dtype(&self, minor_types: &[MinorType]) -> Option<DType> {
        match &*self.slot {
            Vector::Union(union) => union
                .variants()
                .iter()
                .find(|v| minor_types.contains(&v.minor_type()))
                .map(Vector::dtype),
            vector => minor_types
                .contains(&vector.minor_type())
                .then(|| vector.dtype()),
        }
    }
}

/// Make `slot` able to hold `dtype` values, typing or promoting it when needed.
fn prepare(slot: &mut Vector, options: WriterOptions, dtype: &DType) -> ColvecResult<()> {
    match WriterState::of(slot) {
        WriterState::Untyped => {
            let mut vector = Vector::try_new(slot.name().clone(), dtype, slot.allocator().clone())?;
            vector.set_value_count(slot.value_count())?;
            log::debug!(
                "creating {} vector {} on its first typed write",
                dtype,
                slot.name()
            );
            *slot = vector;
            Ok(())
        }
        WriterState::Single(_) if slot.accepts(dtype) => Ok(()),
        WriterState::Single(minor_type) => {
            if minor_type == dtype.minor_type() {
                colvec_bail!(MismatchedTypes: slot.dtype(), dtype);
            }
            if !options.promote_to_union {
                colvec_bail!(
                    UnsupportedOperation: "writing {} to {} vector {} needs union promotion",
                    dtype,
                    slot.dtype(),
                    slot.name()
                );
            }
            UnionVector::promote(slot)
        }
        WriterState::Union => Ok(()),
    }
}

/// Make `slot` able to hold a `dtype` value at `position` and return the vector to write it to.
///
/// For a union the row is tagged with `dtype` once the variant is known to accept it.
pub(crate) fn resolve<'s>(
    slot: &'s mut Vector,
    position: usize,
    options: WriterOptions,
    dtype: &DType,
) -> ColvecResult<&'s mut Vector> {
    prepare(slot, options, dtype)?;
    match slot {
        Vector::Union(union) => {
            union.variant_mut(dtype)?;
            union.set_type_id(position, dtype.minor_type())?;
            union.variant_mut(dtype)
        }
        vector => Ok(vector),
    }
}

/// Write a scalar at `position`. A union row is only re-tagged after the value is stored.
fn write_scalar(
    slot: &mut Vector,
    position: usize,
    options: WriterOptions,
    scalar: &Value,
) -> ColvecResult<()> {
    let dtype = scalar.dtype();
    prepare(slot, options, &dtype)?;
    match slot {
        Vector::Union(union) => {
            union.variant_mut(&dtype)?.set_value(position, scalar)?;
            union.set_type_id(position, dtype.minor_type())
        }
        vector => vector.set_value(position, scalar),
    }
}

impl Vector {
    /// A writer at row zero of this vector with default options.
    pub fn writer(&mut self) -> PromotableWriter<'_> {
        PromotableWriter::new(self, WriterOptions::default())
    }
}

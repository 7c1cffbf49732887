use colvec_dtype::{DType, Field};
use colvec_error::{ColvecResult, colvec_bail, colvec_err};

use crate::vectors::{FixedSizeListVector, StructVector};
use crate::writer::promotable::resolve;
use crate::writer::{ListWriter, MapWriter, PromotableWriter, StructWriter, WriterOptions};
use crate::{Value, ValueVector, Vector};

/// Writes rows of a fixed-size list.
///
/// Row `i` owns the child slots `[i * list_size, (i + 1) * list_size)`. The writer tracks the
/// row (`position`) and the next child slot (`child_position`) separately; any write that would
/// land past the row's last slot fails with `RowOverflow` before anything is modified.
#[derive(Debug)]
pub struct FixedSizeListWriter<'a> {
    vector: &'a mut FixedSizeListVector,
    position: usize,
    child_position: usize,
    list_size: usize,
    options: WriterOptions,
}

impl<'a> FixedSizeListWriter<'a> {
    /// A writer at row zero of `vector`.
    pub fn new(vector: &'a mut FixedSizeListVector, options: WriterOptions) -> Self {
        let list_size = vector.list_size();
        Self {
            vector,
            position: 0,
            child_position: 0,
            list_size,
            options,
        }
    }

    /// Reset the vector and reserve room for the default number of rows.
    pub fn allocate(&mut self) -> ColvecResult<()> {
        self.vector.allocate()
    }

    /// Release the vector's buffers.
    pub fn clear(&mut self) {
        self.vector.clear()
    }

    /// The descriptor of the vector being written.
    pub fn field(&self) -> Field {
        self.vector.field()
    }

    /// Fix the number of rows of the vector.
    pub fn set_value_count(&mut self, count: usize) -> ColvecResult<()> {
        self.vector.set_value_count(count)
    }

    /// The number of rows the vector holds without growing.
    pub fn value_capacity(&self) -> usize {
        self.vector.value_capacity()
    }

    /// Close the vector and drop the writer.
    pub fn close(self) {
        self.vector.close()
    }

    /// Move to row `index`. The child cursor moves to the row's first slot.
    pub fn set_position(&mut self, index: usize) {
        self.position = index;
        self.child_position = index * self.list_size;
    }

    /// The row the writer is at.
    pub fn idx(&self) -> usize {
        self.position
    }

    /// The child slot the next element goes to.
    pub fn child_position(&self) -> usize {
        self.child_position
    }

    /// Open the current row. Slots that are never written read as null.
    pub fn start_list(&mut self) -> ColvecResult<()> {
        self.child_position = self.vector.start_new_value(self.position)?;
        Ok(())
    }

    /// Move to the next row. Unwritten slots of the current row stay null.
    pub fn end_list(&mut self) -> ColvecResult<()> {
        self.position += 1;
        Ok(())
    }

    fn check_bound(&self) -> ColvecResult<()> {
        if self.child_position >= (self.position + 1) * self.list_size {
            colvec_bail!(RowOverflow: self.position, self.list_size, self.child_position);
        }
        Ok(())
    }

    fn element(&mut self) -> ColvecResult<PromotableWriter<'_>> {
        self.check_bound()?;
        Ok(PromotableWriter::with_position(
            self.vector.data_mut(),
            self.child_position,
            self.options,
        ))
    }

    /// Write `value` to the next slot of the current row.
    pub fn write_value(&mut self, value: &Value) -> ColvecResult<()> {
        self.element()?.write_value(value)?;
        self.child_position += 1;
        Ok(())
    }

    /// Write a null to the next slot of the current row.
    ///
    /// The null takes up its slot like any other value, so `write_null(); write_int(5)` on a
    /// row of three yields `[null, 5, null]` rather than `[5, null, null]`.
    pub fn write_null(&mut self) -> ColvecResult<()> {
        self.element()?.write_null()?;
        self.child_position += 1;
        Ok(())
    }

    impl_scalar_writes!();

    /// Write a classic list to the next slot and return its writer.
    pub fn list(&mut self) -> ColvecResult<ListWriter<'_>> {
        self.check_bound()?;
        let writer = PromotableWriter::with_position(
            self.vector.data_mut(),
            self.child_position,
            self.options,
        )
        .into_list_of(&DType::List)?;
        self.child_position += 1;
        Ok(writer)
    }

    /// Write a list-view to the next slot and return its writer.
    pub fn list_view(&mut self) -> ColvecResult<ListWriter<'_>> {
        self.check_bound()?;
        let writer = PromotableWriter::with_position(
            self.vector.data_mut(),
            self.child_position,
            self.options,
        )
        .into_list_of(&DType::ListView)?;
        self.child_position += 1;
        Ok(writer)
    }

    /// Write a struct to the next slot and return its writer.
    pub fn struct_(&mut self) -> ColvecResult<StructWriter<'_>> {
        self.check_bound()?;
        let writer = PromotableWriter::with_position(
            self.vector.data_mut(),
            self.child_position,
            self.options,
        )
        .into_struct()?;
        self.child_position += 1;
        Ok(writer)
    }

    /// Write a map with unsorted keys to the next slot and return its writer.
    pub fn map(&mut self) -> ColvecResult<MapWriter<'_>> {
        self.map_sorted(false)
    }

    /// Write a map to the next slot and return its writer.
    pub fn map_sorted(&mut self, keys_sorted: bool) -> ColvecResult<MapWriter<'_>> {
        self.check_bound()?;
        let writer = PromotableWriter::with_position(
            self.vector.data_mut(),
            self.child_position,
            self.options,
        )
        .into_map(keys_sorted)?;
        self.child_position += 1;
        Ok(writer)
    }

    /// Open the struct element at the next slot. Its fields are written through the named
    /// writers and [`Self::end`] moves past it.
    pub fn start(&mut self) -> ColvecResult<()> {
        let slot = self.child_position;
        self.element_struct()?.set_valid(slot)
    }

    /// Close the struct element opened by [`Self::start`].
    pub fn end(&mut self) {
        self.child_position += 1;
    }

    fn element_struct(&mut self) -> ColvecResult<&mut StructVector> {
        self.check_bound()?;
        match resolve(
            self.vector.data_mut(),
            self.child_position,
            self.options,
            &DType::Struct,
        )? {
            Vector::Struct(element) => Ok(element),
            other => Err(colvec_err!(MismatchedTypes: DType::Struct, other.dtype())),
        }
    }

    /// The writer of field `name` of the struct element at the next slot.
    pub fn named(&mut self, name: &str) -> ColvecResult<PromotableWriter<'_>> {
        let slot = self.child_position;
        let options = self.options;
        let element = self.element_struct()?;
        Ok(PromotableWriter::with_position(
            element.child_slot_mut(name),
            slot,
            options,
        ))
    }

    /// The writer of field `name` of the struct element at the next slot, added with `dtype`
    /// when it does not exist yet.
    pub fn typed_named(&mut self, name: &str, dtype: &DType) -> ColvecResult<PromotableWriter<'_>> {
        let slot = self.child_position;
        let options = self.options;
        let element = self.element_struct()?;
        Ok(PromotableWriter::with_position(
            element.typed_child_slot_mut(name, dtype)?,
            slot,
            options,
        ))
    }

    /// The classic list writer of field `name` of the struct element at the next slot.
    pub fn list_named(&mut self, name: &str) -> ColvecResult<ListWriter<'_>> {
        self.named(name)?.into_list_of(&DType::List)
    }

    /// The struct writer of field `name` of the struct element at the next slot.
    pub fn struct_named(&mut self, name: &str) -> ColvecResult<StructWriter<'_>> {
        self.named(name)?.into_struct()
    }

    /// The map writer, unsorted keys, of field `name` of the struct element at the next slot.
    pub fn map_named(&mut self, name: &str) -> ColvecResult<MapWriter<'_>> {
        self.map_named_sorted(name, false)
    }

    /// The map writer of field `name` of the struct element at the next slot.
    pub fn map_named_sorted(
        &mut self,
        name: &str,
        keys_sorted: bool,
    ) -> ColvecResult<MapWriter<'_>> {
        self.named(name)?.into_map(keys_sorted)
    }
}

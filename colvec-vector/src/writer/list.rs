use colvec_dtype::DType;
use colvec_error::{ColvecResult, colvec_bail};

use crate::writer::{MapWriter, PromotableWriter, StructWriter, WriterOptions};
use crate::{Value, ValueVector, Vector};

/// Writes rows of a classic list, large list, list-view or large list-view.
///
/// Each row is bracketed by [`ListWriter::start_list`] and [`ListWriter::end_list`]; the
/// values in between are appended to the element vector. A classic list records the row's
/// end offset; a list-view records the row's offset and size.
#[derive(Debug)]
pub struct ListWriter<'a> {
    vector: &'a mut Vector,
    position: usize,
    start: usize,
    cursor: usize,
    options: WriterOptions,
}

impl<'a> ListWriter<'a> {
    /// A writer at row `position` of `vector`, which must be a variable-size list.
    pub fn try_new(
        vector: &'a mut Vector,
        position: usize,
        options: WriterOptions,
    ) -> ColvecResult<Self> {
        if !matches!(
            vector,
            Vector::List(_) | Vector::LargeList(_) | Vector::ListView(_) | Vector::LargeListView(_)
        ) {
            colvec_bail!(
                UnsupportedOperation: "{} vector {} is not a variable-size list",
                vector.dtype(),
                vector.name()
            );
        }
        Ok(Self {
            vector,
            position,
            start: 0,
            cursor: 0,
            options,
        })
    }

    /// The row the writer is at.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Move to row `index`.
    pub fn set_position(&mut self, index: usize) {
        self.position = index;
    }

    /// Open the current row.
    pub fn start_list(&mut self) -> ColvecResult<()> {
        self.start = match &mut *self.vector {
            Vector::ListView(v) => {
                v.set_valid(self.position)?;
                v.data().value_count()
            }
            Vector::LargeListView(v) => {
                v.set_valid(self.position)?;
                v.data().value_count()
            }
            vector => vector.start_new_value(self.position)?,
        };
        self.cursor = self.start;
        Ok(())
    }

    /// Close the current row and move to the next one.
    pub fn end_list(&mut self) -> ColvecResult<()> {
        let size = self.cursor - self.start;
        match &mut *self.vector {
            Vector::List(v) => v.end_value(self.position, size)?,
            Vector::LargeList(v) => v.end_value(self.position, size)?,
            Vector::ListView(v) => v.set_row(self.position, self.start, size)?,
            Vector::LargeListView(v) => v.set_row(self.position, self.start, size)?,
            other => colvec_bail!(
                UnsupportedOperation: "{} vectors have no list rows",
                other.dtype()
            ),
        }
        self.position += 1;
        Ok(())
    }

    /// The number of elements written to the current row so far.
    pub fn element_count(&self) -> usize {
        self.cursor - self.start
    }

    fn element(&mut self) -> ColvecResult<PromotableWriter<'_>> {
        Ok(PromotableWriter::with_position(
            self.vector.child_data_mut()?,
            self.cursor,
            self.options,
        ))
    }

    /// Append `value` to the current row.
    pub fn write_value(&mut self, value: &Value) -> ColvecResult<()> {
        self.element()?.write_value(value)?;
        self.cursor += 1;
        Ok(())
    }

    /// Append a null element to the current row.
    pub fn write_null(&mut self) -> ColvecResult<()> {
        self.element()?.write_null()?;
        self.cursor += 1;
        Ok(())
    }

    impl_scalar_writes!();

    /// Append a classic list element and return its writer.
    pub fn list(&mut self) -> ColvecResult<ListWriter<'_>> {
        let writer = PromotableWriter::with_position(
            self.vector.child_data_mut()?,
            self.cursor,
            self.options,
        )
        .into_list_of(&DType::List)?;
        self.cursor += 1;
        Ok(writer)
    }

    /// Append a list-view element and return its writer.
    pub fn list_view(&mut self) -> ColvecResult<ListWriter<'_>> {
        let writer = PromotableWriter::with_position(
            self.vector.child_data_mut()?,
            self.cursor,
            self.options,
        )
        .into_list_of(&DType::ListView)?;
        self.cursor += 1;
        Ok(writer)
    }

    /// Append a struct element and return its writer.
    pub fn struct_(&mut self) -> ColvecResult<StructWriter<'_>> {
        let writer = PromotableWriter::with_position(
            self.vector.child_data_mut()?,
            self.cursor,
            self.options,
        )
        .into_struct()?;
        self.cursor += 1;
        Ok(writer)
    }

    /// Append a map element and return its writer.
    pub fn map(&mut self, keys_sorted: bool) -> ColvecResult<MapWriter<'_>> {
        let writer = PromotableWriter::with_position(
            self.vector.child_data_mut()?,
            self.cursor,
            self.options,
        )
        .into_map(keys_sorted)?;
        self.cursor += 1;
        Ok(writer)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use colvec_buffer::RootAllocator;
    use rstest::rstest;

    use super::*;

    fn writer_over(dtype: DType, rows: &[&[Option<i32>]]) -> Vector {
        let mut vector = Vector::try_new("l", &dtype, Arc::new(RootAllocator::new())).unwrap();
        let mut writer = ListWriter::try_new(&mut vector, 0, WriterOptions::default()).unwrap();
        for row in rows {
            writer.start_list().unwrap();
            for value in row.iter() {
                match value {
                    Some(v) => writer.write_int(*v).unwrap(),
                    None => writer.write_null().unwrap(),
                }
            }
            writer.end_list().unwrap();
        }
        vector
    }

    fn ints(values: &[Option<i32>]) -> Value {
        Value::List(values.iter().map(|v| Value::from(*v)).collect())
    }

    #[rstest]
    #[case(DType::List)]
    #[case(DType::LargeList)]
    #[case(DType::ListView)]
    #[case(DType::LargeListView)]
    fn rows_are_isolated(#[case] dtype: DType) {
        let rows: [&[Option<i32>]; 3] = [&[Some(1), Some(2)], &[], &[None, Some(3)]];
        let vector = writer_over(dtype, &rows);
        assert_eq!(vector.value_count(), 3);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(vector.get_object(i).unwrap(), ints(row));
        }
    }

    #[test]
    fn list_view_records_offset_and_size() {
        let vector = writer_over(DType::ListView, &[&[Some(1)], &[Some(2), Some(3)]]);
        let Vector::ListView(list) = &vector else {
            panic!("expected a list-view, found {}", vector.dtype());
        };
        assert_eq!(list.offset(1).unwrap(), 1);
        assert_eq!(list.size(1).unwrap(), 2);
    }

    #[test]
    fn nested_lists() {
        let mut vector =
            Vector::try_new("l", &DType::List, Arc::new(RootAllocator::new())).unwrap();
        let mut outer = ListWriter::try_new(&mut vector, 0, WriterOptions::default()).unwrap();
        outer.start_list().unwrap();
        for values in [[1, 2], [3, 4]] {
            let mut inner = outer.list().unwrap();
            inner.start_list().unwrap();
            for v in values {
                inner.write_int(v).unwrap();
            }
            inner.end_list().unwrap();
        }
        outer.end_list().unwrap();
        assert_eq!(
            vector.get_object(0).unwrap(),
            Value::List(vec![
                ints(&[Some(1), Some(2)]),
                ints(&[Some(3), Some(4)])
            ])
        );
    }

    #[test]
    fn rejects_non_lists() {
        let allocator = Arc::new(RootAllocator::new());
        let mut vector = Vector::try_new("s", &DType::Struct, allocator).unwrap();
        assert!(ListWriter::try_new(&mut vector, 0, WriterOptions::default()).is_err());
    }
}

use colvec_dtype::{MAP_KEY_NAME, MAP_VALUE_NAME};
use colvec_error::ColvecResult;

use crate::Value;
use crate::vectors::{MapVector, StructVector};
use crate::writer::{PromotableWriter, WriterOptions};

/// Writes rows of a map vector, one key-value entry at a time.
#[derive(Debug)]
pub struct MapWriter<'a> {
    vector: &'a mut MapVector,
    position: usize,
    start: usize,
    cursor: usize,
    options: WriterOptions,
}

impl<'a> MapWriter<'a> {
    /// A writer at row `position` of `vector`.
    pub fn new(vector: &'a mut MapVector, position: usize, options: WriterOptions) -> Self {
        Self {
            vector,
            position,
            start: 0,
            cursor: 0,
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

    /// Open the current row.
    pub fn start_map(&mut self) -> ColvecResult<()> {
        self.start = self.vector.as_list_mut().start_new_value(self.position)?;
        self.cursor = self.start;
        Ok(())
    }

    /// Close the current row and move to the next one.
    pub fn end_map(&mut self) -> ColvecResult<()> {
        self.vector
            .as_list_mut()
            .end_value(self.position, self.cursor - self.start)?;
        self.position += 1;
        Ok(())
    }

    /// Append an entry to the current row and return its writer.
    pub fn entry(&mut self) -> ColvecResult<MapEntryWriter<'_>> {
        let entries = self.vector.entries_mut()?;
        entries.set_valid(self.cursor)?;
        let writer = MapEntryWriter {
            entries,
            index: self.cursor,
            options: self.options,
        };
        self.cursor += 1;
        Ok(writer)
    }

    /// Append the entry `key -> value` to the current row.
    pub fn write_entry(&mut self, key: &Value, value: &Value) -> ColvecResult<()> {
        let mut entry = self.entry()?;
        entry.key().write_value(key)?;
        entry.value().write_value(value)
    }
}

/// Writes the key and value of one map entry.
#[derive(Debug)]
pub struct MapEntryWriter<'a> {
    entries: &'a mut StructVector,
    index: usize,
    options: WriterOptions,
}

impl MapEntryWriter<'_> {
    /// The writer of the entry's key.
    pub fn key(&mut self) -> PromotableWriter<'_> {
        PromotableWriter::with_position(
            self.entries.child_slot_mut(MAP_KEY_NAME),
            self.index,
            self.options,
        )
    }

    /// The writer of the entry's value.
    pub fn value(&mut self) -> PromotableWriter<'_> {
        PromotableWriter::with_position(
            self.entries.child_slot_mut(MAP_VALUE_NAME),
            self.index,
            self.options,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use colvec_buffer::RootAllocator;
    use colvec_dtype::Nullability;

    use super::*;
    use crate::ValueVector;

    #[test]
    fn writes_entries() {
        let mut vector =
            MapVector::new("m", false, Nullability::Nullable, Arc::new(RootAllocator::new()));
        let mut writer = MapWriter::new(&mut vector, 0, WriterOptions::default());
        writer.start_map().unwrap();
        writer
            .write_entry(&Value::from("a"), &Value::I32(1))
            .unwrap();
        let mut entry = writer.entry().unwrap();
        entry.key().write_var_char("b").unwrap();
        entry.value().write_null().unwrap();
        writer.end_map().unwrap();
        writer.start_map().unwrap();
        writer.end_map().unwrap();

        assert_eq!(
            vector.get_object(0).unwrap(),
            Value::Map(vec![
                (Value::from("a"), Value::I32(1)),
                (Value::from("b"), Value::Null),
            ])
        );
        assert_eq!(vector.get_object(1).unwrap(), Value::Map(vec![]));
        assert_eq!(
            vector.field().to_string(),
            "m: map?<entries: struct<key: utf8?, value: i32?>>"
        );
    }
}

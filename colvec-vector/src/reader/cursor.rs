use std::ops::Range;

use colvec_error::{ColvecResult, colvec_bail};

use crate::reader::{FieldReader, UnionHolder};
use crate::Vector;

/// Walks the child elements of one list row through a reader over the element vector.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ElementCursor<'a> {
    data: FieldReader<'a>,
    start: usize,
    current: usize,
    end: usize,
}

impl<'a> ElementCursor<'a> {
    pub fn new(data: &'a Vector) -> Self {
        Self {
            data: FieldReader::new(data),
            start: 0,
            current: 0,
            end: 0,
        }
    }

    /// Load the elements of a new row.
    pub fn reset(&mut self, range: Range<usize>) {
        self.start = range.start;
        self.current = range.start;
        self.end = range.end;
    }

    pub fn size(&self) -> usize {
        self.end - self.start
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn data(&self) -> FieldReader<'a> {
        self.data
    }

    /// Position the element reader at the next element of the row.
    pub fn next(&mut self) -> bool {
        if self.current < self.end {
            self.data.set_position(self.current);
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Position the element reader at element `index` of the row by replaying from the start.
    pub fn read(&mut self, index: usize, holder: &mut UnionHolder<'a>) -> ColvecResult<()> {
        if index >= self.size() {
            colvec_bail!(OutOfBounds: index, 0, self.size());
        }
        self.current = self.start;
        for _ in 0..=index {
            self.next();
        }
        holder.reader = Some(self.data);
        holder.is_set = self.data.is_set();
        Ok(())
    }
}

use std::mem;
use std::sync::Arc;

use colvec_buffer::{BufferAllocator, BufferHandle};
use colvec_dtype::{DType, Field, FieldName, MinorType};
use colvec_error::{ColvecResult, colvec_bail, colvec_err};

use crate::vectors::NullVector;
use crate::{Value, ValueVector, Vector};

/// A sparse union: one `u8` type id per row selects the variant vector holding the row.
///
/// Every variant is indexed by the union row index, so a row's value lives at the same index
/// in its variant. Type id `0` ([`MinorType::Null`]) marks a null row. Variants are keyed by
/// their [`MinorType`]; a union holds at most one variant per minor type.
#[derive(Debug)]
pub struct UnionVector {
    name: FieldName,
    type_ids: BufferHandle,
    variants: Vec<Vector>,
    value_count: usize,
    allocator: Arc<dyn BufferAllocator>,
}

impl UnionVector {
    /// An empty union without variants.
    pub fn new(name: impl Into<FieldName>, allocator: Arc<dyn BufferAllocator>) -> Self {
        Self {
            name: name.into(),
            type_ids: BufferHandle::new(allocator.clone()),
            variants: Vec::new(),
            value_count: 0,
            allocator,
        }
    }

    /// Replace the single-typed vector in `slot` with a union holding it as its only variant.
    ///
    /// Every non-null row of the old vector is tagged with its minor type. The type-id buffer is
    /// allocated and filled before `slot` is touched, so on failure `slot` is unchanged.
    pub fn promote(slot: &mut Vector) -> ColvecResult<()> {
        let minor_type = slot.minor_type();
        if matches!(minor_type, MinorType::Null | MinorType::Union) {
            colvec_bail!(
                UnsupportedOperation: "cannot promote a {} vector to a union",
                minor_type
            );
        }
        let value_count = slot.value_count();
        let mut type_ids = BufferHandle::new(slot.allocator().clone());
        type_ids.allocate(value_count)?;
        for index in 0..value_count {
            if !slot.is_null(index) {
                type_ids.set(index, minor_type.type_id())?;
            }
        }

        let name = slot.name().clone();
        let allocator = slot.allocator().clone();
        let placeholder = Vector::Null(NullVector::new(name.clone(), allocator.clone()));
        let mut old = mem::replace(slot, placeholder);
        old.rename(minor_type.name().into());
        log::debug!(
            "promoting {} vector {} with {} rows to a union",
            minor_type,
            name,
            value_count
        );
        *slot = Vector::Union(Self {
            name,
            type_ids,
            variants: vec![old],
            value_count,
            allocator,
        });
        Ok(())
    }

    pub(crate) fn rename(&mut self, name: FieldName) {
        self.name = name;
    }

    /// The variant vectors, in the order they were added.
    pub fn variants(&self) -> &[Vector] {
        &self.variants
    }

    /// The variant holding values of `minor_type`.
    pub fn variant(&self, minor_type: MinorType) -> Option<&Vector> {
        self.variants.iter().find(|v| v.minor_type() == minor_type)
    }

    /// The variant for values of `dtype`, created and padded with nulls if it does not exist.
    ///
    /// Fails if a variant of the same minor type exists with different type parameters, such
    /// as another decimal scale or time zone.
    pub fn variant_mut(&mut self, dtype: &DType) -> ColvecResult<&mut Vector> {
        let minor_type = dtype.minor_type();
        if minor_type == MinorType::Null {
            colvec_bail!("unions have no variant for the null type");
        }
        match self
            .variants
            .iter()
            .position(|v| v.minor_type() == minor_type)
        {
            Some(position) => {
                let variant = &mut self.variants[position];
                if !variant.accepts(dtype) {
                    colvec_bail!(MismatchedTypes: variant.dtype(), dtype);
                }
                Ok(variant)
            }
            None => {
                let mut variant =
                    Vector::try_new(minor_type.name(), dtype, self.allocator.clone())?;
                variant.set_value_count(self.value_count)?;
                log::debug!("adding {} variant to union {}", dtype, self.name);
                self.variants.push(variant);
                let position = self.variants.len() - 1;
                Ok(&mut self.variants[position])
            }
        }
    }

    pub(crate) fn push_variant(&mut self, mut variant: Vector) -> ColvecResult<()> {
        let minor_type = variant.minor_type();
        if minor_type == MinorType::Null || self.variant(minor_type).is_some() {
            colvec_bail!("union {} cannot take another {} variant", self.name, minor_type);
        }
        variant.set_value_count(self.value_count)?;
        self.variants.push(variant);
        Ok(())
    }

    /// The type of row `index`. Rows beyond the type-id buffer are null.
    pub fn type_id(&self, index: usize) -> ColvecResult<MinorType> {
        if index >= self.value_count || index >= self.type_ids.capacity() {
            return Ok(MinorType::Null);
        }
        MinorType::try_from_type_id(self.type_ids.get(index)?)
    }

    /// Tag row `index` with `minor_type`.
    pub fn set_type_id(&mut self, index: usize, minor_type: MinorType) -> ColvecResult<()> {
        self.type_ids.ensure_capacity(index + 1)?;
        self.type_ids.set(index, minor_type.type_id())?;
        if index >= self.value_count {
            self.set_value_count(index + 1)?;
        }
        Ok(())
    }

    /// The variant holding row `index`, or `None` for null rows.
    pub fn row_variant(&self, index: usize) -> ColvecResult<Option<&Vector>> {
        let minor_type = self.type_id(index)?;
        if minor_type == MinorType::Null {
            return Ok(None);
        }
        self.variant(minor_type).map(Some).ok_or_else(|| {
            colvec_err!(
                CorruptEncoding: "row {} of union {} has type {} but no such variant",
                index,
                self.name,
                minor_type
            )
        })
    }
}

impl ValueVector for UnionVector {
    fn name(&self) -> &FieldName {
        &self.name
    }

    fn field(&self) -> Field {
        Field::nullable(self.name.clone(), DType::Union)
            .with_children(self.variants.iter().map(Vector::field))
    }

    fn minor_type(&self) -> MinorType {
        MinorType::Union
    }

    fn allocator(&self) -> &Arc<dyn BufferAllocator> {
        &self.allocator
    }

    fn allocate_with_capacity(&mut self, rows: usize) -> ColvecResult<()> {
        self.type_ids.allocate(rows)?;
        for variant in self.variants.iter_mut() {
            variant.allocate_with_capacity(rows)?;
        }
        self.value_count = 0;
        Ok(())
    }

    fn value_capacity(&self) -> usize {
        self.variants
            .iter()
            .map(Vector::value_capacity)
            .fold(self.type_ids.capacity(), usize::min)
    }

    fn value_count(&self) -> usize {
        self.value_count
    }

    fn set_value_count(&mut self, count: usize) -> ColvecResult<()> {
        if count < self.value_count {
            for index in count..self.value_count.min(self.type_ids.capacity()) {
                self.type_ids.set(index, MinorType::Null.type_id())?;
            }
        }
        for variant in self.variants.iter_mut() {
            variant.set_value_count(count)?;
        }
        self.value_count = count;
        Ok(())
    }

    fn clear(&mut self) {
        self.type_ids.release();
        self.variants.iter_mut().for_each(Vector::clear);
        self.value_count = 0;
    }

    fn is_null(&self, index: usize) -> bool {
        !matches!(self.type_id(index), Ok(t) if t != MinorType::Null)
    }

    fn set_null(&mut self, index: usize) -> ColvecResult<()> {
        self.set_type_id(index, MinorType::Null)
    }

    fn get_object(&self, index: usize) -> ColvecResult<Value> {
        match self.row_variant(index)? {
            Some(variant) => variant.get_object(index),
            None => Ok(Value::Null),
        }
    }
}

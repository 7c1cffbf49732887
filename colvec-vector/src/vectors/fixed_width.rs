use std::sync::Arc;

use arrow_buffer::i256;
use colvec_buffer::{BufferAllocator, BufferHandle, NativeType};
use colvec_dtype::half::f16;
use colvec_dtype::{DType, Field, FieldName, MinorType, Nullability, PType};
use colvec_error::{ColvecResult, colvec_bail, colvec_err};

use crate::validity::Validity;
use crate::vectors::check_nullable;
use crate::{Value, ValueVector};

/// Every type stored at a constant number of bytes per row: integers, floats, decimals,
/// timestamps, durations and fixed-size binary.
#[derive(Debug)]
pub struct FixedWidthVector {
    name: FieldName,
    dtype: DType,
    nullability: Nullability,
    width: usize,
    validity: Validity,
    data: BufferHandle,
    value_count: usize,
    allocator: Arc<dyn BufferAllocator>,
}

impl FixedWidthVector {
    /// An empty vector of `dtype`, which must have a byte width.
    pub fn try_new(
        name: impl Into<FieldName>,
        dtype: DType,
        nullability: Nullability,
        allocator: Arc<dyn BufferAllocator>,
    ) -> ColvecResult<Self> {
        let width = dtype
            .byte_width()
            .ok_or_else(|| colvec_err!("{} is not a fixed-width type", dtype))?;
        if width == 0 {
            colvec_bail!("fixed-width type {} must be at least one byte wide", dtype);
        }
        Ok(Self {
            name: name.into(),
            dtype,
            nullability,
            width,
            validity: Validity::new(allocator.clone()),
            data: BufferHandle::new(allocator.clone()),
            value_count: 0,
            allocator,
        })
    }

    pub(crate) fn rename(&mut self, name: FieldName) {
        self.name = name;
    }

    /// The type of the stored values.
    pub fn dtype(&self) -> &DType {
        &self.dtype
    }

    /// The number of bytes per row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Store the raw little-endian bytes of row `index`.
    pub fn set_bytes(&mut self, index: usize, bytes: &[u8]) -> ColvecResult<()> {
        if bytes.len() != self.width {
            colvec_bail!(
                "{} expects {} bytes per value, got {}",
                self.dtype,
                self.width,
                bytes.len()
            );
        }
        self.data.ensure_capacity((index + 1) * self.width)?;
        self.validity.ensure_rows(index + 1)?;
        self.data.set_bytes(index * self.width, bytes)?;
        self.mark_set(index)
    }

    /// Store a native value at row `index`.
    pub fn set<T: NativeType>(&mut self, index: usize, value: T) -> ColvecResult<()> {
        if T::WIDTH != self.width {
            colvec_bail!(
                "{} expects {} bytes per value, got a {} byte native value",
                self.dtype,
                self.width,
                T::WIDTH
            );
        }
        self.data.ensure_capacity((index + 1) * self.width)?;
        self.validity.ensure_rows(index + 1)?;
        self.data.set(index * self.width, value)?;
        self.mark_set(index)
    }

    fn mark_set(&mut self, index: usize) -> ColvecResult<()> {
        self.validity.set_valid(index)?;
        self.value_count = self.value_count.max(index + 1);
        Ok(())
    }

    /// The native value at row `index`, or `None` for null rows.
    pub fn get<T: NativeType>(&self, index: usize) -> ColvecResult<Option<T>> {
        if T::WIDTH != self.width {
            colvec_bail!(MismatchedTypes: self.dtype, format!("{} byte native value", T::WIDTH));
        }
        if self.is_null(index) {
            return Ok(None);
        }
        self.data.get(index * self.width).map(Some)
    }

    /// The raw bytes of row `index`, or `None` for null rows.
    pub fn get_bytes(&self, index: usize) -> ColvecResult<Option<&[u8]>> {
        if self.is_null(index) {
            return Ok(None);
        }
        self.data.bytes(index * self.width, self.width).map(Some)
    }

    /// Store a scalar [`Value`] whose type matches this vector.
    pub fn set_value(&mut self, index: usize, value: &Value) -> ColvecResult<()> {
        match (&self.dtype, value) {
            (DType::Primitive(PType::I8), Value::I8(v)) => self.set(index, *v),
            (DType::Primitive(PType::I16), Value::I16(v)) => self.set(index, *v),
            (DType::Primitive(PType::I32), Value::I32(v)) => self.set(index, *v),
            (DType::Primitive(PType::I64), Value::I64(v)) => self.set(index, *v),
            (DType::Primitive(PType::U8), Value::U8(v)) => self.set(index, *v),
            (DType::Primitive(PType::U16), Value::U16(v)) => self.set(index, *v),
            (DType::Primitive(PType::U32), Value::U32(v)) => self.set(index, *v),
            (DType::Primitive(PType::U64), Value::U64(v)) => self.set(index, *v),
            (DType::Primitive(PType::F16), Value::F16(v)) => self.set(index, *v),
            (DType::Primitive(PType::F32), Value::F32(v)) => self.set(index, *v),
            (DType::Primitive(PType::F64), Value::F64(v)) => self.set(index, *v),
            (DType::Decimal(dt), Value::Decimal(v, vdt)) if dt == vdt => self.set(index, *v),
            (DType::Decimal256(dt), Value::Decimal256(v, vdt)) if dt == vdt => {
                self.set(index, *v)
            }
            (DType::Timestamp(unit, tz), Value::Timestamp { value, unit: u, tz: t })
                if unit == u && tz == t =>
            {
                self.set(index, *value)
            }
            (DType::Duration(unit), Value::Duration { value, unit: u }) if unit == u => {
                self.set(index, *value)
            }
            (DType::FixedSizeBinary(_), Value::FixedSizeBinary(bytes)) => {
                self.set_bytes(index, bytes)
            }
            (dtype, value) => Err(colvec_err!(MismatchedTypes: dtype, value.dtype())),
        }
    }
}

impl ValueVector for FixedWidthVector {
    fn name(&self) -> &FieldName {
        &self.name
    }

    fn field(&self) -> Field {
        Field::new(self.name.clone(), self.dtype.clone(), self.nullability)
    }

    fn minor_type(&self) -> MinorType {
        self.dtype.minor_type()
    }

    fn allocator(&self) -> &Arc<dyn BufferAllocator> {
        &self.allocator
    }

    fn allocate_with_capacity(&mut self, rows: usize) -> ColvecResult<()> {
        self.data.allocate(rows * self.width)?;
        self.validity.allocate(rows)?;
        self.value_count = 0;
        Ok(())
    }

    fn value_capacity(&self) -> usize {
        (self.data.capacity() / self.width).min(self.validity.capacity())
    }

    fn value_count(&self) -> usize {
        self.value_count
    }

    fn set_value_count(&mut self, count: usize) -> ColvecResult<()> {
        if count < self.value_count {
            self.validity.truncate(count)?;
        }
        self.value_count = count;
        Ok(())
    }

    fn clear(&mut self) {
        self.data.release();
        self.validity.release();
        self.value_count = 0;
    }

    fn is_null(&self, index: usize) -> bool {
        index >= self.value_count || !self.validity.is_valid(index)
    }

    fn set_null(&mut self, index: usize) -> ColvecResult<()> {
        check_nullable(&self.name, self.nullability)?;
        self.validity.set_null(index)?;
        self.value_count = self.value_count.max(index + 1);
        Ok(())
    }

    fn get_object(&self, index: usize) -> ColvecResult<Value> {
        if self.is_null(index) {
            return Ok(Value::Null);
        }
        let offset = index * self.width;
        Ok(match &self.dtype {
            DType::Primitive(ptype) => match ptype {
                PType::I8 => Value::I8(self.data.get(offset)?),
                PType::I16 => Value::I16(self.data.get(offset)?),
                PType::I32 => Value::I32(self.data.get(offset)?),
                PType::I64 => Value::I64(self.data.get(offset)?),
                PType::U8 => Value::U8(self.data.get(offset)?),
                PType::U16 => Value::U16(self.data.get(offset)?),
                PType::U32 => Value::U32(self.data.get(offset)?),
                PType::U64 => Value::U64(self.data.get(offset)?),
                PType::F16 => Value::F16(self.data.get::<f16>(offset)?),
                PType::F32 => Value::F32(self.data.get(offset)?),
                PType::F64 => Value::F64(self.data.get(offset)?),
            },
            DType::Decimal(dt) => Value::Decimal(self.data.get(offset)?, *dt),
            DType::Decimal256(dt) => Value::Decimal256(self.data.get::<i256>(offset)?, *dt),
            DType::Timestamp(unit, tz) => Value::Timestamp {
                value: self.data.get(offset)?,
                unit: *unit,
                tz: tz.clone(),
            },
            DType::Duration(unit) => Value::Duration {
                value: self.data.get(offset)?,
                unit: *unit,
            },
            DType::FixedSizeBinary(_) => {
                Value::FixedSizeBinary(self.data.bytes(offset, self.width)?.to_vec())
            }
            dtype => colvec_bail!(AssertionFailed: "{} is not a fixed-width type", dtype),
        })
    }
}

#[cfg(test)]
mod tests {
    use colvec_buffer::RootAllocator;
    use colvec_dtype::{DecimalDType, TimeUnit};
    use colvec_error::ColvecError;
    use rstest::rstest;

    use super::*;

    fn vector(dtype: DType) -> FixedWidthVector {
        FixedWidthVector::try_new(
            "v",
            dtype,
            Nullability::Nullable,
            Arc::new(RootAllocator::new()),
        )
        .unwrap()
    }

    #[rstest]
    #[case(Value::I8(-3))]
    #[case(Value::U64(u64::MAX))]
    #[case(Value::F16(f16::from_f32(1.5)))]
    #[case(Value::F64(2.25))]
    #[case(Value::Decimal(-12345, DecimalDType::try_new(10, 2).unwrap()))]
    #[case(Value::Decimal256(i256::from_i128(7), DecimalDType::try_new_256(50, 0).unwrap()))]
    #[case(Value::Timestamp { value: 86_400, unit: TimeUnit::Second, tz: Some("UTC".into()) })]
    #[case(Value::Duration { value: -5, unit: TimeUnit::Nanosecond })]
    #[case(Value::FixedSizeBinary(vec![1, 2, 3]))]
    fn stores_scalars(#[case] value: Value) {
        let mut vector = vector(value.dtype());
        vector.set_value(2, &value).unwrap();
        assert_eq!(vector.value_count(), 3);
        assert_eq!(vector.get_object(0).unwrap(), Value::Null);
        assert_eq!(vector.get_object(2).unwrap(), value);
    }

    #[test]
    fn mismatched_values_are_rejected() {
        let mut vector = vector(PType::I32.into());
        assert!(matches!(
            vector.set_value(0, &Value::I64(1)),
            Err(ColvecError::MismatchedTypes(..))
        ));
        assert!(vector.set::<i64>(0, 1).is_err());
        assert_eq!(vector.value_count(), 0);

        let mut binary = self::vector(DType::FixedSizeBinary(2));
        assert!(binary.set_bytes(0, &[1, 2, 3]).is_err());
        binary.set_bytes(1, &[4, 5]).unwrap();
        assert_eq!(binary.get_bytes(0).unwrap(), None);
        assert_eq!(binary.get_bytes(1).unwrap(), Some(&[4u8, 5][..]));
    }

    #[test]
    fn shrinking_hides_rows() {
        let mut vector = vector(PType::I32.into());
        vector.set(0, 1i32).unwrap();
        vector.set(1, 2i32).unwrap();
        vector.set_value_count(1).unwrap();
        vector.set_value_count(2).unwrap();
        assert_eq!(vector.get::<i32>(0).unwrap(), Some(1));
        assert_eq!(vector.get::<i32>(1).unwrap(), None);
    }

    #[test]
    fn rejects_variable_width_types() {
        assert!(
            FixedWidthVector::try_new(
                "s",
                DType::Utf8,
                Nullability::Nullable,
                Arc::new(RootAllocator::new())
            )
            .is_err()
        );
    }
}

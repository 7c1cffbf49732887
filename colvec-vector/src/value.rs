use std::fmt::{Display, Formatter};
use std::sync::Arc;

use arrow_buffer::i256;
use colvec_dtype::half::f16;
use colvec_dtype::{DType, DecimalDType, FieldName, PType, TimeUnit};
use itertools::Itertools;

/// A single materialised value, as written by writers and returned by `read_object`.
///
/// Nested values carry their elements inline. A `List` is written into whichever list encoding
/// the target vector uses.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A null of any type
    Null,
    /// A boolean
    Bool(bool),
    /// An 8-bit signed integer
    I8(i8),
    /// A 16-bit signed integer
    I16(i16),
    /// A 32-bit signed integer
    I32(i32),
    /// A 64-bit signed integer
    I64(i64),
    /// An 8-bit unsigned integer
    U8(u8),
    /// A 16-bit unsigned integer
    U16(u16),
    /// A 32-bit unsigned integer
    U32(u32),
    /// A 64-bit unsigned integer
    U64(u64),
    /// A 16-bit float
    F16(f16),
    /// A 32-bit float
    F32(f32),
    /// A 64-bit float
    F64(f64),
    /// An unscaled 128-bit decimal
    Decimal(i128, DecimalDType),
    /// An unscaled 256-bit decimal
    Decimal256(i256, DecimalDType),
    /// A timestamp since the epoch
    Timestamp {
        /// The number of `unit`s since the epoch
        value: i64,
        /// The resolution of `value`
        unit: TimeUnit,
        /// The time zone, if any
        tz: Option<Arc<str>>,
    },
    /// A signed duration
    Duration {
        /// The number of `unit`s
        value: i64,
        /// The resolution of `value`
        unit: TimeUnit,
    },
    /// Bytes stored at a fixed width equal to their length
    FixedSizeBinary(Vec<u8>),
    /// A string with 32-bit offsets
    Utf8(String),
    /// A string with 64-bit offsets
    LargeUtf8(String),
    /// Bytes with 32-bit offsets
    Binary(Vec<u8>),
    /// Bytes with 64-bit offsets
    LargeBinary(Vec<u8>),
    /// The elements of a list row
    List(Vec<Value>),
    /// The named fields of a struct row
    Struct(Vec<(FieldName, Value)>),
    /// The key-value entries of a map row
    Map(Vec<(Value, Value)>),
}

impl Value {
    /// Whether this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The type a vector needs in order to store this value.
    ///
    /// Lists and maps report their default encodings; writers keep whatever list or map
    /// encoding the target vector already has.
    pub fn dtype(&self) -> DType {
        match self {
            Value::Null => DType::Null,
            Value::Bool(_) => DType::Bool,
            Value::I8(_) => PType::I8.into(),
            Value::I16(_) => PType::I16.into(),
            Value::I32(_) => PType::I32.into(),
            Value::I64(_) => PType::I64.into(),
            Value::U8(_) => PType::U8.into(),
            Value::U16(_) => PType::U16.into(),
            Value::U32(_) => PType::U32.into(),
            Value::U64(_) => PType::U64.into(),
            Value::F16(_) => PType::F16.into(),
            Value::F32(_) => PType::F32.into(),
            Value::F64(_) => PType::F64.into(),
            Value::Decimal(_, dt) => DType::Decimal(*dt),
            Value::Decimal256(_, dt) => DType::Decimal256(*dt),
            Value::Timestamp { unit, tz, .. } => DType::Timestamp(*unit, tz.clone()),
            Value::Duration { unit, .. } => DType::Duration(*unit),
            Value::FixedSizeBinary(bytes) => DType::FixedSizeBinary(bytes.len()),
            Value::Utf8(_) => DType::Utf8,
            Value::LargeUtf8(_) => DType::LargeUtf8,
            Value::Binary(_) => DType::Binary,
            Value::LargeBinary(_) => DType::LargeBinary,
            Value::List(_) => DType::List,
            Value::Struct(_) => DType::Struct,
            Value::Map(_) => DType::Map { keys_sorted: false },
        }
    }
}

macro_rules! value_from {
    ($T:ty, $variant:ident) => {
        impl From<$T> for Value {
            fn from(value: $T) -> Self {
                Value::$variant(value)
            }
        }
    };
}

value_from!(bool, Bool);
value_from!(i8, I8);
value_from!(i16, I16);
value_from!(i32, I32);
value_from!(i64, I64);
value_from!(u8, U8);
value_from!(u16, U16);
value_from!(u32, U32);
value_from!(u64, U64);
value_from!(f16, F16);
value_from!(f32, F32);
value_from!(f64, F64);
value_from!(String, Utf8);
value_from!(Vec<u8>, Binary);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Utf8(value.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::I8(v) => write!(f, "{v}i8"),
            Value::I16(v) => write!(f, "{v}i16"),
            Value::I32(v) => write!(f, "{v}i32"),
            Value::I64(v) => write!(f, "{v}i64"),
            Value::U8(v) => write!(f, "{v}u8"),
            Value::U16(v) => write!(f, "{v}u16"),
            Value::U32(v) => write!(f, "{v}u32"),
            Value::U64(v) => write!(f, "{v}u64"),
            Value::F16(v) => write!(f, "{v}f16"),
            Value::F32(v) => write!(f, "{v}f32"),
            Value::F64(v) => write!(f, "{v}f64"),
            Value::Decimal(v, dt) => write!(f, "{v}_{dt}"),
            Value::Decimal256(v, dt) => write!(f, "{v}_{dt}"),
            Value::Timestamp { value, unit, tz } => match tz {
                Some(tz) => write!(f, "{value}{unit} {tz}"),
                None => write!(f, "{value}{unit}"),
            },
            Value::Duration { value, unit } => write!(f, "{value}{unit}"),
            Value::Utf8(s) | Value::LargeUtf8(s) => write!(f, "\"{s}\""),
            Value::FixedSizeBinary(b) | Value::Binary(b) | Value::LargeBinary(b) => {
                let hex = b.iter().format_with("", |byte, f| f(&format_args!("{byte:02x}")));
                write!(f, "0x{hex}")
            }
            Value::List(items) => write!(f, "[{}]", items.iter().format(", ")),
            Value::Struct(fields) => write!(
                f,
                "{{{}}}",
                fields
                    .iter()
                    .format_with(", ", |(name, v), f| f(&format_args!("{name}: {v}")))
            ),
            Value::Map(entries) => write!(
                f,
                "{{{}}}",
                entries
                    .iter()
                    .format_with(", ", |(k, v), f| f(&format_args!("{k} => {v}")))
            ),
        }
    }
}

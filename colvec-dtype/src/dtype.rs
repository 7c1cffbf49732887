use std::fmt::{Display, Formatter};
use std::sync::Arc;

use DType::*;

use crate::{DecimalDType, MinorType, PType, TimeUnit};

/// A name for a field in a struct or a vector
pub type FieldName = Arc<str>;

/// The logical type of a single vector.
///
/// A `DType` describes the vector itself but not its children: the element type of a list or
/// the fields of a struct are carried by the child [`crate::Field`]s. Nullability is likewise a
/// property of the field, not of the type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DType {
    /// The logical null type (only has a single value, `null`)
    Null,
    /// The logical boolean type, stored one bit per row
    Bool,
    /// Primitive, fixed-width numeric types
    Primitive(PType),
    /// A 128-bit decimal
    Decimal(DecimalDType),
    /// A 256-bit decimal
    Decimal256(DecimalDType),
    /// A 64-bit timestamp in `TimeUnit`s since the epoch, with an optional time zone
    Timestamp(TimeUnit, Option<Arc<str>>),
    /// A 64-bit signed duration in `TimeUnit`s
    Duration(TimeUnit),
    /// Binary values of exactly the given number of bytes
    FixedSizeBinary(usize),
    /// UTF-8 strings with 32-bit offsets
    Utf8,
    /// UTF-8 strings with 64-bit offsets
    LargeUtf8,
    /// Binary data with 32-bit offsets
    Binary,
    /// Binary data with 64-bit offsets
    LargeBinary,
    /// A variable-length list with one monotonic 32-bit offset buffer
    List,
    /// A variable-length list with one monotonic 64-bit offset buffer
    LargeList,
    /// A variable-length list with independent 32-bit offset and size buffers
    ListView,
    /// A variable-length list with independent 64-bit offset and size buffers
    LargeListView,
    /// A list where every row has exactly the given number of elements
    FixedSizeList(usize),
    /// An ordered set of named fields
    Struct,
    /// A list of key-value entries
    Map {
        /// Whether the keys of each row are sorted
        keys_sorted: bool,
    },
    /// A sparse union, holding one value of one of several variant types per row
    Union,
}

impl DType {
    /// The union tag of values of this type.
    pub fn minor_type(&self) -> MinorType {
        match self {
            Null => MinorType::Null,
            Bool => MinorType::Bit,
            Primitive(ptype) => ptype.minor_type(),
            Decimal(_) => MinorType::Decimal,
            Decimal256(_) => MinorType::Decimal256,
            Timestamp(unit, tz) => MinorType::timestamp(*unit, tz.is_some()),
            Duration(_) => MinorType::Duration,
            FixedSizeBinary(_) => MinorType::FixedSizeBinary,
            Utf8 => MinorType::VarChar,
            LargeUtf8 => MinorType::LargeVarChar,
            Binary => MinorType::VarBinary,
            LargeBinary => MinorType::LargeVarBinary,
            List => MinorType::List,
            LargeList => MinorType::LargeList,
            ListView => MinorType::ListView,
            LargeListView => MinorType::LargeListView,
            FixedSizeList(_) => MinorType::FixedSizeList,
            Struct => MinorType::Struct,
            Map { .. } => MinorType::Map,
            Union => MinorType::Union,
        }
    }

    /// The number of bytes each row occupies in the data buffer, for types stored at a fixed
    /// width in bytes.
    pub fn byte_width(&self) -> Option<usize> {
        match self {
            Primitive(ptype) => Some(ptype.byte_width()),
            Decimal(_) => Some(16),
            Decimal256(_) => Some(32),
            Timestamp(..) | Duration(_) => Some(8),
            FixedSizeBinary(width) => Some(*width),
            _ => None,
        }
    }

    /// Whether values of this type are stored through offsets into a byte buffer.
    pub fn is_variable_width(&self) -> bool {
        matches!(self, Utf8 | LargeUtf8 | Binary | LargeBinary)
    }

    /// Whether vectors of this type own child vectors.
    pub fn is_nested(&self) -> bool {
        self.minor_type().is_nested()
    }

    /// Whether this is one of the list encodings, including fixed-size lists.
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            List | LargeList | ListView | LargeListView | FixedSizeList(_)
        )
    }
}

impl From<PType> for DType {
    fn from(ptype: PType) -> Self {
        Primitive(ptype)
    }
}

impl Display for DType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Null => write!(f, "null"),
            Bool => write!(f, "bool"),
            Primitive(ptype) => write!(f, "{ptype}"),
            Decimal(dt) => write!(f, "{dt}"),
            Decimal256(dt) => write!(f, "decimal256({},{})", dt.precision(), dt.scale()),
            Timestamp(unit, None) => write!(f, "timestamp[{unit}]"),
            Timestamp(unit, Some(tz)) => write!(f, "timestamp[{unit}, tz={tz}]"),
            Duration(unit) => write!(f, "duration[{unit}]"),
            FixedSizeBinary(width) => write!(f, "fixed_size_binary[{width}]"),
            Utf8 => write!(f, "utf8"),
            LargeUtf8 => write!(f, "large_utf8"),
            Binary => write!(f, "binary"),
            LargeBinary => write!(f, "large_binary"),
            List => write!(f, "list"),
            LargeList => write!(f, "large_list"),
            ListView => write!(f, "list_view"),
            LargeListView => write!(f, "large_list_view"),
            FixedSizeList(size) => write!(f, "fixed_size_list[{size}]"),
            Struct => write!(f, "struct"),
            Map { keys_sorted: true } => write!(f, "map[sorted]"),
            Map { keys_sorted: false } => write!(f, "map"),
            Union => write!(f, "union"),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::DType;
    use crate::{MinorType, PType, TimeUnit};

    #[rstest]
    #[case(DType::Timestamp(TimeUnit::Second, None), MinorType::TimeStampSec, Some(8))]
    #[case(
        DType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
        MinorType::TimeStampMicroTz,
        Some(8)
    )]
    #[case(DType::FixedSizeBinary(5), MinorType::FixedSizeBinary, Some(5))]
    #[case(DType::Utf8, MinorType::VarChar, None)]
    #[case(DType::Bool, MinorType::Bit, None)]
    #[case(DType::LargeListView, MinorType::LargeListView, None)]
    fn tags_and_widths(
        #[case] dtype: DType,
        #[case] minor: MinorType,
        #[case] width: Option<usize>,
    ) {
        assert_eq!(dtype.minor_type(), minor);
        assert_eq!(dtype.byte_width(), width);
    }

    #[test]
    fn display() {
        assert_eq!(DType::from(PType::I64).to_string(), "i64");
        assert_eq!(
            DType::Timestamp(TimeUnit::Millisecond, Some("UTC".into())).to_string(),
            "timestamp[ms, tz=UTC]"
        );
        assert_eq!(DType::FixedSizeList(3).to_string(), "fixed_size_list[3]");
    }

    #[test]
    fn nesting() {
        assert!(DType::Map { keys_sorted: false }.is_nested());
        assert!(DType::FixedSizeList(2).is_list());
        assert!(!DType::Struct.is_list());
        assert!(DType::LargeBinary.is_variable_width());
        assert!(!DType::Primitive(PType::U8).is_nested());
    }
}

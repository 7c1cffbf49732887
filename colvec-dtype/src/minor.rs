use std::fmt::{Display, Formatter};

use colvec_error::{ColvecResult, colvec_err};
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::TimeUnit;

/// The flat type tag of a vector.
///
/// Union vectors store the discriminant of this enum once per row to record which variant holds
/// the row's value, so the discriminants are part of the buffer layout and must not be
/// reordered. `Null` (0) marks a null union row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, IntoPrimitive, TryFromPrimitive,
)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum MinorType {
    Null = 0,
    Bit,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    UInt1,
    UInt2,
    UInt4,
    UInt8,
    Float2,
    Float4,
    Float8,
    Decimal,
    Decimal256,
    TimeStampSec,
    TimeStampMilli,
    TimeStampMicro,
    TimeStampNano,
    TimeStampSecTz,
    TimeStampMilliTz,
    TimeStampMicroTz,
    TimeStampNanoTz,
    Duration,
    FixedSizeBinary,
    VarChar,
    LargeVarChar,
    VarBinary,
    LargeVarBinary,
    List,
    LargeList,
    ListView,
    LargeListView,
    FixedSizeList,
    Struct,
    Map,
    Union,
}

impl MinorType {
    /// Decode a type id read from a union type buffer.
    pub fn try_from_type_id(type_id: u8) -> ColvecResult<Self> {
        Self::try_from(type_id)
            .map_err(|_| colvec_err!(CorruptEncoding: "unknown union type id {}", type_id))
    }

    /// The id stored in a union type buffer for this type.
    #[inline]
    pub fn type_id(self) -> u8 {
        self.into()
    }

    /// The timestamp tag for `unit`, with or without a time zone.
    pub const fn timestamp(unit: TimeUnit, with_tz: bool) -> Self {
        match (unit, with_tz) {
            (TimeUnit::Second, false) => Self::TimeStampSec,
            (TimeUnit::Millisecond, false) => Self::TimeStampMilli,
            (TimeUnit::Microsecond, false) => Self::TimeStampMicro,
            (TimeUnit::Nanosecond, false) => Self::TimeStampNano,
            (TimeUnit::Second, true) => Self::TimeStampSecTz,
            (TimeUnit::Millisecond, true) => Self::TimeStampMilliTz,
            (TimeUnit::Microsecond, true) => Self::TimeStampMicroTz,
            (TimeUnit::Nanosecond, true) => Self::TimeStampNanoTz,
        }
    }

    /// Whether vectors of this type own a child data vector.
    pub const fn is_nested(self) -> bool {
        matches!(
            self,
            Self::List
                | Self::LargeList
                | Self::ListView
                | Self::LargeListView
                | Self::FixedSizeList
                | Self::Struct
                | Self::Map
                | Self::Union
        )
    }

    /// The lowercase name, also used to name union variant vectors.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bit => "bit",
            Self::TinyInt => "tinyint",
            Self::SmallInt => "smallint",
            Self::Int => "int",
            Self::BigInt => "bigint",
            Self::UInt1 => "uint1",
            Self::UInt2 => "uint2",
            Self::UInt4 => "uint4",
            Self::UInt8 => "uint8",
            Self::Float2 => "float2",
            Self::Float4 => "float4",
            Self::Float8 => "float8",
            Self::Decimal => "decimal",
            Self::Decimal256 => "decimal256",
            Self::TimeStampSec => "timestampsec",
            Self::TimeStampMilli => "timestampmilli",
            Self::TimeStampMicro => "timestampmicro",
            Self::TimeStampNano => "timestampnano",
            Self::TimeStampSecTz => "timestampsectz",
            Self::TimeStampMilliTz => "timestampmillitz",
            Self::TimeStampMicroTz => "timestampmicrotz",
            Self::TimeStampNanoTz => "timestampnanotz",
            Self::Duration => "duration",
            Self::FixedSizeBinary => "fixedsizebinary",
            Self::VarChar => "varchar",
            Self::LargeVarChar => "largevarchar",
            Self::VarBinary => "varbinary",
            Self::LargeVarBinary => "largevarbinary",
            Self::List => "list",
            Self::LargeList => "largelist",
            Self::ListView => "listview",
            Self::LargeListView => "largelistview",
            Self::FixedSizeList => "fixedsizelist",
            Self::Struct => "struct",
            Self::Map => "map",
            Self::Union => "union",
        }
    }
}

impl Display for MinorType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use colvec_error::ColvecError;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(MinorType::Null, 0)]
    #[case(MinorType::Bit, 1)]
    #[case(MinorType::Int, 4)]
    #[case(MinorType::VarChar, 25)]
    #[case(MinorType::Union, 36)]
    fn stable_type_ids(#[case] minor: MinorType, #[case] id: u8) {
        assert_eq!(minor.type_id(), id);
        assert_eq!(MinorType::try_from_type_id(id).unwrap(), minor);
    }

    #[test]
    fn unknown_type_id_is_corrupt() {
        assert!(matches!(
            MinorType::try_from_type_id(200),
            Err(ColvecError::CorruptEncoding(..))
        ));
    }

    #[test]
    fn timestamp_tags() {
        assert_eq!(
            MinorType::timestamp(TimeUnit::Millisecond, false),
            MinorType::TimeStampMilli
        );
        assert_eq!(
            MinorType::timestamp(TimeUnit::Nanosecond, true),
            MinorType::TimeStampNanoTz
        );
        assert_eq!(MinorType::TimeStampMicroTz.to_string(), "timestampmicrotz");
    }
}

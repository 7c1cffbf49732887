//! Physical type definitions and behavior.

use std::fmt::{Display, Formatter};

use colvec_buffer::NativeType;
use half::f16;

use crate::MinorType;

/// Physical type enum, represents the in-memory physical layout but might represent a different
/// logical type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PType {
    /// An 8-bit unsigned integer
    U8,
    /// A 16-bit unsigned integer
    U16,
    /// A 32-bit unsigned integer
    U32,
    /// A 64-bit unsigned integer
    U64,
    /// An 8-bit signed integer
    I8,
    /// A 16-bit signed integer
    I16,
    /// A 32-bit signed integer
    I32,
    /// A 64-bit signed integer
    I64,
    /// A 16-bit floating point number
    F16,
    /// A 32-bit floating point number
    F32,
    /// A 64-bit floating point number
    F64,
}

/// A Rust type that is the in-memory representation of a [`PType`].
pub trait NativePType: NativeType {
    /// The PType that corresponds to this native type
    const PTYPE: PType;
}

macro_rules! native_ptype {
    ($T:ty, $ptype:tt) => {
        impl NativePType for $T {
            const PTYPE: PType = PType::$ptype;
        }
    };
}

native_ptype!(u8, U8);
native_ptype!(u16, U16);
native_ptype!(u32, U32);
native_ptype!(u64, U64);
native_ptype!(i8, I8);
native_ptype!(i16, I16);
native_ptype!(i32, I32);
native_ptype!(i64, I64);
native_ptype!(f16, F16);
native_ptype!(f32, F32);
native_ptype!(f64, F64);

impl PType {
    /// Returns `true` iff this PType is an unsigned integer type
    pub const fn is_unsigned_int(self) -> bool {
        matches!(self, Self::U8 | Self::U16 | Self::U32 | Self::U64)
    }

    /// Returns `true` iff this PType is a signed integer type
    pub const fn is_signed_int(self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }

    /// Returns `true` iff this PType is an integer type, signed or unsigned
    pub const fn is_int(self) -> bool {
        self.is_unsigned_int() || self.is_signed_int()
    }

    /// Returns `true` iff this PType is a floating point type
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F16 | Self::F32 | Self::F64)
    }

    /// Returns the number of bytes in this PType
    pub const fn byte_width(&self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 | Self::F16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::U64 | Self::I64 | Self::F64 => 8,
        }
    }

    /// The union tag used for values of this physical type.
    pub const fn minor_type(&self) -> MinorType {
        match self {
            Self::U8 => MinorType::UInt1,
            Self::U16 => MinorType::UInt2,
            Self::U32 => MinorType::UInt4,
            Self::U64 => MinorType::UInt8,
            Self::I8 => MinorType::TinyInt,
            Self::I16 => MinorType::SmallInt,
            Self::I32 => MinorType::Int,
            Self::I64 => MinorType::BigInt,
            Self::F16 => MinorType::Float2,
            Self::F32 => MinorType::Float4,
            Self::F64 => MinorType::Float8,
        }
    }
}

impl Display for PType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::U8 => write!(f, "u8"),
            Self::U16 => write!(f, "u16"),
            Self::U32 => write!(f, "u32"),
            Self::U64 => write!(f, "u64"),
            Self::I8 => write!(f, "i8"),
            Self::I16 => write!(f, "i16"),
            Self::I32 => write!(f, "i32"),
            Self::I64 => write!(f, "i64"),
            Self::F16 => write!(f, "f16"),
            Self::F32 => write!(f, "f32"),
            Self::F64 => write!(f, "f64"),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(PType::I8, 1, MinorType::TinyInt)]
    #[case(PType::U16, 2, MinorType::UInt2)]
    #[case(PType::F16, 2, MinorType::Float2)]
    #[case(PType::I32, 4, MinorType::Int)]
    #[case(PType::F64, 8, MinorType::Float8)]
    fn widths_and_tags(#[case] ptype: PType, #[case] width: usize, #[case] minor: MinorType) {
        assert_eq!(ptype.byte_width(), width);
        assert_eq!(ptype.minor_type(), minor);
    }

    #[test]
    fn native_widths_agree() {
        assert_eq!(<i32 as NativeType>::WIDTH, <i32 as NativePType>::PTYPE.byte_width());
        assert_eq!(<f16 as NativeType>::WIDTH, <f16 as NativePType>::PTYPE.byte_width());
        assert_eq!(<u64 as NativeType>::WIDTH, <u64 as NativePType>::PTYPE.byte_width());
    }
}

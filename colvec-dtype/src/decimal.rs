use std::fmt::{Display, Formatter};

use colvec_error::{ColvecError, ColvecResult, colvec_bail, colvec_err};

use crate::DType;

/// Maximum precision of a 128-bit decimal
pub const DECIMAL128_MAX_PRECISION: u8 = 38;

/// Maximum precision of a 256-bit decimal
pub const DECIMAL256_MAX_PRECISION: u8 = 76;

/// Maximum scale of a 128-bit decimal
pub const DECIMAL128_MAX_SCALE: i8 = 38;

/// Maximum scale of a 256-bit decimal
pub const DECIMAL256_MAX_SCALE: i8 = 76;

/// Parameters that define the precision and scale of a decimal type.
///
/// Decimal values are stored as unscaled integers; the scale places the decimal point.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DecimalDType {
    precision: u8,
    scale: i8,
}

impl DecimalDType {
    /// Checked constructor for a 128-bit `DecimalDType`.
    pub fn try_new(precision: u8, scale: i8) -> ColvecResult<Self> {
        Self::validate(precision, scale, DECIMAL128_MAX_PRECISION, DECIMAL128_MAX_SCALE)
    }

    /// Checked constructor for a 256-bit `DecimalDType`.
    pub fn try_new_256(precision: u8, scale: i8) -> ColvecResult<Self> {
        Self::validate(precision, scale, DECIMAL256_MAX_PRECISION, DECIMAL256_MAX_SCALE)
    }

    fn validate(precision: u8, scale: i8, max_precision: u8, max_scale: i8) -> ColvecResult<Self> {
        if precision == 0 || precision > max_precision {
            colvec_bail!(
                "decimal precision {} outside of 1..={}",
                precision,
                max_precision
            );
        }
        if scale > max_scale {
            colvec_bail!("decimal scale {} exceeds {}", scale, max_scale);
        }
        Ok(Self { precision, scale })
    }

    /// The precision is the number of significant figures that the decimal tracks.
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// The scale is the maximum number of digits relative to the decimal point.
    ///
    /// Positive scale means digits after decimal point, negative scale means number of
    /// zeros before the decimal point.
    pub fn scale(&self) -> i8 {
        self.scale
    }
}

impl Display for DecimalDType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "decimal({},{})", self.precision, self.scale)
    }
}

impl TryFrom<&DType> for DecimalDType {
    type Error = ColvecError;

    fn try_from(value: &DType) -> Result<Self, Self::Error> {
        match value {
            DType::Decimal(dt) | DType::Decimal256(dt) => Ok(*dt),
            _ => Err(colvec_err!("Cannot convert DType {value} into DecimalDType")),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, 0)]
    #[case(39, 2)]
    #[case(10, 39)]
    fn rejects_out_of_range(#[case] precision: u8, #[case] scale: i8) {
        assert!(DecimalDType::try_new(precision, scale).is_err());
    }

    #[test]
    fn wide_decimals_allow_more_digits() {
        let dt = DecimalDType::try_new_256(60, 10).unwrap();
        assert_eq!(dt.precision(), 60);
        assert_eq!(dt.to_string(), "decimal(60,10)");
        assert_eq!(DecimalDType::try_from(&DType::Decimal256(dt)).unwrap(), dt);
        assert!(DecimalDType::try_from(&DType::Utf8).is_err());
    }
}

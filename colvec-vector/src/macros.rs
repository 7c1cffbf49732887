//! The scalar type table that the typed `write_*` and `read_*` entry points are generated from.

/// Invoke `$callback!` with one `name: Type => ValueVariant` entry per natively typed scalar.
macro_rules! for_each_native_scalar {
    ($callback:ident) => {
        $callback! {
            tiny_int: i8 => I8,
            small_int: i16 => I16,
            int: i32 => I32,
            big_int: i64 => I64,
            uint1: u8 => U8,
            uint2: u16 => U16,
            uint4: u32 => U32,
            uint8: u64 => U64,
            float2: ::colvec_dtype::half::f16 => F16,
            float4: f32 => F32,
            float8: f64 => F64,
            bit: bool => Bool,
        }
    };
}

macro_rules! native_scalar_writes {
    ($($name:ident: $T:ty => $variant:ident),* $(,)?) => {
        $crate::paste::paste! {
            $(
                #[doc = "Write a `" $name "` value at the current position."]
                pub fn [<write_ $name>](&mut self, value: $T) -> ::colvec_error::ColvecResult<()> {
                    self.write_value(&$crate::Value::$variant(value))
                }
            )*
        }
    };
}

/// Generate every typed `write_*` method on a writer that has
/// `write_value(&mut self, &Value) -> ColvecResult<()>`.
macro_rules! impl_scalar_writes {
    () => {
        for_each_native_scalar!(native_scalar_writes);

        /// Write a UTF-8 string with 32-bit offsets.
        pub fn write_var_char(&mut self, value: &str) -> ::colvec_error::ColvecResult<()> {
            self.write_value(&$crate::Value::Utf8(value.to_string()))
        }

        /// Write a UTF-8 string with 64-bit offsets.
        pub fn write_large_var_char(&mut self, value: &str) -> ::colvec_error::ColvecResult<()> {
            self.write_value(&$crate::Value::LargeUtf8(value.to_string()))
        }

        /// Write binary data with 32-bit offsets.
        pub fn write_var_binary(&mut self, value: &[u8]) -> ::colvec_error::ColvecResult<()> {
            self.write_value(&$crate::Value::Binary(value.to_vec()))
        }

        /// Write binary data with 64-bit offsets.
        pub fn write_large_var_binary(&mut self, value: &[u8]) -> ::colvec_error::ColvecResult<()> {
            self.write_value(&$crate::Value::LargeBinary(value.to_vec()))
        }

        /// Write binary data of a fixed width.
        pub fn write_fixed_size_binary(
            &mut self,
            value: &[u8],
        ) -> ::colvec_error::ColvecResult<()> {
            self.write_value(&$crate::Value::FixedSizeBinary(value.to_vec()))
        }

        /// Write an unscaled 128-bit decimal.
        pub fn write_decimal(
            &mut self,
            value: i128,
            dtype: ::colvec_dtype::DecimalDType,
        ) -> ::colvec_error::ColvecResult<()> {
            self.write_value(&$crate::Value::Decimal(value, dtype))
        }

        /// Write an unscaled 256-bit decimal.
        pub fn write_decimal256(
            &mut self,
            value: ::arrow_buffer::i256,
            dtype: ::colvec_dtype::DecimalDType,
        ) -> ::colvec_error::ColvecResult<()> {
            self.write_value(&$crate::Value::Decimal256(value, dtype))
        }

        /// Write a timestamp in `unit` since the epoch, optionally with a time zone.
        pub fn write_time_stamp(
            &mut self,
            value: i64,
            unit: ::colvec_dtype::TimeUnit,
            tz: Option<&str>,
        ) -> ::colvec_error::ColvecResult<()> {
            self.write_value(&$crate::Value::Timestamp {
                value,
                unit,
                tz: tz.map(Into::into),
            })
        }

        /// Write a duration in `unit`.
        pub fn write_duration(
            &mut self,
            value: i64,
            unit: ::colvec_dtype::TimeUnit,
        ) -> ::colvec_error::ColvecResult<()> {
            self.write_value(&$crate::Value::Duration { value, unit })
        }
    };
}

macro_rules! native_scalar_reads {
    ($($name:ident: $T:ty => $variant:ident),* $(,)?) => {
        $crate::paste::paste! {
            $(
                #[doc = "Read the `" $name "` value at the current position, `None` when it is null."]
                pub fn [<read_ $name>](&self) -> ::colvec_error::ColvecResult<Option<$T>> {
                    match self.read_object()? {
                        $crate::Value::Null => Ok(None),
                        $crate::Value::$variant(value) => Ok(Some(value)),
                        other => Err(::colvec_error::colvec_err!(
                            MismatchedTypes: stringify!($name),
                            other.dtype()
                        )),
                    }
                }
            )*
        }
    };
}

/// Generate every typed `read_*` method on a reader that has
/// `read_object(&self) -> ColvecResult<Value>`.
macro_rules! impl_scalar_reads {
    () => {
        for_each_native_scalar!(native_scalar_reads);

        native_scalar_reads! {
            var_char: String => Utf8,
            large_var_char: String => LargeUtf8,
            var_binary: Vec<u8> => Binary,
            large_var_binary: Vec<u8> => LargeBinary,
            fixed_size_binary: Vec<u8> => FixedSizeBinary,
        }

        /// Read the unscaled 128-bit decimal at the current position.
        pub fn read_decimal(&self) -> ::colvec_error::ColvecResult<Option<i128>> {
            match self.read_object()? {
                $crate::Value::Null => Ok(None),
                $crate::Value::Decimal(value, _) => Ok(Some(value)),
                other => Err(::colvec_error::colvec_err!(
                    MismatchedTypes: "decimal",
                    other.dtype()
                )),
            }
        }

        /// Read the unscaled 256-bit decimal at the current position.
        pub fn read_decimal256(
            &self,
        ) -> ::colvec_error::ColvecResult<Option<::arrow_buffer::i256>> {
            match self.read_object()? {
                $crate::Value::Null => Ok(None),
                $crate::Value::Decimal256(value, _) => Ok(Some(value)),
                other => Err(::colvec_error::colvec_err!(
                    MismatchedTypes: "decimal256",
                    other.dtype()
                )),
            }
        }

        /// Read the raw timestamp at the current position.
        pub fn read_time_stamp(&self) -> ::colvec_error::ColvecResult<Option<i64>> {
            match self.read_object()? {
                $crate::Value::Null => Ok(None),
                $crate::Value::Timestamp { value, .. } => Ok(Some(value)),
                other => Err(::colvec_error::colvec_err!(
                    MismatchedTypes: "timestamp",
                    other.dtype()
                )),
            }
        }

        /// Read the raw duration at the current position.
        pub fn read_duration(&self) -> ::colvec_error::ColvecResult<Option<i64>> {
            match self.read_object()? {
                $crate::Value::Null => Ok(None),
                $crate::Value::Duration { value, .. } => Ok(Some(value)),
                other => Err(::colvec_error::colvec_err!(
                    MismatchedTypes: "duration",
                    other.dtype()
                )),
            }
        }
    };
}

use std::fmt::Debug;

use arrow_buffer::i256;
use half::f16;

/// A fixed-width value that is stored little-endian inside a [`crate::ByteBuffer`].
pub trait NativeType: Copy + Debug + Default + PartialEq + Send + Sync + 'static {
    /// The number of bytes one value occupies.
    const WIDTH: usize;

    /// Decode a value from the first [`Self::WIDTH`] bytes of `bytes`.
    ///
    /// ## Panics
    ///
    /// Panics if `bytes` is shorter than [`Self::WIDTH`].
    fn read_le(bytes: &[u8]) -> Self;

    /// Encode the value into the first [`Self::WIDTH`] bytes of `dst`.
    ///
    /// ## Panics
    ///
    /// Panics if `dst` is shorter than [`Self::WIDTH`].
    fn write_le(self, dst: &mut [u8]);
}

macro_rules! native_type {
    ($T:ty) => {
        impl NativeType for $T {
            const WIDTH: usize = size_of::<$T>();

            #[inline]
            fn read_le(bytes: &[u8]) -> Self {
                let mut raw = [0u8; size_of::<$T>()];
                raw.copy_from_slice(&bytes[..size_of::<$T>()]);
                <$T>::from_le_bytes(raw)
            }

            #[inline]
            fn write_le(self, dst: &mut [u8]) {
                dst[..size_of::<$T>()].copy_from_slice(&self.to_le_bytes());
            }
        }
    };
}

native_type!(u8);
native_type!(u16);
native_type!(u32);
native_type!(u64);
native_type!(i8);
native_type!(i16);
native_type!(i32);
native_type!(i64);
native_type!(i128);
native_type!(i256);
native_type!(f16);
native_type!(f32);
native_type!(f64);

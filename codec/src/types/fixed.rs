//! Fixed-width integer codecs.
//!
//! The `IntNBit` family is little-endian. The `NetworkN` family is big-endian.

use crate::{
    buffer::{Endian, ReadBuffer, WriteBuffer},
    varint::check_safe,
    Error, FixedSize, Prepared, Typedef,
};

macro_rules! impl_fixed {
    ($(#[$doc:meta])* $name:ident, $type:ty, $read:ident, $write:ident, $endian:expr) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, Default)]
        pub struct $name;

        impl FixedSize for $name {
            const SIZE: usize = std::mem::size_of::<$type>();
        }

        impl Typedef for $name {
            type Value = $type;
            type Context = $type;

            #[inline]
            fn read(&self, buf: &mut ReadBuffer<'_>) -> Result<$type, Error> {
                buf.$read($endian)
            }

            #[inline]
            fn prepare(&self, value: &$type) -> Result<Prepared<$type>, Error> {
                Ok(Prepared::new(Self::SIZE, *value))
            }

            #[inline]
            fn write(&self, buf: &mut WriteBuffer<'_>, value: $type) -> Result<(), Error> {
                buf.$write(value, $endian)
            }
        }
    };
}

impl_fixed!(
    /// An unsigned 16-bit integer in little-endian byte order.
    Int16Bit, u16, read_u16, write_u16, Endian::Little
);
impl_fixed!(
    /// A signed 32-bit integer in little-endian byte order.
    Int32Bit, i32, read_i32, write_i32, Endian::Little
);
impl_fixed!(
    /// A signed 64-bit integer in little-endian byte order.
    Int64Bit, i64, read_i64, write_i64, Endian::Little
);
impl_fixed!(
    /// An unsigned 16-bit integer in network (big-endian) byte order.
    Network16, u16, read_u16, write_u16, Endian::Big
);
impl_fixed!(
    /// A signed 32-bit integer in network (big-endian) byte order.
    Network32, i32, read_i32, write_i32, Endian::Big
);
impl_fixed!(
    /// A signed 64-bit integer in network (big-endian) byte order.
    Network64, i64, read_i64, write_i64, Endian::Big
);

/// A signed 8-bit integer.
#[derive(Clone, Copy, Debug, Default)]
pub struct Int8Bit;

impl FixedSize for Int8Bit {
    const SIZE: usize = 1;
}

impl Typedef for Int8Bit {
    type Value = i8;
    type Context = i8;

    fn read(&self, buf: &mut ReadBuffer<'_>) -> Result<i8, Error> {
        buf.read_i8()
    }

    fn prepare(&self, value: &i8) -> Result<Prepared<i8>, Error> {
        Ok(Prepared::new(Self::SIZE, *value))
    }

    fn write(&self, buf: &mut WriteBuffer<'_>, value: i8) -> Result<(), Error> {
        buf.write_i8(value)
    }
}

/// A signed integer stored in 8 little-endian bytes, restricted to magnitudes up to 2^53 - 1.
///
/// Values outside the safe range fail with [Error::IntegerTooLarge] on both prepare and read.
#[derive(Clone, Copy, Debug, Default)]
pub struct Int53Bit;

impl FixedSize for Int53Bit {
    const SIZE: usize = 8;
}

impl Typedef for Int53Bit {
    type Value = i64;
    type Context = i64;

    fn read(&self, buf: &mut ReadBuffer<'_>) -> Result<i64, Error> {
        buf.checked(|buf| {
            let value = buf.read_i64(Endian::Little)?;
            check_safe(value as i128)?;
            Ok(value)
        })
    }

    fn prepare(&self, value: &i64) -> Result<Prepared<i64>, Error> {
        check_safe(*value as i128)?;
        Ok(Prepared::new(Self::SIZE, *value))
    }

    fn write(&self, buf: &mut WriteBuffer<'_>, value: i64) -> Result<(), Error> {
        buf.write_i64(value, Endian::Little)
    }
}

/// A polymorphic-variant tag: a 31-bit signed integer stored as `(n << 1) | 1` in 4
/// little-endian bytes.
#[derive(Clone, Copy, Debug, Default)]
pub struct VariantInt;

impl VariantInt {
    /// Smallest encodable value.
    pub const MIN: i32 = -(1 << 30);
    /// Largest encodable value.
    pub const MAX: i32 = (1 << 30) - 1;
}

impl FixedSize for VariantInt {
    const SIZE: usize = 4;
}

impl Typedef for VariantInt {
    type Value = i32;
    type Context = i32;

    fn read(&self, buf: &mut ReadBuffer<'_>) -> Result<i32, Error> {
        buf.checked(|buf| {
            let raw = buf.read_i32(Endian::Little)?;
            if raw & 1 == 0 {
                return Err(Error::MalformedVariantTag(raw));
            }
            Ok(raw >> 1)
        })
    }

    fn prepare(&self, value: &i32) -> Result<Prepared<i32>, Error> {
        if !(Self::MIN..=Self::MAX).contains(value) {
            return Err(Error::Encode(format!(
                "variant tag {value} is outside {}..={}",
                Self::MIN,
                Self::MAX
            )));
        }
        Ok(Prepared::new(Self::SIZE, (*value << 1) | 1))
    }

    fn write(&self, buf: &mut WriteBuffer<'_>, raw: i32) -> Result<(), Error> {
        buf.write_i32(raw, Endian::Little)
    }
}

//! Variable-length integer encoding and decoding
//!
//! This module implements the bin_prot variable-length integer schemes. A value is written as a
//! single byte when it fits in `0..=0x7F`. Otherwise a tag byte selects a fixed-width
//! little-endian escape:
//!
//! | tag    | payload                        | scheme          |
//! |--------|--------------------------------|-----------------|
//! | `0xFF` | 1 byte, two's complement       | signed only     |
//! | `0xFE` | 2 bytes                        | both            |
//! | `0xFD` | 4 bytes                        | both            |
//! | `0xFC` | 8 bytes                        | both            |
//!
//! The unsigned scheme ("nat0") yields encodings of 1, 3, 5 or 9 bytes. The signed scheme ("int")
//! yields 1, 2, 3, 5 or 9 bytes.
//!
//! Bytes `0x80..=0xFB` (and `0xFF` for nat0) are never produced by an encoder and are rejected by
//! the decoders.
//!
//! Two flavors exist for each scheme. [Nat0] and [Int] are restricted to the safe-integer range
//! (magnitudes up to 2^53 - 1, the integers an IEEE-754 double holds exactly) and fail with
//! [Error::IntegerTooLarge] outside it. [WideNat0] and [WideInt] cover the full 64-bit range and
//! never fail on magnitude.

use crate::{
    buffer::{Endian, ReadBuffer, WriteBuffer},
    Error, Prepared, RangeCfg, Typedef,
};
use bytes::BufMut;

/// Tag of the signed 8-bit escape.
pub const CODE_NEG_INT8: u8 = 0xFF;
/// Tag of the 16-bit escape.
pub const CODE_INT16: u8 = 0xFE;
/// Tag of the 32-bit escape.
pub const CODE_INT32: u8 = 0xFD;
/// Tag of the 64-bit escape.
pub const CODE_INT64: u8 = 0xFC;

/// Largest magnitude representable without precision loss by an IEEE-754 double.
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

const MAX_ENCODED: usize = 9;

/// A variable-length integer ready to be written.
///
/// Escape payloads hold the raw bit pattern of the value at the escape's width; the signed and
/// unsigned schemes share the same wire layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreparedInt {
    /// A value in `0..=0x7F`, written as itself.
    Byte(u8),
    /// `0xFF` followed by one byte.
    NegInt8(i8),
    /// `0xFE` followed by two bytes.
    Int16(u16),
    /// `0xFD` followed by four bytes.
    Int32(u32),
    /// `0xFC` followed by eight bytes.
    Int64(u64),
}

impl PreparedInt {
    /// Number of bytes this integer occupies on the wire.
    pub fn size(&self) -> usize {
        match self {
            PreparedInt::Byte(_) => 1,
            PreparedInt::NegInt8(_) => 2,
            PreparedInt::Int16(_) => 3,
            PreparedInt::Int32(_) => 5,
            PreparedInt::Int64(_) => 9,
        }
    }

    fn encode(&self) -> ([u8; MAX_ENCODED], usize) {
        let mut out = [0u8; MAX_ENCODED];
        let mut window = &mut out[..];
        match *self {
            PreparedInt::Byte(value) => window.put_u8(value),
            PreparedInt::NegInt8(value) => {
                window.put_u8(CODE_NEG_INT8);
                window.put_i8(value);
            }
            PreparedInt::Int16(value) => {
                window.put_u8(CODE_INT16);
                window.put_u16_le(value);
            }
            PreparedInt::Int32(value) => {
                window.put_u8(CODE_INT32);
                window.put_u32_le(value);
            }
            PreparedInt::Int64(value) => {
                window.put_u8(CODE_INT64);
                window.put_u64_le(value);
            }
        }
        (out, self.size())
    }
}

/// Selects the smallest unsigned encoding of `value`.
pub fn prepare_nat0(value: u64) -> PreparedInt {
    if value < 0x80 {
        PreparedInt::Byte(value as u8)
    } else if value < 0x1_0000 {
        PreparedInt::Int16(value as u16)
    } else if value < 0x1_0000_0000 {
        PreparedInt::Int32(value as u32)
    } else {
        PreparedInt::Int64(value)
    }
}

/// Selects the smallest signed encoding of `value`.
pub fn prepare_int(value: i64) -> PreparedInt {
    if value >= 0 {
        if value < 0x80 {
            PreparedInt::Byte(value as u8)
        } else if value < 0x8000 {
            PreparedInt::Int16(value as u16)
        } else if value < 0x8000_0000 {
            PreparedInt::Int32(value as u32)
        } else {
            PreparedInt::Int64(value as u64)
        }
    } else if value >= -0x80 {
        PreparedInt::NegInt8(value as i8)
    } else if value >= -0x8000 {
        PreparedInt::Int16(value as i16 as u16)
    } else if value >= -0x8000_0000 {
        PreparedInt::Int32(value as i32 as u32)
    } else {
        PreparedInt::Int64(value as u64)
    }
}

/// Writes a prepared integer.
///
/// The whole encoding is bounds-checked before the tag is written.
pub fn write_prepared(buf: &mut WriteBuffer<'_>, prepared: PreparedInt) -> Result<(), Error> {
    let (bytes, len) = prepared.encode();
    buf.blit(&bytes[..len], None)
}

/// Decodes an unsigned variable-length integer over the full `u64` range.
pub fn read_nat0(buf: &mut ReadBuffer<'_>) -> Result<u64, Error> {
    buf.checked(|buf| {
        let tag = buf.read_u8()?;
        match tag {
            0x00..=0x7F => Ok(tag as u64),
            CODE_INT16 => Ok(buf.read_u16(Endian::Little)? as u64),
            CODE_INT32 => Ok(buf.read_u32(Endian::Little)? as u64),
            CODE_INT64 => buf.read_u64(Endian::Little),
            _ => Err(Error::MalformedInt(tag)),
        }
    })
}

/// Decodes a signed variable-length integer over the full `i64` range.
pub fn read_int(buf: &mut ReadBuffer<'_>) -> Result<i64, Error> {
    buf.checked(|buf| {
        let tag = buf.read_u8()?;
        match tag {
            0x00..=0x7F => Ok(tag as i64),
            CODE_NEG_INT8 => Ok(buf.read_i8()? as i64),
            CODE_INT16 => Ok(buf.read_i16(Endian::Little)? as i64),
            CODE_INT32 => Ok(buf.read_i32(Endian::Little)? as i64),
            CODE_INT64 => buf.read_i64(Endian::Little),
            _ => Err(Error::MalformedInt(tag)),
        }
    })
}

/// Decodes a nat0 length or count and checks it against `limit`.
pub(crate) fn read_length(buf: &mut ReadBuffer<'_>, limit: &RangeCfg) -> Result<usize, Error> {
    let len = Nat0.read(buf)?;
    let len = usize::try_from(len).map_err(|_| Error::IntegerTooLarge(len as i128))?;
    if !limit.contains(len) {
        return Err(Error::InvalidLength(len));
    }
    Ok(len)
}

/// Fails unless the magnitude of `value` is within [MAX_SAFE_INTEGER].
pub(crate) fn check_safe(value: i128) -> Result<(), Error> {
    if value.unsigned_abs() > MAX_SAFE_INTEGER as u128 {
        return Err(Error::IntegerTooLarge(value));
    }
    Ok(())
}

/// Unsigned variable-length integer restricted to the safe-integer range.
#[derive(Clone, Copy, Debug, Default)]
pub struct Nat0;

impl Typedef for Nat0 {
    type Value = u64;
    type Context = PreparedInt;

    fn read(&self, buf: &mut ReadBuffer<'_>) -> Result<u64, Error> {
        buf.checked(|buf| {
            let value = read_nat0(buf)?;
            check_safe(value as i128)?;
            Ok(value)
        })
    }

    fn prepare(&self, value: &u64) -> Result<Prepared<PreparedInt>, Error> {
        check_safe(*value as i128)?;
        let prepared = prepare_nat0(*value);
        Ok(Prepared::new(prepared.size(), prepared))
    }

    fn write(&self, buf: &mut WriteBuffer<'_>, context: PreparedInt) -> Result<(), Error> {
        write_prepared(buf, context)
    }
}

/// Unsigned variable-length integer over the full `u64` range.
#[derive(Clone, Copy, Debug, Default)]
pub struct WideNat0;

impl Typedef for WideNat0 {
    type Value = u64;
    type Context = PreparedInt;

    fn read(&self, buf: &mut ReadBuffer<'_>) -> Result<u64, Error> {
        read_nat0(buf)
    }

    fn prepare(&self, value: &u64) -> Result<Prepared<PreparedInt>, Error> {
        let prepared = prepare_nat0(*value);
        Ok(Prepared::new(prepared.size(), prepared))
    }

    fn write(&self, buf: &mut WriteBuffer<'_>, context: PreparedInt) -> Result<(), Error> {
        write_prepared(buf, context)
    }
}

/// Signed variable-length integer restricted to the safe-integer range.
#[derive(Clone, Copy, Debug, Default)]
pub struct Int;

impl Typedef for Int {
    type Value = i64;
    type Context = PreparedInt;

    fn read(&self, buf: &mut ReadBuffer<'_>) -> Result<i64, Error> {
        buf.checked(|buf| {
            let value = read_int(buf)?;
            check_safe(value as i128)?;
            Ok(value)
        })
    }

    fn prepare(&self, value: &i64) -> Result<Prepared<PreparedInt>, Error> {
        check_safe(*value as i128)?;
        let prepared = prepare_int(*value);
        Ok(Prepared::new(prepared.size(), prepared))
    }

    fn write(&self, buf: &mut WriteBuffer<'_>, context: PreparedInt) -> Result<(), Error> {
        write_prepared(buf, context)
    }
}

/// Signed variable-length integer over the full `i64` range.
#[derive(Clone, Copy, Debug, Default)]
pub struct WideInt;

impl Typedef for WideInt {
    type Value = i64;
    type Context = PreparedInt;

    fn read(&self, buf: &mut ReadBuffer<'_>) -> Result<i64, Error> {
        read_int(buf)
    }

    fn prepare(&self, value: &i64) -> Result<Prepared<PreparedInt>, Error> {
        let prepared = prepare_int(*value);
        Ok(Prepared::new(prepared.size(), prepared))
    }

    fn write(&self, buf: &mut WriteBuffer<'_>, context: PreparedInt) -> Result<(), Error> {
        write_prepared(buf, context)
    }
}

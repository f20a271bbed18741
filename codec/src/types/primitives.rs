//! Single-value codecs: unit, bool, char and float.
//!
//! Every codec here is fixed-size. Unit and bool restrict the byte they accept on read; char
//! restricts the values it accepts on prepare.

use crate::{
    buffer::{Endian, ReadBuffer, WriteBuffer},
    Error, FixedSize, Prepared, Typedef,
};

/// The unit value, encoded as a single `0x00` byte.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unit;

impl FixedSize for Unit {
    const SIZE: usize = 1;
}

impl Typedef for Unit {
    type Value = ();
    type Context = ();

    fn read(&self, buf: &mut ReadBuffer<'_>) -> Result<(), Error> {
        buf.checked(|buf| match buf.read_u8()? {
            0 => Ok(()),
            byte => Err(Error::MalformedUnit(byte)),
        })
    }

    fn prepare(&self, _: &()) -> Result<Prepared<()>, Error> {
        Ok(Prepared::new(Self::SIZE, ()))
    }

    fn write(&self, buf: &mut WriteBuffer<'_>, _: ()) -> Result<(), Error> {
        buf.write_u8(0)
    }
}

/// A boolean, encoded as `0x00` or `0x01`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Bool;

impl FixedSize for Bool {
    const SIZE: usize = 1;
}

impl Typedef for Bool {
    type Value = bool;
    type Context = bool;

    fn read(&self, buf: &mut ReadBuffer<'_>) -> Result<bool, Error> {
        buf.checked(|buf| match buf.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            byte => Err(Error::MalformedBool(byte)),
        })
    }

    fn prepare(&self, value: &bool) -> Result<Prepared<bool>, Error> {
        Ok(Prepared::new(Self::SIZE, *value))
    }

    fn write(&self, buf: &mut WriteBuffer<'_>, value: bool) -> Result<(), Error> {
        buf.write_u8(value as u8)
    }
}

/// A single-byte character (code points `0..=255`).
#[derive(Clone, Copy, Debug, Default)]
pub struct Char;

impl FixedSize for Char {
    const SIZE: usize = 1;
}

impl Typedef for Char {
    type Value = char;
    type Context = u8;

    fn read(&self, buf: &mut ReadBuffer<'_>) -> Result<char, Error> {
        Ok(buf.read_u8()? as char)
    }

    fn prepare(&self, value: &char) -> Result<Prepared<u8>, Error> {
        let byte = u8::try_from(*value).map_err(|_| {
            Error::Encode(format!("character {value:?} does not fit in a single byte"))
        })?;
        Ok(Prepared::new(Self::SIZE, byte))
    }

    fn write(&self, buf: &mut WriteBuffer<'_>, byte: u8) -> Result<(), Error> {
        buf.write_u8(byte)
    }
}

/// An IEEE-754 double in little-endian byte order.
#[derive(Clone, Copy, Debug, Default)]
pub struct Float;

impl FixedSize for Float {
    const SIZE: usize = 8;
}

impl Typedef for Float {
    type Value = f64;
    type Context = f64;

    fn read(&self, buf: &mut ReadBuffer<'_>) -> Result<f64, Error> {
        buf.read_f64(Endian::Little)
    }

    fn prepare(&self, value: &f64) -> Result<Prepared<f64>, Error> {
        Ok(Prepared::new(Self::SIZE, *value))
    }

    fn write(&self, buf: &mut WriteBuffer<'_>, value: f64) -> Result<(), Error> {
        buf.write_f64(value, Endian::Little)
    }
}

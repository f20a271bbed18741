//! Length-prefixed byte sequences: UTF-8 strings and bigstrings.

use crate::{
    buffer::{ReadBuffer, WriteBuffer},
    varint::{prepare_nat0, read_length, write_prepared, PreparedInt},
    Error, Prepared, RangeCfg, Typedef,
};
use bytes::Bytes;

fn prepare_bytes(bytes: Bytes) -> Prepared<(PreparedInt, Bytes)> {
    let prefix = prepare_nat0(bytes.len() as u64);
    Prepared::new(prefix.size() + bytes.len(), (prefix, bytes))
}

fn write_bytes(
    buf: &mut WriteBuffer<'_>,
    (prefix, bytes): (PreparedInt, Bytes),
) -> Result<(), Error> {
    write_prepared(buf, prefix)?;
    buf.blit(&bytes, None)
}

/// A UTF-8 string prefixed by its byte length.
#[derive(Clone, Debug, Default)]
pub struct Str {
    limit: RangeCfg,
}

impl Str {
    /// Rejects decoded byte lengths outside `limit`.
    pub fn with_limit(mut self, limit: impl Into<RangeCfg>) -> Self {
        self.limit = limit.into();
        self
    }
}

impl Typedef for Str {
    type Value = String;
    type Context = (PreparedInt, Bytes);

    fn read(&self, buf: &mut ReadBuffer<'_>) -> Result<String, Error> {
        buf.checked(|buf| {
            let len = read_length(buf, &self.limit)?;
            Ok(buf.read_string(len)?.to_owned())
        })
    }

    fn prepare(&self, value: &String) -> Result<Prepared<Self::Context>, Error> {
        Ok(prepare_bytes(Bytes::copy_from_slice(value.as_bytes())))
    }

    fn write(&self, buf: &mut WriteBuffer<'_>, context: Self::Context) -> Result<(), Error> {
        write_bytes(buf, context)
    }
}

/// Raw bytes prefixed by their length.
#[derive(Clone, Debug, Default)]
pub struct Bigstring {
    limit: RangeCfg,
}

impl Bigstring {
    /// Rejects decoded lengths outside `limit`.
    pub fn with_limit(mut self, limit: impl Into<RangeCfg>) -> Self {
        self.limit = limit.into();
        self
    }
}

impl Typedef for Bigstring {
    type Value = Bytes;
    type Context = (PreparedInt, Bytes);

    fn read(&self, buf: &mut ReadBuffer<'_>) -> Result<Bytes, Error> {
        buf.checked(|buf| {
            let len = read_length(buf, &self.limit)?;
            Ok(Bytes::copy_from_slice(buf.read_bytes(len)?))
        })
    }

    fn prepare(&self, value: &Bytes) -> Result<Prepared<Self::Context>, Error> {
        Ok(prepare_bytes(value.clone()))
    }

    fn write(&self, buf: &mut WriteBuffer<'_>, context: Self::Context) -> Result<(), Error> {
        write_bytes(buf, context)
    }
}

//! Optional values.

use crate::{
    buffer::{ReadBuffer, WriteBuffer},
    types::primitives::Bool,
    Error, Prepared, Typedef,
};

/// A presence flag (`0x00` or `0x01`) followed by the payload when present.
#[derive(Clone, Debug)]
pub struct Optional<E> {
    inner: E,
}

impl<E: Typedef> Optional<E> {
    pub fn new(inner: E) -> Self {
        Self { inner }
    }
}

impl<E: Typedef> Typedef for Optional<E> {
    type Value = Option<E::Value>;
    type Context = Option<E::Context>;

    fn read(&self, buf: &mut ReadBuffer<'_>) -> Result<Self::Value, Error> {
        buf.checked(|buf| {
            if !Bool.read(buf)? {
                return Ok(None);
            }
            Ok(Some(self.inner.read(buf)?))
        })
    }

    fn prepare(&self, value: &Self::Value) -> Result<Prepared<Self::Context>, Error> {
        match value {
            None => Ok(Prepared::new(1, None)),
            Some(inner) => {
                let prepared = self.inner.prepare(inner)?;
                Ok(Prepared::new(1 + prepared.size, Some(prepared.context)))
            }
        }
    }

    fn write(&self, buf: &mut WriteBuffer<'_>, context: Self::Context) -> Result<(), Error> {
        match context {
            None => buf.write_u8(0),
            Some(context) => {
                buf.write_u8(1)?;
                self.inner.write(buf, context)
            }
        }
    }
}

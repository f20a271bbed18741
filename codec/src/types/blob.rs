//! Self-framing payloads.

use crate::{
    buffer::{ReadBuffer, WriteBuffer},
    types::fixed::Int53Bit,
    Error, FixedSize, Prepared, Typedef,
};
use tracing::debug;

/// A payload preceded by its encoded size as an [Int53Bit].
///
/// On read, the declared size must fit in the remaining region and the number of bytes consumed
/// by the payload must equal it.
#[derive(Clone, Debug)]
pub struct Blob<E> {
    inner: E,
}

impl<E: Typedef> Blob<E> {
    pub fn new(inner: E) -> Self {
        Self { inner }
    }
}

impl<E: Typedef> Typedef for Blob<E> {
    type Value = E::Value;
    type Context = (i64, E::Context);

    fn read(&self, buf: &mut ReadBuffer<'_>) -> Result<E::Value, Error> {
        buf.checked(|buf| {
            let declared = Int53Bit.read(buf)?;
            let remaining = buf.remaining().len();
            if i64::try_from(remaining).is_ok_and(|remaining| declared > remaining) {
                debug!(declared, remaining, "blob extends past region");
                return Err(Error::SizeMismatch {
                    declared,
                    read: remaining,
                });
            }
            let start = buf.position();
            let value = self.inner.read(buf)?;
            let read = buf.position() - start;
            if i64::try_from(read).ok() != Some(declared) {
                debug!(declared, read, "blob size mismatch");
                return Err(Error::SizeMismatch { declared, read });
            }
            Ok(value)
        })
    }

    fn prepare(&self, value: &E::Value) -> Result<Prepared<Self::Context>, Error> {
        let inner = self.inner.prepare(value)?;
        let declared = i64::try_from(inner.size)
            .map_err(|_| Error::IntegerTooLarge(inner.size as i128))?;
        Int53Bit.prepare(&declared)?;
        Ok(Prepared::new(
            Int53Bit::SIZE + inner.size,
            (declared, inner.context),
        ))
    }

    fn write(&self, buf: &mut WriteBuffer<'_>, (declared, context): Self::Context) -> Result<(), Error> {
        Int53Bit.write(buf, declared)?;
        self.inner.write(buf, context)
    }
}

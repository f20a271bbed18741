//! Homogeneous lists.

use crate::{
    buffer::{ReadBuffer, WriteBuffer},
    varint::{prepare_nat0, read_length, write_prepared, PreparedInt},
    Error, Prepared, RangeCfg, Typedef,
};

/// A nat0 element count followed by each element in order.
#[derive(Clone, Debug)]
pub struct List<E> {
    element: E,
    limit: RangeCfg,
}

impl<E: Typedef> List<E> {
    /// Creates a list codec over `element`.
    pub fn new(element: E) -> Self {
        Self {
            element,
            limit: RangeCfg::default(),
        }
    }

    /// Rejects decoded counts outside `limit`.
    pub fn with_limit(mut self, limit: impl Into<RangeCfg>) -> Self {
        self.limit = limit.into();
        self
    }
}

impl<E: Typedef> Typedef for List<E> {
    type Value = Vec<E::Value>;
    type Context = (PreparedInt, Vec<E::Context>);

    fn read(&self, buf: &mut ReadBuffer<'_>) -> Result<Self::Value, Error> {
        buf.checked(|buf| {
            let len = read_length(buf, &self.limit)?;

            // Every element occupies at least one byte.
            let mut items = Vec::with_capacity(len.min(buf.remaining().len()));
            for _ in 0..len {
                items.push(self.element.read(buf)?);
            }
            Ok(items)
        })
    }

    fn prepare(&self, value: &Self::Value) -> Result<Prepared<Self::Context>, Error> {
        let prefix = prepare_nat0(value.len() as u64);
        let mut size = prefix.size();
        let mut contexts = Vec::with_capacity(value.len());
        for item in value {
            let prepared = self.element.prepare(item)?;
            size += prepared.size;
            contexts.push(prepared.context);
        }
        Ok(Prepared::new(size, (prefix, contexts)))
    }

    fn write(&self, buf: &mut WriteBuffer<'_>, (prefix, contexts): Self::Context) -> Result<(), Error> {
        write_prepared(buf, prefix)?;
        for context in contexts {
            self.element.write(buf, context)?;
        }
        Ok(())
    }
}

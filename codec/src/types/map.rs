//! Hash tables.
//!
//! Entries are written in the map's iteration order. [IndexMap] iterates in insertion order, so a
//! given map always encodes to the same bytes and a decoded map keeps the wire order.

use crate::{
    buffer::{ReadBuffer, WriteBuffer},
    varint::{prepare_nat0, read_length, write_prepared, PreparedInt},
    Error, Prepared, RangeCfg, Typedef,
};
use indexmap::IndexMap;
use std::hash::Hash;

/// A nat0 entry count followed by each key and value.
#[derive(Clone, Debug)]
pub struct HashTable<K, V> {
    key: K,
    value: V,
    limit: RangeCfg,
}

impl<K: Typedef, V: Typedef> HashTable<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            limit: RangeCfg::default(),
        }
    }

    /// Rejects decoded entry counts outside `limit`.
    pub fn with_limit(mut self, limit: impl Into<RangeCfg>) -> Self {
        self.limit = limit.into();
        self
    }
}

impl<K, V> Typedef for HashTable<K, V>
where
    K: Typedef,
    K::Value: Hash + Eq,
    V: Typedef,
{
    type Value = IndexMap<K::Value, V::Value>;
    type Context = (PreparedInt, Vec<(K::Context, V::Context)>);

    fn read(&self, buf: &mut ReadBuffer<'_>) -> Result<Self::Value, Error> {
        buf.checked(|buf| {
            let len = read_length(buf, &self.limit)?;

            // Every entry occupies at least two bytes.
            let mut map = IndexMap::with_capacity(len.min(buf.remaining().len() / 2));
            for index in 0..len {
                let key = self.key.read(buf)?;
                let value = self.value.read(buf)?;
                if map.insert(key, value).is_some() {
                    return Err(Error::DuplicateKey(index));
                }
            }
            Ok(map)
        })
    }

    fn prepare(&self, value: &Self::Value) -> Result<Prepared<Self::Context>, Error> {
        let prefix = prepare_nat0(value.len() as u64);
        let mut size = prefix.size();
        let mut entries = Vec::with_capacity(value.len());
        for (k, v) in value {
            let k = self.key.prepare(k)?;
            let v = self.value.prepare(v)?;
            size += k.size + v.size;
            entries.push((k.context, v.context));
        }
        Ok(Prepared::new(size, (prefix, entries)))
    }

    fn write(&self, buf: &mut WriteBuffer<'_>, (prefix, entries): Self::Context) -> Result<(), Error> {
        write_prepared(buf, prefix)?;
        for (k, v) in entries {
            self.key.write(buf, k)?;
            self.value.write(buf, v)?;
        }
        Ok(())
    }
}

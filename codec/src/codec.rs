//! Core codec traits and implementations

use crate::{
    buffer::{ReadBuffer, WriteBuffer},
    error::Error,
};
use bytes::Bytes;

/// The size of an encoded value together with everything `write` needs to produce it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prepared<U> {
    /// Exact number of bytes `write` will produce.
    pub size: usize,
    /// Intermediate representation consumed by `write`.
    pub context: U,
}

impl<U> Prepared<U> {
    /// Creates a new prepared value.
    pub fn new(size: usize, context: U) -> Self {
        Self { size, context }
    }

    /// Transforms the context, keeping the size.
    pub fn map<V>(self, f: impl FnOnce(U) -> V) -> Prepared<V> {
        Prepared {
            size: self.size,
            context: f(self.context),
        }
    }
}

/// A read/prepare/write triple describing the encoding of one logical type.
///
/// Encoding is split into two passes. `prepare` computes the exact encoded size and a
/// [Typedef::Context] holding any work that should not be repeated (for example, the prepared
/// contexts of every element of a list). `write` then consumes that context. Composite codecs
/// therefore know their total size before a buffer is allocated, and never walk a nested value
/// twice.
///
/// # Example
///
/// ```
/// use binprot_codec::{types::primitives::Bool, ReadBuffer, Typedef, WriteBuffer};
///
/// let prepared = Bool.prepare(&true).unwrap();
/// let mut region = vec![0u8; prepared.size];
/// let mut buffer = WriteBuffer::new(&mut region);
/// Bool.write(&mut buffer, prepared.context).unwrap();
///
/// let mut buffer = ReadBuffer::new(&region);
/// assert!(Bool.read(&mut buffer).unwrap());
/// ```
pub trait Typedef {
    /// The logical value type.
    type Value;

    /// The intermediate representation produced by `prepare` and consumed by `write`.
    type Context;

    /// Decodes one value starting at the buffer's cursor.
    ///
    /// Advances the cursor by exactly the number of bytes that `prepare`/`write` would produce
    /// for the returned value. On failure the cursor is left where it was.
    fn read(&self, buf: &mut ReadBuffer<'_>) -> Result<Self::Value, Error>;

    /// Computes the encoded size of `value` and the context `write` needs.
    ///
    /// Must not write anywhere. Every encode-side error is raised here, so a failed encode never
    /// leaves a partially written buffer.
    fn prepare(&self, value: &Self::Value) -> Result<Prepared<Self::Context>, Error>;

    /// Writes exactly `size` bytes (as returned by the matching `prepare`) at the cursor.
    fn write(&self, buf: &mut WriteBuffer<'_>, context: Self::Context) -> Result<(), Error>;
}

impl<T: Typedef + ?Sized> Typedef for &T {
    type Value = T::Value;
    type Context = T::Context;

    #[inline]
    fn read(&self, buf: &mut ReadBuffer<'_>) -> Result<Self::Value, Error> {
        (**self).read(buf)
    }

    #[inline]
    fn prepare(&self, value: &Self::Value) -> Result<Prepared<Self::Context>, Error> {
        (**self).prepare(value)
    }

    #[inline]
    fn write(&self, buf: &mut WriteBuffer<'_>, context: Self::Context) -> Result<(), Error> {
        (**self).write(buf, context)
    }
}

/// Codecs whose every value encodes to the same number of bytes.
pub trait FixedSize {
    /// The encoded size of any value.
    const SIZE: usize;
}

/// Extension trait providing the convenience operations every [Typedef] supports.
pub trait TypedefExt: Typedef {
    /// Returns the encoded size of `value`.
    fn size(&self, value: &Self::Value) -> Result<usize, Error> {
        Ok(self.prepare(value)?.size)
    }

    /// Encodes `value` into a freshly allocated buffer of exactly the right size.
    fn pack(&self, value: &Self::Value) -> Result<Bytes, Error> {
        let Prepared { size, context } = self.prepare(value)?;
        let mut buffer = WriteBuffer::with_size(size);
        self.write(&mut buffer, context)?;
        debug_assert_eq!(buffer.position(), size, "write() did not write expected bytes");
        Ok(buffer.freeze())
    }

    /// Decodes one value starting at `offset` within `region`.
    ///
    /// Bytes after the value are ignored.
    fn read_at(&self, region: &[u8], offset: usize) -> Result<Self::Value, Error> {
        let region = region.get(offset..).ok_or(Error::BufferTooShort {
            index: offset,
            length: region.len(),
        })?;
        self.read(&mut ReadBuffer::new(region))
    }

    /// Encodes `value` at `offset` within `region`, returning the number of bytes written.
    ///
    /// Nothing is written if the value does not fit.
    fn write_at(&self, region: &mut [u8], value: &Self::Value, offset: usize) -> Result<usize, Error> {
        let length = region.len();
        let region = region.get_mut(offset..).ok_or(Error::BufferTooShort {
            index: offset,
            length,
        })?;
        let Prepared { size, context } = self.prepare(value)?;
        if size > region.len() {
            return Err(Error::BufferTooShort {
                index: offset + size,
                length,
            });
        }
        let mut buffer = WriteBuffer::new(region);
        self.write(&mut buffer, context)?;
        Ok(buffer.position())
    }

    /// Decodes one value from `region`, ensuring the region is fully consumed.
    fn decode(&self, region: &[u8]) -> Result<Self::Value, Error> {
        let mut buffer = ReadBuffer::new(region);
        let value = self.read(&mut buffer)?;

        // Check that the region is fully consumed.
        let remaining = buffer.remaining().len();
        if remaining > 0 {
            return Err(Error::ExtraData(remaining));
        }
        Ok(value)
    }

    /// Adapts this codec to another value type.
    ///
    /// `from` converts decoded values, `into` converts values before they are prepared. This is
    /// how a [crate::types::record::Record] (whose value is a tuple) becomes a codec for a struct.
    fn map<S, F, G>(self, from: F, into: G) -> Mapped<Self, F, G>
    where
        Self: Sized,
        F: Fn(Self::Value) -> S,
        G: Fn(&S) -> Self::Value,
    {
        Mapped {
            inner: self,
            from,
            into,
        }
    }
}

// Automatically implement `TypedefExt` for every `Typedef`.
impl<T: Typedef + ?Sized> TypedefExt for T {}

/// A codec adapted to another value type by a pair of conversions. See [TypedefExt::map].
#[derive(Clone, Debug)]
pub struct Mapped<T, F, G> {
    inner: T,
    from: F,
    into: G,
}

impl<T, S, F, G> Typedef for Mapped<T, F, G>
where
    T: Typedef,
    F: Fn(T::Value) -> S,
    G: Fn(&S) -> T::Value,
{
    type Value = S;
    type Context = T::Context;

    fn read(&self, buf: &mut ReadBuffer<'_>) -> Result<S, Error> {
        self.inner.read(buf).map(&self.from)
    }

    fn prepare(&self, value: &S) -> Result<Prepared<T::Context>, Error> {
        self.inner.prepare(&(self.into)(value))
    }

    fn write(&self, buf: &mut WriteBuffer<'_>, context: T::Context) -> Result<(), Error> {
        self.inner.write(buf, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        types::{fixed::Int32Bit, primitives::Bool},
        varint::Nat0,
    };

    #[test]
    fn test_pack_and_size() {
        assert_eq!(Nat0.size(&200).unwrap(), 3);
        assert_eq!(Nat0.pack(&200).unwrap(), Bytes::from_static(&[0xFE, 0xC8, 0x00]));
        assert_eq!(Int32Bit.pack(&-1).unwrap().len(), 4);
    }

    #[test]
    fn test_read_write_at_offset() {
        let mut region = [0u8; 8];
        let written = Int32Bit.write_at(&mut region, &0x01020304, 2).unwrap();
        assert_eq!(written, 4);
        assert_eq!(region, [0, 0, 0x04, 0x03, 0x02, 0x01, 0, 0]);
        assert_eq!(Int32Bit.read_at(&region, 2).unwrap(), 0x01020304);
    }

    #[test]
    fn test_write_at_does_not_fit() {
        let mut region = [0xAAu8; 5];
        assert_eq!(
            Int32Bit.write_at(&mut region, &7, 2),
            Err(Error::BufferTooShort {
                index: 6,
                length: 5
            })
        );
        assert_eq!(region, [0xAA; 5]);
        assert!(Int32Bit.write_at(&mut region, &7, 6).is_err());
        assert!(Int32Bit.read_at(&region, 6).is_err());
    }

    #[test]
    fn test_decode_extra_data() {
        assert!(Bool.decode(&[0x01]).unwrap());
        assert_eq!(Bool.decode(&[0x01, 0x02]), Err(Error::ExtraData(1)));
    }

    #[test]
    fn test_map() {
        #[derive(Debug, PartialEq)]
        struct Flag(bool);

        let codec = Bool.map(Flag, |flag: &Flag| flag.0);
        let encoded = codec.pack(&Flag(true)).unwrap();
        assert_eq!(encoded, Bytes::from_static(&[0x01]));
        assert_eq!(codec.decode(&encoded).unwrap(), Flag(true));
    }

    #[test]
    fn test_reference_is_typedef() {
        let codec = &Bool;
        assert_eq!(codec.pack(&false).unwrap(), Bytes::from_static(&[0x00]));
    }
}

//! Cursors over caller-supplied byte regions.
//!
//! [ReadBuffer] borrows the bytes it decodes from and keeps a stack of boundary checkpoints. A
//! decode step wrapped in [ReadBuffer::checked] either succeeds and keeps the advanced cursor, or
//! fails and leaves the cursor exactly where the step began. Nested steps nest their checkpoints,
//! so a corrupt byte deep inside a composite value unwinds the whole composite.
//!
//! [WriteBuffer] appends sequentially into a borrowed region or into a region it allocated itself.
//!
//! Every access is bounds-checked before any byte is read or written.

use crate::Error;
use binprot_utils::hexdump;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::trace;

/// Byte order of a multi-byte primitive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

/// Sequential reader over a borrowed byte region.
#[derive(Debug)]
pub struct ReadBuffer<'a> {
    contents: &'a [u8],
    ptr: usize,
    boundaries: Vec<usize>,
}

macro_rules! impl_read {
    ($name:ident, $type:ty, $get_be:ident, $get_le:ident) => {
        #[doc = concat!("Reads a `", stringify!($type), "` in the given byte order.")]
        #[inline]
        pub fn $name(&mut self, endian: Endian) -> Result<$type, Error> {
            let mut chunk = self.take(std::mem::size_of::<$type>())?;
            Ok(match endian {
                Endian::Little => chunk.$get_le(),
                Endian::Big => chunk.$get_be(),
            })
        }
    };
}

impl<'a> ReadBuffer<'a> {
    /// Creates a reader positioned at the start of `contents`.
    pub fn new(contents: &'a [u8]) -> Self {
        Self {
            contents,
            ptr: 0,
            boundaries: Vec::new(),
        }
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.ptr
    }

    /// Length of the whole region.
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    /// Returns true if the region is empty.
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Bytes between the cursor and the end of the region.
    pub fn remaining(&self) -> &'a [u8] {
        &self.contents[self.ptr..]
    }

    /// Returns the bytes in `[begin, end)` relative to the cursor without advancing it.
    ///
    /// A missing `end` extends to the end of the region.
    pub fn slice(&self, begin: usize, end: Option<usize>) -> Result<&'a [u8], Error> {
        let start = self.offset(begin)?;
        let stop = match end {
            Some(end) => self.offset(end)?,
            None => self.contents.len(),
        };
        self.assert_length(start)?;
        self.assert_length(stop)?;
        if start > stop {
            return Err(Error::BufferTooShort {
                index: start,
                length: stop,
            });
        }
        Ok(&self.contents[start..stop])
    }

    /// Runs `f` as one all-or-nothing decode step.
    ///
    /// A checkpoint is pushed before `f` runs. On success it is discarded and the cursor stays
    /// where `f` left it. On failure the cursor is reset to the checkpoint before the error is
    /// returned.
    pub fn checked<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, Error>,
    ) -> Result<T, Error> {
        self.push_boundary();
        match f(self) {
            Ok(value) => {
                self.pop_boundary();
                Ok(value)
            }
            Err(err) => {
                self.reset_pointer(&err);
                Err(err)
            }
        }
    }

    fn push_boundary(&mut self) {
        self.boundaries.push(self.ptr);
    }

    fn pop_boundary(&mut self) {
        self.boundaries.pop();
    }

    fn reset_pointer(&mut self, err: &Error) {
        if let Some(boundary) = self.boundaries.pop() {
            trace!(from = self.ptr, to = boundary, %err, "rolled back read cursor");
            self.ptr = boundary;
        }
    }

    fn assert_length(&self, index: usize) -> Result<(), Error> {
        if index > self.contents.len() {
            return Err(Error::BufferTooShort {
                index,
                length: self.contents.len(),
            });
        }
        Ok(())
    }

    /// Index `n` bytes past the cursor.
    fn offset(&self, n: usize) -> Result<usize, Error> {
        self.ptr.checked_add(n).ok_or(Error::BufferTooShort {
            index: usize::MAX,
            length: self.contents.len(),
        })
    }

    /// Returns the next `n` bytes and advances past them.
    fn take(&mut self, n: usize) -> Result<&'a [u8], Error> {
        let end = self.offset(n)?;
        self.assert_length(end)?;
        let chunk = &self.contents[self.ptr..end];
        self.ptr = end;
        Ok(chunk)
    }

    /// Returns the byte under the cursor without advancing.
    pub fn peek_u8(&self) -> Result<u8, Error> {
        self.assert_length(self.offset(1)?)?;
        Ok(self.contents[self.ptr])
    }

    /// Reads one unsigned byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, Error> {
        Ok(self.take(1)?.get_u8())
    }

    /// Reads one signed byte.
    #[inline]
    pub fn read_i8(&mut self) -> Result<i8, Error> {
        Ok(self.take(1)?.get_i8())
    }

    impl_read!(read_u16, u16, get_u16, get_u16_le);
    impl_read!(read_i16, i16, get_i16, get_i16_le);
    impl_read!(read_u32, u32, get_u32, get_u32_le);
    impl_read!(read_i32, i32, get_i32, get_i32_le);
    impl_read!(read_u64, u64, get_u64, get_u64_le);
    impl_read!(read_i64, i64, get_i64, get_i64_le);
    impl_read!(read_f64, f64, get_f64, get_f64_le);

    /// Reads `n` raw bytes as a view into the region.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], Error> {
        self.take(n)
    }

    /// Reads `n` bytes as UTF-8 text.
    ///
    /// The cursor does not move if the bytes are not valid UTF-8.
    pub fn read_string(&mut self, n: usize) -> Result<&'a str, Error> {
        self.checked(|buf| Ok(std::str::from_utf8(buf.take(n)?)?))
    }
}

enum Region<'a> {
    Borrowed(&'a mut [u8]),
    Owned(BytesMut),
}

impl Region<'_> {
    fn as_slice(&self) -> &[u8] {
        match self {
            Region::Borrowed(region) => &region[..],
            Region::Owned(region) => &region[..],
        }
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        match self {
            Region::Borrowed(region) => &mut region[..],
            Region::Owned(region) => &mut region[..],
        }
    }
}

/// Sequential writer into a fixed-size byte region.
pub struct WriteBuffer<'a> {
    contents: Region<'a>,
    ptr: usize,
}

macro_rules! impl_write {
    ($name:ident, $type:ty, $put_be:ident, $put_le:ident) => {
        #[doc = concat!("Writes a `", stringify!($type), "` in the given byte order.")]
        #[inline]
        pub fn $name(&mut self, value: $type, endian: Endian) -> Result<(), Error> {
            let mut window = self.advance(std::mem::size_of::<$type>())?;
            match endian {
                Endian::Little => window.$put_le(value),
                Endian::Big => window.$put_be(value),
            }
            Ok(())
        }
    };
}

impl<'a> WriteBuffer<'a> {
    /// Creates a writer positioned at the start of `region`.
    pub fn new(region: &'a mut [u8]) -> Self {
        Self {
            contents: Region::Borrowed(region),
            ptr: 0,
        }
    }

    /// Creates a writer over `region` after filling it with zeroes.
    pub fn zeroed(region: &'a mut [u8]) -> Self {
        region.fill(0);
        Self::new(region)
    }

    /// Current cursor position (the number of bytes written so far).
    pub fn position(&self) -> usize {
        self.ptr
    }

    /// Length of the whole region.
    pub fn capacity(&self) -> usize {
        self.contents.as_slice().len()
    }

    /// Reserves the next `n` bytes and advances past them.
    fn advance(&mut self, n: usize) -> Result<&mut [u8], Error> {
        let capacity = self.capacity();
        let start = self.ptr;
        let end = start.checked_add(n).ok_or(Error::BufferTooShort {
            index: usize::MAX,
            length: capacity,
        })?;
        if end > capacity {
            return Err(Error::BufferTooShort {
                index: end,
                length: capacity,
            });
        }
        self.ptr = end;
        Ok(&mut self.contents.as_mut_slice()[start..end])
    }

    /// Writes one unsigned byte.
    #[inline]
    pub fn write_u8(&mut self, value: u8) -> Result<(), Error> {
        self.advance(1)?.put_u8(value);
        Ok(())
    }

    /// Writes one signed byte.
    #[inline]
    pub fn write_i8(&mut self, value: i8) -> Result<(), Error> {
        self.advance(1)?.put_i8(value);
        Ok(())
    }

    impl_write!(write_u16, u16, put_u16, put_u16_le);
    impl_write!(write_i16, i16, put_i16, put_i16_le);
    impl_write!(write_u32, u32, put_u32, put_u32_le);
    impl_write!(write_i32, i32, put_i32, put_i32_le);
    impl_write!(write_u64, u64, put_u64, put_u64_le);
    impl_write!(write_i64, i64, put_i64, put_i64_le);
    impl_write!(write_f64, f64, put_f64, put_f64_le);

    /// Copies `bytes` (or its first `length` bytes) to the cursor.
    pub fn blit(&mut self, bytes: &[u8], length: Option<usize>) -> Result<(), Error> {
        let len = length.unwrap_or(bytes.len());
        if len > bytes.len() {
            return Err(Error::BufferTooShort {
                index: len,
                length: bytes.len(),
            });
        }
        self.advance(len)?.copy_from_slice(&bytes[..len]);
        Ok(())
    }

    /// The written prefix `[0, position)`.
    pub fn finalize(&self) -> &[u8] {
        &self.contents.as_slice()[..self.ptr]
    }

    /// The written prefix as owned [Bytes].
    pub fn freeze(self) -> Bytes {
        match self.contents {
            Region::Borrowed(region) => Bytes::copy_from_slice(&region[..self.ptr]),
            Region::Owned(mut region) => {
                region.truncate(self.ptr);
                region.freeze()
            }
        }
    }

    /// Renders the written prefix with [hexdump], padded to `max_len` columns.
    pub fn hexdump(&self, max_len: usize) -> Result<String, Error> {
        let written = self.finalize();
        hexdump(written, max_len).ok_or(Error::BufferTooShort {
            index: written.len(),
            length: max_len,
        })
    }
}

impl WriteBuffer<'static> {
    /// Creates a writer over a freshly allocated, zero-filled region of `size` bytes.
    pub fn with_size(size: usize) -> Self {
        Self {
            contents: Region::Owned(BytesMut::zeroed(size)),
            ptr: 0,
        }
    }
}

//! 16-byte MD5 digests.
//!
//! [Md5] is an immutable digest value ordered byte by byte. Its lowercase hex rendering is
//! computed on first use and cached. [Digest] encodes any [DigestBytes] value as 16 raw bytes
//! with no length prefix.
//!
//! # Example
//!
//! ```
//! use binprot_codec::{Digest, Md5, TypedefExt};
//!
//! let digest: Md5 = "0123456789abcdef0123456789abcdef".parse().unwrap();
//! let encoded = Digest::<Md5>::default().pack(&digest).unwrap();
//! assert_eq!(encoded.len(), 16);
//! assert_eq!(encoded[0], 0x01);
//! assert_eq!(digest.to_string(), "0123456789abcdef0123456789abcdef");
//! ```

use crate::{
    buffer::{ReadBuffer, WriteBuffer},
    Error, FixedSize, Prepared, Typedef,
};
use binprot_utils::{from_hex, hex};
use std::{
    cmp::Ordering,
    fmt::{Debug, Display},
    hash::{Hash, Hasher},
    marker::PhantomData,
    str::FromStr,
    sync::OnceLock,
};

/// Length of an MD5 digest in bytes.
pub const DIGEST_LENGTH: usize = 16;

/// An MD5 digest.
#[derive(Clone, Default)]
pub struct Md5 {
    bytes: [u8; DIGEST_LENGTH],
    hex: OnceLock<String>,
}

impl Md5 {
    pub fn new(bytes: [u8; DIGEST_LENGTH]) -> Self {
        Self {
            bytes,
            hex: OnceLock::new(),
        }
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LENGTH] {
        &self.bytes
    }

    /// Lowercase hex rendering, computed once per instance.
    pub fn to_hex(&self) -> &str {
        self.hex.get_or_init(|| hex(&self.bytes))
    }
}

impl From<[u8; DIGEST_LENGTH]> for Md5 {
    fn from(value: [u8; DIGEST_LENGTH]) -> Self {
        Self::new(value)
    }
}

impl TryFrom<&[u8]> for Md5 {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; DIGEST_LENGTH] = value
            .try_into()
            .map_err(|_| Error::InvalidLength(value.len()))?;
        Ok(Self::new(bytes))
    }
}

impl FromStr for Md5 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = from_hex(s).ok_or_else(|| Error::Encode(format!("invalid hex digest: {s:?}")))?;
        Self::try_from(bytes.as_slice())
    }
}

impl AsRef<[u8]> for Md5 {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl PartialEq for Md5 {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for Md5 {}

impl PartialOrd for Md5 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Md5 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bytes.cmp(&other.bytes)
    }
}

impl Hash for Md5 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl Debug for Md5 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Md5({})", self.to_hex())
    }
}

impl Display for Md5 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_hex())
    }
}

/// Values that can be encoded as a 16-byte digest.
pub trait DigestBytes: Sized {
    /// Builds a value from decoded digest bytes.
    fn from_digest_bytes(bytes: [u8; DIGEST_LENGTH]) -> Result<Self, Error>;

    /// The bytes to encode. Anything other than exactly 16 bytes is rejected at prepare.
    fn as_digest_bytes(&self) -> &[u8];
}

impl DigestBytes for Md5 {
    fn from_digest_bytes(bytes: [u8; DIGEST_LENGTH]) -> Result<Self, Error> {
        Ok(Self::new(bytes))
    }

    fn as_digest_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl DigestBytes for [u8; DIGEST_LENGTH] {
    fn from_digest_bytes(bytes: [u8; DIGEST_LENGTH]) -> Result<Self, Error> {
        Ok(bytes)
    }

    fn as_digest_bytes(&self) -> &[u8] {
        self
    }
}

impl DigestBytes for Vec<u8> {
    fn from_digest_bytes(bytes: [u8; DIGEST_LENGTH]) -> Result<Self, Error> {
        Ok(bytes.to_vec())
    }

    fn as_digest_bytes(&self) -> &[u8] {
        self
    }
}

/// Codec for 16 raw digest bytes.
pub struct Digest<T = Md5> {
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Default for Digest<T> {
    fn default() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<T> Clone for Digest<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Digest<T> {}

impl<T> Debug for Digest<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Digest")
    }
}

impl<T> FixedSize for Digest<T> {
    const SIZE: usize = DIGEST_LENGTH;
}

impl<T: DigestBytes> Typedef for Digest<T> {
    type Value = T;
    type Context = [u8; DIGEST_LENGTH];

    fn read(&self, buf: &mut ReadBuffer<'_>) -> Result<T, Error> {
        buf.checked(|buf| {
            let bytes = buf.read_bytes(DIGEST_LENGTH)?;
            let mut digest = [0u8; DIGEST_LENGTH];
            digest.copy_from_slice(bytes);
            T::from_digest_bytes(digest)
        })
    }

    fn prepare(&self, value: &T) -> Result<Prepared<Self::Context>, Error> {
        let bytes = value.as_digest_bytes();
        let digest: [u8; DIGEST_LENGTH] = bytes.try_into().map_err(|_| {
            Error::Encode(format!(
                "digest must be {DIGEST_LENGTH} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Prepared::new(DIGEST_LENGTH, digest))
    }

    fn write(&self, buf: &mut WriteBuffer<'_>, digest: Self::Context) -> Result<(), Error> {
        buf.blit(&digest, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypedefExt;
    use std::collections::BTreeSet;

    const SAMPLE: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_hex_round_trip() {
        let digest: Md5 = SAMPLE.parse().unwrap();
        assert_eq!(digest.as_bytes()[..2], [0x01, 0x23]);
        assert_eq!(digest.to_hex(), SAMPLE);
        assert_eq!(digest.to_string(), SAMPLE);
        assert_eq!(format!("{digest:?}"), format!("Md5({SAMPLE})"));

        // The cached rendering survives a clone.
        let copy = digest.clone();
        assert_eq!(copy.to_hex(), SAMPLE);
    }

    #[test]
    fn test_invalid_construction() {
        assert_eq!(
            Md5::try_from(&[0u8; 15][..]),
            Err(Error::InvalidLength(15))
        );
        assert!(matches!("0123".parse::<Md5>(), Err(Error::InvalidLength(2))));
        assert!(matches!("zz".repeat(16).parse::<Md5>(), Err(Error::Encode(_))));
    }

    #[test]
    fn test_ordering() {
        let mut low = [0u8; DIGEST_LENGTH];
        let mut high = [0u8; DIGEST_LENGTH];
        low[15] = 0xFF;
        high[0] = 0x01;
        let (low, high) = (Md5::from(low), Md5::from(high));
        assert!(low < high);
        assert_eq!(low, Md5::from(*low.as_bytes()));

        let set: BTreeSet<_> = [high.clone(), low.clone(), high.clone()].into_iter().collect();
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![low, high]);
    }

    #[test]
    fn test_codec() {
        let digest: Md5 = SAMPLE.parse().unwrap();
        let codec = Digest::<Md5>::default();
        let encoded = codec.pack(&digest).unwrap();
        assert_eq!(&encoded[..], digest.as_bytes());
        assert_eq!(codec.decode(&encoded).unwrap(), digest);

        let mut buf = ReadBuffer::new(&encoded[..15]);
        assert!(codec.read(&mut buf).is_err());
        assert_eq!(buf.position(), 0);
    }

    #[test]
    fn test_other_digest_values() {
        let codec = Digest::<Vec<u8>>::default();
        assert!(matches!(codec.prepare(&vec![0u8; 15]), Err(Error::Encode(_))));
        let encoded = codec.pack(&vec![7u8; 16]).unwrap();
        assert_eq!(codec.decode(&encoded).unwrap(), vec![7u8; 16]);

        let codec = Digest::<[u8; DIGEST_LENGTH]>::default();
        assert_eq!(codec.decode(&encoded).unwrap(), [7u8; 16]);
    }
}

//! Error types for codec operations

use thiserror::Error;

/// Error type for codec operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("attempting to index {index} of buffer size {length}")]
    BufferTooShort { index: usize, length: usize },
    #[error("malformed unit: expected 0x00, read 0x{0:02x}")]
    MalformedUnit(u8),
    #[error("malformed bool: expected 0x00 or 0x01, read 0x{0:02x}")]
    MalformedBool(u8),
    #[error("malformed variant tag: 0x{0:08x}")]
    MalformedVariantTag(i32),
    #[error("malformed integer: unexpected leading byte 0x{0:02x}")]
    MalformedInt(u8),
    #[error("integer is too large: {0}")]
    IntegerTooLarge(i128),
    #[error("size declaration mismatch: declared {declared}, read {read}")]
    SizeMismatch { declared: i64, read: usize },
    #[error("variant {variant} {}", shape(.expects_payload))]
    VariantShapeMismatch {
        variant: String,
        expects_payload: bool,
    },
    #[error("cannot encode: {0}")]
    Encode(String),
    #[error("enum of {0} variants is not supported")]
    UnsupportedEnumSize(usize),
    #[error("invalid utf-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("unknown variant: {0}")]
    UnknownVariant(String),
    #[error("invalid variant index: {0}")]
    InvalidVariantIndex(usize),
    #[error("duplicate name: {0}")]
    DuplicateName(String),
    #[error("duplicate key at entry {0}")]
    DuplicateKey(usize),
    #[error("invalid length: {0}")]
    InvalidLength(usize),
    #[error("extra data found: {0} bytes")]
    ExtraData(usize),
}

fn shape(expects_payload: &bool) -> &'static str {
    if *expects_payload {
        "requires a payload"
    } else {
        "takes no payload"
    }
}

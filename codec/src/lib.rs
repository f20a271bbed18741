//! Serialize structured data in the bin_prot binary format.
//!
//! # Overview
//!
//! A library of composable codecs ("typedefs") that convert typed values to and from a compact
//! binary representation compatible with bin_prot:
//! - Integers use a variable-length encoding with escape tags (see [varint]).
//! - Fixed-width integers, floats and network-order integers are also available.
//! - Composites (lists, tuples, records, options, hash tables, blobs and enums) are built by
//!   combining other codecs.
//!
//! Encoding happens in two passes. [Typedef::prepare] computes the exact encoded size of a value
//! together with a context that [Typedef::write] consumes. Decoding runs against a [ReadBuffer]
//! whose cursor is rolled back to the start of any failed step.
//!
//! Decoding assumes the whole encoded value is resident in memory. Collections read from
//! untrusted input can be bounded with a [RangeCfg].
//!
//! # Example
//!
//! ```
//! use binprot_codec::{field, List, Optional, Record, Str, TypedefExt, Nat0};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Item {
//!     name: String,
//!     tags: Vec<u64>,
//!     parent: Option<u64>,
//! }
//!
//! let codec = Record::new((
//!     field("name", Str::default()),
//!     field("tags", List::new(Nat0)),
//!     field("parent", Optional::new(Nat0)),
//! ))
//! .unwrap()
//! .map(
//!     |(name, tags, parent)| Item { name, tags, parent },
//!     |item: &Item| (item.name.clone(), item.tags.clone(), item.parent),
//! );
//!
//! let item = Item {
//!     name: "leaf".to_string(),
//!     tags: vec![1, 200],
//!     parent: Some(7),
//! };
//! let encoded = codec.pack(&item).unwrap();
//! assert_eq!(encoded.len(), 5 + 5 + 2);
//! assert_eq!(codec.decode(&encoded).unwrap(), item);
//! ```

pub mod buffer;
pub mod codec;
pub mod config;
pub mod digest;
pub mod error;
pub mod types;
pub mod varint;

// Re-export main types and traits
pub use buffer::{Endian, ReadBuffer, WriteBuffer};
pub use codec::{FixedSize, Mapped, Prepared, Typedef, TypedefExt};
pub use config::RangeCfg;
pub use digest::{Digest, DigestBytes, Md5};
pub use error::Error;
pub use types::{
    blob::Blob,
    fixed::{
        Int16Bit, Int32Bit, Int53Bit, Int64Bit, Int8Bit, Network16, Network32, Network64,
        VariantInt,
    },
    list::List,
    map::HashTable,
    option::Optional,
    primitives::{Bool, Char, Float, Unit},
    record::{field, Field, Record},
    string::{Bigstring, Str},
    variant::{Enum, Tagged, Variant},
};
pub use varint::{Int, Nat0, WideInt, WideNat0};

//! Tagged unions.
//!
//! An [Enum] is an ordered, immutable registry of named [Variant]s. The wire form is the
//! variant's index followed by its payload, if any. The index is one byte when there are at most
//! 256 variants and two little-endian bytes when there are at most 65536.
//!
//! Each variant owns its payload codec. An enum is generic over the value type its payloads
//! decode into, so variants with different payload codecs share one enum by [mapping](Variant::mapped)
//! their payloads into a common type (usually a Rust `enum`).
//!
//! # Example
//!
//! ```
//! use binprot_codec::{Enum, Int, Str, Tagged, TypedefExt, Variant};
//!
//! #[derive(Debug, PartialEq)]
//! enum Message {
//!     Num(i64),
//!     Text(String),
//! }
//!
//! let codec = Enum::new(vec![
//!     Variant::mapped("num", Int, Message::Num, |m| match m {
//!         Message::Num(n) => Some(n),
//!         _ => None,
//!     }),
//!     Variant::mapped("text", Str::default(), Message::Text, |m| match m {
//!         Message::Text(s) => Some(s),
//!         _ => None,
//!     }),
//!     Variant::constant("none"),
//! ])
//! .unwrap();
//!
//! let value = Tagged::new("text", Message::Text("hi".to_string()));
//! let encoded = codec.pack(&value).unwrap();
//! assert_eq!(&encoded[..], &[0x01, 0x02, b'h', b'i']);
//! assert_eq!(codec.decode(&encoded).unwrap(), value);
//! ```

use crate::{
    buffer::{Endian, ReadBuffer, WriteBuffer},
    types::record::{check_unique, Fields, Record},
    Error, Prepared, Typedef,
};
use std::{
    any::Any,
    collections::HashMap,
    fmt::{self, Debug},
    sync::Arc,
};
use tracing::debug;

/// Largest registry that uses a one-byte tag.
const MAX_NARROW_VARIANTS: usize = 1 << 8;

/// Largest supported registry.
const MAX_VARIANTS: usize = 1 << 16;

/// A payload codec whose value type is erased to the enum's value type `V`.
trait Payload<V>: Send + Sync {
    fn read(&self, buf: &mut ReadBuffer<'_>) -> Result<V, Error>;

    /// Returns `None` if `value` is not this variant's payload.
    fn prepare(&self, value: &V) -> Result<Option<Prepared<Box<dyn Any>>>, Error>;

    /// Returns true if `context` was produced by this payload's `prepare`.
    fn accepts(&self, context: &dyn Any) -> bool;

    fn write(&self, buf: &mut WriteBuffer<'_>, context: Box<dyn Any>) -> Result<(), Error>;
}

struct Projected<E, F, G> {
    codec: E,
    inject: F,
    project: G,
}

impl<V, E, F, G> Payload<V> for Projected<E, F, G>
where
    E: Typedef + Send + Sync,
    E::Context: 'static,
    F: Fn(E::Value) -> V + Send + Sync,
    G: Fn(&V) -> Option<&E::Value> + Send + Sync,
{
    fn read(&self, buf: &mut ReadBuffer<'_>) -> Result<V, Error> {
        self.codec.read(buf).map(&self.inject)
    }

    fn prepare(&self, value: &V) -> Result<Option<Prepared<Box<dyn Any>>>, Error> {
        let Some(payload) = (self.project)(value) else {
            return Ok(None);
        };
        let prepared = self.codec.prepare(payload)?;
        Ok(Some(prepared.map(|context| Box::new(context) as Box<dyn Any>)))
    }

    fn accepts(&self, context: &dyn Any) -> bool {
        context.is::<E::Context>()
    }

    fn write(&self, buf: &mut WriteBuffer<'_>, context: Box<dyn Any>) -> Result<(), Error> {
        let context = context
            .downcast::<E::Context>()
            .map_err(|_| Error::Encode("context was prepared by another variant".to_string()))?;
        self.codec.write(buf, *context)
    }
}

/// One named alternative of an [Enum] whose payloads decode into `V`.
pub struct Variant<V> {
    name: String,
    payload: Option<Arc<dyn Payload<V>>>,
}

impl<V> Variant<V> {
    /// A variant without a payload.
    pub fn constant(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: None,
        }
    }

    /// A variant whose payload is encoded by `codec` and whose value is the payload itself.
    pub fn new<E>(name: impl Into<String>, codec: E) -> Self
    where
        V: 'static,
        E: Typedef<Value = V> + Send + Sync + 'static,
        E::Context: 'static,
    {
        Self::mapped(name, codec, |value| value, |value| Some(value))
    }

    /// A variant whose payload is encoded by `codec` and converted to and from `V`.
    ///
    /// `inject` wraps a decoded payload. `project` returns the payload of a value belonging to
    /// this variant, or `None` if the value has another shape.
    pub fn mapped<E, F, G>(name: impl Into<String>, codec: E, inject: F, project: G) -> Self
    where
        V: 'static,
        E: Typedef + Send + Sync + 'static,
        E::Context: 'static,
        F: Fn(E::Value) -> V + Send + Sync + 'static,
        G: Fn(&V) -> Option<&E::Value> + Send + Sync + 'static,
    {
        let payload: Arc<dyn Payload<V>> = Arc::new(Projected {
            codec,
            inject,
            project,
        });
        Self {
            name: name.into(),
            payload: Some(payload),
        }
    }

    /// A variant carrying named fields, encoded in construction order.
    pub fn record<F>(name: impl Into<String>, fields: F) -> Result<Self, Error>
    where
        V: 'static,
        F: Fields<Value = V> + Send + Sync + 'static,
        F::Context: 'static,
    {
        Ok(Self::new(name, Record::new(fields)?))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if the variant carries a payload.
    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }
}

impl<V> Clone for Variant<V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            payload: self.payload.clone(),
        }
    }
}

impl<V> Debug for Variant<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variant")
            .field("name", &self.name)
            .field("has_payload", &self.has_payload())
            .finish()
    }
}

/// A decoded (or to-be-encoded) enum value: the variant name and its payload.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tagged<V> {
    pub name: String,
    pub payload: Option<V>,
}

impl<V> Tagged<V> {
    /// A value of a variant without a payload.
    pub fn constant(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: None,
        }
    }

    /// A value of a payload-bearing variant.
    pub fn new(name: impl Into<String>, payload: V) -> Self {
        Self {
            name: name.into(),
            payload: Some(payload),
        }
    }
}

/// A tagged union over an ordered registry of variants.
pub struct Enum<V> {
    variants: Vec<Variant<V>>,
    index: HashMap<String, usize>,
}

impl<V> Enum<V> {
    /// Creates an enum from `variants`, whose order fixes their tags.
    ///
    /// Fails with [Error::UnsupportedEnumSize] above 65536 variants and with
    /// [Error::DuplicateName] if two variants share a name.
    pub fn new(variants: Vec<Variant<V>>) -> Result<Self, Error> {
        if variants.len() > MAX_VARIANTS {
            debug!(variants = variants.len(), "rejected enum");
            return Err(Error::UnsupportedEnumSize(variants.len()));
        }
        if let Err(err) = check_unique(variants.iter().map(Variant::name)) {
            debug!(%err, "rejected enum");
            return Err(err);
        }
        let index = variants
            .iter()
            .enumerate()
            .map(|(i, variant)| (variant.name.clone(), i))
            .collect();
        Ok(Self { variants, index })
    }

    /// Variant names in tag order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variants.iter().map(Variant::name)
    }

    /// Number of variants.
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Returns true if the enum has no variants.
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Width of the encoded tag in bytes.
    pub fn tag_size(&self) -> usize {
        if self.variants.len() <= MAX_NARROW_VARIANTS {
            1
        } else {
            2
        }
    }

    fn read_tag(&self, buf: &mut ReadBuffer<'_>) -> Result<usize, Error> {
        if self.tag_size() == 1 {
            Ok(buf.read_u8()? as usize)
        } else {
            Ok(buf.read_u16(Endian::Little)? as usize)
        }
    }

    fn write_tag(&self, buf: &mut WriteBuffer<'_>, tag: usize) -> Result<(), Error> {
        if self.tag_size() == 1 {
            buf.write_u8(tag as u8)
        } else {
            buf.write_u16(tag as u16, Endian::Little)
        }
    }
}

impl<V> Clone for Enum<V> {
    fn clone(&self) -> Self {
        Self {
            variants: self.variants.clone(),
            index: self.index.clone(),
        }
    }
}

impl<V> Debug for Enum<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Enum")
            .field("variants", &self.variants)
            .finish()
    }
}

impl<V> Typedef for Enum<V> {
    type Value = Tagged<V>;
    type Context = (usize, Option<Box<dyn Any>>);

    fn read(&self, buf: &mut ReadBuffer<'_>) -> Result<Self::Value, Error> {
        buf.checked(|buf| {
            let tag = self.read_tag(buf)?;
            let variant = self
                .variants
                .get(tag)
                .ok_or(Error::InvalidVariantIndex(tag))?;
            let payload = match &variant.payload {
                Some(codec) => Some(codec.read(buf)?),
                None => None,
            };
            Ok(Tagged {
                name: variant.name.clone(),
                payload,
            })
        })
    }

    fn prepare(&self, value: &Self::Value) -> Result<Prepared<Self::Context>, Error> {
        let tag = *self
            .index
            .get(&value.name)
            .ok_or_else(|| Error::UnknownVariant(value.name.clone()))?;
        let variant = &self.variants[tag];
        match (&variant.payload, &value.payload) {
            (None, None) => Ok(Prepared::new(self.tag_size(), (tag, None))),
            (Some(codec), Some(payload)) => {
                let prepared = codec.prepare(payload)?.ok_or_else(|| {
                    Error::Encode(format!("payload does not belong to variant {:?}", variant.name))
                })?;
                Ok(Prepared::new(
                    self.tag_size() + prepared.size,
                    (tag, Some(prepared.context)),
                ))
            }
            (expected, _) => Err(Error::VariantShapeMismatch {
                variant: variant.name.clone(),
                expects_payload: expected.is_some(),
            }),
        }
    }

    fn write(&self, buf: &mut WriteBuffer<'_>, (tag, context): Self::Context) -> Result<(), Error> {
        let variant = self
            .variants
            .get(tag)
            .ok_or(Error::InvalidVariantIndex(tag))?;
        match (&variant.payload, context) {
            (None, None) => self.write_tag(buf, tag),
            (Some(codec), Some(context)) if codec.accepts(&*context) => {
                self.write_tag(buf, tag)?;
                codec.write(buf, context)
            }
            (Some(_), Some(_)) => Err(Error::Encode(format!(
                "context was not prepared by variant {:?}",
                variant.name
            ))),
            (expected, _) => Err(Error::VariantShapeMismatch {
                variant: variant.name.clone(),
                expects_payload: expected.is_some(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        types::{primitives::Bool, record::field, string::Str},
        varint::Int,
        TypedefExt,
    };

    fn shapes() -> Enum<(i64, i64)> {
        Enum::new(vec![
            Variant::constant("empty"),
            Variant::new("point", (Int, Int)),
            Variant::constant("origin"),
        ])
        .unwrap()
    }

    #[derive(Clone, Debug, PartialEq)]
    enum Message {
        Num(i64),
        Text(String),
    }

    fn messages() -> Enum<Message> {
        Enum::new(vec![
            Variant::mapped("num", Int, Message::Num, |m| match m {
                Message::Num(n) => Some(n),
                _ => None,
            }),
            Variant::mapped("text", Str::default(), Message::Text, |m| match m {
                Message::Text(s) => Some(s),
                _ => None,
            }),
            Variant::constant("none"),
        ])
        .unwrap()
    }

    #[test]
    fn test_round_trip() {
        let codec = shapes();
        assert_eq!(codec.tag_size(), 1);
        assert_eq!(codec.names().collect::<Vec<_>>(), vec!["empty", "point", "origin"]);

        let point = Tagged::new("point", (3, -4));
        let encoded = codec.pack(&point).unwrap();
        assert_eq!(encoded, &[0x01, 0x03, 0xFF, 0xFC][..]);
        assert_eq!(codec.decode(&encoded).unwrap(), point);

        let origin = Tagged::constant("origin");
        assert_eq!(codec.pack(&origin).unwrap(), &[0x02][..]);
        assert_eq!(codec.decode(&[0x02]).unwrap(), origin);
    }

    #[test]
    fn test_mixed_payloads() {
        let codec = messages();
        let cases = [
            (Tagged::new("num", Message::Num(-300)), vec![0x00, 0xFE, 0xD4, 0xFE]),
            (
                Tagged::new("text", Message::Text("hi".to_string())),
                vec![0x01, 0x02, b'h', b'i'],
            ),
            (Tagged::constant("none"), vec![0x02]),
        ];
        for (value, expected) in cases {
            let encoded = codec.pack(&value).unwrap();
            assert_eq!(encoded, expected);
            assert_eq!(codec.decode(&encoded).unwrap(), value);
        }

        // A payload of another variant's type is rejected at prepare.
        assert!(matches!(
            codec.prepare(&Tagged::new("num", Message::Text("1".to_string()))),
            Err(Error::Encode(_))
        ));
    }

    #[test]
    fn test_shape_mismatch() {
        let codec = shapes();
        assert_eq!(
            codec.prepare(&Tagged::new("empty", (1, 2))).map(|_| ()),
            Err(Error::VariantShapeMismatch {
                variant: "empty".to_string(),
                expects_payload: false
            })
        );
        assert_eq!(
            codec.prepare(&Tagged::constant("point")).map(|_| ()),
            Err(Error::VariantShapeMismatch {
                variant: "point".to_string(),
                expects_payload: true
            })
        );
        assert_eq!(
            codec.prepare(&Tagged::constant("missing")).map(|_| ()),
            Err(Error::UnknownVariant("missing".to_string()))
        );
    }

    #[test]
    fn test_write_rejects_mismatched_context() {
        let codec = messages();
        let mut buf = WriteBuffer::with_size(8);
        assert_eq!(
            codec.write(&mut buf, (0, None)),
            Err(Error::VariantShapeMismatch {
                variant: "num".to_string(),
                expects_payload: true
            })
        );
        assert_eq!(
            codec.write(&mut buf, (2, Some(Box::new(7i64) as Box<dyn Any>))),
            Err(Error::VariantShapeMismatch {
                variant: "none".to_string(),
                expects_payload: false
            })
        );

        // A context prepared for "text" cannot be written as "num".
        let text = codec
            .prepare(&Tagged::new("text", Message::Text("x".to_string())))
            .unwrap();
        let (_, context) = text.context;
        assert!(matches!(codec.write(&mut buf, (0, context)), Err(Error::Encode(_))));
        assert_eq!(buf.position(), 0);
    }

    #[test]
    fn test_invalid_index() {
        let codec = shapes();
        let mut buf = ReadBuffer::new(&[0x03]);
        assert_eq!(codec.read(&mut buf), Err(Error::InvalidVariantIndex(3)));
        assert_eq!(buf.position(), 0);
    }

    #[test]
    fn test_payload_failure_rolls_back() {
        let codec = shapes();
        let mut buf = ReadBuffer::new(&[0x01, 0x03, 0xFD, 0x00]);
        assert!(codec.read(&mut buf).is_err());
        assert_eq!(buf.position(), 0);
    }

    #[test]
    fn test_record_variant() {
        let codec = Enum::new(vec![
            Variant::record("user", (field("name", Str::default()), field("admin", Bool)))
                .unwrap(),
            Variant::constant("guest"),
        ])
        .unwrap();
        let user = Tagged::new("user", ("ann".to_string(), true));
        let encoded = codec.pack(&user).unwrap();
        assert_eq!(encoded, &[0x00, 0x03, b'a', b'n', b'n', 0x01][..]);
        assert_eq!(codec.decode(&encoded).unwrap(), user);
    }

    #[test]
    fn test_duplicate_variant() {
        let result = Enum::<i64>::new(vec![Variant::constant("a"), Variant::new("a", Int)]);
        assert_eq!(result.map(|_| ()), Err(Error::DuplicateName("a".to_string())));
    }

    #[test]
    fn test_too_many_variants() {
        let variants = (0..=MAX_VARIANTS)
            .map(|i| Variant::<i64>::constant(i.to_string()))
            .collect();
        assert_eq!(
            Enum::new(variants).map(|_| ()),
            Err(Error::UnsupportedEnumSize(MAX_VARIANTS + 1))
        );

        let variants = (0..MAX_VARIANTS)
            .map(|i| Variant::<i64>::constant(i.to_string()))
            .collect();
        let codec = Enum::new(variants).unwrap();
        assert_eq!(codec.tag_size(), 2);
        let last = Tagged::constant((MAX_VARIANTS - 1).to_string());
        assert_eq!(codec.pack(&last).unwrap(), &[0xFF, 0xFF][..]);
        assert_eq!(codec.decode(&[0xFF, 0xFF]).unwrap(), last);
    }
}

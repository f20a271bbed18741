//! Records: tuples whose elements carry names.
//!
//! Names exist only at construction time. They fix nothing on the wire beyond the order in which
//! fields were supplied. To decode into a struct, [map](crate::TypedefExt::map) the record's tuple
//! value.

use crate::{
    buffer::{ReadBuffer, WriteBuffer},
    Error, Prepared, Typedef,
};
use paste::paste;
use std::collections::HashSet;

/// A named codec within a [Record].
#[derive(Clone, Debug)]
pub struct Field<E> {
    name: String,
    codec: E,
}

/// Creates a [Field] named `name`.
pub fn field<E: Typedef>(name: impl Into<String>, codec: E) -> Field<E> {
    Field {
        name: name.into(),
        codec,
    }
}

impl<E> Field<E> {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<E: Typedef> Typedef for Field<E> {
    type Value = E::Value;
    type Context = E::Context;

    #[inline]
    fn read(&self, buf: &mut ReadBuffer<'_>) -> Result<E::Value, Error> {
        self.codec.read(buf)
    }

    #[inline]
    fn prepare(&self, value: &E::Value) -> Result<Prepared<E::Context>, Error> {
        self.codec.prepare(value)
    }

    #[inline]
    fn write(&self, buf: &mut WriteBuffer<'_>, context: E::Context) -> Result<(), Error> {
        self.codec.write(buf, context)
    }
}

/// A tuple of [Field]s.
pub trait Fields: Typedef {
    /// Field names in wire order.
    fn names(&self) -> Vec<&str>;
}

macro_rules! impl_fields_for_tuple {
    ($($index:literal),*) => {
        paste! {
            impl<$( [<T $index>]: Typedef ),*> Fields for ( $( Field<[<T $index>]>, )* ) {
                fn names(&self) -> Vec<&str> {
                    vec![$( self.$index.name(), )*]
                }
            }
        }
    };
}

impl_fields_for_tuple!(0);
impl_fields_for_tuple!(0, 1);
impl_fields_for_tuple!(0, 1, 2);
impl_fields_for_tuple!(0, 1, 2, 3);
impl_fields_for_tuple!(0, 1, 2, 3, 4);
impl_fields_for_tuple!(0, 1, 2, 3, 4, 5);
impl_fields_for_tuple!(0, 1, 2, 3, 4, 5, 6);
impl_fields_for_tuple!(0, 1, 2, 3, 4, 5, 6, 7);
impl_fields_for_tuple!(0, 1, 2, 3, 4, 5, 6, 7, 8);
impl_fields_for_tuple!(0, 1, 2, 3, 4, 5, 6, 7, 8, 9);
impl_fields_for_tuple!(0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10);
impl_fields_for_tuple!(0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11);

/// Fails with [Error::DuplicateName] on the first repeated name.
pub(crate) fn check_unique<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<(), Error> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(Error::DuplicateName(name.to_string()));
        }
    }
    Ok(())
}

/// A named-field tuple. The value is the tuple of field values in construction order.
#[derive(Clone, Debug)]
pub struct Record<F> {
    fields: F,
}

impl<F: Fields> Record<F> {
    /// Creates a record, rejecting duplicate field names.
    pub fn new(fields: F) -> Result<Self, Error> {
        check_unique(fields.names())?;
        Ok(Self { fields })
    }

    /// Field names in wire order.
    pub fn names(&self) -> Vec<&str> {
        self.fields.names()
    }
}

impl<F: Fields> Typedef for Record<F> {
    type Value = F::Value;
    type Context = F::Context;

    fn read(&self, buf: &mut ReadBuffer<'_>) -> Result<F::Value, Error> {
        self.fields.read(buf)
    }

    fn prepare(&self, value: &F::Value) -> Result<Prepared<F::Context>, Error> {
        self.fields.prepare(value)
    }

    fn write(&self, buf: &mut WriteBuffer<'_>, context: F::Context) -> Result<(), Error> {
        self.fields.write(buf, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        types::{list::List, primitives::Float, string::Str},
        varint::Int,
        TypedefExt,
    };

    #[derive(Clone, Debug, PartialEq)]
    struct Point {
        label: String,
        x: i64,
        weights: Vec<f64>,
    }

    #[test]
    fn test_record_as_struct() {
        let codec = Record::new((
            field("label", Str::default()),
            field("x", Int),
            field("weights", List::new(Float)),
        ))
        .unwrap()
        .map(
            |(label, x, weights)| Point { label, x, weights },
            |p: &Point| (p.label.clone(), p.x, p.weights.clone()),
        );

        let point = Point {
            label: "a".to_string(),
            x: -3,
            weights: vec![0.5],
        };
        let encoded = codec.pack(&point).unwrap();
        assert_eq!(encoded.len(), 2 + 2 + 1 + 8);
        assert_eq!(&encoded[..5], &[0x01, b'a', 0xFF, 0xFD, 0x01]);
        assert_eq!(codec.decode(&encoded).unwrap(), point);
    }

    #[test]
    fn test_names() {
        let record = Record::new((field("b", Int), field("a", Int))).unwrap();
        assert_eq!(record.names(), vec!["b", "a"]);
        assert_eq!(record.pack(&(1, 2)).unwrap(), &[0x01, 0x02][..]);
    }

    #[test]
    fn test_duplicate_name() {
        let result = Record::new((field("a", Int), field("b", Int), field("a", Float)));
        assert_eq!(
            result.map(|_| ()),
            Err(Error::DuplicateName("a".to_string()))
        );
    }
}

#![no_main]

use arbitrary::Arbitrary;
use binprot_codec::{
    field, Bigstring, Blob, Bool, Char, Digest, Enum, Float, HashTable, Int, Int16Bit, Int32Bit,
    Int53Bit, Int64Bit, Int8Bit, List, Md5, Nat0, Network16, Network32, Network64, Optional,
    ReadBuffer, Record, Str, Tagged, Typedef, TypedefExt, Unit, Variant, VariantInt, WideInt,
    WideNat0,
};
use bytes::Bytes;
use indexmap::IndexMap;
use libfuzzer_sys::fuzz_target;
use std::fmt::Debug;

/// Encodes `value`, checks the prepared size, and decodes it back.
fn roundtrip<T>(codec: &T, value: &T::Value)
where
    T: Typedef,
    T::Value: PartialEq + Debug,
{
    let Ok(size) = codec.size(value) else {
        // Values rejected at prepare must also be rejected by pack.
        assert!(codec.pack(value).is_err());
        return;
    };
    let encoded = codec.pack(value).expect("prepared value failed to encode");
    assert_eq!(encoded.len(), size);
    let decoded = codec.decode(&encoded).expect("failed to decode an encoded value");
    assert_eq!(&decoded, value);
}

/// Decodes arbitrary bytes. A failed decode must leave the cursor untouched; a successful one
/// must re-encode to at most the bytes consumed (escapes may be wider than needed on input).
fn decode_arbitrary<T>(codec: &T, data: &[u8])
where
    T: Typedef,
    T::Value: PartialEq + Debug,
{
    let mut buf = ReadBuffer::new(data);
    match codec.read(&mut buf) {
        Ok(value) => {
            let encoded = codec.pack(&value).expect("decoded value failed to encode");
            assert!(encoded.len() <= buf.position());
            assert_eq!(codec.decode(&encoded).expect("failed to decode re-encoded value"), value);
        }
        Err(_) => assert_eq!(buf.position(), 0),
    }
}

#[derive(Debug, PartialEq)]
enum Shape {
    Pair((i64, String)),
    Count(u64),
}

fn shapes() -> Enum<Shape> {
    Enum::new(vec![
        Variant::constant("none"),
        Variant::mapped("pair", (Int, Str::default()), Shape::Pair, |shape| match shape {
            Shape::Pair(pair) => Some(pair),
            _ => None,
        }),
        Variant::mapped("count", Nat0, Shape::Count, |shape| match shape {
            Shape::Count(n) => Some(n),
            _ => None,
        }),
        Variant::constant("other"),
    ])
    .expect("valid enum")
}

#[derive(Arbitrary, Debug)]
enum FuzzInput<'a> {
    // Variable-length integers
    Nat0(u64),
    WideNat0(u64),
    Int(i64),
    WideInt(i64),

    // Fixed-width integers
    Int8Bit(i8),
    Int16Bit(u16),
    Int32Bit(i32),
    Int53Bit(i64),
    Int64Bit(i64),
    Network16(u16),
    Network32(i32),
    Network64(i64),
    VariantInt(i32),

    // Scalars
    Unit,
    Bool(bool),
    Char(char),
    Float(f64),
    Digest([u8; 16]),

    // Byte sequences
    Str(String),
    Bigstring(&'a [u8]),

    // Composites
    List(Vec<i64>),
    Option(Option<u64>),
    Tuple(bool, i64, String),
    Map(Vec<(String, i64)>),
    Blob(Vec<u64>),
    Enum(u8, i64, String),

    // Arbitrary input
    DecodeComposite(&'a [u8]),
    DecodeInt(&'a [u8]),
}

fn fuzz(input: FuzzInput) {
    match input {
        FuzzInput::Nat0(v) => roundtrip(&Nat0, &v),
        FuzzInput::WideNat0(v) => roundtrip(&WideNat0, &v),
        FuzzInput::Int(v) => roundtrip(&Int, &v),
        FuzzInput::WideInt(v) => roundtrip(&WideInt, &v),
        FuzzInput::Int8Bit(v) => roundtrip(&Int8Bit, &v),
        FuzzInput::Int16Bit(v) => roundtrip(&Int16Bit, &v),
        FuzzInput::Int32Bit(v) => roundtrip(&Int32Bit, &v),
        FuzzInput::Int53Bit(v) => roundtrip(&Int53Bit, &v),
        FuzzInput::Int64Bit(v) => roundtrip(&Int64Bit, &v),
        FuzzInput::Network16(v) => roundtrip(&Network16, &v),
        FuzzInput::Network32(v) => roundtrip(&Network32, &v),
        FuzzInput::Network64(v) => roundtrip(&Network64, &v),
        FuzzInput::VariantInt(v) => roundtrip(&VariantInt, &v),
        FuzzInput::Unit => roundtrip(&Unit, &()),
        FuzzInput::Bool(v) => roundtrip(&Bool, &v),
        FuzzInput::Char(v) => roundtrip(&Char, &v),
        FuzzInput::Float(v) => {
            let encoded = Float.pack(&v).expect("floats always encode");
            let decoded = Float.decode(&encoded).expect("failed to decode float");
            assert_eq!(decoded.to_bits(), v.to_bits());
        }
        FuzzInput::Digest(v) => roundtrip(&Digest::<Md5>::default(), &Md5::from(v)),
        FuzzInput::Str(v) => roundtrip(&Str::default(), &v),
        FuzzInput::Bigstring(v) => roundtrip(&Bigstring::default(), &Bytes::copy_from_slice(v)),
        FuzzInput::List(v) => roundtrip(&List::new(WideInt), &v),
        FuzzInput::Option(v) => roundtrip(&Optional::new(Nat0), &v),
        FuzzInput::Tuple(a, b, c) => {
            let codec = Record::new((field("a", Bool), field("b", Int), field("c", Str::default())))
                .expect("valid record");
            roundtrip(&codec, &(a, b, c));
        }
        FuzzInput::Map(entries) => {
            let map: IndexMap<_, _> = entries.into_iter().collect();
            roundtrip(&HashTable::new(Str::default(), WideInt), &map);
        }
        FuzzInput::Blob(v) => roundtrip(&Blob::new(List::new(WideNat0)), &v),
        FuzzInput::Enum(tag, n, s) => {
            let value = match tag % 5 {
                0 => Tagged::constant("none"),
                1 => Tagged::new("pair", Shape::Pair((n, s))),
                2 => Tagged::new("count", Shape::Count(n.unsigned_abs())),
                3 => Tagged::new("count", Shape::Pair((n, s))),
                _ => Tagged::constant("other"),
            };
            roundtrip(&shapes(), &value);
        }
        FuzzInput::DecodeComposite(data) => {
            decode_arbitrary(&List::new(Optional::new(shapes())), data);
            decode_arbitrary(&Blob::new(HashTable::new(Str::default(), Int)), data);
        }
        FuzzInput::DecodeInt(data) => {
            decode_arbitrary(&WideNat0, data);
            decode_arbitrary(&WideInt, data);
            decode_arbitrary(&Int53Bit, data);
            decode_arbitrary(&VariantInt, data);
        }
    }
}

fuzz_target!(|input: FuzzInput| {
    fuzz(input);
});

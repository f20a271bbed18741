//! Size-boundary search over every integer codec.
//!
//! For each codec, binary search finds every point where the encoded size changes. Each point,
//! every power of two in range and the range bounds are then round-tripped together with a small
//! window of neighbors.

use binprot_codec::{
    varint::MAX_SAFE_INTEGER, Int, Int16Bit, Int32Bit, Int53Bit, Int64Bit, Int8Bit, Nat0,
    Network16, Network32, Network64, ReadBuffer, Typedef, TypedefExt, VariantInt, WideInt,
    WideNat0,
};
use std::{collections::BTreeSet, fmt::Debug, ops::RangeInclusive};

const WINDOW: i128 = 16;
const MAX_SAFE: i128 = MAX_SAFE_INTEGER as i128;

struct Harness<T> {
    codec: T,
    min: i128,
    max: i128,
}

impl<T> Harness<T>
where
    T: Typedef,
    T::Value: TryFrom<i128> + Into<i128> + Copy + Debug,
    <T::Value as TryFrom<i128>>::Error: Debug,
{
    fn value(&self, n: i128) -> T::Value {
        <T::Value>::try_from(n).unwrap()
    }

    fn size(&self, n: i128) -> usize {
        self.codec.size(&self.value(n)).unwrap()
    }

    fn find_size_increase(&self, size: usize, mut a: i128, mut b: i128) -> i128 {
        loop {
            assert!(a < b);
            let m = (a + b).div_euclid(2);
            let (size_m, size_n) = (self.size(m), self.size(m + 1));
            assert!(size_m <= size_n, "size decreased between {m} and {}", m + 1);
            if size_m == size && size_m < size_n {
                return m;
            } else if size_m <= size {
                a = m + 1;
            } else {
                b = m;
            }
        }
    }

    fn find_size_decrease(&self, size: usize, mut a: i128, mut b: i128) -> i128 {
        loop {
            assert!(a < b);
            let m = (a + b).div_euclid(2);
            let (size_m, size_n) = (self.size(m), self.size(m + 1));
            assert!(size_m >= size_n, "size increased between {m} and {}", m + 1);
            if size_m == size && size_m > size_n {
                return m;
            } else if size_m >= size {
                a = m + 1;
            } else {
                b = m;
            }
        }
    }

    /// Every `n` such that `size(n) != size(n + 1)`.
    fn change_points(&self) -> Vec<i128> {
        let mut points = Vec::new();
        if self.min < 0 {
            let (mut a, mut size) = (self.min, self.size(self.min));
            while size != self.size(0) {
                let p = self.find_size_decrease(size, a, 0);
                points.push(p);
                a = p + 1;
                size = self.size(a);
            }
        }
        if self.max > 0 {
            let (mut a, mut size) = (0, self.size(0));
            while size != self.size(self.max) {
                let p = self.find_size_increase(size, a, self.max);
                points.push(p);
                a = p + 1;
                size = self.size(a);
            }
        }
        points
    }

    fn powers_of_two(&self) -> impl Iterator<Item = i128> + '_ {
        (0..64)
            .flat_map(|n| [1i128 << n, -(1i128 << n)])
            .filter(|x| (self.min..=self.max).contains(x))
    }

    fn check(&self, name: &str, bounds: RangeInclusive<usize>) -> Vec<i128> {
        let change_points = self.change_points();
        let centers = change_points
            .iter()
            .copied()
            .chain([0, self.min, self.max])
            .chain(self.powers_of_two());

        let mut points = BTreeSet::new();
        for center in centers {
            let a = (center - WINDOW / 2).max(self.min);
            let b = (center + WINDOW / 2).min(self.max);
            points.extend(a..=b);
        }

        let (mut lo, mut hi) = (usize::MAX, 0);
        for n in points {
            let value = self.value(n);
            let encoded = self.codec.pack(&value).unwrap();
            assert!(
                bounds.contains(&encoded.len()),
                "{name}| {n}: size {} outside of {bounds:?}",
                encoded.len()
            );

            let mut buf = ReadBuffer::new(&encoded);
            let decoded: i128 = self.codec.read(&mut buf).unwrap().into();
            assert_eq!(decoded, n, "{name}| read test failed");
            assert_eq!(buf.position(), encoded.len(), "{name}| {n}: read length");

            lo = lo.min(encoded.len());
            hi = hi.max(encoded.len());
        }
        assert_eq!(lo..=hi, bounds, "{name}| invalid bounds");
        change_points
    }
}

fn harness<T>(codec: T, range: RangeInclusive<i128>) -> Harness<T> {
    Harness {
        codec,
        min: *range.start(),
        max: *range.end(),
    }
}

const INT_POINTS: [i128; 7] = [
    -0x8000_0001,
    -0x8001,
    -0x81,
    -1,
    0x7F,
    0x7FFF,
    0x7FFF_FFFF,
];

const NAT0_POINTS: [i128; 3] = [0x7F, 0xFFFF, 0xFFFF_FFFF];

#[test]
fn test_int() {
    let points = harness(Int, -MAX_SAFE..=MAX_SAFE).check("int", 1..=9);
    assert_eq!(points, INT_POINTS);
}

#[test]
fn test_int64() {
    let points =
        harness(WideInt, i64::MIN as i128..=i64::MAX as i128).check("int64", 1..=9);
    assert_eq!(points, INT_POINTS);
}

#[test]
fn test_int32_range() {
    let points =
        harness(WideInt, i32::MIN as i128..=i32::MAX as i128).check("int32", 1..=5);
    assert_eq!(points, INT_POINTS[1..6]);
}

#[test]
fn test_nat0() {
    let points = harness(Nat0, 0..=MAX_SAFE).check("nat0", 1..=9);
    assert_eq!(points, NAT0_POINTS);
}

#[test]
fn test_nat0_64() {
    let points = harness(WideNat0, 0..=u64::MAX as i128).check("nat0_64", 1..=9);
    assert_eq!(points, NAT0_POINTS);
}

#[test]
fn test_fixed_width() {
    let cases: [(&str, Vec<i128>); 10] = [
        (
            "variant_int",
            harness(VariantInt, VariantInt::MIN as i128..=VariantInt::MAX as i128)
                .check("variant_int", 4..=4),
        ),
        (
            "int_8bit",
            harness(Int8Bit, i8::MIN as i128..=i8::MAX as i128).check("int_8bit", 1..=1),
        ),
        (
            "int_16bit",
            harness(Int16Bit, 0..=u16::MAX as i128).check("int_16bit", 2..=2),
        ),
        (
            "int_32bit",
            harness(Int32Bit, i32::MIN as i128..=i32::MAX as i128).check("int_32bit", 4..=4),
        ),
        (
            "int_53bit",
            harness(Int53Bit, -MAX_SAFE..=MAX_SAFE).check("int_53bit", 8..=8),
        ),
        (
            "int_64bit",
            harness(Int64Bit, i64::MIN as i128..=i64::MAX as i128).check("int_64bit", 8..=8),
        ),
        (
            "network16_int",
            harness(Network16, 0..=u16::MAX as i128).check("network16_int", 2..=2),
        ),
        (
            "network32_int",
            harness(Network32, i32::MIN as i128..=i32::MAX as i128)
                .check("network32_int", 4..=4),
        ),
        (
            "network64_int",
            harness(Network64, i64::MIN as i128..=i64::MAX as i128)
                .check("network64_int", 8..=8),
        ),
        (
            "network64_int_small",
            harness(Network64, -(1 << 62)..=(1 << 62) - 1).check("network64_int_small", 8..=8),
        ),
    ];
    for (name, points) in cases {
        assert!(points.is_empty(), "{name}: fixed-width size changed at {points:?}");
    }
}

#[test]
fn test_safe_codecs_reject_wide_values() {
    let encoded = WideInt.pack(&(MAX_SAFE_INTEGER as i64 + 1)).unwrap();
    let mut buf = ReadBuffer::new(&encoded);
    assert!(Int.read(&mut buf).is_err());
    assert_eq!(buf.position(), 0);

    // Retrying with the wide codec succeeds from the same position.
    assert_eq!(WideInt.read(&mut buf).unwrap(), MAX_SAFE_INTEGER as i64 + 1);
}

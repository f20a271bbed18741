//! Tuples of codecs.
//!
//! A tuple of typedefs is itself a typedef over the tuple of their values. Elements are encoded
//! in declaration order with no length prefix.

use crate::{
    buffer::{ReadBuffer, WriteBuffer},
    Error, Prepared, Typedef,
};
use paste::paste;

macro_rules! impl_typedef_for_tuple {
    ($($index:literal),*) => {
        paste! {
            impl<$( [<T $index>]: Typedef ),*> Typedef for ( $( [<T $index>], )* ) {
                type Value = ( $( <[<T $index>] as Typedef>::Value, )* );
                type Context = ( $( <[<T $index>] as Typedef>::Context, )* );

                #[inline]
                fn read(&self, buf: &mut ReadBuffer<'_>) -> Result<Self::Value, Error> {
                    buf.checked(|buf| Ok(( $( self.$index.read(buf)?, )* )))
                }

                #[inline]
                fn prepare(&self, value: &Self::Value) -> Result<Prepared<Self::Context>, Error> {
                    let mut size = 0;
                    let context = ( $( {
                        let prepared = self.$index.prepare(&value.$index)?;
                        size += prepared.size;
                        prepared.context
                    }, )* );
                    Ok(Prepared::new(size, context))
                }

                #[inline]
                fn write(&self, buf: &mut WriteBuffer<'_>, context: Self::Context) -> Result<(), Error> {
                    $( self.$index.write(buf, context.$index)?; )*
                    Ok(())
                }
            }
        }
    };
}

// Generate implementations for tuple sizes 1 through 12
impl_typedef_for_tuple!(0);
impl_typedef_for_tuple!(0, 1);
impl_typedef_for_tuple!(0, 1, 2);
impl_typedef_for_tuple!(0, 1, 2, 3);
impl_typedef_for_tuple!(0, 1, 2, 3, 4);
impl_typedef_for_tuple!(0, 1, 2, 3, 4, 5);
impl_typedef_for_tuple!(0, 1, 2, 3, 4, 5, 6);
impl_typedef_for_tuple!(0, 1, 2, 3, 4, 5, 6, 7);
impl_typedef_for_tuple!(0, 1, 2, 3, 4, 5, 6, 7, 8);
impl_typedef_for_tuple!(0, 1, 2, 3, 4, 5, 6, 7, 8, 9);
impl_typedef_for_tuple!(0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10);
impl_typedef_for_tuple!(0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11);

#[cfg(test)]
mod tests {
    use crate::{
        types::{fixed::Int32Bit, option::Optional, primitives::Bool, string::Str},
        varint::{Int, Nat0},
        ReadBuffer, TypedefExt, Typedef, Error,
    };

    #[test]
    fn test_tuple() {
        let codec = (Nat0, Optional::new(Int32Bit));
        for value in [(1u64, None), (200, Some(-7))] {
            let encoded = codec.pack(&value).unwrap();
            assert_eq!(codec.decode(&encoded).unwrap(), value);
        }
        assert_eq!(codec.size(&(200, Some(-7))).unwrap(), 3 + 1 + 4);
    }

    #[test]
    fn test_tuple_layout() {
        let codec = (Bool, Str::default(), Int);
        let encoded = codec.pack(&(true, "hi".to_string(), -1)).unwrap();
        assert_eq!(encoded, &[0x01, 0x02, b'h', b'i', 0xFF, 0xFF][..]);
    }

    #[test]
    fn test_single_and_wide() {
        let single = (Bool,);
        assert_eq!(single.decode(&[0x01]).unwrap(), (true,));

        let wide = (Bool, Bool, Bool, Bool, Bool, Bool, Bool, Bool, Bool, Bool, Bool, Nat0);
        let value = (true, false, true, false, true, false, true, false, true, false, true, 9);
        assert_eq!(wide.decode(&wide.pack(&value).unwrap()).unwrap(), value);
    }

    #[test]
    fn test_failure_unwinds_whole_tuple() {
        let codec = (Bool, Nat0, Bool);
        let mut buf = ReadBuffer::new(&[0x01, 0x05, 0x09]);
        assert_eq!(codec.read(&mut buf), Err(Error::MalformedBool(0x09)));
        assert_eq!(buf.position(), 0);
    }
}

// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::{Deserializer, SerializeError, Serializer};
use nom::error::{context, ContextError, ParseError};
use nom::number::complete::{le_u128, le_u16, le_u32, le_u64, le_u8};
use nom::IResult;

macro_rules! gen_fixed {
    ($($type:ident, $bs:ident, $ds:ident, $parser:ident, $d:expr);*) => {
        $(
            #[doc = " Little-endian fixed-width serializer for "]
            #[doc = $d]
            #[derive(Clone, Default)]
            pub struct $bs;

            impl $bs {
                #[doc = " Create a little-endian serializer for "]
                #[doc = $d]
                pub const fn new() -> Self {
                    Self
                }
            }

            impl Serializer<$type> for $bs {
                fn serialize(&self, value: &$type, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
                    buffer.extend_from_slice(&value.to_le_bytes());
                    Ok(())
                }
            }

            #[doc = " Little-endian fixed-width deserializer for "]
            #[doc = $d]
            #[derive(Clone, Default)]
            pub struct $ds;

            impl $ds {
                #[doc = " Create a little-endian deserializer for "]
                #[doc = $d]
                pub const fn new() -> Self {
                    Self
                }
            }

            impl Deserializer<$type> for $ds {
                fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
                    &self,
                    buffer: &'a [u8],
                ) -> IResult<&'a [u8], $type, E> {
                    context(concat!("Failed ", stringify!($type), " deserialization"), $parser)(buffer)
                }
            }
        )*
    };
}

gen_fixed! {
    u8, U8Serializer, U8Deserializer, le_u8, "`u8`";
    u16, U16LeSerializer, U16LeDeserializer, le_u16, "`u16`";
    u32, U32LeSerializer, U32LeDeserializer, le_u32, "`u32`";
    u64, U64LeSerializer, U64LeDeserializer, le_u64, "`u64`";
    u128, U128LeSerializer, U128LeDeserializer, le_u128, "`u128`"
}

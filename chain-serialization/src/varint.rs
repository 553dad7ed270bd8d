// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::{Deserializer, SerializeError, Serializer};
use nom::error::{context, ContextError, ErrorKind, ParseError};
use nom::IResult;
use std::ops::{Bound, RangeBounds};
use unsigned_varint::decode::Error as VarIntError;

/// Maximum encoded size of a `u16` varint
pub const U16_VARINT_MAX_BYTES: usize = 3;
/// Maximum encoded size of a `u32` varint
pub const U32_VARINT_MAX_BYTES: usize = 5;
/// Maximum encoded size of a `u64` varint
pub const U64_VARINT_MAX_BYTES: usize = 10;

// Insufficient input is a truncation, anything else (overflow, non-minimal) is a malformed varint.
fn varint_error_kind(err: VarIntError) -> ErrorKind {
    match err {
        VarIntError::Insufficient => ErrorKind::Eof,
        _ => ErrorKind::TooLarge,
    }
}

macro_rules! gen_varint {
    ($($type:ident, $bs:ident, $ds:ident, $buffer:ident, $d:expr);*) => {
        $(
            #[doc = " Serializer for "]
            #[doc = $d]
            #[doc = " in a varint form."]
            #[derive(Clone, Default)]
            pub struct $bs;

            impl $bs {
                #[doc = " Create a basic serializer for "]
                #[doc = $d]
                #[doc = " in a varint form."]
                pub const fn new() -> Self {
                    Self
                }
            }

            impl Serializer<$type> for $bs {
                fn serialize(&self, value: &$type, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
                    buffer.extend_from_slice(unsigned_varint::encode::$type(
                        *value,
                        &mut unsigned_varint::encode::$buffer(),
                    ));
                    Ok(())
                }
            }

            #[doc = " Deserializer for "]
            #[doc = $d]
            #[doc = " in a varint form."]
            #[derive(Clone)]
            pub struct $ds {
                range: (Bound<$type>, Bound<$type>),
            }

            impl $ds {
                #[doc = " Create a basic deserializer for "]
                #[doc = $d]
                #[doc = " in a varint form."]
                #[doc = ""]
                #[doc = " Values outside of `[min, max]` are rejected as a malformed record."]
                pub const fn new(min: Bound<$type>, max: Bound<$type>) -> Self {
                    Self { range: (min, max) }
                }
            }

            impl Deserializer<$type> for $ds {
                fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
                    &self,
                    buffer: &'a [u8],
                ) -> IResult<&'a [u8], $type, E> {
                    context(concat!("Failed ", stringify!($type), " varint deserialization"), |input: &'a [u8]| {
                        let (value, rest) = unsigned_varint::decode::$type(input).map_err(|err| {
                            nom::Err::Error(E::from_error_kind(input, varint_error_kind(err)))
                        })?;
                        // the last group may carry bits above the type width, which the
                        // decoder drops: only the canonical bytes of `value` are accepted
                        let read = input.len() - rest.len();
                        let mut canonical_buffer = unsigned_varint::encode::$buffer();
                        let canonical = unsigned_varint::encode::$type(value, &mut canonical_buffer);
                        if input[..read] != *canonical {
                            return Err(nom::Err::Error(E::from_error_kind(
                                input,
                                ErrorKind::TooLarge,
                            )));
                        }
                        if !self.range.contains(&value) {
                            return Err(nom::Err::Error(E::from_error_kind(
                                input,
                                ErrorKind::Verify,
                            )));
                        }
                        Ok((rest, value))
                    })(buffer)
                }
            }
        )*
    };
}

gen_varint! {
    u16, U16VarIntSerializer, U16VarIntDeserializer, u16_buffer, "`u16`";
    u32, U32VarIntSerializer, U32VarIntDeserializer, u32_buffer, "`u32`";
    u64, U64VarIntSerializer, U64VarIntDeserializer, u64_buffer, "`u64`"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DecodeErrorKind, DecodeFailure, DeserializeError};
    use assert_matches::assert_matches;
    use paste::paste;
    use std::ops::Bound::Included;

    macro_rules! gen_varint_tests {
        ($($type:ident, $max_bytes:expr);*) => {
            paste! {
                $(
                    #[test]
                    fn [<test_ $type _max_is_widest_encoding>]() {
                        let mut buffer = Vec::new();
                        [<$type:upper VarIntSerializer>]::new().serialize(&$type::MAX, &mut buffer).unwrap();
                        assert_eq!(buffer.len(), $max_bytes);
                        let (rest, value) = [<$type:upper VarIntDeserializer>]::new(Included(0), Included($type::MAX))
                            .deserialize::<DeserializeError>(&buffer)
                            .unwrap();
                        assert!(rest.is_empty());
                        assert_eq!(value, $type::MAX);
                    }

                    #[test]
                    fn [<test_ $type _overlong_is_rejected>]() {
                        let mut buffer = vec![0x80u8; $max_bytes];
                        buffer.push(0x01);
                        let err = [<$type:upper VarIntDeserializer>]::new(Included(0), Included($type::MAX))
                            .deserialize::<DeserializeError>(&buffer)
                            .unwrap_err();
                        assert_eq!(DecodeFailure::from(err).kind, DecodeErrorKind::MalformedVarint);
                    }

                    #[test]
                    fn [<test_ $type _last_group_overflow_is_rejected>]() {
                        let deserializer = [<$type:upper VarIntDeserializer>]::new(Included(0), Included($type::MAX));
                        let mut max_encoded = Vec::new();
                        [<$type:upper VarIntSerializer>]::new().serialize(&$type::MAX, &mut max_encoded).unwrap();
                        let last_max = max_encoded[$max_bytes - 1];
                        for last in 0u8..0x80 {
                            let mut buffer = vec![0xFFu8; $max_bytes - 1];
                            buffer.push(last);
                            let res = deserializer.deserialize::<DeserializeError>(&buffer);
                            if last == 0 || last > last_max {
                                let err = res.unwrap_err();
                                assert_eq!(
                                    DecodeFailure::from(err).kind,
                                    DecodeErrorKind::MalformedVarint,
                                    "last byte {:#04x}", last
                                );
                            } else {
                                let (rest, value) = res.unwrap();
                                assert!(rest.is_empty());
                                let mut reencoded = Vec::new();
                                [<$type:upper VarIntSerializer>]::new().serialize(&value, &mut reencoded).unwrap();
                                assert_eq!(reencoded, buffer, "last byte {:#04x}", last);
                            }
                        }
                    }

                    #[test]
                    fn [<test_ $type _boundaries_reencode_canonically>]() {
                        let serializer = [<$type:upper VarIntSerializer>]::new();
                        let deserializer = [<$type:upper VarIntDeserializer>]::new(Included(0), Included($type::MAX));
                        let mut values = vec![$type::MAX];
                        for groups in 1..$max_bytes {
                            let edge = 1u128 << (7 * groups);
                            for candidate in [edge - 1, edge] {
                                if let Ok(value) = $type::try_from(candidate) {
                                    values.push(value);
                                }
                            }
                        }
                        for value in values {
                            let mut encoded = Vec::new();
                            serializer.serialize(&value, &mut encoded).unwrap();
                            let (rest, decoded) = deserializer.deserialize::<DeserializeError>(&encoded).unwrap();
                            assert!(rest.is_empty());
                            assert_eq!(decoded, value);
                            let mut reencoded = Vec::new();
                            serializer.serialize(&decoded, &mut reencoded).unwrap();
                            assert_eq!(reencoded, encoded, "encoding of {}", value);
                        }
                    }
                )*
            }
        };
    }

    gen_varint_tests! {
        u16, U16_VARINT_MAX_BYTES;
        u32, U32_VARINT_MAX_BYTES;
        u64, U64_VARINT_MAX_BYTES
    }

    fn decode_u32(buffer: &[u8]) -> Result<(usize, u32), DecodeFailure> {
        let (rest, value) = U32VarIntDeserializer::new(Included(0), Included(u32::MAX))
            .deserialize::<DeserializeError>(buffer)?;
        Ok((rest.len(), value))
    }

    #[test]
    fn test_known_encodings() {
        let serializer = U32VarIntSerializer::new();
        for (value, expected) in [
            (0u32, vec![0x00u8]),
            (1, vec![0x01]),
            (127, vec![0x7F]),
            (128, vec![0x80, 0x01]),
            (300, vec![0xAC, 0x02]),
            (16_384, vec![0x80, 0x80, 0x01]),
        ] {
            let mut buffer = Vec::new();
            serializer.serialize(&value, &mut buffer).unwrap();
            assert_eq!(buffer, expected, "encoding of {}", value);
            assert_eq!(decode_u32(&buffer).unwrap(), (0, value));
        }
    }

    #[test]
    fn test_canonical_reencoding() {
        let serializer = U32VarIntSerializer::new();
        for encoded in [vec![0x05u8], vec![0xFF, 0x7F], vec![0xE5, 0x8E, 0x26]] {
            let (_, value) = decode_u32(&encoded).unwrap();
            let mut buffer = Vec::new();
            serializer.serialize(&value, &mut buffer).unwrap();
            assert_eq!(buffer, encoded);
        }
    }

    #[test]
    fn test_non_minimal_is_rejected() {
        assert_matches!(
            decode_u32(&[0x81, 0x00]),
            Err(DecodeFailure {
                kind: DecodeErrorKind::MalformedVarint,
                ..
            })
        );
    }

    #[test]
    fn test_dropped_high_bits_are_rejected() {
        // 2^35 - 1 does not fit a u32 even though 5 bytes is a valid u32 width
        assert_matches!(
            decode_u32(&[0xFF, 0xFF, 0xFF, 0xFF, 0x7F]),
            Err(DecodeFailure {
                kind: DecodeErrorKind::MalformedVarint,
                ..
            })
        );
        assert_eq!(
            decode_u32(&[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]).unwrap(),
            (0, u32::MAX)
        );
        let err = U16VarIntDeserializer::new(Included(0), Included(u16::MAX))
            .deserialize::<DeserializeError>(&[0xFF, 0xFF, 0x7F])
            .unwrap_err();
        assert_eq!(
            DecodeFailure::from(err).kind,
            DecodeErrorKind::MalformedVarint
        );
        let mut buffer = vec![0xFFu8; 9];
        buffer.push(0x7F);
        let err = U64VarIntDeserializer::new(Included(0), Included(u64::MAX))
            .deserialize::<DeserializeError>(&buffer)
            .unwrap_err();
        assert_eq!(
            DecodeFailure::from(err).kind,
            DecodeErrorKind::MalformedVarint
        );
    }

    #[test]
    fn test_missing_continuation_is_truncated() {
        assert_matches!(
            decode_u32(&[0x80, 0x80]),
            Err(DecodeFailure {
                kind: DecodeErrorKind::TruncatedInput,
                ..
            })
        );
        assert_matches!(
            decode_u32(&[]),
            Err(DecodeFailure {
                kind: DecodeErrorKind::TruncatedInput,
                ..
            })
        );
    }

    #[test]
    fn test_out_of_range_is_malformed_record() {
        let err = U32VarIntDeserializer::new(Included(0), Included(10))
            .deserialize::<DeserializeError>(&[0x0B])
            .unwrap_err();
        assert_eq!(
            DecodeFailure::from(err).kind,
            DecodeErrorKind::MalformedRecord
        );
    }
}

// Copyright (c) 2022 MASSA LABS <info@massa.net>
//! Positional binary codec used by every on-chain record.
//!
//! A record is encoded as the concatenation of its fields, in declaration order,
//! without any field name, padding or framing. This crate provides the building blocks:
//! * little-endian fixed-width integers (8 to 128 bits)
//! * LEB128 variable-length unsigned integers (minimal encoding only)
//! * varint length-prefixed byte blobs and element sequences
#![warn(missing_docs)]
#![warn(unused_crate_dependencies)]

mod error;
mod fixed;
mod varint;
mod vec;

pub use error::{DecodeErrorKind, DecodeFailure, DeserializeError, SerializeError};
pub use fixed::*;
pub use varint::*;
pub use vec::{VecDeserializer, VecSerializer, VecU8Deserializer, VecU8Serializer};

use nom::error::{ContextError, ParseError};
use nom::IResult;

/// Trait that define the deserialize method that must be implemented for all types that have a serialized form.
///
/// Each implementation needs to verify that the data are valid and must not panic on malformed input.
pub trait Deserializer<T> {
    /// Deserialize a value `T` from a buffer of `u8`.
    ///
    /// ## Parameters
    /// * buffer: the buffer that contains the whole serialized data.
    ///
    /// ## Returns
    /// A nom result with the rest of the serialized data and the decoded value.
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], T, E>;
}

/// Trait that define the serialize method that must be implemented for all types that need to be serialized.
pub trait Serializer<T> {
    /// Serialize a value `T` into a buffer of `u8`.
    ///
    /// ## Parameters
    /// * value: the value to be serialized.
    /// * buffer: the buffer that will contain the serialized data.
    ///
    /// ## Returns
    /// A Result with the serialized data.
    fn serialize(&self, value: &T, buffer: &mut Vec<u8>) -> Result<(), SerializeError>;
}

/// Deserializes a value that must span the whole `buffer`.
///
/// Trailing bytes are reported as a malformed record.
/// ```
/// use std::ops::Bound::Included;
/// use chain_serialization::{deserialize_exact, DecodeErrorKind, U32VarIntDeserializer};
///
/// let deserializer = U32VarIntDeserializer::new(Included(0), Included(u32::MAX));
/// assert_eq!(deserialize_exact(&deserializer, &[0xAC, 0x02]).unwrap(), 300);
/// let err = deserialize_exact(&deserializer, &[0xAC, 0x02, 0x00]).unwrap_err();
/// assert_eq!(err.kind, DecodeErrorKind::MalformedRecord);
/// ```
pub fn deserialize_exact<T, D: Deserializer<T>>(
    deserializer: &D,
    buffer: &[u8],
) -> Result<T, DecodeFailure> {
    let (rest, value) = deserializer.deserialize::<DeserializeError>(buffer)?;
    if !rest.is_empty() {
        return Err(DecodeFailure {
            kind: DecodeErrorKind::MalformedRecord,
            context: format!("{} trailing bytes after the record", rest.len()),
        });
    }
    Ok(value)
}

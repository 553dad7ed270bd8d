// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::{
    Deserializer, SerializeError, Serializer, U32VarIntDeserializer, U32VarIntSerializer,
};
use nom::error::{context, ContextError, ErrorKind, ParseError};
use nom::IResult;
use std::marker::PhantomData;
use std::ops::Bound;

fn length_prefix(len: usize, what: &str) -> Result<u32, SerializeError> {
    u32::try_from(len).map_err(|err| {
        SerializeError::NumberTooBig(format!("too many entries in {}: {}", what, err))
    })
}

/// Basic `Vec<u8>` serializer: varint length followed by the raw bytes
#[derive(Clone, Default)]
pub struct VecU8Serializer {
    len_serializer: U32VarIntSerializer,
}

impl VecU8Serializer {
    /// Creates a new `VecU8Serializer`
    pub const fn new() -> Self {
        Self {
            len_serializer: U32VarIntSerializer::new(),
        }
    }
}

impl Serializer<Vec<u8>> for VecU8Serializer {
    /// ```
    /// use chain_serialization::{Serializer, VecU8Serializer};
    ///
    /// let mut buffer = Vec::new();
    /// VecU8Serializer::new().serialize(&vec![1, 2, 3], &mut buffer).unwrap();
    /// assert_eq!(buffer, vec![3, 1, 2, 3]);
    /// ```
    fn serialize(&self, value: &Vec<u8>, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        let len = length_prefix(value.len(), "VecU8")?;
        self.len_serializer.serialize(&len, buffer)?;
        buffer.extend(value);
        Ok(())
    }
}

/// Basic `Vec<u8>` deserializer
#[derive(Clone)]
pub struct VecU8Deserializer {
    len_deserializer: U32VarIntDeserializer,
}

impl VecU8Deserializer {
    /// Creates a new `VecU8Deserializer`
    pub const fn new(min_length: Bound<u32>, max_length: Bound<u32>) -> Self {
        Self {
            len_deserializer: U32VarIntDeserializer::new(min_length, max_length),
        }
    }
}

impl Deserializer<Vec<u8>> for VecU8Deserializer {
    /// ```
    /// use std::ops::Bound::Included;
    /// use chain_serialization::{Serializer, Deserializer, DeserializeError, VecU8Serializer, VecU8Deserializer};
    ///
    /// let vec = vec![1, 2, 3];
    /// let mut serialized = Vec::new();
    /// let serializer = VecU8Serializer::new();
    /// let deserializer = VecU8Deserializer::new(Included(0), Included(1000000));
    /// serializer.serialize(&vec, &mut serialized).unwrap();
    /// let (rest, vec_deser) = deserializer.deserialize::<DeserializeError>(&serialized).unwrap();
    /// assert!(rest.is_empty());
    /// assert_eq!(vec, vec_deser);
    /// ```
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], Vec<u8>, E> {
        context("Failed Vec<u8> deserialization", |input: &'a [u8]| {
            let (rest, len) = self.len_deserializer.deserialize::<E>(input)?;
            let len = len as usize;
            if len > rest.len() {
                return Err(nom::Err::Error(E::from_error_kind(
                    input,
                    ErrorKind::LengthValue,
                )));
            }
            let (data, rest) = rest.split_at(len);
            Ok((rest, data.to_vec()))
        })(buffer)
    }
}

/// Serializer for a sequence: varint element count followed by each element
#[derive(Clone)]
pub struct VecSerializer<T, ST>
where
    ST: Serializer<T>,
{
    len_serializer: U32VarIntSerializer,
    data_serializer: ST,
    phantom_t: PhantomData<T>,
}

impl<T, ST> VecSerializer<T, ST>
where
    ST: Serializer<T>,
{
    /// Creates a new `VecSerializer` using `data_serializer` for every element
    pub fn new(data_serializer: ST) -> Self {
        Self {
            len_serializer: U32VarIntSerializer::new(),
            data_serializer,
            phantom_t: PhantomData,
        }
    }
}

impl<T, ST> Serializer<Vec<T>> for VecSerializer<T, ST>
where
    ST: Serializer<T>,
{
    fn serialize(&self, value: &Vec<T>, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        let len = length_prefix(value.len(), "Vec")?;
        self.len_serializer.serialize(&len, buffer)?;
        for elem in value {
            self.data_serializer.serialize(elem, buffer)?;
        }
        Ok(())
    }
}

/// Deserializer for a sequence: varint element count followed by each element.
///
/// Elements are expected to take at least one byte each, so a count larger than the
/// remaining input is rejected before any element is parsed.
#[derive(Clone)]
pub struct VecDeserializer<T, DT>
where
    DT: Deserializer<T>,
{
    len_deserializer: U32VarIntDeserializer,
    data_deserializer: DT,
    phantom_t: PhantomData<T>,
}

impl<T, DT> VecDeserializer<T, DT>
where
    DT: Deserializer<T>,
{
    /// Creates a new `VecDeserializer`
    ///
    /// # Arguments
    /// * `data_deserializer`: deserializer of a single element
    /// * `min_length` / `max_length`: accepted element count
    pub const fn new(data_deserializer: DT, min_length: Bound<u32>, max_length: Bound<u32>) -> Self {
        Self {
            len_deserializer: U32VarIntDeserializer::new(min_length, max_length),
            data_deserializer,
            phantom_t: PhantomData,
        }
    }
}

impl<T, DT> Deserializer<Vec<T>> for VecDeserializer<T, DT>
where
    DT: Deserializer<T>,
{
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], Vec<T>, E> {
        context("Failed Vec deserialization", |input: &'a [u8]| {
            let (mut rest, count) = context("Failed length deserialization", |input: &'a [u8]| {
                self.len_deserializer.deserialize::<E>(input)
            })(input)?;
            let count = count as usize;
            if count > rest.len() {
                return Err(nom::Err::Error(E::from_error_kind(
                    input,
                    ErrorKind::LengthValue,
                )));
            }
            let mut elements = Vec::with_capacity(count);
            for _ in 0..count {
                let (next, elem) = self.data_deserializer.deserialize::<E>(rest)?;
                elements.push(elem);
                rest = next;
            }
            Ok((rest, elements))
        })(buffer)
    }
}

// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::error::ModelsError;
use chain_serialization::{
    Deserializer, SerializeError, Serializer, U64LeDeserializer, U64LeSerializer,
};
use nom::error::{context, ContextError, ParseError};
use nom::IResult;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;

const NAME_CHARMAP: &[u8; 32] = b".12345abcdefghijklmnopqrstuvwxyz";
/// Max number of characters in the textual form of a name
pub const NAME_MAX_LENGTH: usize = 13;

/// 64-bit identifier of an account, an action or a permission.
///
/// Its textual form uses the alphabet `.12345a-z`: up to 12 characters of 5 bits each,
/// most significant first, plus an optional 13th character of 4 bits.
#[derive(
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    SerializeDisplay,
    DeserializeFromStr,
)]
pub struct Name(u64);

/// account identifier
pub type AccountName = Name;
/// action identifier
pub type ActionName = Name;
/// permission identifier
pub type PermissionName = Name;

fn char_to_symbol(c: u8) -> Option<u64> {
    match c {
        b'a'..=b'z' => Some((c - b'a') as u64 + 6),
        b'1'..=b'5' => Some((c - b'1') as u64 + 1),
        b'.' => Some(0),
        _ => None,
    }
}

impl Name {
    /// Name from its raw value
    pub const fn from_u64(value: u64) -> Self {
        Name(value)
    }

    /// raw value
    pub const fn to_u64(&self) -> u64 {
        self.0
    }

    /// true for the empty name
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for Name {
    fn from(value: u64) -> Self {
        Name(value)
    }
}

impl From<Name> for u64 {
    fn from(name: Name) -> Self {
        name.0
    }
}

impl FromStr for Name {
    type Err = ModelsError;

    /// ```
    /// # use chain_models::name::Name;
    /// # use std::str::FromStr;
    /// let name = Name::from_str("eosio").unwrap();
    /// assert_eq!(name.to_u64(), 6138663577826885632);
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() > NAME_MAX_LENGTH {
            return Err(ModelsError::NameParseError(format!(
                "{} is longer than {} characters",
                s, NAME_MAX_LENGTH
            )));
        }
        let mut value = 0u64;
        for (i, c) in bytes.iter().enumerate() {
            let symbol = char_to_symbol(*c).ok_or_else(|| {
                ModelsError::NameParseError(format!("invalid character {:?} in {}", *c as char, s))
            })?;
            if i < 12 {
                value |= symbol << (64 - 5 * (i + 1));
            } else {
                if symbol > 0x0F {
                    return Err(ModelsError::NameParseError(format!(
                        "13th character of {} must be in [.1-5a-j]",
                        s
                    )));
                }
                value |= symbol;
            }
        }
        Ok(Name(value))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut chars = [b'.'; NAME_MAX_LENGTH];
        let mut tmp = self.0;
        for i in 0..NAME_MAX_LENGTH {
            let (mask, shift) = if i == 0 { (0x0F, 4) } else { (0x1F, 5) };
            chars[NAME_MAX_LENGTH - 1 - i] = NAME_CHARMAP[(tmp & mask) as usize];
            tmp >>= shift;
        }
        let len = chars
            .iter()
            .rposition(|c| *c != b'.')
            .map_or(0, |pos| pos + 1);
        for c in &chars[..len] {
            write!(f, "{}", *c as char)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self)
    }
}

/// Serializer for `Name`: 8 bytes little-endian
#[derive(Clone, Default)]
pub struct NameSerializer {
    u64_serializer: U64LeSerializer,
}

impl NameSerializer {
    /// Creates a new `NameSerializer`
    pub const fn new() -> Self {
        Self {
            u64_serializer: U64LeSerializer::new(),
        }
    }
}

impl Serializer<Name> for NameSerializer {
    fn serialize(&self, value: &Name, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        self.u64_serializer.serialize(&value.0, buffer)
    }
}

/// Deserializer for `Name`
#[derive(Clone, Default)]
pub struct NameDeserializer {
    u64_deserializer: U64LeDeserializer,
}

impl NameDeserializer {
    /// Creates a new `NameDeserializer`
    pub const fn new() -> Self {
        Self {
            u64_deserializer: U64LeDeserializer::new(),
        }
    }
}

impl Deserializer<Name> for NameDeserializer {
    /// ```
    /// use chain_models::name::{Name, NameSerializer, NameDeserializer};
    /// use chain_serialization::{Serializer, Deserializer, DeserializeError};
    /// use std::str::FromStr;
    ///
    /// let name = Name::from_str("eosio.token").unwrap();
    /// let mut serialized = Vec::new();
    /// NameSerializer::new().serialize(&name, &mut serialized).unwrap();
    /// assert_eq!(serialized, vec![0x00, 0xa6, 0x82, 0x34, 0x03, 0xea, 0x30, 0x55]);
    /// let (rest, name_deser) = NameDeserializer::new().deserialize::<DeserializeError>(&serialized).unwrap();
    /// assert!(rest.is_empty());
    /// assert_eq!(name, name_deser);
    /// ```
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], Name, E> {
        context("Failed Name deserialization", |input| {
            self.u64_deserializer
                .deserialize(input)
                .map(|(rest, value)| (rest, Name(value)))
        })(buffer)
    }
}

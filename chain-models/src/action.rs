// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::config::TransactionConfig;
use crate::error::ModelsError;
use crate::name::{AccountName, ActionName, NameDeserializer, NameSerializer, PermissionName};
use chain_serialization::{
    Deserializer, SerializeError, Serializer, VecDeserializer, VecSerializer, VecU8Deserializer,
    VecU8Serializer,
};
use nom::error::{context, ContextError, ParseError};
use nom::sequence::tuple;
use nom::{IResult, Parser};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt::Formatter;
use std::ops::Bound::Included;

/// Which action list of a transaction an index refers to
#[derive(
    IntoPrimitive, TryFromPrimitive, Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize,
)]
#[repr(u32)]
pub enum ActionKind {
    /// actions executed without access to chain state
    ContextFree = 0,
    /// regular actions
    Regular = 1,
}

impl ActionKind {
    /// Parses the raw discriminant used at the host boundary
    pub fn from_raw(raw: u32) -> Result<Self, ModelsError> {
        ActionKind::try_from(raw).map_err(|_| ModelsError::InvalidActionKind(raw))
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::ContextFree => write!(f, "context-free"),
            ActionKind::Regular => write!(f, "regular"),
        }
    }
}

/// An `(actor, permission)` pair authorizing an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionLevel {
    /// account granting the authorization
    pub actor: AccountName,
    /// permission of the actor being used
    pub permission: PermissionName,
}

impl PermissionLevel {
    /// Creates a new `PermissionLevel`
    pub fn new(actor: AccountName, permission: PermissionName) -> Self {
        PermissionLevel { actor, permission }
    }
}

impl std::fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.actor, self.permission)
    }
}

/// Serializer for `PermissionLevel`
#[derive(Clone, Default)]
pub struct PermissionLevelSerializer {
    name_serializer: NameSerializer,
}

impl PermissionLevelSerializer {
    /// Creates a new `PermissionLevelSerializer`
    pub const fn new() -> Self {
        Self {
            name_serializer: NameSerializer::new(),
        }
    }
}

impl Serializer<PermissionLevel> for PermissionLevelSerializer {
    fn serialize(
        &self,
        value: &PermissionLevel,
        buffer: &mut Vec<u8>,
    ) -> Result<(), SerializeError> {
        self.name_serializer.serialize(&value.actor, buffer)?;
        self.name_serializer.serialize(&value.permission, buffer)?;
        Ok(())
    }
}

/// Deserializer for `PermissionLevel`
#[derive(Clone, Default)]
pub struct PermissionLevelDeserializer {
    name_deserializer: NameDeserializer,
}

impl PermissionLevelDeserializer {
    /// Creates a new `PermissionLevelDeserializer`
    pub const fn new() -> Self {
        Self {
            name_deserializer: NameDeserializer::new(),
        }
    }
}

impl Deserializer<PermissionLevel> for PermissionLevelDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], PermissionLevel, E> {
        context(
            "Failed PermissionLevel deserialization",
            tuple((
                context("Failed actor deserialization", |input| {
                    self.name_deserializer.deserialize(input)
                }),
                context("Failed permission deserialization", |input| {
                    self.name_deserializer.deserialize(input)
                }),
            )),
        )
        .map(|(actor, permission)| PermissionLevel { actor, permission })
        .parse(buffer)
    }
}

/// One unit of work of a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// account the action is sent to
    pub account: AccountName,
    /// name of the action
    pub name: ActionName,
    /// authorizations, in the order they were given
    pub authorization: Vec<PermissionLevel>,
    /// opaque payload, interpreted by the receiving contract
    pub data: Vec<u8>,
}

impl Action {
    /// Creates a new `Action`
    pub fn new(
        account: AccountName,
        name: ActionName,
        authorization: Vec<PermissionLevel>,
        data: Vec<u8>,
    ) -> Self {
        Action {
            account,
            name,
            authorization,
            data,
        }
    }
}

impl Action {
    /// Fails unless the action fits the decoding limits of `config`
    pub fn check_limits(&self, config: &TransactionConfig) -> Result<(), ModelsError> {
        if self.authorization.len() > config.max_authorizations_per_action as usize {
            return Err(ModelsError::LimitExceeded(format!(
                "{} authorizations on {}::{}, at most {}",
                self.authorization.len(),
                self.account,
                self.name,
                config.max_authorizations_per_action
            )));
        }
        if self.data.len() > config.max_action_data_size as usize {
            return Err(ModelsError::LimitExceeded(format!(
                "{} bytes of data on {}::{}, at most {}",
                self.data.len(),
                self.account,
                self.name,
                config.max_action_data_size
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{} [", self.account, self.name)?;
        for (i, level) in self.authorization.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", level)?;
        }
        write!(f, "] ({} bytes of data)", self.data.len())
    }
}

/// Serializer for `Action`
#[derive(Clone)]
pub struct ActionSerializer {
    name_serializer: NameSerializer,
    authorization_serializer: VecSerializer<PermissionLevel, PermissionLevelSerializer>,
    data_serializer: VecU8Serializer,
}

impl ActionSerializer {
    /// Creates a new `ActionSerializer`
    pub fn new() -> Self {
        Self {
            name_serializer: NameSerializer::new(),
            authorization_serializer: VecSerializer::new(PermissionLevelSerializer::new()),
            data_serializer: VecU8Serializer::new(),
        }
    }
}

impl Default for ActionSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Serializer<Action> for ActionSerializer {
    /// ```
    /// use chain_models::action::{Action, ActionSerializer, PermissionLevel};
    /// use chain_models::name::Name;
    /// use chain_serialization::Serializer;
    /// use std::str::FromStr;
    ///
    /// let action = Action::new(
    ///     Name::from_str("eosio.token").unwrap(),
    ///     Name::from_str("transfer").unwrap(),
    ///     vec![PermissionLevel::new(Name::from_str("alice").unwrap(), Name::from_str("active").unwrap())],
    ///     vec![1, 2, 3],
    /// );
    /// let mut buffer = Vec::new();
    /// ActionSerializer::new().serialize(&action, &mut buffer).unwrap();
    /// // 8 (account) + 8 (name) + 1 (count) + 16 (one level) + 1 (length) + 3 (data)
    /// assert_eq!(buffer.len(), 37);
    /// ```
    fn serialize(&self, value: &Action, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        self.name_serializer.serialize(&value.account, buffer)?;
        self.name_serializer.serialize(&value.name, buffer)?;
        self.authorization_serializer
            .serialize(&value.authorization, buffer)?;
        self.data_serializer.serialize(&value.data, buffer)?;
        Ok(())
    }
}

/// Deserializer for `Action`
#[derive(Clone)]
pub struct ActionDeserializer {
    name_deserializer: NameDeserializer,
    authorization_deserializer: VecDeserializer<PermissionLevel, PermissionLevelDeserializer>,
    data_deserializer: VecU8Deserializer,
}

impl ActionDeserializer {
    /// Creates a new `ActionDeserializer` bounded by the limits of `config`
    pub const fn new(config: TransactionConfig) -> Self {
        Self {
            name_deserializer: NameDeserializer::new(),
            authorization_deserializer: VecDeserializer::new(
                PermissionLevelDeserializer::new(),
                Included(0),
                Included(config.max_authorizations_per_action),
            ),
            data_deserializer: VecU8Deserializer::new(
                Included(0),
                Included(config.max_action_data_size),
            ),
        }
    }
}

impl Deserializer<Action> for ActionDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], Action, E> {
        context(
            "Failed Action deserialization",
            tuple((
                context("Failed account deserialization", |input| {
                    self.name_deserializer.deserialize(input)
                }),
                context("Failed name deserialization", |input| {
                    self.name_deserializer.deserialize(input)
                }),
                context("Failed authorization deserialization", |input| {
                    self.authorization_deserializer.deserialize(input)
                }),
                context("Failed data deserialization", |input| {
                    self.data_deserializer.deserialize(input)
                }),
            )),
        )
        .map(|(account, name, authorization, data)| Action {
            account,
            name,
            authorization,
            data,
        })
        .parse(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::Name;
    use assert_matches::assert_matches;
    use chain_serialization::{deserialize_exact, DecodeErrorKind};
    use hex_literal::hex;
    use serial_test::serial;
    use std::str::FromStr;

    fn transfer_action() -> Action {
        Action::new(
            Name::from_str("eosio.token").unwrap(),
            Name::from_str("transfer").unwrap(),
            vec![PermissionLevel::new(
                Name::from_str("alice").unwrap(),
                Name::from_str("active").unwrap(),
            )],
            vec![0xCA, 0xFE],
        )
    }

    #[test]
    #[serial]
    fn test_action_layout() {
        let mut buffer = Vec::new();
        ActionSerializer::new()
            .serialize(&transfer_action(), &mut buffer)
            .unwrap();
        assert_eq!(
            buffer,
            hex!(
                "00a6823403ea3055"
                "000000572d3ccdcd"
                "01"
                "0000000000855c34" "00000000a8ed3232"
                "02" "cafe"
            )
        );
        let action = deserialize_exact(
            &ActionDeserializer::new(TransactionConfig::default()),
            &buffer,
        )
        .unwrap();
        assert_eq!(action, transfer_action());
    }

    #[test]
    #[serial]
    fn test_payload_overrun_is_malformed() {
        let mut buffer = Vec::new();
        ActionSerializer::new()
            .serialize(&transfer_action(), &mut buffer)
            .unwrap();
        // claim a 3 bytes payload while only 2 follow
        let len_pos = buffer.len() - 3;
        buffer[len_pos] = 3;
        let err = deserialize_exact(
            &ActionDeserializer::new(TransactionConfig::default()),
            &buffer,
        )
        .unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::MalformedRecord);
    }

    #[test]
    #[serial]
    fn test_too_many_authorizations() {
        let mut action = transfer_action();
        action.authorization = vec![action.authorization[0]; 3];
        let mut buffer = Vec::new();
        ActionSerializer::new()
            .serialize(&action, &mut buffer)
            .unwrap();
        let config = TransactionConfig {
            max_authorizations_per_action: 2,
            ..TransactionConfig::default()
        };
        let err = deserialize_exact(&ActionDeserializer::new(config), &buffer).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::MalformedRecord);
    }

    #[test]
    #[serial]
    fn test_action_kind() {
        assert_eq!(ActionKind::from_raw(0).unwrap(), ActionKind::ContextFree);
        assert_eq!(ActionKind::from_raw(1).unwrap(), ActionKind::Regular);
        assert_eq!(u32::from(ActionKind::Regular), 1);
        assert_eq!(
            ActionKind::from_raw(2).unwrap_err(),
            ModelsError::InvalidActionKind(2)
        );
    }

    #[test]
    #[serial]
    fn test_action_limits() {
        let config = TransactionConfig {
            max_authorizations_per_action: 2,
            max_action_data_size: 4,
            ..TransactionConfig::default()
        };
        let mut action = transfer_action();
        action.check_limits(&config).unwrap();

        action.data = vec![0; 5];
        assert_matches!(
            action.check_limits(&config),
            Err(ModelsError::LimitExceeded(_))
        );

        let mut action = transfer_action();
        action.authorization = vec![action.authorization[0]; 3];
        assert_matches!(
            action.check_limits(&config),
            Err(ModelsError::LimitExceeded(_))
        );
    }

    #[test]
    #[serial]
    fn test_action_display() {
        assert_eq!(
            transfer_action().to_string(),
            "eosio.token::transfer [alice@active] (2 bytes of data)"
        );
    }
}

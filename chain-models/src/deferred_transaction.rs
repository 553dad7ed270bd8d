// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::config::TransactionConfig;
use crate::error::{ModelsError, ModelsResult};
use crate::name::{AccountName, NameDeserializer, NameSerializer};
use crate::transaction::{Transaction, TransactionDeserializer, TransactionSerializer};
use chain_serialization::{
    deserialize_exact, Deserializer, SerializeError, Serializer, U128LeDeserializer,
    U128LeSerializer,
};
use chain_time::{ChainTime, ChainTimeDeserializer, ChainTimeSerializer};
use nom::error::{context, ContextError, ParseError};
use nom::sequence::tuple;
use nom::{IResult, Parser};
use serde::{Deserialize, Serialize};
use std::fmt::Formatter;
use std::ops::Deref;

/// A transaction scheduled by a contract to be executed later.
///
/// Serialized as the base transaction immediately followed by
/// `sender_id`, `sender`, `payer` and `delay_until`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredTransaction {
    /// the scheduled transaction
    pub transaction: Transaction,
    /// identifier chosen by the sender, unique within the sending contract
    pub sender_id: u128,
    /// contract that scheduled the transaction
    pub sender: AccountName,
    /// account billed for the resources of the transaction
    pub payer: AccountName,
    /// the transaction does not execute before this time
    pub delay_until: ChainTime,
}

impl DeferredTransaction {
    /// Creates a new `DeferredTransaction`
    pub fn new(
        transaction: Transaction,
        sender_id: u128,
        sender: AccountName,
        payer: AccountName,
        delay_until: ChainTime,
    ) -> Self {
        DeferredTransaction {
            transaction,
            sender_id,
            sender,
            payer,
            delay_until,
        }
    }

    /// Serialized form of the deferred transaction
    pub fn to_bytes(&self) -> ModelsResult<Vec<u8>> {
        let mut buffer = Vec::new();
        DeferredTransactionSerializer::new().serialize(self, &mut buffer)?;
        Ok(buffer)
    }

    /// Decodes a deferred transaction spanning the whole buffer
    pub fn from_bytes(buffer: &[u8], config: TransactionConfig) -> ModelsResult<Self> {
        deserialize_exact(&DeferredTransactionDeserializer::new(config), buffer)
            .map_err(ModelsError::from)
    }
}

impl Deref for DeferredTransaction {
    type Target = Transaction;

    fn deref(&self) -> &Self::Target {
        &self.transaction
    }
}

impl AsRef<Transaction> for DeferredTransaction {
    fn as_ref(&self) -> &Transaction {
        &self.transaction
    }
}

impl From<DeferredTransaction> for Transaction {
    fn from(deferred: DeferredTransaction) -> Self {
        deferred.transaction
    }
}

impl std::fmt::Display for DeferredTransaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.transaction)?;
        writeln!(f, "Sender: {} (id {})", self.sender, self.sender_id)?;
        writeln!(f, "Payer: {}", self.payer)?;
        writeln!(f, "Delay until: {}", self.delay_until)?;
        Ok(())
    }
}

/// Serializer for `DeferredTransaction`
#[derive(Clone)]
pub struct DeferredTransactionSerializer {
    transaction_serializer: TransactionSerializer,
    u128_serializer: U128LeSerializer,
    name_serializer: NameSerializer,
    time_serializer: ChainTimeSerializer,
}

impl DeferredTransactionSerializer {
    /// Creates a new `DeferredTransactionSerializer`
    pub fn new() -> Self {
        Self {
            transaction_serializer: TransactionSerializer::new(),
            u128_serializer: U128LeSerializer::new(),
            name_serializer: NameSerializer::new(),
            time_serializer: ChainTimeSerializer::new(),
        }
    }
}

impl Default for DeferredTransactionSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Serializer<DeferredTransaction> for DeferredTransactionSerializer {
    fn serialize(
        &self,
        value: &DeferredTransaction,
        buffer: &mut Vec<u8>,
    ) -> Result<(), SerializeError> {
        self.transaction_serializer
            .serialize(&value.transaction, buffer)?;
        self.u128_serializer.serialize(&value.sender_id, buffer)?;
        self.name_serializer.serialize(&value.sender, buffer)?;
        self.name_serializer.serialize(&value.payer, buffer)?;
        self.time_serializer.serialize(&value.delay_until, buffer)?;
        Ok(())
    }
}

/// Deserializer for `DeferredTransaction`
#[derive(Clone)]
pub struct DeferredTransactionDeserializer {
    transaction_deserializer: TransactionDeserializer,
    u128_deserializer: U128LeDeserializer,
    name_deserializer: NameDeserializer,
    time_deserializer: ChainTimeDeserializer,
}

impl DeferredTransactionDeserializer {
    /// Creates a new `DeferredTransactionDeserializer`
    pub fn new(config: TransactionConfig) -> Self {
        Self {
            transaction_deserializer: TransactionDeserializer::new(config),
            u128_deserializer: U128LeDeserializer::new(),
            name_deserializer: NameDeserializer::new(),
            time_deserializer: ChainTimeDeserializer::default(),
        }
    }
}

impl Deserializer<DeferredTransaction> for DeferredTransactionDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], DeferredTransaction, E> {
        context(
            "Failed DeferredTransaction deserialization",
            tuple((
                |input| self.transaction_deserializer.deserialize(input),
                context("Failed sender_id deserialization", |input| {
                    self.u128_deserializer.deserialize(input)
                }),
                context("Failed sender deserialization", |input| {
                    self.name_deserializer.deserialize(input)
                }),
                context("Failed payer deserialization", |input| {
                    self.name_deserializer.deserialize(input)
                }),
                context("Failed delay_until deserialization", |input| {
                    self.time_deserializer.deserialize(input)
                }),
            )),
        )
        .map(
            |(transaction, sender_id, sender, payer, delay_until)| DeferredTransaction {
                transaction,
                sender_id,
                sender,
                payer,
                delay_until,
            },
        )
        .parse(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Action, PermissionLevel};
    use crate::name::Name;
    use chain_serialization::DecodeErrorKind;
    use hex_literal::hex;
    use serial_test::serial;
    use std::str::FromStr;

    fn deferred() -> DeferredTransaction {
        let mut transaction = Transaction::new(ChainTime::from_secs(1000), 0);
        transaction.ref_block_num = 5;
        transaction.ref_block_prefix = 0xAABBCCDD;
        DeferredTransaction::new(
            transaction,
            42,
            Name::from_str("eosio").unwrap(),
            Name::from_str("alice").unwrap(),
            ChainTime::from_secs(2000),
        )
    }

    #[test]
    #[serial]
    fn test_fixture_bytes() {
        let bytes = deferred().to_bytes().unwrap();
        assert_eq!(
            bytes,
            hex!(
                "e8030000 0000 0500 ddccbbaa 00 00 00 00 00"
                "2a000000000000000000000000000000"
                "0000000000ea3055"
                "0000000000855c34"
                "d0070000"
            )
        );
        let decoded = DeferredTransaction::from_bytes(&bytes, TransactionConfig::default()).unwrap();
        assert_eq!(decoded, deferred());
    }

    #[test]
    #[serial]
    fn test_base_then_extra_fields() {
        let mut value = deferred();
        value.transaction.actions = vec![Action::new(
            Name::from_str("eosio.token").unwrap(),
            Name::from_str("transfer").unwrap(),
            vec![PermissionLevel::new(
                Name::from_str("alice").unwrap(),
                Name::from_str("active").unwrap(),
            )],
            vec![7; 12],
        )];
        value.sender_id = u128::MAX - 1;

        let mut extra = Vec::new();
        U128LeSerializer::new()
            .serialize(&value.sender_id, &mut extra)
            .unwrap();
        NameSerializer::new()
            .serialize(&value.sender, &mut extra)
            .unwrap();
        NameSerializer::new()
            .serialize(&value.payer, &mut extra)
            .unwrap();
        ChainTimeSerializer::new()
            .serialize(&value.delay_until, &mut extra)
            .unwrap();

        let mut expected = value.transaction.to_bytes().unwrap();
        expected.extend(extra);
        let bytes = value.to_bytes().unwrap();
        assert_eq!(bytes, expected);

        let decoded = DeferredTransaction::from_bytes(&bytes, TransactionConfig::default()).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(Transaction::from(decoded), value.transaction);
    }

    #[test]
    #[serial]
    fn test_truncated_extra_fields() {
        let bytes = deferred().to_bytes().unwrap();
        let err = DeferredTransaction::from_bytes(&bytes[..bytes.len() - 1], TransactionConfig::default())
            .unwrap_err();
        assert_eq!(err.decode_kind(), Some(DecodeErrorKind::TruncatedInput));
        // a bare transaction is not a deferred transaction
        let base = deferred().transaction.to_bytes().unwrap();
        let err = DeferredTransaction::from_bytes(&base, TransactionConfig::default()).unwrap_err();
        assert_eq!(err.decode_kind(), Some(DecodeErrorKind::TruncatedInput));
    }

    #[test]
    #[serial]
    fn test_deref_to_base() {
        let value = deferred();
        assert_eq!(value.ref_block_num, 5);
        assert_eq!(value.as_ref().expiration, ChainTime::from_secs(1000));
    }

    #[test]
    #[serial]
    fn test_json_view() {
        let json = serde_json::to_value(deferred()).unwrap();
        assert_eq!(json["payer"], "alice");
        assert_eq!(json["transaction"]["ref_block_num"], 5);
    }
}

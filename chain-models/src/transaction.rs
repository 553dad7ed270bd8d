// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::action::{Action, ActionDeserializer, ActionSerializer};
use crate::config::constants::DEFAULT_REGION;
use crate::config::TransactionConfig;
use crate::error::{ModelsError, ModelsResult};
use chain_serialization::{
    deserialize_exact, Deserializer, SerializeError, Serializer, U16LeDeserializer,
    U16LeSerializer, U32LeDeserializer, U32LeSerializer, U32VarIntDeserializer,
    U32VarIntSerializer, VecDeserializer, VecSerializer,
};
use chain_time::{ChainTime, ChainTimeDeserializer, ChainTimeSerializer};
use nom::error::{context, ContextError, ParseError};
use nom::sequence::tuple;
use nom::{IResult, Parser};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::Formatter;
use std::ops::Bound::Included;

/// Size in bytes of a transaction id
pub const TRANSACTION_ID_SIZE_BYTES: usize = 32;

/// region identifier
pub type RegionId = u16;

/// Identity of a transaction: SHA-256 of its serialized form
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct TransactionId([u8; TRANSACTION_ID_SIZE_BYTES]);

impl TransactionId {
    /// id from raw bytes
    pub const fn from_bytes(data: &[u8; TRANSACTION_ID_SIZE_BYTES]) -> TransactionId {
        TransactionId(*data)
    }

    /// id to bytes
    pub fn to_bytes(&self) -> &[u8; TRANSACTION_ID_SIZE_BYTES] {
        &self.0
    }

    /// id of already serialized transaction bytes
    pub fn compute_from(serialized: &[u8]) -> TransactionId {
        TransactionId(Sha256::digest(serialized).into())
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for byte in self.0.iter() {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for TransactionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

/// the transaction as sent to the chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// the transaction is rejected once this time is passed
    pub expiration: ChainTime,
    /// region the transaction targets
    pub region: RegionId,
    /// lower 16 bits of the number of a recent block
    pub ref_block_num: u16,
    /// 32 bits of the id of the block referenced by `ref_block_num`
    pub ref_block_prefix: u32,
    /// number of 8 byte words this transaction can serialize into after compression
    pub net_usage_words: u32,
    /// number of CPU usage units to bill the transaction for
    pub kcpu_usage: u32,
    /// number of seconds to delay the transaction for
    pub delay_sec: u32,
    /// actions executed without access to chain state
    pub context_free_actions: Vec<Action>,
    /// regular actions
    pub actions: Vec<Action>,
}

impl Transaction {
    /// Creates an empty transaction with the given expiration and region
    pub fn new(expiration: ChainTime, region: RegionId) -> Self {
        Transaction {
            expiration,
            region,
            ref_block_num: 0,
            ref_block_prefix: 0,
            net_usage_words: 0,
            kcpu_usage: 0,
            delay_sec: 0,
            context_free_actions: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Creates an empty transaction in the default region expiring `expiration_delay`
    /// seconds after `now`
    pub fn new_expiring(now: ChainTime, expiration_delay: u32) -> Self {
        Transaction::new(now.saturating_add_secs(expiration_delay), DEFAULT_REGION)
    }

    /// Creates an empty transaction with default values, using the system clock.
    ///
    /// Contracts must rather use their host clock.
    pub fn with_defaults() -> ModelsResult<Self> {
        Ok(Transaction::new_expiring(
            ChainTime::now()?,
            TransactionConfig::default().expiration_delay,
        ))
    }

    /// Fails unless the transaction fits the decoding limits of `config`.
    ///
    /// Only transactions passing this check decode back with the same `config`.
    pub fn check_limits(&self, config: &TransactionConfig) -> ModelsResult<()> {
        if self.context_free_actions.len()
            > config.max_context_free_actions_per_transaction as usize
        {
            return Err(ModelsError::LimitExceeded(format!(
                "{} context-free actions, at most {}",
                self.context_free_actions.len(),
                config.max_context_free_actions_per_transaction
            )));
        }
        if self.actions.len() > config.max_actions_per_transaction as usize {
            return Err(ModelsError::LimitExceeded(format!(
                "{} actions, at most {}",
                self.actions.len(),
                config.max_actions_per_transaction
            )));
        }
        self.context_free_actions
            .iter()
            .chain(self.actions.iter())
            .try_for_each(|action| action.check_limits(config))
    }

    /// Serialized form of the transaction
    pub fn to_bytes(&self) -> ModelsResult<Vec<u8>> {
        let mut buffer = Vec::new();
        TransactionSerializer::new().serialize(self, &mut buffer)?;
        Ok(buffer)
    }

    /// Decodes a transaction spanning the whole buffer
    pub fn from_bytes(buffer: &[u8], config: TransactionConfig) -> ModelsResult<Self> {
        deserialize_exact(&TransactionDeserializer::new(config), buffer).map_err(ModelsError::from)
    }

    /// Identity of the transaction
    pub fn id(&self) -> ModelsResult<TransactionId> {
        Ok(TransactionId::compute_from(&self.to_bytes()?))
    }
}

impl std::fmt::Display for Transaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Expiration: {}", self.expiration)?;
        writeln!(f, "Region: {}", self.region)?;
        writeln!(
            f,
            "Reference block: {} / {:#010x}",
            self.ref_block_num, self.ref_block_prefix
        )?;
        writeln!(
            f,
            "Usage: {} net words, {} kcpu, {} s delay",
            self.net_usage_words, self.kcpu_usage, self.delay_sec
        )?;
        for action in &self.context_free_actions {
            writeln!(f, "Context-free action: {}", action)?;
        }
        for action in &self.actions {
            writeln!(f, "Action: {}", action)?;
        }
        Ok(())
    }
}

/// Serializer for `Transaction`
#[derive(Clone)]
pub struct TransactionSerializer {
    time_serializer: ChainTimeSerializer,
    u16_serializer: U16LeSerializer,
    u32_serializer: U32LeSerializer,
    u32_var_int_serializer: U32VarIntSerializer,
    actions_serializer: VecSerializer<Action, ActionSerializer>,
}

impl TransactionSerializer {
    /// Creates a new `TransactionSerializer`
    pub fn new() -> Self {
        Self {
            time_serializer: ChainTimeSerializer::new(),
            u16_serializer: U16LeSerializer::new(),
            u32_serializer: U32LeSerializer::new(),
            u32_var_int_serializer: U32VarIntSerializer::new(),
            actions_serializer: VecSerializer::new(ActionSerializer::new()),
        }
    }
}

impl Default for TransactionSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Serializer<Transaction> for TransactionSerializer {
    /// ```
    /// use chain_models::transaction::{Transaction, TransactionSerializer};
    /// use chain_serialization::Serializer;
    /// use chain_time::ChainTime;
    ///
    /// let mut transaction = Transaction::new(ChainTime::from_secs(1000), 0);
    /// transaction.ref_block_num = 5;
    /// transaction.ref_block_prefix = 0xAABBCCDD;
    /// let mut buffer = Vec::new();
    /// TransactionSerializer::new().serialize(&transaction, &mut buffer).unwrap();
    /// assert_eq!(buffer.len(), 17);
    /// ```
    fn serialize(&self, value: &Transaction, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        self.time_serializer.serialize(&value.expiration, buffer)?;
        self.u16_serializer.serialize(&value.region, buffer)?;
        self.u16_serializer.serialize(&value.ref_block_num, buffer)?;
        self.u32_serializer
            .serialize(&value.ref_block_prefix, buffer)?;
        self.u32_var_int_serializer
            .serialize(&value.net_usage_words, buffer)?;
        self.u32_var_int_serializer
            .serialize(&value.kcpu_usage, buffer)?;
        self.u32_var_int_serializer
            .serialize(&value.delay_sec, buffer)?;
        self.actions_serializer
            .serialize(&value.context_free_actions, buffer)?;
        self.actions_serializer.serialize(&value.actions, buffer)?;
        Ok(())
    }
}

/// Deserializer for `Transaction`
#[derive(Clone)]
pub struct TransactionDeserializer {
    time_deserializer: ChainTimeDeserializer,
    u16_deserializer: U16LeDeserializer,
    u32_deserializer: U32LeDeserializer,
    u32_var_int_deserializer: U32VarIntDeserializer,
    context_free_actions_deserializer: VecDeserializer<Action, ActionDeserializer>,
    actions_deserializer: VecDeserializer<Action, ActionDeserializer>,
}

impl TransactionDeserializer {
    /// Creates a new `TransactionDeserializer` bounded by the limits of `config`
    pub fn new(config: TransactionConfig) -> Self {
        Self {
            time_deserializer: ChainTimeDeserializer::default(),
            u16_deserializer: U16LeDeserializer::new(),
            u32_deserializer: U32LeDeserializer::new(),
            u32_var_int_deserializer: U32VarIntDeserializer::new(Included(0), Included(u32::MAX)),
            context_free_actions_deserializer: VecDeserializer::new(
                ActionDeserializer::new(config),
                Included(0),
                Included(config.max_context_free_actions_per_transaction),
            ),
            actions_deserializer: VecDeserializer::new(
                ActionDeserializer::new(config),
                Included(0),
                Included(config.max_actions_per_transaction),
            ),
        }
    }
}

impl Deserializer<Transaction> for TransactionDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], Transaction, E> {
        context(
            "Failed Transaction deserialization",
            tuple((
                context("Failed expiration deserialization", |input| {
                    self.time_deserializer.deserialize(input)
                }),
                context("Failed region deserialization", |input| {
                    self.u16_deserializer.deserialize(input)
                }),
                context("Failed ref_block_num deserialization", |input| {
                    self.u16_deserializer.deserialize(input)
                }),
                context("Failed ref_block_prefix deserialization", |input| {
                    self.u32_deserializer.deserialize(input)
                }),
                context("Failed net_usage_words deserialization", |input| {
                    self.u32_var_int_deserializer.deserialize(input)
                }),
                context("Failed kcpu_usage deserialization", |input| {
                    self.u32_var_int_deserializer.deserialize(input)
                }),
                context("Failed delay_sec deserialization", |input| {
                    self.u32_var_int_deserializer.deserialize(input)
                }),
                context("Failed context_free_actions deserialization", |input| {
                    self.context_free_actions_deserializer.deserialize(input)
                }),
                context("Failed actions deserialization", |input| {
                    self.actions_deserializer.deserialize(input)
                }),
            )),
        )
        .map(
            |(
                expiration,
                region,
                ref_block_num,
                ref_block_prefix,
                net_usage_words,
                kcpu_usage,
                delay_sec,
                context_free_actions,
                actions,
            )| Transaction {
                expiration,
                region,
                ref_block_num,
                ref_block_prefix,
                net_usage_words,
                kcpu_usage,
                delay_sec,
                context_free_actions,
                actions,
            },
        )
        .parse(buffer)
    }
}

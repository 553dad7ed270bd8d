// Copyright (c) 2022 MASSA LABS <info@massa.net>
//! Limits applied when decoding transactions, and their hard-coded defaults.

pub mod constants;

use constants::*;
use serde::Deserialize;

/// Configuration of the transaction codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TransactionConfig {
    /// seconds between "now" and the expiration of a default-built transaction
    pub expiration_delay: u32,
    /// max regular actions per transaction
    pub max_actions_per_transaction: u32,
    /// max context-free actions per transaction
    pub max_context_free_actions_per_transaction: u32,
    /// max authorizations per action
    pub max_authorizations_per_action: u32,
    /// max action payload size
    pub max_action_data_size: u32,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            expiration_delay: DEFAULT_EXPIRATION_DELAY,
            max_actions_per_transaction: MAX_ACTIONS_PER_TRANSACTION,
            max_context_free_actions_per_transaction: MAX_CONTEXT_FREE_ACTIONS_PER_TRANSACTION,
            max_authorizations_per_action: MAX_AUTHORIZATIONS_PER_ACTION,
            max_action_data_size: MAX_ACTION_DATA_SIZE,
        }
    }
}

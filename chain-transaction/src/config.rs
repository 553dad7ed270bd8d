// Copyright (c) 2022 MASSA LABS <info@massa.net>

use chain_models::TransactionConfig;
use serde::Deserialize;

/// Configuration of the transaction api
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TransactionApiConfig {
    /// codec limits
    pub transaction: TransactionConfig,
    /// hand every failure to the host `fail_fast` before returning it.
    /// Contracts keep it on, off-chain tooling turns it off.
    pub abort_on_error: bool,
}

impl Default for TransactionApiConfig {
    fn default() -> Self {
        Self {
            transaction: TransactionConfig::default(),
            abort_on_error: true,
        }
    }
}

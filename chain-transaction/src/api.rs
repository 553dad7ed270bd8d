// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Contract-side view of the executing transaction: reading its actions,
//! decoding the deferred transaction carried by the current action and
//! handing new deferred transactions to the chain scheduler.

use crate::config::TransactionApiConfig;
use crate::error::TransactionApiError;
use crate::host::Host;
use chain_logging::chain_trace;
use chain_models::action::ActionDeserializer;
use chain_models::deferred_transaction::DeferredTransactionDeserializer;
use chain_models::{AccountName, Action, ActionKind, DeferredTransaction, ModelsError, Transaction};
use chain_serialization::deserialize_exact;
use chain_time::ChainTime;
use tracing::{debug, warn};

/// Reads a record whose size the host does not declare up front.
///
/// `read` is called a first time with an empty buffer to get the size, then with a
/// buffer of exactly that size. Both calls must report the same size.
fn fetch<F>(
    what: &'static str,
    not_found: TransactionApiError,
    read: F,
) -> Result<Vec<u8>, TransactionApiError>
where
    F: Fn(&mut [u8]) -> i32,
{
    let mut empty: [u8; 0] = [];
    let expected = read(&mut empty[..]);
    if expected <= 0 {
        return Err(not_found);
    }
    let mut buffer = vec![0u8; expected as usize];
    let actual = read(&mut buffer[..]);
    if actual != expected {
        return Err(TransactionApiError::InconsistentSize {
            what,
            expected,
            actual,
        });
    }
    Ok(buffer)
}

/// Transaction api of a contract, on top of its host
pub struct TransactionApi<H: Host> {
    host: H,
    config: TransactionApiConfig,
}

impl<H: Host> TransactionApi<H> {
    /// Creates a new `TransactionApi`
    ///
    /// # Arguments
    /// * host: runtime executing the contract
    /// * config: codec limits and failure policy
    pub fn new(host: H, config: TransactionApiConfig) -> Self {
        TransactionApi { host, config }
    }

    /// underlying host
    pub fn host(&self) -> &H {
        &self.host
    }

    /// current configuration
    pub fn config(&self) -> &TransactionApiConfig {
        &self.config
    }

    /// Gets the action `index` of list `kind` of the executing transaction
    pub fn get_action(&self, kind: ActionKind, index: u32) -> Result<Action, TransactionApiError> {
        let raw_kind = u32::from(kind);
        let bytes = fetch(
            "action",
            TransactionApiError::ActionNotFound(kind, index),
            |buffer| self.host.get_action(raw_kind, index, buffer),
        )
        .map_err(|err| self.abort(err))?;
        let action = deserialize_exact(&ActionDeserializer::new(self.config.transaction), &bytes)
            .map_err(|err| self.abort(ModelsError::from(err).into()))?;
        debug!("read {} action {}: {}", kind, index, action);
        Ok(action)
    }

    /// Decodes the payload of the executing action as a deferred transaction
    pub fn from_current_action(&self) -> Result<DeferredTransaction, TransactionApiError> {
        let bytes = fetch(
            "action data",
            TransactionApiError::ActionDataNotFound,
            |buffer| self.host.read_action_data(buffer),
        )
        .map_err(|err| self.abort(err))?;
        let deferred = deserialize_exact(
            &DeferredTransactionDeserializer::new(self.config.transaction),
            &bytes,
        )
        .map_err(|err| self.abort(ModelsError::from(err).into()))?;
        chain_trace!("deferred.from_current_action", {
            "sender": deferred.sender.to_string(),
            "sender_id": deferred.sender_id.to_string(),
            "size": bytes.len()
        });
        Ok(deferred)
    }

    /// Empty transaction expiring `expiration_delay` seconds after the host clock
    pub fn new_transaction(&self) -> Transaction {
        Transaction::new_expiring(
            self.host.current_time(),
            self.config.transaction.expiration_delay,
        )
    }

    /// Schedules `transaction` for execution not before `delay_until`.
    ///
    /// The sender of the deferred transaction is the executing contract. A transaction
    /// over the configured limits is refused, as it could not be decoded back. Only the
    /// hand-off is guaranteed: whether the transaction runs is up to the host.
    ///
    /// # Arguments
    /// * transaction: transaction to schedule
    /// * sender_id: identifier chosen by the contract, unique among its deferred transactions
    /// * payer: account billed for the deferred transaction
    /// * delay_until: earliest execution time
    pub fn send(
        &self,
        transaction: Transaction,
        sender_id: u128,
        payer: AccountName,
        delay_until: ChainTime,
    ) -> Result<(), TransactionApiError> {
        transaction
            .check_limits(&self.config.transaction)
            .map_err(|err| self.abort(err.into()))?;
        let deferred = DeferredTransaction::new(
            transaction,
            sender_id,
            self.host.current_receiver(),
            payer,
            delay_until,
        );
        let bytes = deferred
            .to_bytes()
            .map_err(|err| self.abort(err.into()))?;
        chain_trace!("deferred.send", {
            "sender": deferred.sender.to_string(),
            "sender_id": sender_id.to_string(),
            "payer": payer.to_string(),
            "delay_until": delay_until.to_secs(),
            "size": bytes.len()
        });
        debug!(
            "sending deferred transaction {} from {} ({} bytes)",
            sender_id,
            deferred.sender,
            bytes.len()
        );
        self.host
            .send_deferred(sender_id, payer, delay_until, &bytes);
        Ok(())
    }

    /// Same as `send`, executable as soon as the host allows it
    pub fn send_now(
        &self,
        transaction: Transaction,
        sender_id: u128,
        payer: AccountName,
    ) -> Result<(), TransactionApiError> {
        let now = self.host.current_time();
        self.send(transaction, sender_id, payer, now)
    }

    /// Fails with `message` unless `condition` holds
    pub fn check(&self, condition: bool, message: &str) -> Result<(), TransactionApiError> {
        if condition {
            Ok(())
        } else {
            Err(self.abort(TransactionApiError::PreconditionFailed(
                message.to_string(),
            )))
        }
    }

    /// Reports `err` to the host when failures must abort the invocation
    fn abort(&self, err: TransactionApiError) -> TransactionApiError {
        warn!("transaction api failure: {}", err);
        if self.config.abort_on_error {
            self.host.fail_fast(&err.to_string());
        }
        err
    }
}

// Copyright (c) 2022 MASSA LABS <info@massa.net>

use chain_models::Name;
use chain_time::ChainTime;

/// Calls the contract makes into the chain runtime executing it.
///
/// Size-returning methods follow the host convention: a buffer too small to hold the
/// record (an empty one in particular) is left untouched and the required size is
/// returned, a non-positive size means there is nothing to read.
#[cfg_attr(any(test, feature = "test-exports"), mockall::automock)]
pub trait Host {
    /// Copies the packed action `index` of list `kind` of the executing transaction
    /// into `buffer`, returns its size
    fn get_action(&self, kind: u32, index: u32, buffer: &mut [u8]) -> i32;

    /// Copies the payload of the executing action into `buffer`, returns its size
    fn read_action_data(&self, buffer: &mut [u8]) -> i32;

    /// Hands a packed deferred transaction to the scheduler of the chain
    fn send_deferred(&self, sender_id: u128, payer: Name, delay_until: ChainTime, data: &[u8]);

    /// Time of the block being produced
    fn current_time(&self) -> ChainTime;

    /// Contract currently executing
    fn current_receiver(&self) -> Name;

    /// Aborts the current invocation with `message`
    fn fail_fast(&self, message: &str);
}

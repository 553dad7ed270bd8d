//! Hard-coded default values of the transaction configuration.
//!
//! The `Default` implementation of `TransactionConfig` takes its values from this
//! file. Code that needs one of these limits should read it from the `cfg` it was
//! given rather than from here, which keeps unit tests free to shrink them.

/// Seconds added to the current time to get the default expiration of a new transaction
pub const DEFAULT_EXPIRATION_DELAY: u32 = 60;
/// Max number of regular actions in a transaction
pub const MAX_ACTIONS_PER_TRANSACTION: u32 = 1024;
/// Max number of context-free actions in a transaction
pub const MAX_CONTEXT_FREE_ACTIONS_PER_TRANSACTION: u32 = 1024;
/// Max number of authorizations carried by one action
pub const MAX_AUTHORIZATIONS_PER_ACTION: u32 = 64;
/// Max size in bytes of the payload of one action
pub const MAX_ACTION_DATA_SIZE: u32 = 1_048_576;
/// Region of a transaction built with default values
pub const DEFAULT_REGION: u16 = 0;

// Copyright (c) 2022 MASSA LABS <info@massa.net>
//! In-contract model of a transaction and of a deferred transaction, with their
//! deterministic binary encoding.
#![warn(missing_docs)]
#![warn(unused_crate_dependencies)]

pub use action::{Action, ActionKind, PermissionLevel};
pub use config::TransactionConfig;
pub use deferred_transaction::DeferredTransaction;
pub use error::{ModelsError, ModelsResult};
pub use name::{AccountName, ActionName, Name, PermissionName};
pub use transaction::{Transaction, TransactionId};

/// actions and their authorizations
pub mod action;
/// codec limits and their defaults
pub mod config;
/// transaction scheduled for later execution
pub mod deferred_transaction;
/// models error
pub mod error;
/// account, action and permission identifiers
pub mod name;
/// base transaction record
pub mod transaction;

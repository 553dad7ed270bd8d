// Copyright (c) 2022 MASSA LABS <info@massa.net>
//! Transaction api of a contract: reads the actions of the executing transaction
//! and schedules deferred transactions through the host.
#![warn(missing_docs)]
#![warn(unused_crate_dependencies)]

pub use api::TransactionApi;
pub use config::TransactionApiConfig;
pub use error::TransactionApiError;
pub use host::Host;

#[cfg(any(test, feature = "test-exports"))]
pub use host::MockHost;

mod api;
mod config;
mod error;
mod host;

#[cfg(test)]
mod tests;

// Copyright (c) 2021 MASSA LABS <info@massa.net>
//! Structured trace points shared by the contract-side crates.

#[doc(hidden)]
pub use serde_json;
#[doc(hidden)]
pub use tracing;

/// Emits a `tracing` trace event tagged with `evt` and a JSON object of parameters.
///
/// Callers do not need their own `tracing` or `serde_json` dependency.
///
/// ```
/// chain_logging::chain_trace!("deferred.send", { "sender_id": 42, "size": 17 });
/// ```
#[macro_export]
macro_rules! chain_trace {
    ($evt:expr, $params:tt) => {
        $crate::tracing::trace!(
            "chain_trace:{}:{}",
            $evt,
            $crate::serde_json::json!($params)
        );
    };
}

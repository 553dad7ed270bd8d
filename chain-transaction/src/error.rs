// Copyright (c) 2022 MASSA LABS <info@massa.net>

use chain_models::{ActionKind, ModelsError};
use chain_serialization::DecodeErrorKind;
use displaydoc::Display;
use thiserror::Error;

/// transaction api error
#[non_exhaustive]
#[derive(Display, Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionApiError {
    /// no {0} action at index {1}
    ActionNotFound(ActionKind, u32),
    /// the current action carries no data
    ActionDataNotFound,
    /// host reported {expected} bytes then {actual} bytes for the same {what}
    InconsistentSize {
        /// what was queried
        what: &'static str,
        /// size reported by the size query
        expected: i32,
        /// size reported by the fetch
        actual: i32,
    },
    /// precondition failed: {0}
    PreconditionFailed(String),
    /// models error: {0}
    ModelsError(#[from] ModelsError),
}

impl TransactionApiError {
    /// structural reason when the error comes from a decode failure
    pub fn decode_kind(&self) -> Option<DecodeErrorKind> {
        match self {
            TransactionApiError::ModelsError(err) => err.decode_kind(),
            _ => None,
        }
    }
}

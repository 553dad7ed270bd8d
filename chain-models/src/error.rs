// Copyright (c) 2022 MASSA LABS <info@massa.net>

use chain_serialization::{DecodeErrorKind, DecodeFailure, SerializeError};
use displaydoc::Display;
use thiserror::Error;

/// models result
pub type ModelsResult<T, E = ModelsError> = core::result::Result<T, E>;

/// models error
#[non_exhaustive]
#[derive(Display, Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelsError {
    /// value out of the encodable range: {0}
    EncodeRangeError(String),
    /// Serialization error: {0}
    SerializeError(String),
    /// record exceeds the configured limits: {0}
    LimitExceeded(String),
    /// Decode error: {0}
    DecodeError(#[from] DecodeFailure),
    /// invalid name: {0}
    NameParseError(String),
    /// invalid action kind: {0}
    InvalidActionKind(u32),
    /// Time error {0}
    TimeError(#[from] chain_time::TimeError),
}

impl ModelsError {
    /// structural reason when the error comes from a decode failure
    pub fn decode_kind(&self) -> Option<DecodeErrorKind> {
        match self {
            ModelsError::DecodeError(failure) => Some(failure.kind),
            _ => None,
        }
    }
}

impl From<SerializeError> for ModelsError {
    fn from(err: SerializeError) -> Self {
        match err {
            SerializeError::NumberTooBig(_) => ModelsError::EncodeRangeError(err.to_string()),
            _ => ModelsError::SerializeError(err.to_string()),
        }
    }
}

// Copyright (c) 2022 MASSA LABS <info@massa.net>

use displaydoc::Display;
use nom::error::{ContextError, ErrorKind, ParseError};
use std::fmt;
use thiserror::Error;

/// Errors raised while encoding a record
#[non_exhaustive]
#[derive(Display, Error, Debug, Clone, PartialEq, Eq)]
pub enum SerializeError {
    /// Number {0} is too big to be serialized
    NumberTooBig(String),
    /// General error {0}
    GeneralError(String),
}

/// Structural reason of a decode failure
#[derive(Display, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeErrorKind {
    /// truncated input
    TruncatedInput,
    /// malformed varint
    MalformedVarint,
    /// malformed record
    MalformedRecord,
}

impl DecodeErrorKind {
    /// Maps the innermost nom error kind reported by the codec to its structural reason.
    ///
    /// The codec only emits `Eof` when bytes are missing and `TooLarge` when a varint is
    /// overlong or non-minimal. Every other kind is a record-level violation.
    pub fn from_error_kind(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Eof | ErrorKind::Complete => DecodeErrorKind::TruncatedInput,
            ErrorKind::TooLarge => DecodeErrorKind::MalformedVarint,
            _ => DecodeErrorKind::MalformedRecord,
        }
    }
}

/// Concrete nom error used to deserialize records.
///
/// Keeps the innermost failure and the stack of contexts it went through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeserializeError<'a> {
    kind: ErrorKind,
    input: &'a [u8],
    contexts: Vec<&'static str>,
}

impl<'a> DeserializeError<'a> {
    /// structural reason of the failure
    pub fn kind(&self) -> DecodeErrorKind {
        DecodeErrorKind::from_error_kind(self.kind)
    }

    /// number of bytes that were left to parse where the failure happened
    pub fn remaining(&self) -> usize {
        self.input.len()
    }

    /// contexts, innermost first
    pub fn contexts(&self) -> &[&'static str] {
        &self.contexts
    }
}

impl<'a> ParseError<&'a [u8]> for DeserializeError<'a> {
    fn from_error_kind(input: &'a [u8], kind: ErrorKind) -> Self {
        Self {
            kind,
            input,
            contexts: Vec::new(),
        }
    }

    fn append(_input: &'a [u8], _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

impl<'a> ContextError<&'a [u8]> for DeserializeError<'a> {
    fn add_context(_input: &'a [u8], ctx: &'static str, mut other: Self) -> Self {
        other.contexts.push(ctx);
        other
    }
}

impl<'a> fmt::Display for DeserializeError<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ctx in self.contexts.iter().rev() {
            write!(f, "{}: ", ctx)?;
        }
        write!(
            f,
            "{} ({:?} with {} bytes left)",
            self.kind(),
            self.kind,
            self.input.len()
        )
    }
}

/// Owned summary of a failed decode, detached from the input buffer
#[derive(Display, Error, Debug, Clone, PartialEq, Eq)]
/// {kind}: {context}
pub struct DecodeFailure {
    /// structural reason
    pub kind: DecodeErrorKind,
    /// human readable trace of where it failed
    pub context: String,
}

impl<'a> From<nom::Err<DeserializeError<'a>>> for DecodeFailure {
    fn from(err: nom::Err<DeserializeError<'a>>) -> Self {
        match err {
            nom::Err::Incomplete(needed) => DecodeFailure {
                kind: DecodeErrorKind::TruncatedInput,
                context: format!("incomplete input: {:?}", needed),
            },
            nom::Err::Error(err) | nom::Err::Failure(err) => DecodeFailure {
                kind: err.kind(),
                context: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nom::error::context;

    fn always_eof(input: &[u8]) -> nom::IResult<&[u8], (), DeserializeError> {
        Err(nom::Err::Error(DeserializeError::from_error_kind(
            input,
            ErrorKind::Eof,
        )))
    }

    #[test]
    fn innermost_kind_survives_contexts() {
        let input: &[u8] = &[1, 2, 3];
        let res = context("outer", context("inner", always_eof))(input);
        let failure = DecodeFailure::from(res.unwrap_err());
        assert_eq!(failure.kind, DecodeErrorKind::TruncatedInput);
        assert!(failure.context.starts_with("outer: inner: truncated input"));
    }

    #[test]
    fn kinds_are_classified() {
        assert_eq!(
            DecodeErrorKind::from_error_kind(ErrorKind::TooLarge),
            DecodeErrorKind::MalformedVarint
        );
        assert_eq!(
            DecodeErrorKind::from_error_kind(ErrorKind::LengthValue),
            DecodeErrorKind::MalformedRecord
        );
        assert_eq!(
            DecodeFailure::from(nom::Err::<DeserializeError>::Incomplete(nom::Needed::Unknown))
                .kind,
            DecodeErrorKind::TruncatedInput
        );
    }
}

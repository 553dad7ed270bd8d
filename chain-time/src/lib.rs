// Copyright (c) 2022 MASSA LABS <info@massa.net>
//! Unsigned time management
#![warn(missing_docs)]
#![warn(unused_crate_dependencies)]

mod error;
pub use error::TimeError;
use chain_serialization::{Deserializer, Serializer, U32LeDeserializer, U32LeSerializer};
use nom::error::{context, ContextError, ErrorKind, ParseError};
use nom::IResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Bound, RangeBounds};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use std::{
    convert::{TryFrom, TryInto},
    str::FromStr,
};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Time structure used in on-chain records.
/// seconds since 01/01/1970, 32 bits on the wire.
#[derive(
    Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct ChainTime(u32);

/// Serializer for `ChainTime`
#[derive(Clone, Default)]
pub struct ChainTimeSerializer {
    u32_serializer: U32LeSerializer,
}

impl ChainTimeSerializer {
    /// Creates a `ChainTimeSerializer`
    pub const fn new() -> Self {
        Self {
            u32_serializer: U32LeSerializer::new(),
        }
    }
}

impl Serializer<ChainTime> for ChainTimeSerializer {
    /// ```
    /// use chain_serialization::Serializer;
    /// use chain_time::{ChainTime, ChainTimeSerializer};
    ///
    /// let time: ChainTime = ChainTime::from_secs(1000);
    /// let mut serialized = Vec::new();
    /// let serializer = ChainTimeSerializer::new();
    /// serializer.serialize(&time, &mut serialized).unwrap();
    /// assert_eq!(serialized, vec![0xe8, 0x03, 0x00, 0x00]);
    /// ```
    fn serialize(
        &self,
        value: &ChainTime,
        buffer: &mut Vec<u8>,
    ) -> Result<(), chain_serialization::SerializeError> {
        self.u32_serializer.serialize(&value.to_secs(), buffer)
    }
}

/// Deserializer for `ChainTime`
#[derive(Clone)]
pub struct ChainTimeDeserializer {
    u32_deserializer: U32LeDeserializer,
    range: (Bound<ChainTime>, Bound<ChainTime>),
}

impl ChainTimeDeserializer {
    /// Creates a `ChainTimeDeserializer`
    ///
    /// Arguments:
    /// * range: accepted times, anything outside is rejected
    pub const fn new(range: (Bound<ChainTime>, Bound<ChainTime>)) -> Self {
        Self {
            u32_deserializer: U32LeDeserializer::new(),
            range,
        }
    }
}

impl Default for ChainTimeDeserializer {
    fn default() -> Self {
        Self::new((Bound::Unbounded, Bound::Unbounded))
    }
}

impl Deserializer<ChainTime> for ChainTimeDeserializer {
    /// ```
    /// use std::ops::Bound::Included;
    /// use chain_serialization::{Serializer, Deserializer, DeserializeError};
    /// use chain_time::{ChainTime, ChainTimeSerializer, ChainTimeDeserializer};
    ///
    /// let time: ChainTime = ChainTime::from_secs(30);
    /// let mut serialized = Vec::new();
    /// let serializer = ChainTimeSerializer::new();
    /// let deserializer = ChainTimeDeserializer::new((Included(ChainTime::from_secs(0)), Included(ChainTime::max())));
    /// serializer.serialize(&time, &mut serialized).unwrap();
    /// let (rest, time_deser) = deserializer.deserialize::<DeserializeError>(&serialized).unwrap();
    /// assert!(rest.is_empty());
    /// assert_eq!(time, time_deser);
    /// ```
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], ChainTime, E> {
        context("Failed ChainTime deserialization", |input: &'a [u8]| {
            let (rest, secs) = self.u32_deserializer.deserialize::<E>(input)?;
            let time = ChainTime::from_secs(secs);
            if !self.range.contains(&time) {
                return Err(nom::Err::Error(E::from_error_kind(
                    input,
                    ErrorKind::Verify,
                )));
            }
            Ok((rest, time))
        })(buffer)
    }
}

impl fmt::Display for ChainTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_secs())
    }
}

impl TryFrom<Duration> for ChainTime {
    type Error = TimeError;

    /// Conversion from `std::time::Duration`, sub-second precision is dropped.
    /// ```
    /// # use std::time::Duration;
    /// # use chain_time::*;
    /// # use std::convert::TryFrom;
    /// let duration: Duration = Duration::from_millis(42_500);
    /// assert_eq!(ChainTime::from_secs(42), ChainTime::try_from(duration).unwrap());
    /// ```
    fn try_from(value: Duration) -> Result<Self, Self::Error> {
        Ok(ChainTime(
            value
                .as_secs()
                .try_into()
                .map_err(|_| TimeError::ConversionError)?,
        ))
    }
}

impl From<ChainTime> for Duration {
    fn from(value: ChainTime) -> Self {
        value.to_duration()
    }
}

impl FromStr for ChainTime {
    type Err = crate::TimeError;

    /// Conversion from `&str`, in seconds.
    ///
    /// ```
    /// # use chain_time::*;
    /// # use std::str::FromStr;
    /// assert_eq!(ChainTime::from_secs(42), ChainTime::from_str("42").unwrap());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ChainTime(
            u32::from_str(s).map_err(|_| Self::Err::ConversionError)?,
        ))
    }
}

impl ChainTime {
    /// Conversion from `u32`, representing a timestamp in seconds.
    pub const fn from_secs(value: u32) -> Self {
        ChainTime(value)
    }

    /// Gets current UNIX timestamp (resolution: seconds).
    ///
    /// Only meaningful off-chain: contracts read the clock from their host.
    pub fn now() -> Result<Self, TimeError> {
        let now: u32 = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| TimeError::TimeOverflowError)?
            .as_secs()
            .try_into()
            .map_err(|_| TimeError::TimeOverflowError)?;
        Ok(ChainTime(now))
    }

    /// Conversion to `std::time::Duration` since the UNIX epoch.
    pub fn to_duration(&self) -> Duration {
        Duration::from_secs(self.0 as u64)
    }

    /// Conversion to `u32`, representing seconds.
    /// ```
    /// # use chain_time::*;
    /// assert_eq!(ChainTime::from_secs(42).to_secs(), 42);
    /// ```
    pub const fn to_secs(&self) -> u32 {
        self.0
    }

    /// ```
    /// # use chain_time::*;
    /// let time = ChainTime::from_secs(u32::MAX - 10);
    /// assert_eq!(time.saturating_add_secs(60), ChainTime::max());
    /// assert_eq!(ChainTime::from_secs(1000).saturating_add_secs(60), ChainTime::from_secs(1060));
    /// ```
    #[must_use]
    pub const fn saturating_add_secs(self, secs: u32) -> Self {
        ChainTime(self.0.saturating_add(secs))
    }

    /// ```
    /// # use chain_time::*;
    /// let time_1 = ChainTime::from_secs(42);
    /// let time_2 = ChainTime::from_secs(7);
    /// assert_eq!(time_1.saturating_sub(time_2), ChainTime::from_secs(35));
    /// assert_eq!(time_2.saturating_sub(time_1), ChainTime::from_secs(0));
    /// ```
    #[must_use]
    pub fn saturating_sub(self, t: ChainTime) -> Self {
        ChainTime(self.0.saturating_sub(t.0))
    }

    /// ```
    /// # use chain_time::*;
    /// assert_eq!(ChainTime::from_secs(42).checked_add_secs(7).unwrap(), ChainTime::from_secs(49));
    /// assert!(ChainTime::max().checked_add_secs(1).is_err());
    /// ```
    pub fn checked_add_secs(self, secs: u32) -> Result<Self, TimeError> {
        self.0
            .checked_add(secs)
            .ok_or_else(|| TimeError::CheckedOperationError("addition error".to_string()))
            .map(ChainTime)
    }

    /// ```
    /// # use chain_time::*;
    /// let time = ChainTime::from_secs(1_640_995_200);
    /// assert_eq!(time.format_instant().unwrap(), String::from("2022-01-01T00:00:00Z"))
    /// ```
    pub fn format_instant(&self) -> Result<String, TimeError> {
        let date_time = OffsetDateTime::from_unix_timestamp(self.0 as i64)
            .map_err(|_| TimeError::ConversionError)?;
        date_time
            .format(&Rfc3339)
            .map_err(|_| TimeError::ConversionError)
    }

    /// Get max ChainTime value
    pub const fn max() -> ChainTime {
        ChainTime(u32::MAX)
    }
}

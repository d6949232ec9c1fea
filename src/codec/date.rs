//! `xsd:date` and `xsd:dateTime` values, packed as seconds since the Unix epoch.
//!
//! A value is only packed if formatting the packed form gives back the exact original text.
//! Anything else (time zone offsets, sub-millisecond precision, unusual spellings) stays a
//! string.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::error::{Error, Result};
use crate::token::Token;

const SECONDS_PER_DAY: i64 = 86_400;
const NANOS_PER_MILLI: u32 = 1_000_000;
const NANOS_PER_SEC: u32 = 1_000_000_000;

fn int_token(v: i64) -> Token {
    if v < 0 {
        Token::NegInt(v)
    } else {
        Token::UInt(v as u64)
    }
}

fn token_seconds(token: &Token) -> Result<i64> {
    match *token {
        Token::UInt(v) => i64::try_from(v)
            .map_err(|_| Error::UnknownCompressedValue(format!("{} seconds is out of range", v))),
        Token::NegInt(v) => Ok(v),
        ref other => Err(Error::UnknownCompressedValue(format!(
            "{} where epoch seconds were expected",
            other.name()
        ))),
    }
}

fn timestamp(secs: i64, nanos: u32) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, nanos)
        .ok_or_else(|| Error::UnknownCompressedValue(format!("{} seconds is out of range", secs)))
}

/// A calendar date, held as the epoch seconds of its midnight UTC.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct XsdDate {
    secs: i64,
}

impl XsdDate {
    pub fn probe(value: &str) -> Option<Self> {
        let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
        let secs = date.and_hms_opt(0, 0, 0)?.and_utc().timestamp();
        let candidate = Self { secs };
        (candidate.format().ok()? == value).then_some(candidate)
    }

    fn format(&self) -> Result<String> {
        Ok(timestamp(self.secs, 0)?.format("%Y-%m-%d").to_string())
    }

    pub fn to_token(&self) -> Token {
        int_token(self.secs)
    }

    pub fn decode(token: &Token) -> Result<String> {
        let secs = token_seconds(token)?;
        if secs.rem_euclid(SECONDS_PER_DAY) != 0 {
            return Err(Error::UnknownCompressedValue(format!(
                "{} seconds is not the start of a day",
                secs
            )));
        }
        Self { secs }.format()
    }
}

/// A UTC timestamp, with optional millisecond precision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct XsdDateTime {
    secs: i64,
    millis: Option<u32>,
}

impl XsdDateTime {
    pub fn probe(value: &str) -> Option<Self> {
        let parsed = DateTime::parse_from_rfc3339(value).ok()?;
        let secs = parsed.timestamp();
        let nanos = parsed.timestamp_subsec_nanos();
        // Leap seconds carry their extra second in the fraction, which packing can't hold
        if nanos >= NANOS_PER_SEC {
            return None;
        }
        let candidate = if value.contains('.') {
            if nanos % NANOS_PER_MILLI != 0 {
                return None;
            }
            Self {
                secs,
                millis: Some(nanos / NANOS_PER_MILLI),
            }
        } else {
            if nanos != 0 {
                return None;
            }
            Self { secs, millis: None }
        };
        (candidate.format().ok()? == value).then_some(candidate)
    }

    fn format(&self) -> Result<String> {
        match self.millis {
            None => Ok(timestamp(self.secs, 0)?.to_rfc3339_opts(SecondsFormat::Secs, true)),
            Some(ms) => Ok(timestamp(self.secs, ms * NANOS_PER_MILLI)?
                .to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }

    /// Whole seconds pack to a single integer; anything with a fraction to `[seconds, millis]`.
    pub fn to_token(&self) -> Token {
        match self.millis {
            None => int_token(self.secs),
            Some(ms) => Token::Array(vec![int_token(self.secs), Token::UInt(ms as u64)]),
        }
    }

    pub fn decode(token: &Token) -> Result<String> {
        let value = match token {
            Token::Array(parts) => match parts.as_slice() {
                [secs, Token::UInt(ms)] if *ms < 1000 => Self {
                    secs: token_seconds(secs)?,
                    millis: Some(*ms as u32),
                },
                _ => {
                    return Err(Error::UnknownCompressedValue(
                        "malformed [seconds, millis] dateTime".to_string(),
                    ))
                }
            },
            other => Self {
                secs: token_seconds(other)?,
                millis: None,
            },
        };
        value.format()
    }
}

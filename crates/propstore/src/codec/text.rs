// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Text form of scalar values.
//!
//! `parse_scalar(k, &format_scalar(&x)) == x` for every representable `x`
//! (NaN excepted, which compares unequal to itself).

use std::fmt::{Display, Write as _};
use std::str::FromStr;

use chrono::{DateTime, Datelike, FixedOffset, ParseError, SecondsFormat, TimeDelta, TimeZone, Utc};
use num_bigint::BigInt;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::value::{Scalar, ScalarKind};

const SECS_PER_DAY: i64 = 86_400;
const SECS_PER_HOUR: i64 = 3_600;
const SECS_PER_MINUTE: i64 = 60;
const NANOS_DIGITS: usize = 9;

/// Instants outside years 0000-9999, which RFC 3339 cannot express.
/// `%Y` writes a sign and as many digits as the year needs.
const EXTENDED_INSTANT: &str = "%Y-%m-%dT%H:%M:%S%.f%:z";

/// A text fragment that does not parse as the requested kind.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid {kind} value '{text}': {reason}")]
pub struct ScalarParseError {
    pub kind: ScalarKind,
    pub text: String,
    pub reason: String,
}

impl ScalarParseError {
    fn new(kind: ScalarKind, text: &str, reason: impl Display) -> Self {
        Self {
            kind,
            text: text.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Encode a scalar as element text.
pub fn format_scalar(value: &Scalar) -> String {
    match value {
        Scalar::String(v) => v.clone(),
        Scalar::Bool(v) => v.to_string(),
        Scalar::I8(v) => v.to_string(),
        Scalar::I16(v) => v.to_string(),
        Scalar::I32(v) => v.to_string(),
        Scalar::I64(v) => v.to_string(),
        Scalar::U8(v) => v.to_string(),
        Scalar::U16(v) => v.to_string(),
        Scalar::U32(v) => v.to_string(),
        Scalar::U64(v) => v.to_string(),
        Scalar::BigInt(v) => v.to_string(),
        Scalar::F32(v) => format_float(*v),
        Scalar::F64(v) => format_float(*v),
        Scalar::Decimal(v) => v.to_string(),
        Scalar::Uuid(v) => v.hyphenated().to_string(),
        Scalar::Duration(v) => format_duration(*v),
        Scalar::DateTimeOffset(v) => format_instant(v, false),
        Scalar::DateTime(v) => format_instant(v, true),
    }
}

/// Decode element text as `kind`.
///
/// String text is taken verbatim; everything else is trimmed first.
pub fn parse_scalar(kind: ScalarKind, text: &str) -> Result<Scalar, ScalarParseError> {
    if kind == ScalarKind::String {
        return Ok(Scalar::String(text.to_string()));
    }

    let t = text.trim();
    let value = match kind {
        ScalarKind::String => Scalar::String(text.to_string()),
        ScalarKind::Bool => match t {
            "true" | "1" => Scalar::Bool(true),
            "false" | "0" => Scalar::Bool(false),
            _ => return Err(ScalarParseError::new(kind, text, "expected true or false")),
        },
        ScalarKind::I8 => Scalar::I8(parse_with(kind, t)?),
        ScalarKind::I16 => Scalar::I16(parse_with(kind, t)?),
        ScalarKind::I32 => Scalar::I32(parse_with(kind, t)?),
        ScalarKind::I64 => Scalar::I64(parse_with(kind, t)?),
        ScalarKind::U8 => Scalar::U8(parse_with(kind, t)?),
        ScalarKind::U16 => Scalar::U16(parse_with(kind, t)?),
        ScalarKind::U32 => Scalar::U32(parse_with(kind, t)?),
        ScalarKind::U64 => Scalar::U64(parse_with(kind, t)?),
        ScalarKind::BigInt => Scalar::BigInt(parse_with::<BigInt>(kind, t)?),
        ScalarKind::F32 => Scalar::F32(match t {
            "NaN" => f32::NAN,
            "INF" => f32::INFINITY,
            "-INF" => f32::NEG_INFINITY,
            _ => parse_with(kind, t)?,
        }),
        ScalarKind::F64 => Scalar::F64(match t {
            "NaN" => f64::NAN,
            "INF" => f64::INFINITY,
            "-INF" => f64::NEG_INFINITY,
            _ => parse_with(kind, t)?,
        }),
        ScalarKind::Decimal => Scalar::Decimal(parse_with::<Decimal>(kind, t)?),
        ScalarKind::Uuid => Scalar::Uuid(
            Uuid::parse_str(t).map_err(|e| ScalarParseError::new(kind, text, e))?,
        ),
        ScalarKind::Duration => Scalar::Duration(parse_duration(t)?),
        ScalarKind::DateTimeOffset => Scalar::DateTimeOffset(
            parse_instant(t).map_err(|e| ScalarParseError::new(kind, text, e))?,
        ),
        ScalarKind::DateTime => Scalar::DateTime(
            parse_instant(t)
                .map_err(|e| ScalarParseError::new(kind, text, e))?
                .with_timezone(&Utc),
        ),
    };
    Ok(value)
}

fn format_instant<Tz>(value: &DateTime<Tz>, use_z: bool) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if (0..=9999).contains(&value.year()) {
        value.to_rfc3339_opts(SecondsFormat::AutoSi, use_z)
    } else {
        value.format(EXTENDED_INSTANT).to_string()
    }
}

/// RFC 3339, else the signed extended-year form.
fn parse_instant(text: &str) -> Result<DateTime<FixedOffset>, ParseError> {
    DateTime::parse_from_rfc3339(text)
        .or_else(|e| DateTime::parse_from_str(text, EXTENDED_INSTANT).map_err(|_| e))
}

fn parse_with<T>(kind: ScalarKind, text: &str) -> Result<T, ScalarParseError>
where
    T: FromStr,
    T::Err: Display,
{
    text.parse::<T>()
        .map_err(|e| ScalarParseError::new(kind, text, e))
}

trait SpecialFloat: Display + Copy {
    fn is_nan(self) -> bool;
    fn is_infinite(self) -> bool;
    fn is_sign_negative(self) -> bool;
}

macro_rules! impl_special_float {
    ($ty:ty) => {
        impl SpecialFloat for $ty {
            fn is_nan(self) -> bool {
                <$ty>::is_nan(self)
            }
            fn is_infinite(self) -> bool {
                <$ty>::is_infinite(self)
            }
            fn is_sign_negative(self) -> bool {
                <$ty>::is_sign_negative(self)
            }
        }
    };
}

impl_special_float!(f32);
impl_special_float!(f64);

/// Shortest text that parses back to the same float.
fn format_float<F: SpecialFloat>(v: F) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        (if v.is_sign_negative() { "-INF" } else { "INF" }).to_string()
    } else {
        v.to_string()
    }
}

// ---------------------------------------------------------------------------
// ISO-8601 durations
// ---------------------------------------------------------------------------

/// Format as `[-]P[nD][T[nH][nM][n[.f]S]]`; zero is `PT0S`.
pub fn format_duration(value: TimeDelta) -> String {
    let negative = value < TimeDelta::zero();
    let magnitude = if negative { -value } else { value };

    let total = magnitude.num_seconds();
    let nanos = magnitude.subsec_nanos();
    let days = total / SECS_PER_DAY;
    let hours = (total % SECS_PER_DAY) / SECS_PER_HOUR;
    let minutes = (total % SECS_PER_HOUR) / SECS_PER_MINUTE;
    let seconds = total % SECS_PER_MINUTE;

    let mut out = String::with_capacity(24);
    if negative {
        out.push('-');
    }
    out.push('P');
    if days > 0 {
        let _ = write!(out, "{}D", days);
    }
    let has_time = hours > 0 || minutes > 0 || seconds > 0 || nanos > 0;
    if has_time || days == 0 {
        out.push('T');
        if hours > 0 {
            let _ = write!(out, "{}H", hours);
        }
        if minutes > 0 {
            let _ = write!(out, "{}M", minutes);
        }
        if seconds > 0 || nanos > 0 || !has_time {
            let _ = write!(out, "{}", seconds);
            if nanos > 0 {
                let frac = format!("{:09}", nanos);
                let _ = write!(out, ".{}", frac.trim_end_matches('0'));
            }
            out.push('S');
        }
    }
    out
}

/// Parse the form written by [`format_duration`].
///
/// Days, hours, minutes and (fractional) seconds are accepted; years, months
/// and weeks are not, as they have no fixed length.
pub fn parse_duration(text: &str) -> Result<TimeDelta, ScalarParseError> {
    let err = |reason: &str| ScalarParseError::new(ScalarKind::Duration, text, reason);

    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let rest = rest.strip_prefix('P').ok_or_else(|| err("missing 'P' designator"))?;
    let (date, time) = match rest.split_once('T') {
        Some((date, time)) => {
            if time.is_empty() {
                return Err(err("empty time part"));
            }
            (date, Some(time))
        }
        None => (rest, None),
    };
    if date.is_empty() && time.is_none() {
        return Err(err("no components"));
    }

    let mut seconds: i64 = 0;
    let mut nanos: i64 = 0;
    let overflow = || err("out of range");

    if !date.is_empty() {
        let days = date
            .strip_suffix('D')
            .and_then(parse_component)
            .ok_or_else(|| err("date part must be '<n>D'"))?;
        seconds = days.checked_mul(SECS_PER_DAY).ok_or_else(overflow)?;
    }

    if let Some(mut time) = time {
        let mut last_unit = 0u8;
        while !time.is_empty() {
            let end = time
                .find(|c: char| c.is_ascii_alphabetic())
                .ok_or_else(|| err("missing unit designator"))?;
            let (number, unit) = (&time[..end], time.as_bytes()[end]);
            time = &time[end + 1..];

            let rank = match unit {
                b'H' => 1,
                b'M' => 2,
                b'S' => 3,
                _ => return Err(err("unknown time unit")),
            };
            if rank <= last_unit {
                return Err(err("time units out of order"));
            }
            last_unit = rank;

            let (whole, frac) = match number.split_once('.') {
                Some((whole, frac)) if unit == b'S' => (whole, Some(frac)),
                Some(_) => return Err(err("only seconds may be fractional")),
                None => (number, None),
            };
            let whole = parse_component(whole).ok_or_else(|| err("invalid number"))?;
            let scale = match unit {
                b'H' => SECS_PER_HOUR,
                b'M' => SECS_PER_MINUTE,
                _ => 1,
            };
            seconds = whole
                .checked_mul(scale)
                .and_then(|s| seconds.checked_add(s))
                .ok_or_else(overflow)?;
            if let Some(frac) = frac {
                nanos = parse_fraction(frac).ok_or_else(|| err("invalid fraction"))?;
            }
        }
    }

    let delta = TimeDelta::try_seconds(seconds)
        .and_then(|d| d.checked_add(&TimeDelta::nanoseconds(nanos)))
        .ok_or_else(overflow)?;
    Ok(if negative { -delta } else { delta })
}

fn parse_component(digits: &str) -> Option<i64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Up to nine fractional digits, as nanoseconds.
fn parse_fraction(digits: &str) -> Option<i64> {
    if digits.is_empty() || digits.len() > NANOS_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    let padded = format!("{:0<width$}", digits, width = NANOS_DIGITS);
    padded.parse().ok()
}

use super::ValidationError;
use crate::table::{is_missing, AnyValue};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::TimeUnit;
use std::fmt::{Display, LowerExp};

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Lexical form of a category or index value.
///
/// Datetimes render as `YYYY-MM-DDTHH:MM:SS` and dates as `YYYY-MM-DD`.
/// Floats always carry a fractional part or an exponent (`2.0`, `1e+16`,
/// `1e-07`). Missing values are rejected.
pub fn canonicalize(value: &AnyValue) -> Result<String, ValidationError> {
    if is_missing(value) {
        return Err(ValidationError::InvalidValue(
            "index and category values cannot be null or NaN".to_string(),
        ));
    }
    Ok(match value {
        AnyValue::Datetime(ticks, unit, _) => datetime(*ticks, *unit)?
            .format(DATETIME_FORMAT)
            .to_string(),
        AnyValue::Date(days) => date(*days)?.format(DATE_FORMAT).to_string(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Float32(f) => float(*f, f64::from(*f)),
        AnyValue::Float64(f) => float(*f, *f),
        AnyValue::Boolean(b) => b.to_string(),
        AnyValue::Int8(n) => n.to_string(),
        AnyValue::Int16(n) => n.to_string(),
        AnyValue::Int32(n) => n.to_string(),
        AnyValue::Int64(n) => n.to_string(),
        AnyValue::UInt8(n) => n.to_string(),
        AnyValue::UInt16(n) => n.to_string(),
        AnyValue::UInt32(n) => n.to_string(),
        AnyValue::UInt64(n) => n.to_string(),
        other => other.to_string(),
    })
}

fn float<F: Display + LowerExp>(value: F, magnitude: f64) -> String {
    let magnitude = magnitude.abs();
    if !magnitude.is_finite() {
        return value.to_string();
    }
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let scientific = format!("{:e}", value);
        return match scientific.split_once('e') {
            Some((mantissa, exponent)) => {
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exponent),
                };
                format!("{mantissa}e{sign}{digits:0>2}")
            }
            None => scientific,
        };
    }
    let plain = value.to_string();
    if plain.contains('.') {
        plain
    } else {
        format!("{plain}.0")
    }
}

fn date(days: i32) -> Result<NaiveDate, ValidationError> {
    days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .ok_or_else(|| ValidationError::InvalidValue(format!("date out of range: {days}")))
}

fn datetime(ticks: i64, unit: TimeUnit) -> Result<NaiveDateTime, ValidationError> {
    let parsed = match unit {
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(ticks),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(ticks),
        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(ticks)),
    };
    parsed
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| ValidationError::InvalidValue(format!("datetime out of range: {ticks}")))
}

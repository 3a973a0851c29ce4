//! Typed coercion of configuration values.
//!
//! Config files are loosely typed: properties files only carry strings, and
//! YAML happily turns `port: 8080` into an integer while `port: "8080"` stays
//! a string. Readers ask for the type they want and these helpers bridge the
//! gap. Every function returns `None` when the value cannot be coerced.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::config::value::Value;

pub fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Integer(i) => Some(*i != 0),
        Value::String(s) => match s.trim() {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

pub fn to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(i) => Some(*i),
        Value::Float(f) if f.is_finite() => Some(f.trunc() as i64),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn to_i32(value: &Value) -> Option<i32> {
    to_i64(value).and_then(|i| i32::try_from(i).ok())
}

pub fn to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Float(f) => Some(*f),
        Value::Integer(i) => Some(*i as f64),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn to_duration(value: &Value) -> Option<Duration> {
    match value {
        Value::Integer(nanos) => u64::try_from(*nanos).ok().map(Duration::from_nanos),
        Value::Float(nanos) if *nanos >= 0.0 && nanos.is_finite() => {
            Some(Duration::from_nanos(*nanos as u64))
        }
        Value::String(s) => {
            let s = s.trim();
            if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
                s.parse().ok().map(Duration::from_nanos)
            } else {
                parse_duration(s)
            }
        }
        _ => None,
    }
}

/// Parse a duration such as `300ms`, `1h30m` or `1.5s`.
///
/// Units: `ns`, `us` (`µs`, `μs`), `ms`, `s`, `m`, `h`. A lone `0` is
/// accepted without a unit. Negative durations are rejected.
pub fn parse_duration(input: &str) -> Option<Duration> {
    let s = input.trim();
    let s = s.strip_prefix('+').unwrap_or(s);
    if s == "0" {
        return Some(Duration::ZERO);
    }
    if s.is_empty() || s.starts_with('-') {
        return None;
    }

    let is_number = |c: char| c.is_ascii_digit() || c == '.';
    let mut rest = s;
    let mut total_nanos = 0f64;

    while !rest.is_empty() {
        let number_end = rest.find(|c: char| !is_number(c)).unwrap_or(rest.len());
        if number_end == 0 {
            return None;
        }
        let number: f64 = rest[..number_end].parse().ok()?;
        rest = &rest[number_end..];

        let unit_end = rest.find(is_number).unwrap_or(rest.len());
        let scale = match &rest[..unit_end] {
            "ns" => 1.0,
            "us" | "µs" | "μs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return None,
        };
        total_nanos += number * scale;
        rest = &rest[unit_end..];
    }

    if total_nanos > u64::MAX as f64 {
        return None;
    }
    Some(Duration::from_nanos(total_nanos.round() as u64))
}

/// Parse a size such as `512`, `64kb` or `1 GB` into bytes.
///
/// Suffixes are powers of 1024. Negative sizes clamp to zero; anything
/// unparseable is zero as well.
pub fn parse_size_in_bytes(input: &str) -> u64 {
    let mut size = input.trim();
    let mut multiplier = 1u64;

    if let Some(stripped) = size.strip_suffix(['b', 'B']) {
        if size.len() > 2 {
            match stripped.chars().last().map(|c| c.to_ascii_lowercase()) {
                Some('k') => multiplier = 1 << 10,
                Some('m') => multiplier = 1 << 20,
                Some('g') => multiplier = 1 << 30,
                _ => {}
            }
            size = if multiplier > 1 {
                stripped[..stripped.len() - 1].trim()
            } else {
                stripped.trim()
            };
        }
    }

    match size.parse::<i64>() {
        Ok(n) if n > 0 => (n as u64).saturating_mul(multiplier),
        _ => 0,
    }
}

pub fn to_size_in_bytes(value: &Value) -> Option<u64> {
    to_string(value).map(|s| parse_size_in_bytes(&s))
}

pub fn to_string_slice(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::List(items) => Some(items.iter().filter_map(to_string).collect()),
        Value::String(s) => Some(s.split_whitespace().map(str::to_string).collect()),
        _ => None,
    }
}

pub fn to_string_map(value: &Value) -> Option<BTreeMap<String, Value>> {
    value.as_table().cloned()
}

pub fn to_string_map_string(value: &Value) -> Option<BTreeMap<String, String>> {
    let table = value.as_table()?;
    Some(
        table
            .iter()
            .filter_map(|(k, v)| to_string(v).map(|s| (k.clone(), s)))
            .collect(),
    )
}

pub fn to_string_map_string_slice(value: &Value) -> Option<BTreeMap<String, Vec<String>>> {
    let table = value.as_table()?;
    Some(
        table
            .iter()
            .filter_map(|(k, v)| {
                let items = match v {
                    Value::List(_) | Value::String(_) => to_string_slice(v)?,
                    other => vec![to_string(other)?],
                };
                Some((k.clone(), items))
            })
            .collect(),
    )
}

pub fn to_time(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Integer(secs) => DateTime::from_timestamp(*secs, 0),
        Value::String(s) => parse_time(s.trim()),
        _ => None,
    }
}

fn parse_time(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

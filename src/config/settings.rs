//! Read-only, typed view over a configuration document.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::config::cast;
use crate::config::value::Value;

/// Typed accessors shared by documents and live sources.
///
/// Implementors only provide raw lookup; every typed getter is derived.
/// Keys are dotted and case-insensitive. A getter returns `None` when the
/// key is missing, null, or cannot be coerced to the requested type.
pub trait Settings {
    /// Raw value at `key`, excluding nulls.
    fn value(&self, key: &str) -> Option<Value>;

    /// Every leaf key in dotted form, sorted.
    fn all_keys(&self) -> Vec<String>;

    fn is_set(&self, key: &str) -> bool {
        self.value(key).is_some()
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        self.value(key).as_ref().and_then(cast::to_bool)
    }

    fn get_int(&self, key: &str) -> Option<i64> {
        self.value(key).as_ref().and_then(cast::to_i64)
    }

    fn get_int32(&self, key: &str) -> Option<i32> {
        self.value(key).as_ref().and_then(cast::to_i32)
    }

    fn get_float64(&self, key: &str) -> Option<f64> {
        self.value(key).as_ref().and_then(cast::to_f64)
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.value(key).as_ref().and_then(cast::to_string)
    }

    fn get_duration(&self, key: &str) -> Option<Duration> {
        self.value(key).as_ref().and_then(cast::to_duration)
    }

    fn get_size_in_bytes(&self, key: &str) -> Option<u64> {
        self.value(key).as_ref().and_then(cast::to_size_in_bytes)
    }

    fn get_string_slice(&self, key: &str) -> Option<Vec<String>> {
        self.value(key).as_ref().and_then(cast::to_string_slice)
    }

    fn get_string_map(&self, key: &str) -> Option<BTreeMap<String, Value>> {
        self.value(key).as_ref().and_then(cast::to_string_map)
    }

    fn get_string_map_string(&self, key: &str) -> Option<BTreeMap<String, String>> {
        self.value(key).as_ref().and_then(cast::to_string_map_string)
    }

    fn get_string_map_string_slice(&self, key: &str) -> Option<BTreeMap<String, Vec<String>>> {
        self.value(key).as_ref().and_then(cast::to_string_map_string_slice)
    }

    fn get_time(&self, key: &str) -> Option<DateTime<Utc>> {
        self.value(key).as_ref().and_then(cast::to_time)
    }
}

//! Format-independent value tree.
//!
//! Every parser (JSON, TOML, YAML, properties, dotenv, INI) lowers its
//! output into [`Value`]. Table keys are lowercased on the way in so that
//! lookups are case-insensitive regardless of how the file spelled them.

use std::collections::BTreeMap;

/// A table of lowercased keys.
pub type Table = BTreeMap<String, Value>;

/// A single configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Table(Table),
}

impl Value {
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// Insert `value` at a dotted path, creating intermediate tables.
///
/// A scalar sitting where a table is needed gets replaced, so the last
/// writer wins.
pub fn insert_path(table: &mut Table, key: &str, value: Value) {
    let mut segments = key.split('.').map(str::to_lowercase).peekable();
    let mut current = table;

    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment, value);
            return;
        }

        let slot = current
            .entry(segment)
            .or_insert_with(|| Value::Table(Table::new()));
        if !matches!(slot, Value::Table(_)) {
            *slot = Value::Table(Table::new());
        }
        let Value::Table(inner) = slot else {
            return;
        };
        current = inner;
    }
}

/// Walk a dotted, case-insensitive key through nested tables.
///
/// At each level the shortest segment is tried first, then progressively
/// longer literal keys, so `"server.port": 1` written as one key is found
/// the same way as a nested `server: {port: 1}`.
pub fn lookup<'a>(table: &'a Table, key: &str) -> Option<&'a Value> {
    let key = key.to_lowercase();
    let segments: Vec<&str> = key.split('.').collect();
    find(table, &segments)
}

fn find<'a>(table: &'a Table, segments: &[&str]) -> Option<&'a Value> {
    (1..=segments.len()).find_map(|split| {
        let value = table.get(&segments[..split].join("."))?;
        match &segments[split..] {
            [] => Some(value),
            rest => find(value.as_table()?, rest),
        }
    })
}

/// Collect every leaf key in dotted form, sorted and deduplicated.
pub fn leaf_keys(table: &Table) -> Vec<String> {
    fn walk(prefix: &str, table: &Table, out: &mut Vec<String>) {
        for (key, value) in table {
            let full = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            match value {
                Value::Table(inner) if !inner.is_empty() => walk(&full, inner, out),
                Value::Table(_) | Value::Null => {}
                _ => out.push(full),
            }
        }
    }

    let mut keys = Vec::new();
    walk("", table, &mut keys);
    keys.sort();
    keys.dedup();
    keys
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Table(
                map.into_iter()
                    .map(|(k, v)| (k.to_lowercase(), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<toml::Value> for Value {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => Value::String(s),
            toml::Value::Integer(i) => Value::Integer(i),
            toml::Value::Float(f) => Value::Float(f),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::Datetime(dt) => Value::String(dt.to_string()),
            toml::Value::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            toml::Value::Table(map) => Value::Table(
                map.into_iter()
                    .map(|(k, v)| (k.to_lowercase(), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_yaml::Value> for Value {
    fn from(value: serde_yaml::Value) -> Self {
        match value {
            serde_yaml::Value::Null => Value::Null,
            serde_yaml::Value::Bool(b) => Value::Bool(b),
            serde_yaml::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or_default()),
            },
            serde_yaml::Value::String(s) => Value::String(s),
            serde_yaml::Value::Sequence(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_yaml::Value::Mapping(map) => Value::Table(
                map.into_iter()
                    .filter_map(|(k, v)| yaml_key(k).map(|k| (k.to_lowercase(), Value::from(v))))
                    .collect(),
            ),
            serde_yaml::Value::Tagged(tagged) => Value::from(tagged.value),
        }
    }
}

// YAML allows non-string keys; scalars are stringified, anything else dropped.
fn yaml_key(key: serde_yaml::Value) -> Option<String> {
    match key {
        serde_yaml::Value::String(s) => Some(s),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

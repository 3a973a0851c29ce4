//! Reader for flat `key=value` files (Java-properties style).
//!
//! Machine configuration files such as `/etc/podcastdb.conf` use this
//! syntax:
//!
//! ```text
//! # comment
//! production = false
//! configuration.path = /etc/podcastdb, /usr/share/podcastdb
//! motd : first line \
//!        continued
//! ```
//!
//! Separators are `=`, `:` or whitespace. `#` and `!` start comment lines.
//! A trailing backslash continues the logical line. Dotted keys nest.

use thiserror::Error;

use crate::config::value::{insert_path, Table, Value};

#[derive(Debug, Error, PartialEq)]
#[error("line {line}: {message}")]
pub struct PropertiesError {
    pub line: usize,
    pub message: String,
}

/// Parse properties text into `(key, value)` pairs, in file order.
pub fn parse_pairs(input: &str) -> Result<Vec<(String, String)>, PropertiesError> {
    let mut pairs = Vec::new();
    let mut lines = input.lines().enumerate();

    while let Some((index, raw)) = lines.next() {
        let start_line = index + 1;
        let mut logical = raw.trim_start().to_string();

        if logical.is_empty() || logical.starts_with('#') || logical.starts_with('!') {
            continue;
        }

        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some((_, next)) => logical.push_str(next.trim_start()),
                None => break,
            }
        }

        let (key, value) = split_entry(&logical);
        let key = unescape(key).map_err(|message| PropertiesError {
            line: start_line,
            message,
        })?;
        if key.is_empty() {
            return Err(PropertiesError {
                line: start_line,
                message: "empty key".to_string(),
            });
        }
        let value = unescape(value).map_err(|message| PropertiesError {
            line: start_line,
            message,
        })?;

        pairs.push((key, value.trim_end().to_string()));
    }

    Ok(pairs)
}

/// Parse properties text into a nested table of string values.
pub fn parse(input: &str) -> Result<Table, PropertiesError> {
    let mut table = Table::new();
    for (key, value) in parse_pairs(input)? {
        insert_path(&mut table, &key, Value::String(value));
    }
    Ok(table)
}

// An odd number of trailing backslashes means the last one is a continuation.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                break;
            }
            c if c.is_whitespace() => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let mut rest = line[key_end..].trim_start();
    if let Some(stripped) = rest.strip_prefix(['=', ':']) {
        rest = stripped.trim_start();
    }
    (key, rest)
}

fn unescape(raw: &str) -> Result<String, String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{000C}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let code = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4)
                    .and_then(char::from_u32)
                    .ok_or_else(|| format!("invalid unicode escape \\u{hex}"))?;
                out.push(code);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

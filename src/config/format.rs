//! Supported configuration file formats.

use std::fmt;
use std::path::Path;

use crate::config::properties;
use crate::config::value::{insert_path, Table, Value};

/// Extensions tried, in order, when searching for a named source.
pub const SEARCH_EXTENSIONS: &[&str] = &[
    "json", "toml", "yaml", "yml", "properties", "props", "prop", "dotenv", "env", "ini",
];

/// Syntax of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Toml,
    Yaml,
    Properties,
    Dotenv,
    Ini,
}

impl Format {
    /// Format for a file extension (without the dot), case-insensitive.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(Format::Json),
            "toml" => Some(Format::Toml),
            "yaml" | "yml" => Some(Format::Yaml),
            "properties" | "props" | "prop" => Some(Format::Properties),
            "dotenv" | "env" => Some(Format::Dotenv),
            "ini" => Some(Format::Ini),
            _ => None,
        }
    }

    /// Format for a machine configuration file.
    ///
    /// `.conf` files are read as properties; everything else goes through
    /// [`Format::from_extension`].
    pub fn for_machine_file(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext == "conf" {
            return Some(Format::Properties);
        }
        Self::from_extension(ext)
    }

    /// Parse file contents into a root table.
    ///
    /// An empty YAML document is an empty table. Any other non-table root is
    /// rejected.
    pub fn parse(self, content: &str) -> Result<Table, String> {
        let root: Value = match self {
            Format::Json => serde_json::from_str::<serde_json::Value>(content)
                .map_err(|e| e.to_string())?
                .into(),
            Format::Toml => toml::from_str::<toml::Table>(content)
                .map(toml::Value::Table)
                .map_err(|e| e.to_string())?
                .into(),
            Format::Yaml => serde_yaml::from_str::<serde_yaml::Value>(content)
                .map_err(|e| e.to_string())?
                .into(),
            Format::Properties => {
                return properties::parse(content).map_err(|e| e.to_string());
            }
            Format::Dotenv => return parse_dotenv(content),
            Format::Ini => return parse_ini(content),
        };

        match root {
            Value::Table(table) => Ok(table),
            Value::Null => Ok(Table::new()),
            _ => Err("document root is not a table".to_string()),
        }
    }
}

/// `KEY=value` lines. Keys stay flat; a dotted key is stored as written.
fn parse_dotenv(content: &str) -> Result<Table, String> {
    let mut table = Table::new();
    for item in dotenvy::from_read_iter(content.as_bytes()) {
        let (key, value) = item.map_err(|e| e.to_string())?;
        table.insert(key.to_lowercase(), Value::String(value));
    }
    Ok(table)
}

/// Keys outside any section are top-level; `[a.b]` sections nest.
fn parse_ini(content: &str) -> Result<Table, String> {
    let document = ini::Ini::load_from_str(content).map_err(|e| e.to_string())?;
    let mut table = Table::new();
    for (section, entries) in document.iter() {
        for (key, value) in entries.iter() {
            let path = match section {
                Some(section) => format!("{section}.{key}"),
                None => key.to_string(),
            };
            insert_path(&mut table, &path, Value::String(value.to_string()));
        }
    }
    Ok(table)
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Json => "json",
            Format::Toml => "toml",
            Format::Yaml => "yaml",
            Format::Properties => "properties",
            Format::Dotenv => "dotenv",
            Format::Ini => "ini",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::value::lookup;

    #[test]
    fn test_machine_file_detection() {
        assert_eq!(
            Format::for_machine_file(Path::new("/etc/podcastdb.conf")),
            Some(Format::Properties)
        );
        assert_eq!(
            Format::for_machine_file(Path::new("machine.YML")),
            Some(Format::Yaml)
        );
        assert_eq!(
            Format::for_machine_file(Path::new("machine.ini")),
            Some(Format::Ini)
        );
        assert_eq!(Format::for_machine_file(Path::new("machine.xml")), None);
        assert_eq!(Format::for_machine_file(Path::new("machine")), None);
    }

    #[test]
    fn test_structured_formats_agree() {
        let json = r#"{"helloworld-message": "Hello, World!", "limits": {"port": 8080}}"#;
        let toml = "helloworld-message = \"Hello, World!\"\n[limits]\nport = 8080\n";
        let yaml = "helloworld-message: Hello, World!\nlimits:\n  port: 8080\n";

        for (format, content) in [(Format::Json, json), (Format::Toml, toml), (Format::Yaml, yaml)] {
            let table = format.parse(content).unwrap();
            assert_eq!(
                lookup(&table, "helloworld-message"),
                Some(&Value::String("Hello, World!".into())),
                "{format}"
            );
            assert_eq!(lookup(&table, "limits.port"), Some(&Value::Integer(8080)), "{format}");
        }
    }

    #[test]
    fn test_empty_yaml_is_empty_table() {
        assert!(Format::Yaml.parse("").unwrap().is_empty());
    }

    #[test]
    fn test_scalar_root_rejected() {
        assert!(Format::Json.parse("[1, 2]").is_err());
        assert!(Format::Yaml.parse("just a string").is_err());
    }

    #[test]
    fn test_ini_sections_nest() {
        let table = Format::Ini
            .parse("helloworld-message=Hi\n\n[server]\nport = 8080\n")
            .unwrap();
        assert_eq!(
            lookup(&table, "helloworld-message"),
            Some(&Value::String("Hi".into()))
        );
        assert_eq!(lookup(&table, "server.port"), Some(&Value::String("8080".into())));
    }

    #[test]
    fn test_dotenv_keys_are_flat() {
        let table = Format::Dotenv
            .parse("# greeting\nHELLOWORLD_MESSAGE=\"Hi there\"\nPORT=8080\n")
            .unwrap();
        assert_eq!(
            lookup(&table, "helloworld_message"),
            Some(&Value::String("Hi there".into()))
        );
        assert_eq!(lookup(&table, "port"), Some(&Value::String("8080".into())));
    }

    #[test]
    fn test_new_formats_are_searched_last() {
        let position = |ext| SEARCH_EXTENSIONS.iter().position(|e| *e == ext).unwrap();
        assert!(position("prop") < position("dotenv"));
        assert!(position("env") < position("ini"));
        assert_eq!(SEARCH_EXTENSIONS.last(), Some(&"ini"));
    }
}

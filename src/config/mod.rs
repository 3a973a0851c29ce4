//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! --configuration /etc/podcastdb.conf
//!     → store.rs set_primary_configuration (exact path, .conf = properties)
//!     → validation.rs derives MachineSettings for startup
//!
//! get_configuration("strings-en")
//!     → registry hit: shared Arc<ConfigSource>
//!     → miss: loader.rs searches configuration.path for strings-en.{json,toml,yaml,...}
//!     → format.rs / properties.rs parse into a value tree
//!     → cached under the name (one load per name, shared by concurrent callers)
//!
//! Outside production, on file change:
//!     watcher.rs detects change
//!     → source re-reads and re-parses the file
//!     → atomic swap of Arc<Document>
//!     → readers observe new values
//! ```
//!
//! # Design Decisions
//! - The store is an explicit context object, not process-global state
//! - Documents are immutable; a reload publishes a whole new document
//! - Keys are dotted and case-insensitive; values are typed on read
//! - Failed loads are not cached

pub mod cast;
pub mod format;
pub mod loader;
pub mod properties;
pub mod schema;
pub mod settings;
pub mod source;
pub mod store;
pub mod validation;
pub mod value;
pub mod watcher;

pub use format::Format;
pub use loader::ConfigError;
pub use schema::MachineSettings;
pub use settings::Settings;
pub use source::{ConfigSource, Document};
pub use store::{ConfigStore, MACHINE};
pub use validation::{validate_machine, ValidationError};
pub use value::Value;

//! # migrate-kit
//!
//! A declarative column/index accumulator for schema migrations.
//!
//! Declare a table's columns with short-hand type tags, then compile the
//! declaration into idempotent table operations against a [`host::Host`]:
//! the migration framework (or database) that owns execution.
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use migrate_kit::prelude::*;
//!
//! let host = SqlxHost::connect(&MigrateConfig::load("migrate.toml")?).await?;
//!
//! let mut posts = Migration::for_host("posts", &host);
//! posts
//!     .set_column("title", "varchar", ColumnOptions::new().limit(200u32))?
//!     .set_column("body", "longtext", ColumnOptions::new())?
//!     .set_column("views", "int", ColumnOptions::new().signed(false).default_value(0))?
//!     .created_at()?
//!     .updated_at()?;
//! posts.index(["title"], IndexOptions::new());
//!
//! posts.update_table(&host).await?;
//! posts.add_indices_table(&host).await?;
//! ```
//!
//! ## Type aliases
//!
//! | Tag                                              | Canonical      |
//! |--------------------------------------------------|----------------|
//! | `tinytext`, `mediumtext`, `longtext`             | `text`         |
//! | `varchar`, `str`                                 | `string`       |
//! | `int`, `tinyint`, `tinyinteger`, `mediumint`, `mediuminteger` | `integer` |
//! | `smallint`                                       | `smallinteger` |
//! | `bigint`                                         | `biginteger`   |
//!
//! Other tags pass through unchanged.

pub mod config;
pub mod ddl;
pub mod engine;
pub mod error;
pub mod host;
pub mod limits;
pub mod memory;
pub mod migration;
pub mod options;
pub mod schema;
pub mod types;

pub mod prelude {
    pub use crate::config::MigrateConfig;
    pub use crate::engine::SqlxHost;
    pub use crate::error::*;
    pub use crate::host::{Host, TableHandle};
    pub use crate::limits::SizeLimits;
    pub use crate::memory::MemoryHost;
    pub use crate::migration::Migration;
    pub use crate::options::{
        CURRENT_TIMESTAMP, ColumnOptions, IndexLimit, IndexOptions, OptionValue, TableSettings,
    };
    pub use crate::schema::{ColumnInfo, ColumnSpec, IndexSpec};
    pub use crate::types::ColumnType;
}

pub use migration::Migration;

/// Resolve a short-hand column type tag to its canonical name.
///
/// # Example
///
/// ```
/// assert_eq!(migrate_kit::canonical_type("MediumInt"), "integer");
/// assert_eq!(migrate_kit::canonical_type("uuid"), "uuid");
/// ```
pub fn canonical_type(tag: &str) -> String {
    types::ColumnType::from_tag(tag).as_str().to_string()
}

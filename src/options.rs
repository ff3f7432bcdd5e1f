//! Column, index and table options.
//!
//! Column options are an open key/value map: the accumulator only reads
//! `limit` and writes `after`, everything else goes to the host untouched.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Recognized column option keys.
pub mod keys {
    pub const LIMIT: &str = "limit";
    pub const DEFAULT: &str = "default";
    pub const NULL: &str = "null";
    pub const AFTER: &str = "after";
    pub const COMMENT: &str = "comment";
    pub const PRECISION: &str = "precision";
    pub const SCALE: &str = "scale";
    pub const SIGNED: &str = "signed";
    pub const VALUES: &str = "values";
    pub const IDENTITY: &str = "identity";
    pub const UPDATE: &str = "update";
    pub const TIMEZONE: &str = "timezone";
    pub const COLLATION: &str = "collation";
    pub const ENCODING: &str = "encoding";
    pub const DELETE: &str = "delete";
    pub const CONSTRAINT: &str = "constraint";
}

/// Literal the host understands as "now" for defaults and on-update.
pub const CURRENT_TIMESTAMP: &str = "CURRENT_TIMESTAMP";

/// Dynamic option value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    List(Vec<String>),
}

impl OptionValue {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::UInt(v) => Some(*v),
            Self::Int(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Bool(v)
    }
}

impl From<i32> for OptionValue {
    fn from(v: i32) -> Self {
        OptionValue::Int(v as i64)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Int(v)
    }
}

impl From<u32> for OptionValue {
    fn from(v: u32) -> Self {
        OptionValue::UInt(v as u64)
    }
}

impl From<u64> for OptionValue {
    fn from(v: u64) -> Self {
        OptionValue::UInt(v)
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        OptionValue::Float(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::String(v.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        OptionValue::String(v)
    }
}

impl From<Vec<String>> for OptionValue {
    fn from(v: Vec<String>) -> Self {
        OptionValue::List(v)
    }
}

impl From<&[&str]> for OptionValue {
    fn from(v: &[&str]) -> Self {
        OptionValue::List(v.iter().map(|s| s.to_string()).collect())
    }
}

/// Open option map for a single column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnOptions {
    entries: BTreeMap<String, OptionValue>,
}

impl ColumnOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an arbitrary option.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn limit(self, limit: impl Into<OptionValue>) -> Self {
        self.set(keys::LIMIT, limit)
    }

    pub fn default_value(self, value: impl Into<OptionValue>) -> Self {
        self.set(keys::DEFAULT, value)
    }

    /// `null = true` allows NULL; hosts treat a missing key as NOT NULL.
    pub fn nullable(self, nullable: bool) -> Self {
        self.set(keys::NULL, nullable)
    }

    pub fn after(self, column: impl Into<String>) -> Self {
        self.set(keys::AFTER, column.into())
    }

    pub fn comment(self, comment: impl Into<String>) -> Self {
        self.set(keys::COMMENT, comment.into())
    }

    /// Total number of digits.
    pub fn precision(self, precision: u32) -> Self {
        self.set(keys::PRECISION, precision)
    }

    /// Digits after the decimal point.
    pub fn scale(self, scale: u32) -> Self {
        self.set(keys::SCALE, scale)
    }

    pub fn signed(self, signed: bool) -> Self {
        self.set(keys::SIGNED, signed)
    }

    /// Allowed members for `enum` and `set` columns.
    pub fn values<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        self.set(keys::VALUES, values)
    }

    pub fn identity(self, identity: bool) -> Self {
        self.set(keys::IDENTITY, identity)
    }

    pub fn on_update(self, value: impl Into<String>) -> Self {
        self.set(keys::UPDATE, value.into())
    }

    pub fn timezone(self, timezone: bool) -> Self {
        self.set(keys::TIMEZONE, timezone)
    }

    pub fn collation(self, collation: impl Into<String>) -> Self {
        self.set(keys::COLLATION, collation.into())
    }

    pub fn encoding(self, encoding: impl Into<String>) -> Self {
        self.set(keys::ENCODING, encoding.into())
    }

    pub fn on_delete(self, action: impl Into<String>) -> Self {
        self.set(keys::DELETE, action.into())
    }

    pub fn constraint(self, name: impl Into<String>) -> Self {
        self.set(keys::CONSTRAINT, name.into())
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(OptionValue::as_u64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(OptionValue::as_bool)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(OptionValue::as_str)
    }

    pub fn get_list(&self, key: &str) -> Option<&[String]> {
        self.get(key).and_then(OptionValue::as_list)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Prefix length for indexed text columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexLimit {
    /// Same prefix length for every column.
    All(u64),
    /// Prefix length per column name.
    PerColumn(BTreeMap<String, u64>),
}

impl IndexLimit {
    pub fn for_column(&self, column: &str) -> Option<u64> {
        match self {
            Self::All(n) => Some(*n),
            Self::PerColumn(map) => map.get(column).copied(),
        }
    }
}

/// Options for a single index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexOptions {
    #[serde(default)]
    pub unique: bool,
    /// Sort direction per column (`ASC` / `DESC`).
    #[serde(default)]
    pub order: BTreeMap<String, String>,
    pub name: Option<String>,
    /// Index kind such as `fulltext`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub limit: Option<IndexLimit>,
    /// Covering columns; ignored by hosts that do not support them.
    #[serde(default)]
    pub include: Vec<String>,
}

impl IndexOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn order(mut self, column: impl Into<String>, direction: impl Into<String>) -> Self {
        self.order.insert(column.into(), direction.into());
        self
    }

    pub fn limit(mut self, limit: IndexLimit) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn include<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = columns.into_iter().map(Into::into).collect();
        self
    }
}

fn default_true() -> bool {
    true
}

/// Table-level settings passed through to the table factory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSettings {
    /// Add an implicit auto-increment `id` primary key.
    #[serde(default = "default_true")]
    pub id: bool,
    #[serde(default)]
    pub primary_key: Vec<String>,
    pub collation: Option<String>,
    pub encoding: Option<String>,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            id: true,
            primary_key: Vec::new(),
            collation: None,
            encoding: None,
        }
    }
}

impl TableSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_id(mut self) -> Self {
        self.id = false;
        self
    }

    pub fn primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_value_from() {
        assert_eq!(OptionValue::from(true), OptionValue::Bool(true));
        assert_eq!(OptionValue::from(255u64).as_u64(), Some(255));
        assert_eq!(OptionValue::from(-1i64).as_u64(), None);
        assert_eq!(OptionValue::from("x").as_str(), Some("x"));
    }

    #[test]
    fn test_column_options_builder() {
        let opts = ColumnOptions::new()
            .limit(64u32)
            .nullable(true)
            .comment("display name")
            .values(["a", "b"]);

        assert_eq!(opts.get_u64(keys::LIMIT), Some(64));
        assert_eq!(opts.get_bool(keys::NULL), Some(true));
        assert_eq!(opts.get_str(keys::COMMENT), Some("display name"));
        assert_eq!(opts.get_list(keys::VALUES), Some(&["a".to_string(), "b".to_string()][..]));
        assert!(!opts.contains(keys::AFTER));
    }

    #[test]
    fn test_index_limit_lookup() {
        let all = IndexLimit::All(10);
        assert_eq!(all.for_column("anything"), Some(10));

        let per = IndexLimit::PerColumn(BTreeMap::from([("title".to_string(), 32)]));
        assert_eq!(per.for_column("title"), Some(32));
        assert_eq!(per.for_column("body"), None);
    }

    #[test]
    fn test_index_options_from_json() {
        let opts: IndexOptions = serde_json::from_str(
            r#"{"unique": true, "type": "fulltext",
                "limit": {"title": 16}, "order": {"title": "DESC"}}"#,
        )
        .unwrap();
        assert!(opts.unique);
        assert_eq!(opts.kind.as_deref(), Some("fulltext"));
        assert_eq!(opts.limit.as_ref().and_then(|l| l.for_column("title")), Some(16));
        assert!(opts.include.is_empty());
    }

    #[test]
    fn test_column_options_from_json() {
        let opts: ColumnOptions =
            serde_json::from_str(r#"{"limit": 255, "null": true, "values": ["a", "b"]}"#).unwrap();
        assert_eq!(opts.get_u64(keys::LIMIT), Some(255));
        assert_eq!(opts.get_bool(keys::NULL), Some(true));
        assert_eq!(opts.get_list(keys::VALUES).map(|v| v.len()), Some(2));
    }

    #[test]
    fn test_table_settings_defaults() {
        let settings: TableSettings = toml::from_str("collation = \"utf8mb4_unicode_ci\"").unwrap();
        assert!(settings.id);
        assert!(settings.primary_key.is_empty());
        assert_eq!(settings.collation.as_deref(), Some("utf8mb4_unicode_ci"));
    }
}

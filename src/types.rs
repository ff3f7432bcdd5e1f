//! Column types and alias resolution.
//!
//! Short-hand and MySQL-flavoured tags (`varchar`, `tinyint`, `longtext`, ...)
//! collapse onto the host's canonical vocabulary. Tags that are not known are
//! kept as [`ColumnType::Custom`] so native host types still pass through.

use std::fmt;

/// Canonical column type after alias resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnType {
    String,
    Char,
    Text,
    Integer,
    SmallInteger,
    BigInteger,
    Boolean,
    Float,
    Double,
    Decimal,
    Date,
    DateTime,
    Time,
    Timestamp,
    Binary,
    Blob,
    Json,
    Uuid,
    Enum,
    Set,
    Year,
    /// Any other tag, kept lower-cased and otherwise unchanged.
    Custom(String),
}

impl ColumnType {
    /// Resolve a raw tag (case-insensitive) into its canonical type.
    ///
    /// ```
    /// use migrate_kit::types::ColumnType;
    ///
    /// assert_eq!(ColumnType::from_tag("VARCHAR"), ColumnType::String);
    /// assert_eq!(ColumnType::from_tag("bigint"), ColumnType::BigInteger);
    /// assert_eq!(ColumnType::from_tag("point").as_str(), "point");
    /// ```
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.to_lowercase();
        match tag.as_str() {
            "tinytext" | "mediumtext" | "longtext" | "text" => Self::Text,
            "varchar" | "str" | "string" => Self::String,
            "int" | "tinyint" | "tinyinteger" | "mediumint" | "mediuminteger" | "integer" => {
                Self::Integer
            }
            "smallint" | "smallinteger" => Self::SmallInteger,
            "bigint" | "biginteger" => Self::BigInteger,
            "char" => Self::Char,
            "boolean" => Self::Boolean,
            "float" => Self::Float,
            "double" => Self::Double,
            "decimal" => Self::Decimal,
            "date" => Self::Date,
            "datetime" => Self::DateTime,
            "time" => Self::Time,
            "timestamp" => Self::Timestamp,
            "binary" => Self::Binary,
            "blob" => Self::Blob,
            "json" => Self::Json,
            "uuid" => Self::Uuid,
            "enum" => Self::Enum,
            "set" => Self::Set,
            "year" => Self::Year,
            _ => Self::Custom(tag),
        }
    }

    /// The canonical tag handed to the host.
    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Char => "char",
            Self::Text => "text",
            Self::Integer => "integer",
            Self::SmallInteger => "smallinteger",
            Self::BigInteger => "biginteger",
            Self::Boolean => "boolean",
            Self::Float => "float",
            Self::Double => "double",
            Self::Decimal => "decimal",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Time => "time",
            Self::Timestamp => "timestamp",
            Self::Binary => "binary",
            Self::Blob => "blob",
            Self::Json => "json",
            Self::Uuid => "uuid",
            Self::Enum => "enum",
            Self::Set => "set",
            Self::Year => "year",
            Self::Custom(tag) => tag,
        }
    }

    /// Whether `UNSIGNED` applies to this type.
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Integer
                | Self::SmallInteger
                | Self::BigInteger
                | Self::Float
                | Self::Double
                | Self::Decimal
        )
    }

    /// Whether a character set / collation may be attached.
    pub const fn is_textual(&self) -> bool {
        matches!(
            self,
            Self::String | Self::Char | Self::Text | Self::Enum | Self::Set
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Width tier a raw tag implies for its `limit` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeTier {
    TextTiny,
    TextMedium,
    TextLong,
    IntTiny,
    IntSmall,
    IntMedium,
    IntBig,
}

impl SizeTier {
    /// Look up the tier for a raw, lower-cased tag, before alias resolution.
    ///
    /// Plain `text`, `int` and `integer` carry no tier.
    pub fn for_tag(tag: &str) -> Option<Self> {
        match tag {
            "tinytext" => Some(Self::TextTiny),
            "mediumtext" => Some(Self::TextMedium),
            "longtext" => Some(Self::TextLong),
            "tinyint" | "tinyinteger" => Some(Self::IntTiny),
            "smallint" | "smallinteger" => Some(Self::IntSmall),
            "mediumint" | "mediuminteger" => Some(Self::IntMedium),
            "bigint" | "biginteger" => Some(Self::IntBig),
            _ => None,
        }
    }
}

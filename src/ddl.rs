//! MySQL DDL rendering for queued table actions.
//!
//! Identifiers are backtick-quoted and string literals are escaped. Raw view
//! bodies never pass through here.

use crate::limits::SizeLimits;
use crate::options::{CURRENT_TIMESTAMP, OptionValue, TableSettings, keys};
use crate::schema::{ColumnSpec, IndexSpec, TableAction};
use crate::types::ColumnType;

/// Trait for rendering schema nodes as MySQL DDL fragments.
pub trait ToDdl {
    fn to_ddl(&self, limits: &SizeLimits) -> String;
}

/// Quote an identifier with backticks.
pub fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn is_current_timestamp(value: &str) -> bool {
    value.eq_ignore_ascii_case(CURRENT_TIMESTAMP)
}

fn render_default(value: &OptionValue) -> Option<String> {
    match value {
        OptionValue::Null => Some("NULL".to_string()),
        OptionValue::Bool(v) => Some(if *v { "1" } else { "0" }.to_string()),
        OptionValue::Int(v) => Some(v.to_string()),
        OptionValue::UInt(v) => Some(v.to_string()),
        OptionValue::Float(v) => Some(v.to_string()),
        OptionValue::String(v) if is_current_timestamp(v) => Some(CURRENT_TIMESTAMP.to_string()),
        OptionValue::String(v) => Some(quote_literal(v)),
        OptionValue::List(_) => None,
    }
}

fn member_list(values: Option<&[String]>) -> String {
    values
        .unwrap_or_default()
        .iter()
        .map(|v| quote_literal(v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// SQL type for a column, honouring `limit`, `precision`, `scale` and `values`.
pub fn column_type_sql(column: &ColumnSpec, limits: &SizeLimits) -> String {
    let opts = &column.options;
    let limit = opts.get_u64(keys::LIMIT);

    match &column.column_type {
        ColumnType::String => format!("VARCHAR({})", limit.unwrap_or(255)),
        ColumnType::Char => format!("CHAR({})", limit.unwrap_or(255)),
        ColumnType::Text => match limit {
            None => "TEXT".to_string(),
            Some(n) if n <= limits.text_tiny => "TINYTEXT".to_string(),
            Some(n) if n <= limits.text_regular => "TEXT".to_string(),
            Some(n) if n <= limits.text_medium => "MEDIUMTEXT".to_string(),
            Some(_) => "LONGTEXT".to_string(),
        },
        ColumnType::Integer => match limit {
            Some(n) if n == limits.int_tiny => "TINYINT".to_string(),
            Some(n) if n == limits.int_small => "SMALLINT".to_string(),
            Some(n) if n == limits.int_medium => "MEDIUMINT".to_string(),
            Some(n) if n == limits.int_big => "BIGINT".to_string(),
            _ => "INT".to_string(),
        },
        ColumnType::SmallInteger => "SMALLINT".to_string(),
        ColumnType::BigInteger => "BIGINT".to_string(),
        ColumnType::Boolean => "TINYINT(1)".to_string(),
        ColumnType::Float => "FLOAT".to_string(),
        ColumnType::Double => "DOUBLE".to_string(),
        ColumnType::Decimal => match opts.get_u64(keys::PRECISION) {
            Some(p) => format!("DECIMAL({},{})", p, opts.get_u64(keys::SCALE).unwrap_or(0)),
            None => "DECIMAL".to_string(),
        },
        ColumnType::Date => "DATE".to_string(),
        ColumnType::DateTime => "DATETIME".to_string(),
        ColumnType::Time => "TIME".to_string(),
        ColumnType::Timestamp => "TIMESTAMP".to_string(),
        ColumnType::Year => "YEAR".to_string(),
        ColumnType::Binary => format!("BINARY({})", limit.unwrap_or(255)),
        ColumnType::Blob => "BLOB".to_string(),
        ColumnType::Json => "JSON".to_string(),
        ColumnType::Uuid => "CHAR(36)".to_string(),
        ColumnType::Enum => format!("ENUM({})", member_list(opts.get_list(keys::VALUES))),
        ColumnType::Set => format!("SET({})", member_list(opts.get_list(keys::VALUES))),
        ColumnType::Custom(tag) => tag.to_uppercase(),
    }
}

/// Full column definition. `AFTER` is only valid in `ALTER TABLE`.
///
/// `delete` and `constraint` belong to foreign keys and are not rendered.
pub fn column_definition(column: &ColumnSpec, limits: &SizeLimits, with_after: bool) -> String {
    let opts = &column.options;
    let mut parts = vec![quote_ident(&column.name), column_type_sql(column, limits)];

    if column.column_type.is_numeric() && opts.get_bool(keys::SIGNED) == Some(false) {
        parts.push("UNSIGNED".to_string());
    }
    if column.column_type.is_textual() {
        if let Some(encoding) = opts.get_str(keys::ENCODING) {
            parts.push(format!("CHARACTER SET {}", encoding));
        }
        if let Some(collation) = opts.get_str(keys::COLLATION) {
            parts.push(format!("COLLATE {}", collation));
        }
    }

    if opts.get_bool(keys::NULL) == Some(true) {
        parts.push("NULL".to_string());
    } else {
        parts.push("NOT NULL".to_string());
    }

    if opts.get_bool(keys::IDENTITY) == Some(true) {
        parts.push("AUTO_INCREMENT".to_string());
    }
    if let Some(default) = opts.get(keys::DEFAULT).and_then(render_default) {
        parts.push(format!("DEFAULT {}", default));
    }
    if let Some(update) = opts.get_str(keys::UPDATE) {
        parts.push(format!("ON UPDATE {}", update));
    }
    if let Some(comment) = opts.get_str(keys::COMMENT) {
        parts.push(format!("COMMENT {}", quote_literal(comment)));
    }
    if with_after {
        if let Some(after) = opts.get_str(keys::AFTER) {
            parts.push(format!("AFTER {}", quote_ident(after)));
        }
    }

    parts.join(" ")
}

impl ToDdl for ColumnSpec {
    fn to_ddl(&self, limits: &SizeLimits) -> String {
        column_definition(self, limits, false)
    }
}

impl ToDdl for IndexSpec {
    /// `[UNIQUE|FULLTEXT] INDEX [name] (cols)`. `include` has no MySQL form.
    fn to_ddl(&self, _limits: &SizeLimits) -> String {
        let opts = &self.options;
        let mut sql = String::new();

        if opts.unique {
            sql.push_str("UNIQUE ");
        } else if let Some(kind) = &opts.kind {
            sql.push_str(&kind.to_uppercase());
            sql.push(' ');
        }
        sql.push_str("INDEX ");
        if let Some(name) = &opts.name {
            sql.push_str(&quote_ident(name));
            sql.push(' ');
        }

        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                let mut col = quote_ident(c);
                if let Some(len) = opts.limit.as_ref().and_then(|l| l.for_column(c)) {
                    col.push_str(&format!("({})", len));
                }
                if let Some(dir) = opts.order.get(c) {
                    col.push(' ');
                    col.push_str(&dir.to_uppercase());
                }
                col
            })
            .collect();
        sql.push_str(&format!("({})", columns.join(", ")));
        sql
    }
}

/// `CREATE TABLE` for the queued `AddColumn` / `AddIndex` actions.
pub fn create_table_sql(
    name: &str,
    settings: &TableSettings,
    actions: &[TableAction],
    limits: &SizeLimits,
) -> String {
    let mut defs: Vec<String> = Vec::new();
    let mut primary_key = settings.primary_key.clone();

    let declares_id = actions
        .iter()
        .any(|a| matches!(a, TableAction::AddColumn(c) if c.name == "id"));
    if settings.id && primary_key.is_empty() && !declares_id {
        defs.push("`id` INT UNSIGNED NOT NULL AUTO_INCREMENT".to_string());
        primary_key.push("id".to_string());
    }

    for action in actions {
        if let TableAction::AddColumn(column) = action {
            defs.push(column.to_ddl(limits));
        }
    }

    if !primary_key.is_empty() {
        let cols: Vec<String> = primary_key.iter().map(|c| quote_ident(c)).collect();
        defs.push(format!("PRIMARY KEY ({})", cols.join(", ")));
    }

    for action in actions {
        if let TableAction::AddIndex(index) = action {
            if !index.columns.is_empty() {
                defs.push(index.to_ddl(limits));
            }
        }
    }

    let mut sql = format!(
        "CREATE TABLE {} ({}) ENGINE = InnoDB",
        quote_ident(name),
        defs.join(", ")
    );
    if let Some(encoding) = &settings.encoding {
        sql.push_str(&format!(" CHARACTER SET {}", encoding));
    }
    if let Some(collation) = &settings.collation {
        sql.push_str(&format!(" COLLATE {}", collation));
    }
    sql
}

/// One `ALTER TABLE` with every queued action, or `None` when nothing is queued.
pub fn alter_table_sql(name: &str, actions: &[TableAction], limits: &SizeLimits) -> Option<String> {
    let clauses: Vec<String> = actions
        .iter()
        .filter_map(|action| match action {
            TableAction::AddColumn(c) => {
                Some(format!("ADD COLUMN {}", column_definition(c, limits, true)))
            }
            TableAction::ChangeColumn(c) => {
                Some(format!("MODIFY COLUMN {}", column_definition(c, limits, true)))
            }
            TableAction::RemoveColumn(c) => Some(format!("DROP COLUMN {}", quote_ident(c))),
            TableAction::AddIndex(i) if !i.columns.is_empty() => {
                Some(format!("ADD {}", i.to_ddl(limits)))
            }
            TableAction::AddIndex(_) => None,
        })
        .collect();

    if clauses.is_empty() {
        return None;
    }
    Some(format!("ALTER TABLE {} {}", quote_ident(name), clauses.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{ColumnOptions, IndexLimit, IndexOptions};
    use pretty_assertions::assert_eq;

    fn col(name: &str, tag: &str, options: ColumnOptions) -> ColumnSpec {
        ColumnSpec::new(name, ColumnType::from_tag(tag), options)
    }

    const L: SizeLimits = SizeLimits::MYSQL;

    #[test]
    fn test_text_tiers() {
        let tiny = col("a", "text", ColumnOptions::new().limit(L.text_tiny));
        let medium = col("a", "text", ColumnOptions::new().limit(L.text_medium));
        let long = col("a", "text", ColumnOptions::new().limit(L.text_long));
        assert_eq!(column_type_sql(&tiny, &L), "TINYTEXT");
        assert_eq!(column_type_sql(&medium, &L), "MEDIUMTEXT");
        assert_eq!(column_type_sql(&long, &L), "LONGTEXT");
        assert_eq!(column_type_sql(&col("a", "text", ColumnOptions::new()), &L), "TEXT");
    }

    #[test]
    fn test_integer_tiers() {
        let tiny = col("a", "integer", ColumnOptions::new().limit(L.int_tiny));
        let big = col("a", "integer", ColumnOptions::new().limit(L.int_big));
        assert_eq!(column_type_sql(&tiny, &L), "TINYINT");
        assert_eq!(column_type_sql(&big, &L), "BIGINT");
        assert_eq!(column_type_sql(&col("a", "int", ColumnOptions::new()), &L), "INT");
    }

    #[test]
    fn test_column_definition() {
        let c = col(
            "name",
            "varchar",
            ColumnOptions::new()
                .limit(64u32)
                .nullable(true)
                .default_value("it's")
                .comment("display")
                .after("id"),
        );
        assert_eq!(
            column_definition(&c, &L, true),
            "`name` VARCHAR(64) NULL DEFAULT 'it''s' COMMENT 'display' AFTER `id`"
        );
        assert_eq!(
            c.to_ddl(&L),
            "`name` VARCHAR(64) NULL DEFAULT 'it''s' COMMENT 'display'"
        );
    }

    #[test]
    fn test_timestamp_definition() {
        let c = col(
            "updated_at",
            "timestamp",
            ColumnOptions::new()
                .nullable(false)
                .default_value(CURRENT_TIMESTAMP)
                .on_update(CURRENT_TIMESTAMP),
        );
        assert_eq!(
            c.to_ddl(&L),
            "`updated_at` TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP"
        );
    }

    #[test]
    fn test_enum_and_unsigned() {
        let e = col("state", "enum", ColumnOptions::new().values(["on", "off"]));
        assert_eq!(e.to_ddl(&L), "`state` ENUM('on', 'off') NOT NULL");

        let n = col("qty", "int", ColumnOptions::new().signed(false).identity(true));
        assert_eq!(n.to_ddl(&L), "`qty` INT UNSIGNED NOT NULL AUTO_INCREMENT");
    }

    #[test]
    fn test_index_definition() {
        let idx = IndexSpec::new(
            ["title", "created_at"],
            IndexOptions::new()
                .name("idx_title")
                .order("created_at", "desc")
                .limit(IndexLimit::PerColumn([("title".to_string(), 32)].into())),
        );
        assert_eq!(
            idx.to_ddl(&L),
            "INDEX `idx_title` (`title`(32), `created_at` DESC)"
        );

        let ft = IndexSpec::new(["body"], IndexOptions::new().kind("fulltext"));
        assert_eq!(ft.to_ddl(&L), "FULLTEXT INDEX (`body`)");
    }

    #[test]
    fn test_create_table_sql() {
        let actions = vec![
            TableAction::AddColumn(col("email", "string", ColumnOptions::new())),
            TableAction::AddColumn(col(
                "age",
                "tinyint",
                ColumnOptions::new().limit(L.int_tiny).after("email"),
            )),
            TableAction::AddIndex(IndexSpec::new(["email"], IndexOptions::new().unique())),
        ];
        let settings = TableSettings::new().encoding("utf8mb4");
        assert_eq!(
            create_table_sql("users", &settings, &actions, &L),
            "CREATE TABLE `users` (`id` INT UNSIGNED NOT NULL AUTO_INCREMENT, \
             `email` VARCHAR(255) NOT NULL, `age` TINYINT NOT NULL, PRIMARY KEY (`id`), \
             UNIQUE INDEX (`email`)) ENGINE = InnoDB CHARACTER SET utf8mb4"
        );
    }

    #[test]
    fn test_create_table_explicit_primary_key() {
        let actions = vec![TableAction::AddColumn(col(
            "code",
            "char",
            ColumnOptions::new().limit(2u32),
        ))];
        let settings = TableSettings::new().without_id().primary_key(["code"]);
        assert_eq!(
            create_table_sql("countries", &settings, &actions, &L),
            "CREATE TABLE `countries` (`code` CHAR(2) NOT NULL, PRIMARY KEY (`code`)) \
             ENGINE = InnoDB"
        );
    }

    #[test]
    fn test_alter_table_sql() {
        let actions = vec![
            TableAction::ChangeColumn(col("b", "text", ColumnOptions::new().after("a"))),
            TableAction::AddColumn(col(
                "c",
                "boolean",
                ColumnOptions::new().default_value(false).after("b"),
            )),
            TableAction::RemoveColumn("old".to_string()),
        ];
        assert_eq!(
            alter_table_sql("t", &actions, &L).unwrap(),
            "ALTER TABLE `t` MODIFY COLUMN `b` TEXT NOT NULL AFTER `a`, \
             ADD COLUMN `c` TINYINT(1) NOT NULL DEFAULT 0 AFTER `b`, DROP COLUMN `old`"
        );
        assert_eq!(alter_table_sql("t", &[], &L), None);
    }
}

//! Normalized DDL statements
//!
//! The unit the filter engine decides on: exactly one schema and at most one
//! table. Statements that name several tables are split by the resolver
//! before they reach the engine.

use serde::{Deserialize, Serialize};

/// Kind of DDL operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DdlKind {
    /// CREATE DATABASE / CREATE SCHEMA
    CreateSchema,
    /// DROP DATABASE / DROP SCHEMA
    DropSchema,
    /// ALTER DATABASE / ALTER SCHEMA
    AlterSchema,
    /// CREATE TABLE
    CreateTable,
    /// DROP TABLE (one target after splitting)
    DropTable,
    /// ALTER TABLE
    AlterTable,
    /// RENAME TABLE (one pair after splitting)
    RenameTable,
    /// TRUNCATE TABLE
    TruncateTable,
    /// CREATE INDEX ... ON table
    CreateIndex,
    /// DROP INDEX ... ON table
    DropIndex,
}

impl DdlKind {
    /// Schema-scoped kinds carry no table and are decided by `skip_schema`.
    pub fn is_schema_scoped(&self) -> bool {
        matches!(
            self,
            DdlKind::CreateSchema | DdlKind::DropSchema | DdlKind::AlterSchema
        )
    }

    /// Get a human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            DdlKind::CreateSchema => "CREATE DATABASE",
            DdlKind::DropSchema => "DROP DATABASE",
            DdlKind::AlterSchema => "ALTER DATABASE",
            DdlKind::CreateTable => "CREATE TABLE",
            DdlKind::DropTable => "DROP TABLE",
            DdlKind::AlterTable => "ALTER TABLE",
            DdlKind::RenameTable => "RENAME TABLE",
            DdlKind::TruncateTable => "TRUNCATE TABLE",
            DdlKind::CreateIndex => "CREATE INDEX",
            DdlKind::DropIndex => "DROP INDEX",
        }
    }
}

impl std::fmt::Display for DdlKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// A possibly schema-qualified table name as written in a statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
}

impl TableRef {
    pub fn new(schema: Option<String>, name: impl Into<String>) -> Self {
        Self {
            schema,
            name: name.into(),
        }
    }

    /// Backtick-quoted form, e.g. `` `db`.`t` ``.
    pub fn quoted(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", quote_ident(schema), quote_ident(&self.name)),
            None => quote_ident(&self.name),
        }
    }
}

impl std::fmt::Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Quote an identifier with backticks, doubling embedded backticks.
pub fn quote_ident(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

/// One single-target DDL statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedStatement {
    /// Operation kind
    pub kind: DdlKind,
    /// Target schema; empty when the statement did not qualify its target
    pub schema: String,
    /// Target table for table-scoped kinds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    /// Destination of a RENAME TABLE pair
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename_to: Option<TableRef>,
    /// Statement text naming only this target
    pub sql: String,
}

impl NormalizedStatement {
    /// Create a schema-scoped statement.
    pub fn schema(kind: DdlKind, schema: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            kind,
            schema: schema.into(),
            table: None,
            rename_to: None,
            sql: sql.into(),
        }
    }

    /// Create a table-scoped statement.
    pub fn table(kind: DdlKind, table: &TableRef, sql: impl Into<String>) -> Self {
        Self {
            kind,
            schema: table.schema.clone().unwrap_or_default(),
            table: Some(table.name.clone()),
            rename_to: None,
            sql: sql.into(),
        }
    }

    /// Set the rename destination.
    pub fn with_rename_to(mut self, to: TableRef) -> Self {
        self.rename_to = Some(to);
        self
    }

    /// Fill an unqualified target with the event's default schema.
    pub fn with_default_schema(mut self, default_schema: &str) -> Self {
        if self.schema.is_empty() {
            self.schema = default_schema.to_string();
        }
        self
    }

    /// The target schema, or `default_schema` when the statement left it out.
    pub fn schema_or<'a>(&'a self, default_schema: &'a str) -> &'a str {
        if self.schema.is_empty() {
            default_schema
        } else {
            &self.schema
        }
    }

    pub fn is_schema_scoped(&self) -> bool {
        self.table.is_none()
    }

    /// `schema.table` or `schema`, for logging.
    pub fn target(&self) -> String {
        match &self.table {
            Some(table) if self.schema.is_empty() => table.clone(),
            Some(table) => format!("{}.{}", self.schema, table),
            None => self.schema.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_scope() {
        assert!(DdlKind::CreateSchema.is_schema_scoped());
        assert!(DdlKind::AlterSchema.is_schema_scoped());
        assert!(!DdlKind::DropTable.is_schema_scoped());
        assert!(!DdlKind::CreateIndex.is_schema_scoped());
        assert_eq!(DdlKind::RenameTable.to_string(), "RENAME TABLE");
    }

    #[test]
    fn test_quoting() {
        let t = TableRef::new(Some("stest".into()), "log");
        assert_eq!(t.quoted(), "`stest`.`log`");
        assert_eq!(t.to_string(), "stest.log");

        let t = TableRef::new(None, "we`ird");
        assert_eq!(t.quoted(), "`we``ird`");
    }

    #[test]
    fn test_default_schema() {
        let t = TableRef::new(None, "log");
        let stmt = NormalizedStatement::table(DdlKind::CreateTable, &t, "create table log(id int)");
        assert_eq!(stmt.schema, "");
        assert_eq!(stmt.schema_or("stest"), "stest");
        assert_eq!(stmt.target(), "log");

        let stmt = stmt.with_default_schema("stest");
        assert_eq!(stmt.schema, "stest");
        assert_eq!(stmt.schema_or("other"), "stest");
        assert_eq!(stmt.target(), "stest.log");

        let stmt = NormalizedStatement::schema(DdlKind::DropSchema, "s1", "drop database s1");
        assert!(stmt.is_schema_scoped());
        assert_eq!(stmt.target(), "s1");
    }

    #[test]
    fn test_serde_shape() {
        let stmt = NormalizedStatement::schema(DdlKind::CreateSchema, "s1", "create database s1");
        let json = serde_json::to_value(&stmt).unwrap();
        assert_eq!(json["kind"], "CREATE_SCHEMA");
        assert!(json.get("table").is_none());
    }
}

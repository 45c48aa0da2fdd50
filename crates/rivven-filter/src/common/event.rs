//! Replication events as delivered by the binlog transport
//!
//! The transport decodes the wire protocol and hands over one
//! [`SourceEvent`] at a time, in log order. Only the parts the filter needs
//! are modelled: the statement text and default schema of query events, and
//! the target plus row images of row events.

use serde::{Deserialize, Serialize};

/// Row change operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowOp {
    /// Row inserted
    Insert,
    /// Row updated
    Update,
    /// Row deleted
    Delete,
}

/// A row change against one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowChange {
    /// Schema (database) name
    pub schema: String,
    /// Table name
    pub table: String,
    /// Operation type
    pub op: RowOp,
    /// Previous row state (for UPDATE/DELETE)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,
    /// Current row state (for INSERT/UPDATE)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,
}

impl RowChange {
    /// Create a new INSERT change
    pub fn insert(
        schema: impl Into<String>,
        table: impl Into<String>,
        after: serde_json::Value,
    ) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
            op: RowOp::Insert,
            before: None,
            after: Some(after),
        }
    }

    /// Create a new UPDATE change
    pub fn update(
        schema: impl Into<String>,
        table: impl Into<String>,
        before: serde_json::Value,
        after: serde_json::Value,
    ) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
            op: RowOp::Update,
            before: Some(before),
            after: Some(after),
        }
    }

    /// Create a new DELETE change
    pub fn delete(
        schema: impl Into<String>,
        table: impl Into<String>,
        before: serde_json::Value,
    ) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
            op: RowOp::Delete,
            before: Some(before),
            after: None,
        }
    }
}

/// One event from the replication log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceEvent {
    /// Statement-based event (DDL, transaction control, admin commands)
    Query {
        /// Default schema of the session that issued the statement
        #[serde(default)]
        schema: String,
        /// Statement text
        sql: String,
    },
    /// Row-based data change
    Rows(RowChange),
}

impl SourceEvent {
    pub fn query(schema: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::Query {
            schema: schema.into(),
            sql: sql.into(),
        }
    }

    pub fn rows(change: RowChange) -> Self {
        Self::Rows(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_constructors() {
        let insert = RowChange::insert("stest", "t", json!({"id": 10}));
        assert_eq!(insert.op, RowOp::Insert);
        assert!(insert.before.is_none());

        let update = RowChange::update("stest", "t", json!({"id": 10}), json!({"id": 11}));
        assert_eq!(update.op, RowOp::Update);
        assert_eq!(update.after, Some(json!({"id": 11})));

        let delete = RowChange::delete("stest", "t", json!({"id": 11}));
        assert_eq!(delete.op, RowOp::Delete);
        assert!(delete.after.is_none());
    }

    #[test]
    fn test_event_json() {
        let event: SourceEvent =
            serde_json::from_value(json!({"type": "query", "sql": "create database s1"})).unwrap();
        assert_eq!(event, SourceEvent::query("", "create database s1"));

        let event = SourceEvent::rows(RowChange::insert("stest", "log", json!({"id": 10})));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "rows");
        assert_eq!(value["table"], "log");
        assert_eq!(value["op"], "Insert");
        assert!(value.get("before").is_none());
    }
}

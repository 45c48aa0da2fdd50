//! Event generators for filter tests
//!
//! Each scenario is the sequence of binlog events a MySQL primary writes for
//! a short DDL/DML session, in log order. Query events carry an empty
//! default schema because the sessions qualify every target.

use rivven_filter::{RowChange, SourceEvent};
use serde_json::json;

/// Query event with the given default schema.
pub fn query(schema: &str, sql: &str) -> SourceEvent {
    SourceEvent::query(schema, sql)
}

/// Single-row insert event.
pub fn insert(schema: &str, table: &str, id: i64) -> SourceEvent {
    SourceEvent::rows(RowChange::insert(schema, table, json!({ "id": id })))
}

pub mod scenarios {
    use super::*;

    /// Schemas exercised by the schema-level scenarios.
    pub const SCHEMAS: [&str; 6] = ["s1", "s2", "btest", "b1", "stest", "st"];

    /// `create database X` followed by `drop database X` for every schema in
    /// [`SCHEMAS`].
    pub fn create_drop_databases() -> Vec<SourceEvent> {
        SCHEMAS
            .iter()
            .flat_map(|db| {
                [
                    query("", &format!("create database {}", db)),
                    query("", &format!("drop database {}", db)),
                ]
            })
            .collect()
    }

    /// Mixed DDL and row traffic across `s1`, `mysql`, `stest` and `t2`.
    pub fn table_session() -> Vec<SourceEvent> {
        vec![
            query("", "create database s1"),
            query("", "create table s1.log(id int)"),
            query("", "drop database s1"),
            query("", "create table mysql.test(id int)"),
            query("", "drop table mysql.test"),
            query("", "create database stest"),
            query("", "create table stest.log(id int)"),
            query("", "create table stest.t(id int)"),
            query("", "create table stest.log2(id int)"),
            insert("stest", "t", 10),
            insert("stest", "log", 10),
            insert("stest", "log2", 10),
            query("", "drop table stest.log,stest.t,stest.log2"),
            query("", "drop database stest"),
            query("", "create database t2"),
            query("", "create table t2.log(id int)"),
            query("", "create table t2.log1(id int)"),
            query("", "drop table t2.log"),
            query("", "drop database t2"),
        ]
    }

    /// [`table_session`] with the transaction framing a primary writes
    /// around row events.
    pub fn table_session_with_transactions() -> Vec<SourceEvent> {
        table_session()
            .into_iter()
            .flat_map(|event| match event {
                SourceEvent::Rows(_) => {
                    vec![query("stest", "BEGIN"), event, query("stest", "COMMIT")]
                }
                SourceEvent::Query { .. } => vec![event],
            })
            .collect()
    }
}

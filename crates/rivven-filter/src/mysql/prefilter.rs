//! Query event pre-filter
//!
//! Cheap checks applied to every binlog query event before DDL resolution.
//! Transaction control, account management, maintenance commands and
//! routines never yield a replicable statement, so they are dropped without
//! invoking the tokenizer.

use crate::common::is_system_schema;
use regex::RegexSet;
use std::sync::LazyLock;

/// Statements dropped before DDL resolution.
static BUILTIN_SKIP_SQL: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        // transaction control
        r"(?i)^BEGIN\b",
        r"(?i)^COMMIT\b",
        r"(?i)^ROLLBACK\b",
        r"(?i)^(RELEASE\s+)?SAVEPOINT\b",
        r"(?i)^START\s+TRANSACTION\b",
        r"(?i)^XA\s",
        // administrative
        r"(?i)^FLUSH\b",
        r"(?i)^RESET\b",
        r"(?i)^PURGE\b",
        r"(?i)^(OPTIMIZE|ANALYZE|REPAIR|CHECK|CHECKSUM)\s+((NO_WRITE_TO_BINLOG|LOCAL)\s+)?TABLE\b",
        // account management
        r"(?i)^GRANT\b",
        r"(?i)^REVOKE\b",
        r"(?i)^(CREATE|ALTER|DROP|RENAME)\s+USER\b",
        r"(?i)^(CREATE|DROP)\s+ROLE\b",
        r"(?i)^SET\s+(PASSWORD|DEFAULT\s+ROLE)\b",
        // temporary tables
        r"(?i)^DROP\s+(/\*!\d+\s+)?TEMPORARY\s+(\*/\s+)?TABLE\b",
        // triggers
        r"(?i)^CREATE\s+(DEFINER\s*=\s*\S+\s+)?TRIGGER\b",
        r"(?i)^DROP\s+TRIGGER\b",
        // procedures and functions
        r"(?i)^CREATE\s+(DEFINER\s*=\s*\S+\s+)?(PROCEDURE|FUNCTION)\b",
        r"(?i)^CREATE\s+AGGREGATE\s+FUNCTION\b",
        r"(?i)^(ALTER|DROP)\s+(PROCEDURE|FUNCTION)\b",
        // views
        r"(?i)^CREATE\s+(OR\s+REPLACE\s+)?(ALGORITHM\s*=\s*\S+\s+)?(DEFINER\s*=\s*\S+\s+)?(SQL\s+SECURITY\s+\S+\s+)?VIEW\b",
        r"(?i)^ALTER\s+(ALGORITHM\s*=\s*\S+\s+)?(DEFINER\s*=\s*\S+\s+)?(SQL\s+SECURITY\s+\S+\s+)?VIEW\b",
        r"(?i)^DROP\s+VIEW\b",
        // events
        r"(?i)^(CREATE|ALTER)\s+(DEFINER\s*=\s*\S+\s+)?EVENT\b",
        r"(?i)^DROP\s+EVENT\b",
        // tablespaces
        r"(?i)^(CREATE|ALTER|DROP)\s+(UNDO\s+)?TABLESPACE\b",
    ])
    .expect("builtin skip patterns are invalid - this is a bug")
});

/// Check whether a query event can be dropped without resolving it.
///
/// `schema` is the event's default (originating) schema.
pub fn skip_query_event(sql: &str, schema: &str) -> bool {
    if is_system_schema(schema) {
        return true;
    }

    let statement = strip_leading_comments(sql);
    statement.is_empty() || BUILTIN_SKIP_SQL.is_match(statement)
}

/// Drop leading whitespace and plain `/* ... */` or `-- ...` comments.
///
/// Executable `/*! ... */` comments are kept: they carry statement text.
fn strip_leading_comments(sql: &str) -> &str {
    let mut rest = sql.trim_start();
    loop {
        if rest.starts_with("/*") && !rest.starts_with("/*!") {
            match rest.find("*/") {
                Some(end) => rest = rest[end + 2..].trim_start(),
                None => return "",
            }
        } else if rest.starts_with("-- ") || rest.starts_with('#') {
            match rest.find('\n') {
                Some(end) => rest = rest[end + 1..].trim_start(),
                None => return "",
            }
        } else {
            return rest;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_control() {
        assert!(skip_query_event("BEGIN", ""));
        assert!(skip_query_event("begin", "stest"));
        assert!(skip_query_event("COMMIT", ""));
        assert!(skip_query_event("ROLLBACK TO SAVEPOINT sp1", ""));
        assert!(skip_query_event("SAVEPOINT sp1", ""));
        assert!(skip_query_event("XA START 'x'", ""));
    }

    #[test]
    fn test_administrative() {
        assert!(skip_query_event("FLUSH PRIVILEGES", ""));
        assert!(skip_query_event("GRANT REPLICATION SLAVE ON *.* TO 'repl'@'%'", ""));
        assert!(skip_query_event("REVOKE ALL ON *.* FROM 'u'", ""));
        assert!(skip_query_event("CREATE USER 'u'@'%' IDENTIFIED BY 'x'", ""));
        assert!(skip_query_event("SET PASSWORD FOR 'u' = 'x'", ""));
        assert!(skip_query_event("OPTIMIZE TABLE stest.log", ""));
        assert!(skip_query_event("ANALYZE NO_WRITE_TO_BINLOG TABLE t", ""));
    }

    #[test]
    fn test_routines_and_temporary_tables() {
        assert!(skip_query_event(
            "CREATE DEFINER=`root`@`%` TRIGGER trg BEFORE INSERT ON t FOR EACH ROW SET @x = 1",
            "stest"
        ));
        assert!(skip_query_event("CREATE PROCEDURE p() BEGIN END", ""));
        assert!(skip_query_event("DROP FUNCTION IF EXISTS f", ""));
        assert!(skip_query_event(
            "CREATE OR REPLACE ALGORITHM=UNDEFINED DEFINER=`root`@`%` SQL SECURITY DEFINER VIEW v AS SELECT 1",
            ""
        ));
        assert!(skip_query_event("DROP VIEW v", ""));
        assert!(skip_query_event("CREATE EVENT e ON SCHEDULE EVERY 1 DAY DO SELECT 1", ""));
        assert!(skip_query_event("CREATE TABLESPACE ts ADD DATAFILE 'ts.ibd'", ""));
        assert!(skip_query_event(
            "DROP /*!40005 TEMPORARY */ TABLE IF EXISTS `tmp`",
            ""
        ));
        assert!(skip_query_event("DROP TEMPORARY TABLE tmp", ""));
    }

    #[test]
    fn test_system_schema_origin() {
        assert!(skip_query_event("create table t(id int)", "mysql"));
        assert!(skip_query_event("drop table x", "information_schema"));
        assert!(skip_query_event("create table t(id int)", "performance_schema"));
    }

    #[test]
    fn test_replicable_statements_pass() {
        assert!(!skip_query_event("create database s1", ""));
        assert!(!skip_query_event("create table mysql.test(id int)", ""));
        assert!(!skip_query_event("drop table stest.log,stest.t", "stest"));
        assert!(!skip_query_event("ALTER TABLE t ADD COLUMN c INT", "stest"));
        assert!(!skip_query_event("RENAME TABLE a TO b", "stest"));
        assert!(!skip_query_event("CREATE TABLE begin_log (id int)", ""));
        // Non-DDL statements are left to the resolver
        assert!(!skip_query_event("insert into t values (1)", "stest"));
    }

    #[test]
    fn test_leading_comments() {
        assert!(skip_query_event("/* app */ BEGIN", ""));
        assert!(skip_query_event("-- note\nFLUSH LOGS", ""));
        assert!(!skip_query_event("/* app */ create database s1", ""));
        assert!(skip_query_event("   ", ""));
        assert!(skip_query_event("/* unterminated", ""));
        assert_eq!(strip_leading_comments("/*!40101 SET x */"), "/*!40101 SET x */");
    }
}

//! MySQL/MariaDB statement handling
//!
//! - [`DdlResolver`] splits binlog query text into single-target statements
//! - [`skip_query_event`] drops query events that never carry replicable DDL
//!
//! # Example
//!
//! ```rust
//! use rivven_filter::mysql::{resolve_ddl, skip_query_event};
//!
//! assert!(skip_query_event("BEGIN", ""));
//!
//! let statements = resolve_ddl("DROP TABLE a.t1, a.t2").unwrap().unwrap();
//! assert_eq!(statements.len(), 2);
//! assert_eq!(statements[1].sql, "DROP TABLE `a`.`t2`");
//! ```

pub mod ddl;
pub mod prefilter;

pub use ddl::*;
pub use prefilter::*;

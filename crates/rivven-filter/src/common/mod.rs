//! # Common Filter Types
//!
//! Dialect-independent building blocks of the replication filter:
//!
//! - [`PatternMatcher`] - Literal or `~regex` name pattern
//! - [`RuleSet`] - Compiled allow/deny lists for schemas and tables
//! - [`ReplicationFilter`] - Keep/skip decisions for statements and rows
//! - [`SharedFilter`] - Reloadable filter handle
//! - [`NormalizedStatement`] - Single-target DDL statement
//! - [`FilterPipeline`] - Event-at-a-time filtering driver
//! - [`FilterConfig`] - YAML/builder configuration
//! - [`FilterStats`] - Lock-free counters
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Common Module                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  FilterConfig  ←─── YAML / builder, env expansion           │
//! │  RuleSet       ←─── Compiled patterns, system schemas       │
//! │  Filter        ←─── skip_schema / skip_table decisions      │
//! │  Statement     ←─── Normalized single-target DDL            │
//! │  Pipeline      ←─── Pre-filter, resolve, decide             │
//! │  Stats         ←─── Kept / skipped / error counters         │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod event;
mod filter;
pub mod pattern;
mod pipeline;
mod rules;
mod statement;
mod stats;

pub use config::*;
pub use error::*;
pub use event::*;
pub use filter::*;
pub use pattern::{PatternError, PatternMatcher, PatternSet, REGEX_MARKER};
pub use pipeline::*;
pub use rules::*;
pub use statement::*;
pub use stats::*;

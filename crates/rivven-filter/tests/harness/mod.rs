//! Test harness for filter integration tests
//!
//! Provides:
//! - Idempotent `tracing` initialization
//! - Binlog event sequences replaying real replication sessions
//! - Assertions over per-target filter decisions

pub mod assertions;
pub mod data_generators;

pub use assertions::{decisions_of, DecisionVecExt};
pub use data_generators::{insert, query, scenarios};

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize test logging (idempotent)
pub fn init_test_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive("rivven_filter=debug".parse().unwrap()),
            )
            .with_test_writer()
            .try_init()
            .ok();
    });
}

//! Custom assertions for filter decisions
//!
//! Provides readable assertions over the verdicts a pipeline returns, with
//! the offending targets in the failure message.

use pretty_assertions::assert_eq;
use rivven_filter::{Decision, FilterOutput, FilterPipeline, SourceEvent};

/// Evaluate every event and collect the skip verdicts per event.
///
/// Events that yield no targets (pre-filtered or not DDL) are left out, so
/// the result lines up with the replicable events of a session.
pub fn decisions_of(pipeline: &FilterPipeline, events: Vec<SourceEvent>) -> Vec<Vec<Decision>> {
    events
        .into_iter()
        .map(|event| pipeline.evaluate(event).expect("event should resolve"))
        .filter(|decisions| !decisions.is_empty())
        .collect()
}

/// Assertion helpers for decision lists
pub trait DecisionVecExt {
    fn verdicts(&self) -> Vec<Vec<bool>>;
    fn assert_verdicts(&self, expected: &[&[bool]]);
}

impl DecisionVecExt for Vec<Vec<Decision>> {
    fn verdicts(&self) -> Vec<Vec<bool>> {
        self.iter()
            .map(|event| event.iter().map(|d| d.skip).collect())
            .collect()
    }

    fn assert_verdicts(&self, expected: &[&[bool]]) {
        let expected: Vec<Vec<bool>> = expected.iter().map(|e| e.to_vec()).collect();
        let targets: Vec<Vec<String>> = self
            .iter()
            .map(|event| event.iter().map(|d| describe(&d.output)).collect())
            .collect();
        assert_eq!(
            self.verdicts(),
            expected,
            "Unexpected skip verdicts for targets {:#?}",
            targets
        );
    }
}

fn describe(output: &FilterOutput) -> String {
    match output {
        FilterOutput::Statement { statement, .. } => {
            format!("{} {}", statement.kind, statement.target())
        }
        FilterOutput::Row(row) => format!("{:?} {}.{}", row.op, row.schema, row.table),
    }
}

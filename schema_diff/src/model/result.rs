//! Comparison run result and its write-through summary

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::filter::ComparisonFilter;
use crate::model::difference::ObjectDifference;
use crate::model::types::{DifferenceType, ObjectType, Severity};

/// Lifecycle state of a comparison run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    Running,
    Succeeded,
    Failed,
}

/// Running difference counts, updated write-through on every
/// `add_difference` call and never recomputed from scratch
#[derive(Debug, Clone, Default, Serialize)]
pub struct ComparisonSummary {
    pub missing: usize,
    pub extra: usize,
    pub modified: usize,
    /// Candidate objects examined per category, including matches
    pub objects_scanned: HashMap<ObjectType, usize>,
    /// Differences recorded per category
    pub differences_by_object_type: HashMap<ObjectType, usize>,
}

impl ComparisonSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one difference in the counters
    pub fn record(&mut self, diff: &ObjectDifference) {
        match diff.difference_type {
            DifferenceType::Missing => self.missing += 1,
            DifferenceType::Extra => self.extra += 1,
            DifferenceType::Modified => self.modified += 1,
        }
        *self
            .differences_by_object_type
            .entry(diff.object_type)
            .or_insert(0) += 1;
    }

    /// Record that `count` candidate objects of a category were examined
    pub fn record_scanned(&mut self, object_type: ObjectType, count: usize) {
        *self.objects_scanned.entry(object_type).or_insert(0) += count;
    }

    pub fn total_differences(&self) -> usize {
        self.missing + self.extra + self.modified
    }
}

/// The structured record of one comparison run
///
/// Created at scan start, mutated only through `add_difference` while
/// RUNNING, then frozen by `finish` or `fail`. A finalized result is
/// immutable and safe to share across threads.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaComparisonResult {
    pub id: Uuid,
    pub source_instance: String,
    pub destination_instance: String,
    pub source_schema: String,
    pub destination_schema: String,
    pub compared_at: DateTime<Utc>,
    pub summary: ComparisonSummary,
    pub differences: Vec<ObjectDifference>,
    pub filter: Option<ComparisonFilter>,
    pub performed_by: Option<String>,
    pub duration_millis: Option<u64>,
    pub error_message: Option<String>,
    /// Non-fatal notes: skipped objects, dependency cycles
    pub warnings: Vec<String>,
    pub state: RunState,
}

impl SchemaComparisonResult {
    pub fn new(
        source_instance: &str,
        destination_instance: &str,
        source_schema: &str,
        destination_schema: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_instance: source_instance.to_string(),
            destination_instance: destination_instance.to_string(),
            source_schema: source_schema.to_string(),
            destination_schema: destination_schema.to_string(),
            compared_at: Utc::now(),
            summary: ComparisonSummary::new(),
            differences: Vec::new(),
            filter: None,
            performed_by: None,
            duration_millis: None,
            error_message: None,
            warnings: Vec::new(),
            state: RunState::Running,
        }
    }

    /// Append one difference and update the summary counters.
    /// Ignored with a log line once the run has been finalized.
    pub fn add_difference(&mut self, diff: ObjectDifference) {
        if self.state != RunState::Running {
            tracing::warn!(
                object = %diff.qualified_name(),
                "difference discarded: result already finalized"
            );
            return;
        }
        self.summary.record(&diff);
        self.differences.push(diff);
    }

    pub fn add_warning(&mut self, warning: String) {
        if self.state == RunState::Running {
            self.warnings.push(warning);
        }
    }

    /// Freeze the run as SUCCEEDED
    pub fn finish(&mut self, duration_millis: u64) {
        self.duration_millis = Some(duration_millis);
        self.state = RunState::Succeeded;
    }

    /// Freeze the run as FAILED, retaining partial differences for
    /// diagnostics. No DDL is guaranteed complete on a failed run.
    pub fn fail(&mut self, duration_millis: u64, error_message: String) {
        self.duration_millis = Some(duration_millis);
        self.error_message = Some(error_message);
        self.state = RunState::Failed;
    }

    pub fn differences_by_severity(&self, severity: Severity) -> Vec<&ObjectDifference> {
        self.differences
            .iter()
            .filter(|d| d.severity == severity)
            .collect()
    }

    pub fn differences_by_object_type(&self, object_type: ObjectType) -> Vec<&ObjectDifference> {
        self.differences
            .iter()
            .filter(|d| d.object_type == object_type)
            .collect()
    }

    pub fn differences_by_diff_type(&self, difference_type: DifferenceType) -> Vec<&ObjectDifference> {
        self.differences
            .iter()
            .filter(|d| d.difference_type == difference_type)
            .collect()
    }

    pub fn is_identical(&self) -> bool {
        self.differences.is_empty() && self.error_message.is_none()
    }

    pub fn has_breaking_changes(&self) -> bool {
        self.differences
            .iter()
            .any(|d| d.severity == Severity::Breaking)
    }

    /// The full migration script: concatenation of per-difference DDL in
    /// resolver order. Differences the resolver could not order (cycle
    /// members) carry no DDL and are skipped here.
    pub fn migration_script(&self) -> String {
        self.differences
            .iter()
            .filter_map(|d| d.generated_ddl.as_deref())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::definition::ObjectKey;
    use pretty_assertions::assert_eq;

    fn sample_diff(name: &str, difference_type: DifferenceType) -> ObjectDifference {
        let key = ObjectKey::new("public", name, ObjectType::Table);
        match difference_type {
            DifferenceType::Missing => ObjectDifference::missing(&key, "t".into()),
            DifferenceType::Extra => ObjectDifference::extra(&key, "t".into()),
            DifferenceType::Modified => {
                ObjectDifference::modified(&key, "a".into(), "b".into(), Vec::new())
            }
        }
    }

    #[test]
    fn summary_tracks_every_added_difference() {
        let mut result = SchemaComparisonResult::new("src", "dst", "public", "public");
        result.add_difference(sample_diff("a", DifferenceType::Missing));
        result.add_difference(sample_diff("b", DifferenceType::Extra));
        result.add_difference(sample_diff("c", DifferenceType::Modified));
        result.add_difference(sample_diff("d", DifferenceType::Missing));

        assert_eq!(result.summary.total_differences(), result.differences.len());
        assert_eq!(result.summary.missing, 2);
        assert_eq!(result.summary.extra, 1);
        assert_eq!(result.summary.modified, 1);
    }

    #[test]
    fn finalized_result_rejects_mutation() {
        let mut result = SchemaComparisonResult::new("src", "dst", "public", "public");
        result.add_difference(sample_diff("a", DifferenceType::Missing));
        result.finish(12);

        result.add_difference(sample_diff("b", DifferenceType::Extra));
        assert_eq!(result.differences.len(), 1);
        assert_eq!(result.summary.total_differences(), 1);
        assert_eq!(result.state, RunState::Succeeded);
    }

    #[test]
    fn empty_run_is_identical() {
        let mut result = SchemaComparisonResult::new("src", "dst", "public", "public");
        result.finish(3);
        assert!(result.is_identical());
        assert!(!result.has_breaking_changes());
        assert_eq!(result.summary.total_differences(), 0);
    }

    #[test]
    fn failed_run_keeps_partial_differences() {
        let mut result = SchemaComparisonResult::new("src", "dst", "public", "public");
        result.add_difference(sample_diff("a", DifferenceType::Missing));
        result.fail(7, "source snapshot failed".to_string());

        assert_eq!(result.state, RunState::Failed);
        assert_eq!(result.differences.len(), 1);
        assert!(!result.is_identical());
    }
}

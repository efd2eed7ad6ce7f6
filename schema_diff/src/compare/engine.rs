//! The comparison engine
//!
//! One run is sequential by contract: categories are scanned in the fixed
//! `SCAN_ORDER`, every difference flows through the classifier and into the
//! result's write-through summary, and once scanning completes the resolver
//! orders the set and the generator renders per-difference DDL.

use std::time::{Duration, Instant};

use crate::classify::DifferenceClassifier;
use crate::compare::comparator_for;
use crate::ddl::DdlGenerator;
use crate::filter::ComparisonFilter;
use crate::model::definition::{ObjectDefinition, ObjectKey, SchemaSnapshot};
use crate::model::result::SchemaComparisonResult;
use crate::model::types::{ObjectType, SCAN_ORDER};
use crate::resolve::DependencyResolver;

/// Drives one comparison run from two snapshots to a finalized result
pub struct ComparisonEngine {
    filter: ComparisonFilter,
    classifier: DifferenceClassifier,
    performed_by: Option<String>,
    deadline: Option<Duration>,
}

impl ComparisonEngine {
    pub fn new(filter: ComparisonFilter) -> Self {
        Self {
            filter,
            classifier: DifferenceClassifier::new(),
            performed_by: None,
            deadline: None,
        }
    }

    pub fn performed_by(mut self, user: &str) -> Self {
        self.performed_by = Some(user.to_string());
        self
    }

    /// Bound the scan; schemas with many thousands of objects can exceed it
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Compare two snapshots and produce a finalized result.
    /// Never panics and never returns early without finalizing the run.
    pub fn run(
        &self,
        source: &SchemaSnapshot,
        destination: &SchemaSnapshot,
    ) -> SchemaComparisonResult {
        let started = Instant::now();
        let mut result = SchemaComparisonResult::new(
            &source.instance,
            &destination.instance,
            &source.schema_name,
            &destination.schema_name,
        );
        result.filter = Some(self.filter.clone());
        result.performed_by = self.performed_by.clone();

        for pattern in self.filter.validate() {
            tracing::warn!(pattern = %pattern, "invalid filter pattern ignored (fail-open)");
            result.add_warning(format!(
                "filter pattern '{}' does not compile and was ignored",
                pattern
            ));
        }

        tracing::info!(
            source = %source.instance,
            destination = %destination.instance,
            schema = %source.schema_name,
            "starting schema comparison"
        );

        for object_type in SCAN_ORDER {
            if !self.filter.matches_object_type(object_type) {
                continue;
            }
            if let Some(deadline) = self.deadline {
                if started.elapsed() > deadline {
                    let millis = deadline.as_millis() as u64;
                    result.fail(
                        started.elapsed().as_millis() as u64,
                        format!("comparison deadline of {}ms exceeded", millis),
                    );
                    return result;
                }
            }
            self.scan_category(object_type, source, destination, &mut result);
        }

        self.order_and_render(source, destination, &mut result);

        result.finish(started.elapsed().as_millis() as u64);
        tracing::info!(
            differences = result.summary.total_differences(),
            duration_ms = result.duration_millis,
            "schema comparison finished"
        );
        result
    }

    /// Compare every candidate object of one category
    fn scan_category(
        &self,
        object_type: ObjectType,
        source: &SchemaSnapshot,
        destination: &SchemaSnapshot,
        result: &mut SchemaComparisonResult,
    ) {
        let mut keys: Vec<&ObjectKey> = source.keys_of_type(object_type);
        for key in destination.keys_of_type(object_type) {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }

        let comparator = comparator_for(object_type);
        let mut scanned = 0usize;

        for key in keys {
            let src_def = source.get(key);
            let dst_def = destination.get(key);

            let Some(table) = self.gate_key(key, src_def.or(dst_def), result) else {
                continue;
            };
            if !self.filter.matches_table(&key.schema, &table) {
                continue;
            }
            if object_type == ObjectType::Column
                && self.parent_table_is_one_sided(key, src_def.or(dst_def), source, destination)
            {
                // The table-level difference already covers its columns
                continue;
            }

            scanned += 1;
            if let Some(mut diff) = comparator.compare(key, src_def, dst_def) {
                diff.severity = self.classifier.classify(&diff);
                tracing::debug!(
                    object = %key,
                    difference = %diff.difference_type,
                    severity = %diff.severity,
                    "difference detected"
                );
                result.add_difference(diff);
            }
        }

        result.summary.record_scanned(object_type, scanned);
    }

    /// Definition-shape gate: returns the name the table filter applies to,
    /// or `None` when the object must be skipped with a note
    fn gate_key(
        &self,
        key: &ObjectKey,
        definition: Option<&ObjectDefinition>,
        result: &mut SchemaComparisonResult,
    ) -> Option<String> {
        let Some(def) = definition else {
            return None;
        };
        if !def.matches_type(key.object_type) {
            tracing::info!(object = %key, "skipping object with mismatched definition shape");
            result.add_warning(format!(
                "skipped {}: definition shape does not match its object type",
                key
            ));
            return None;
        }
        let table = match def {
            ObjectDefinition::Column(c) => c.table.clone(),
            ObjectDefinition::Index(i) => i.table.clone(),
            ObjectDefinition::Constraint(c) => c.table.clone(),
            ObjectDefinition::Trigger(t) => t.table.clone(),
            _ => key.name.clone(),
        };
        Some(table)
    }

    /// Whether the owning table of a standalone column object exists on only
    /// one side
    fn parent_table_is_one_sided(
        &self,
        key: &ObjectKey,
        definition: Option<&ObjectDefinition>,
        source: &SchemaSnapshot,
        destination: &SchemaSnapshot,
    ) -> bool {
        let Some(ObjectDefinition::Column(col)) = definition else {
            return false;
        };
        let table_key = ObjectKey::new(&key.schema, &col.table, ObjectType::Table);
        source.contains(&table_key) != destination.contains(&table_key)
    }

    /// Resolve dependency order, render per-difference DDL and put the
    /// difference list into script order. Cycles degrade to partial output.
    fn order_and_render(
        &self,
        source: &SchemaSnapshot,
        destination: &SchemaSnapshot,
        result: &mut SchemaComparisonResult,
    ) {
        if result.differences.is_empty() {
            return;
        }

        let resolver = DependencyResolver::new(&result.differences);
        let resolution = resolver.resolve(&result.differences);

        if !resolution.cycle_members.is_empty() {
            let path = resolver.cycle_path(&resolution.cycle_members[0]);
            tracing::warn!(cycle = %path, "dependency cycle; DDL skipped for its members");
            result.add_warning(format!(
                "dependency cycle among [{}]; DDL generation skipped for these objects ({})",
                resolution.cycle_members.join(", "),
                path
            ));
        }

        let generator = DdlGenerator::new(source, destination);
        for &index in &resolution.script_order {
            match generator.generate(&result.differences[index]) {
                Ok(sql) => result.differences[index].generated_ddl = Some(sql),
                Err(e) => {
                    tracing::warn!(
                        object = %result.differences[index].qualified_name(),
                        error = %e,
                        "DDL generation failed"
                    );
                    result.add_warning(format!(
                        "DDL generation failed for {}: {}",
                        result.differences[index].qualified_name(),
                        e
                    ));
                }
            }
        }

        // Reorder the difference list so the script is the straight
        // concatenation of generated DDL; unordered cycle members keep their
        // relative order at the end
        let mut order = resolution.script_order.clone();
        for index in 0..result.differences.len() {
            if !order.contains(&index) {
                order.push(index);
            }
        }
        let mut reordered = Vec::with_capacity(result.differences.len());
        for index in order {
            reordered.push(result.differences[index].clone());
        }
        result.differences = reordered;
    }
}

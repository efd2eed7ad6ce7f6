//! View and materialized view comparator
//!
//! Views are definitional: when the normalized body differs the record
//! carries the single `definition` attribute, marked breaking because the
//! view must be dropped and recreated and its dependents follow it.

use crate::compare::normalize::normalized_eq;
use crate::compare::{qualify, ObjectComparator};
use crate::model::definition::{ObjectDefinition, ObjectKey};
use crate::model::difference::{AttributeDifference, ObjectDifference};

pub struct ViewComparator;

impl ObjectComparator for ViewComparator {
    fn compare_both(
        &self,
        key: &ObjectKey,
        source: &ObjectDefinition,
        destination: &ObjectDefinition,
    ) -> Option<ObjectDifference> {
        let (ObjectDefinition::View(src), ObjectDefinition::View(dst)) = (source, destination)
        else {
            return None;
        };

        if normalized_eq(&src.definition, &dst.definition) {
            return None;
        }

        let attrs = vec![
            AttributeDifference::modified("definition", &src.definition, &dst.definition)
                .breaking(true)
                .describe("view body differs; requires drop and recreate"),
        ];
        Some(ObjectDifference::modified(
            key,
            source.describe(),
            destination.describe(),
            attrs,
        ))
    }

    fn attach_dependencies(
        &self,
        key: &ObjectKey,
        definition: &ObjectDefinition,
        diff: &mut ObjectDifference,
    ) {
        if let ObjectDefinition::View(view) = definition {
            for relation in &view.depends_on {
                diff.dependencies.push(qualify(&key.schema, relation));
            }
        }
    }
}

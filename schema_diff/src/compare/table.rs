//! Table comparator
//!
//! Table-level comparison covers presence and table-scoped attributes only.
//! Column differences are detected by the column comparator over the
//! standalone column objects the snapshot carries.

use crate::compare::ObjectComparator;
use crate::model::definition::{ObjectDefinition, ObjectKey};
use crate::model::difference::{AttributeDifference, ObjectDifference};

pub struct TableComparator;

impl ObjectComparator for TableComparator {
    fn compare_both(
        &self,
        key: &ObjectKey,
        source: &ObjectDefinition,
        destination: &ObjectDefinition,
    ) -> Option<ObjectDifference> {
        let (ObjectDefinition::Table(src), ObjectDefinition::Table(dst)) = (source, destination)
        else {
            return None;
        };

        let mut attrs = Vec::new();
        match (&src.comment, &dst.comment) {
            (Some(s), Some(d)) if s != d => {
                attrs.push(AttributeDifference::modified("comment", s, d));
            }
            (Some(s), None) => attrs.push(AttributeDifference::removed("comment", s)),
            (None, Some(d)) => attrs.push(AttributeDifference::added("comment", d)),
            _ => {}
        }

        if attrs.is_empty() {
            return None;
        }
        Some(ObjectDifference::modified(
            key,
            source.describe(),
            destination.describe(),
            attrs,
        ))
    }
}

//! Constraint comparator, shared by the four constraint kinds
//!
//! Which attributes are meaningful depends on the object type: primary and
//! unique constraints compare column lists, foreign keys add the referenced
//! table/columns and actions, check constraints compare their normalized
//! clause.

use crate::compare::normalize::normalize;
use crate::compare::{qualify, ObjectComparator};
use crate::model::definition::{ObjectDefinition, ObjectKey};
use crate::model::difference::{AttributeDifference, ObjectDifference};

pub struct ConstraintComparator;

impl ObjectComparator for ConstraintComparator {
    fn compare_both(
        &self,
        key: &ObjectKey,
        source: &ObjectDefinition,
        destination: &ObjectDefinition,
    ) -> Option<ObjectDifference> {
        let (ObjectDefinition::Constraint(src), ObjectDefinition::Constraint(dst)) =
            (source, destination)
        else {
            return None;
        };

        let mut attrs = Vec::new();

        if src.columns != dst.columns {
            attrs.push(AttributeDifference::modified(
                "columns",
                &src.columns.join(", "),
                &dst.columns.join(", "),
            ));
        }

        match (&src.ref_table, &dst.ref_table) {
            (Some(s), Some(d)) if s != d => {
                attrs.push(AttributeDifference::modified("referenced_table", s, d));
            }
            (Some(s), None) => attrs.push(AttributeDifference::removed("referenced_table", s)),
            (None, Some(d)) => attrs.push(AttributeDifference::added("referenced_table", d)),
            _ => {}
        }

        if src.ref_columns != dst.ref_columns {
            attrs.push(AttributeDifference::modified(
                "referenced_columns",
                &src.ref_columns.join(", "),
                &dst.ref_columns.join(", "),
            ));
        }

        match (&src.check_clause, &dst.check_clause) {
            (Some(s), Some(d)) if normalize(s) != normalize(d) => {
                attrs.push(AttributeDifference::modified("check_clause", s, d));
            }
            (Some(s), None) => attrs.push(AttributeDifference::removed("check_clause", s)),
            (None, Some(d)) => attrs.push(AttributeDifference::added("check_clause", d)),
            _ => {}
        }

        let src_delete = src.on_delete.as_deref().unwrap_or("NO ACTION");
        let dst_delete = dst.on_delete.as_deref().unwrap_or("NO ACTION");
        if src_delete != dst_delete {
            attrs.push(AttributeDifference::modified("on_delete", src_delete, dst_delete));
        }

        let src_update = src.on_update.as_deref().unwrap_or("NO ACTION");
        let dst_update = dst.on_update.as_deref().unwrap_or("NO ACTION");
        if src_update != dst_update {
            attrs.push(AttributeDifference::modified("on_update", src_update, dst_update));
        }

        if src.deferrable != dst.deferrable {
            attrs.push(AttributeDifference::modified(
                "deferrable",
                &src.deferrable.to_string(),
                &dst.deferrable.to_string(),
            ));
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

    fn attach_dependencies(
        &self,
        key: &ObjectKey,
        definition: &ObjectDefinition,
        diff: &mut ObjectDifference,
    ) {
        if let ObjectDefinition::Constraint(c) = definition {
            diff.parent_object_name = Some(qualify(&key.schema, &c.table));
            if let Some(ref_table) = &c.ref_table {
                let qualified = qualify(&key.schema, ref_table);
                // A self-referencing foreign key needs no extra edge
                if Some(&qualified) != diff.parent_object_name.as_ref() {
                    diff.dependencies.push(qualified);
                }
            }
        }
    }
}

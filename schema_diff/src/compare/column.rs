//! Column comparator
//!
//! Attribute-level comparison of one column present on both sides: data
//! type, nullability, default, collation and generation expression. A change
//! of base type cannot be reconciled by a plain ALTER and is flagged
//! breaking; size or precision changes within the same base type are not.

use crate::compare::normalize::{base_type, normalize};
use crate::compare::{qualify, ObjectComparator};
use crate::model::definition::{ObjectDefinition, ObjectKey};
use crate::model::difference::{AttributeDifference, ObjectDifference};

pub struct ColumnComparator;

impl ObjectComparator for ColumnComparator {
    fn compare_both(
        &self,
        key: &ObjectKey,
        source: &ObjectDefinition,
        destination: &ObjectDefinition,
    ) -> Option<ObjectDifference> {
        let (ObjectDefinition::Column(src), ObjectDefinition::Column(dst)) = (source, destination)
        else {
            return None;
        };

        let mut attrs = Vec::new();

        if normalize(&src.data_type) != normalize(&dst.data_type) {
            let breaking = base_type(&src.data_type) != base_type(&dst.data_type);
            let mut attr =
                AttributeDifference::modified("data_type", &src.data_type, &dst.data_type)
                    .breaking(breaking);
            if breaking {
                attr = attr.describe("base type change requires a rewrite of existing values");
            }
            attrs.push(attr);
        }

        if src.nullable != dst.nullable {
            attrs.push(AttributeDifference::modified(
                "nullable",
                &src.nullable.to_string(),
                &dst.nullable.to_string(),
            ));
        }

        match (&src.default, &dst.default) {
            (Some(s), Some(d)) if normalize(s) != normalize(d) => {
                attrs.push(AttributeDifference::modified("default", s, d));
            }
            (Some(s), None) => attrs.push(AttributeDifference::removed("default", s)),
            (None, Some(d)) => attrs.push(AttributeDifference::added("default", d)),
            _ => {}
        }

        match (&src.collation, &dst.collation) {
            (Some(s), Some(d)) if s != d => {
                attrs.push(AttributeDifference::modified("collation", s, d));
            }
            (Some(s), None) => attrs.push(AttributeDifference::removed("collation", s)),
            (None, Some(d)) => attrs.push(AttributeDifference::added("collation", d)),
            _ => {}
        }

        if src.is_generated != dst.is_generated
            || src.generation_expression != dst.generation_expression
        {
            attrs.push(
                AttributeDifference::modified(
                    "generation_expression",
                    src.generation_expression.as_deref().unwrap_or("none"),
                    dst.generation_expression.as_deref().unwrap_or("none"),
                )
                .breaking(true)
                .describe("generated columns must be dropped and recreated"),
            );
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
        if let ObjectDefinition::Column(col) = definition {
            diff.parent_object_name = Some(qualify(&key.schema, &col.table));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::definition::ColumnDef;
    use crate::model::types::ObjectType;
    use pretty_assertions::assert_eq;

    fn key() -> ObjectKey {
        ObjectKey::new("public", "orders.status", ObjectType::Column)
    }

    #[test]
    fn widened_varchar_is_a_single_non_breaking_attribute() {
        let src = ObjectDefinition::Column(
            ColumnDef::new("orders", "status", "varchar(20)").nullable(false),
        );
        let dst = ObjectDefinition::Column(
            ColumnDef::new("orders", "status", "varchar(50)").nullable(false),
        );

        let diff = ColumnComparator.compare(&key(), Some(&src), Some(&dst)).unwrap();
        assert_eq!(diff.attribute_differences.len(), 1);
        let attr = &diff.attribute_differences[0];
        assert_eq!(attr.attribute_name, "data_type");
        assert_eq!(attr.source_value.as_deref(), Some("varchar(20)"));
        assert_eq!(attr.destination_value.as_deref(), Some("varchar(50)"));
        assert!(!attr.breaking);
    }

    #[test]
    fn base_type_change_is_breaking() {
        let src = ObjectDefinition::Column(ColumnDef::new("orders", "status", "integer"));
        let dst = ObjectDefinition::Column(ColumnDef::new("orders", "status", "text"));

        let diff = ColumnComparator.compare(&key(), Some(&src), Some(&dst)).unwrap();
        assert!(diff.attribute_differences[0].breaking);
    }

    #[test]
    fn identical_columns_produce_nothing() {
        let src = ObjectDefinition::Column(
            ColumnDef::new("orders", "status", "varchar(20)").default_value("'new'"),
        );
        let dst = src.clone();
        assert!(ColumnComparator.compare(&key(), Some(&src), Some(&dst)).is_none());
    }

    #[test]
    fn parent_is_the_owning_table() {
        let src = ObjectDefinition::Column(ColumnDef::new("orders", "status", "text"));
        let diff = ColumnComparator.compare(&key(), Some(&src), None).unwrap();
        assert_eq!(diff.parent_object_name.as_deref(), Some("public.orders"));
    }
}

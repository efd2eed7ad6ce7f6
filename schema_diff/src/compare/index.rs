//! Index comparator

use crate::compare::normalize::normalize;
use crate::compare::{qualify, ObjectComparator};
use crate::model::definition::{ObjectDefinition, ObjectKey};
use crate::model::difference::{AttributeDifference, ObjectDifference};

pub struct IndexComparator;

impl ObjectComparator for IndexComparator {
    fn compare_both(
        &self,
        key: &ObjectKey,
        source: &ObjectDefinition,
        destination: &ObjectDefinition,
    ) -> Option<ObjectDifference> {
        let (ObjectDefinition::Index(src), ObjectDefinition::Index(dst)) = (source, destination)
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

        if src.is_unique != dst.is_unique {
            attrs.push(AttributeDifference::modified(
                "unique",
                &src.is_unique.to_string(),
                &dst.is_unique.to_string(),
            ));
        }

        let src_method = src.method.as_deref().unwrap_or("btree");
        let dst_method = dst.method.as_deref().unwrap_or("btree");
        if src_method != dst_method {
            attrs.push(AttributeDifference::modified("method", src_method, dst_method));
        }

        match (&src.predicate, &dst.predicate) {
            (Some(s), Some(d)) if normalize(s) != normalize(d) => {
                attrs.push(AttributeDifference::modified("predicate", s, d));
            }
            (Some(s), None) => attrs.push(AttributeDifference::removed("predicate", s)),
            (None, Some(d)) => attrs.push(AttributeDifference::added("predicate", d)),
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

    fn attach_dependencies(
        &self,
        key: &ObjectKey,
        definition: &ObjectDefinition,
        diff: &mut ObjectDifference,
    ) {
        if let ObjectDefinition::Index(idx) = definition {
            diff.parent_object_name = Some(qualify(&key.schema, &idx.table));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::definition::IndexDef;
    use crate::model::types::ObjectType;

    #[test]
    fn column_list_change_is_detected() {
        let key = ObjectKey::new("public", "ix_orders_status", ObjectType::Index);
        let src = ObjectDefinition::Index(IndexDef::new(
            "orders",
            "ix_orders_status",
            vec!["status".into()],
        ));
        let dst = ObjectDefinition::Index(IndexDef::new(
            "orders",
            "ix_orders_status",
            vec!["status".into(), "created_at".into()],
        ));

        let diff = IndexComparator.compare(&key, Some(&src), Some(&dst)).unwrap();
        assert_eq!(diff.attribute_differences.len(), 1);
        assert_eq!(diff.attribute_differences[0].attribute_name, "columns");
        assert_eq!(diff.parent_object_name.as_deref(), Some("public.orders"));
    }

    #[test]
    fn default_btree_method_compares_equal_to_explicit() {
        let key = ObjectKey::new("public", "ix_orders_status", ObjectType::Index);
        let mut explicit = IndexDef::new("orders", "ix_orders_status", vec!["status".into()]);
        explicit.method = Some("btree".into());
        let implied = IndexDef::new("orders", "ix_orders_status", vec!["status".into()]);

        let diff = IndexComparator.compare(
            &key,
            Some(&ObjectDefinition::Index(explicit)),
            Some(&ObjectDefinition::Index(implied)),
        );
        assert!(diff.is_none());
    }
}

//! Sequence comparator

use crate::compare::{qualify, ObjectComparator};
use crate::model::definition::{ObjectDefinition, ObjectKey};
use crate::model::difference::{AttributeDifference, ObjectDifference};

pub struct SequenceComparator;

impl ObjectComparator for SequenceComparator {
    fn compare_both(
        &self,
        key: &ObjectKey,
        source: &ObjectDefinition,
        destination: &ObjectDefinition,
    ) -> Option<ObjectDifference> {
        let (ObjectDefinition::Sequence(src), ObjectDefinition::Sequence(dst)) =
            (source, destination)
        else {
            return None;
        };

        let mut attrs = Vec::new();

        if !src.data_type.eq_ignore_ascii_case(&dst.data_type) {
            attrs.push(AttributeDifference::modified(
                "data_type",
                &src.data_type,
                &dst.data_type,
            ));
        }

        if src.start_value != dst.start_value {
            attrs.push(AttributeDifference::modified(
                "start_value",
                &src.start_value.to_string(),
                &dst.start_value.to_string(),
            ));
        }

        if src.increment != dst.increment {
            attrs.push(AttributeDifference::modified(
                "increment",
                &src.increment.to_string(),
                &dst.increment.to_string(),
            ));
        }

        if src.min_value != dst.min_value {
            attrs.push(AttributeDifference::modified(
                "min_value",
                &option_i64(src.min_value),
                &option_i64(dst.min_value),
            ));
        }

        if src.max_value != dst.max_value {
            attrs.push(AttributeDifference::modified(
                "max_value",
                &option_i64(src.max_value),
                &option_i64(dst.max_value),
            ));
        }

        if src.cycle != dst.cycle {
            attrs.push(AttributeDifference::modified(
                "cycle",
                &src.cycle.to_string(),
                &dst.cycle.to_string(),
            ));
        }

        match (&src.owned_by, &dst.owned_by) {
            (Some(s), Some(d)) if s != d => {
                attrs.push(AttributeDifference::modified("owned_by", s, d));
            }
            (Some(s), None) => attrs.push(AttributeDifference::removed("owned_by", s)),
            (None, Some(d)) => attrs.push(AttributeDifference::added("owned_by", d)),
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
        if let ObjectDefinition::Sequence(seq) = definition {
            // owned_by is `table.column`; the owning table is the parent
            if let Some(owned_by) = &seq.owned_by {
                if let Some(table) = owned_by.split('.').next() {
                    diff.parent_object_name = Some(qualify(&key.schema, table));
                }
            }
        }
    }
}

fn option_i64(value: Option<i64>) -> String {
    value.map_or_else(|| "none".to_string(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::definition::SequenceDef;
    use crate::model::types::ObjectType;
    use pretty_assertions::assert_eq;

    #[test]
    fn increment_change_is_detected() {
        let key = ObjectKey::new("public", "orders_id_seq", ObjectType::Sequence);
        let src = ObjectDefinition::Sequence(SequenceDef::new("orders_id_seq"));
        let mut changed = SequenceDef::new("orders_id_seq");
        changed.increment = 10;
        let dst = ObjectDefinition::Sequence(changed);

        let diff = SequenceComparator.compare(&key, Some(&src), Some(&dst)).unwrap();
        assert_eq!(diff.attribute_differences.len(), 1);
        assert_eq!(diff.attribute_differences[0].attribute_name, "increment");
    }

    #[test]
    fn owning_table_becomes_parent() {
        let key = ObjectKey::new("public", "orders_id_seq", ObjectType::Sequence);
        let mut def = SequenceDef::new("orders_id_seq");
        def.owned_by = Some("orders.id".to_string());

        let diff = SequenceComparator
            .compare(&key, Some(&ObjectDefinition::Sequence(def)), None)
            .unwrap();
        assert_eq!(diff.parent_object_name.as_deref(), Some("public.orders"));
    }
}

//! Trigger comparator

use crate::compare::normalize::normalize;
use crate::compare::{qualify, ObjectComparator};
use crate::model::definition::{ObjectDefinition, ObjectKey};
use crate::model::difference::{AttributeDifference, ObjectDifference};

pub struct TriggerComparator;

impl ObjectComparator for TriggerComparator {
    fn compare_both(
        &self,
        key: &ObjectKey,
        source: &ObjectDefinition,
        destination: &ObjectDefinition,
    ) -> Option<ObjectDifference> {
        let (ObjectDefinition::Trigger(src), ObjectDefinition::Trigger(dst)) =
            (source, destination)
        else {
            return None;
        };

        let mut attrs = Vec::new();

        if !src.timing.eq_ignore_ascii_case(&dst.timing) {
            attrs.push(AttributeDifference::modified("timing", &src.timing, &dst.timing));
        }

        let src_events = src.events.join(" OR ");
        let dst_events = dst.events.join(" OR ");
        if !src_events.eq_ignore_ascii_case(&dst_events) {
            attrs.push(AttributeDifference::modified("events", &src_events, &dst_events));
        }

        if !src.orientation.eq_ignore_ascii_case(&dst.orientation) {
            attrs.push(AttributeDifference::modified(
                "orientation",
                &src.orientation,
                &dst.orientation,
            ));
        }

        if src.function != dst.function {
            attrs.push(AttributeDifference::modified("function", &src.function, &dst.function));
        }

        match (&src.condition, &dst.condition) {
            (Some(s), Some(d)) if normalize(s) != normalize(d) => {
                attrs.push(AttributeDifference::modified("condition", s, d));
            }
            (Some(s), None) => attrs.push(AttributeDifference::removed("condition", s)),
            (None, Some(d)) => attrs.push(AttributeDifference::added("condition", d)),
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
        if let ObjectDefinition::Trigger(trg) = definition {
            diff.parent_object_name = Some(qualify(&key.schema, &trg.table));
            diff.dependencies.push(qualify(&key.schema, &trg.function));
        }
    }
}

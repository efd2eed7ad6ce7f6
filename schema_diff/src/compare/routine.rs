//! Function and procedure comparator
//!
//! Signature changes (arguments, return type, language) are breaking: the
//! routine must be dropped and recreated and callers may stop resolving.
//! A body-only change is the definitional case and carries the single
//! breaking `definition` attribute.

use crate::compare::normalize::{normalize, normalized_eq};
use crate::compare::ObjectComparator;
use crate::model::definition::{ObjectDefinition, ObjectKey};
use crate::model::difference::{AttributeDifference, ObjectDifference};

pub struct RoutineComparator;

impl ObjectComparator for RoutineComparator {
    fn compare_both(
        &self,
        key: &ObjectKey,
        source: &ObjectDefinition,
        destination: &ObjectDefinition,
    ) -> Option<ObjectDifference> {
        let (ObjectDefinition::Routine(src), ObjectDefinition::Routine(dst)) =
            (source, destination)
        else {
            return None;
        };

        let mut attrs = Vec::new();

        if normalize(&src.arguments) != normalize(&dst.arguments) {
            attrs.push(
                AttributeDifference::modified("arguments", &src.arguments, &dst.arguments)
                    .breaking(true)
                    .describe("signature change requires drop and recreate"),
            );
        }

        let src_returns = src.returns.as_deref().unwrap_or("");
        let dst_returns = dst.returns.as_deref().unwrap_or("");
        if normalize(src_returns) != normalize(dst_returns) {
            attrs.push(
                AttributeDifference::modified("returns", src_returns, dst_returns).breaking(true),
            );
        }

        if !src.language.eq_ignore_ascii_case(&dst.language) {
            attrs.push(
                AttributeDifference::modified("language", &src.language, &dst.language)
                    .breaking(true),
            );
        }

        if attrs.is_empty() && !normalized_eq(&src.body, &dst.body) {
            attrs.push(
                AttributeDifference::modified("definition", &src.body, &dst.body)
                    .breaking(true)
                    .describe("routine body differs"),
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
}

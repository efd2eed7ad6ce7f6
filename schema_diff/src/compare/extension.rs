//! Extension comparator

use crate::compare::ObjectComparator;
use crate::model::definition::{ObjectDefinition, ObjectKey};
use crate::model::difference::{AttributeDifference, ObjectDifference};

pub struct ExtensionComparator;

impl ObjectComparator for ExtensionComparator {
    fn compare_both(
        &self,
        key: &ObjectKey,
        source: &ObjectDefinition,
        destination: &ObjectDefinition,
    ) -> Option<ObjectDifference> {
        let (ObjectDefinition::Extension(src), ObjectDefinition::Extension(dst)) =
            (source, destination)
        else {
            return None;
        };

        let mut attrs = Vec::new();

        if src.version != dst.version {
            attrs.push(AttributeDifference::modified("version", &src.version, &dst.version));
        }

        if src.schema != dst.schema {
            attrs.push(AttributeDifference::modified("schema", &src.schema, &dst.schema));
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::definition::ExtensionDef;
    use crate::model::types::ObjectType;
    use pretty_assertions::assert_eq;

    #[test]
    fn version_drift_is_detected() {
        let key = ObjectKey::new("public", "pgcrypto", ObjectType::Extension);
        let src = ObjectDefinition::Extension(ExtensionDef::new("pgcrypto", "1.3", "public"));
        let dst = ObjectDefinition::Extension(ExtensionDef::new("pgcrypto", "1.2", "public"));

        let diff = ExtensionComparator.compare(&key, Some(&src), Some(&dst)).unwrap();
        assert_eq!(diff.attribute_differences.len(), 1);
        assert_eq!(diff.attribute_differences[0].attribute_name, "version");
    }
}

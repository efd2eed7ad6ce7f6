//! User-defined type comparator: enums, composites and domains
//!
//! Enum labels can only be added in place; a label present in the
//! destination but not the source forces a drop-and-recreate and is
//! breaking. Composite attribute changes always recreate the type.

use std::collections::HashSet;

use crate::compare::normalize::normalize;
use crate::compare::ObjectComparator;
use crate::model::definition::{ObjectDefinition, ObjectKey, UserTypeDef};
use crate::model::difference::{AttributeDifference, ObjectDifference};

pub struct UserTypeComparator;

impl ObjectComparator for UserTypeComparator {
    fn compare_both(
        &self,
        key: &ObjectKey,
        source: &ObjectDefinition,
        destination: &ObjectDefinition,
    ) -> Option<ObjectDifference> {
        let (ObjectDefinition::UserType(src), ObjectDefinition::UserType(dst)) =
            (source, destination)
        else {
            return None;
        };

        let mut attrs = Vec::new();
        compare_enum_labels(src, dst, &mut attrs);
        compare_composite_attrs(src, dst, &mut attrs);
        compare_domain(src, dst, &mut attrs);

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

fn compare_enum_labels(src: &UserTypeDef, dst: &UserTypeDef, attrs: &mut Vec<AttributeDifference>) {
    if src.enum_labels == dst.enum_labels {
        return;
    }
    if src.enum_labels.is_empty() && dst.enum_labels.is_empty() {
        return;
    }

    let src_set: HashSet<&String> = src.enum_labels.iter().collect();
    let dst_has_removed = dst.enum_labels.iter().any(|l| !src_set.contains(l));

    let mut attr = AttributeDifference::modified(
        "labels",
        &src.enum_labels.join(", "),
        &dst.enum_labels.join(", "),
    );
    if dst_has_removed {
        attr = attr
            .breaking(true)
            .describe("labels cannot be removed from an enum in place");
    }
    attrs.push(attr);
}

fn compare_composite_attrs(
    src: &UserTypeDef,
    dst: &UserTypeDef,
    attrs: &mut Vec<AttributeDifference>,
) {
    if src.attributes == dst.attributes {
        return;
    }
    let render = |def: &UserTypeDef| {
        def.attributes
            .iter()
            .map(|a| format!("{} {}", a.name, a.data_type))
            .collect::<Vec<_>>()
            .join(", ")
    };
    attrs.push(
        AttributeDifference::modified("attributes", &render(src), &render(dst))
            .breaking(true)
            .describe("composite types are recreated on attribute changes"),
    );
}

fn compare_domain(src: &UserTypeDef, dst: &UserTypeDef, attrs: &mut Vec<AttributeDifference>) {
    match (&src.base_type, &dst.base_type) {
        (Some(s), Some(d)) if !s.eq_ignore_ascii_case(d) => {
            attrs.push(
                AttributeDifference::modified("base_type", s, d)
                    .breaking(true)
                    .describe("domain base type cannot be altered in place"),
            );
        }
        _ => {}
    }

    match (&src.domain_constraint, &dst.domain_constraint) {
        (Some(s), Some(d)) if normalize(s) != normalize(d) => {
            attrs.push(AttributeDifference::modified("constraint", s, d));
        }
        (Some(s), None) => attrs.push(AttributeDifference::removed("constraint", s)),
        (None, Some(d)) => attrs.push(AttributeDifference::added("constraint", d)),
        _ => {}
    }

    if src.domain_not_null != dst.domain_not_null {
        attrs.push(AttributeDifference::modified(
            "not_null",
            &src.domain_not_null.to_string(),
            &dst.domain_not_null.to_string(),
        ));
    }

    match (&src.domain_default, &dst.domain_default) {
        (Some(s), Some(d)) if normalize(s) != normalize(d) => {
            attrs.push(AttributeDifference::modified("default", s, d));
        }
        (Some(s), None) => attrs.push(AttributeDifference::removed("default", s)),
        (None, Some(d)) => attrs.push(AttributeDifference::added("default", d)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::ObjectType;
    use pretty_assertions::assert_eq;

    #[test]
    fn appended_enum_label_is_not_breaking() {
        let key = ObjectKey::new("public", "order_status", ObjectType::TypeEnum);
        let src = ObjectDefinition::UserType(UserTypeDef::new_enum(
            "order_status",
            vec!["new".into(), "paid".into(), "shipped".into()],
        ));
        let dst = ObjectDefinition::UserType(UserTypeDef::new_enum(
            "order_status",
            vec!["new".into(), "paid".into()],
        ));

        let diff = UserTypeComparator.compare(&key, Some(&src), Some(&dst)).unwrap();
        assert_eq!(diff.attribute_differences.len(), 1);
        assert!(!diff.attribute_differences[0].breaking);
    }

    #[test]
    fn removed_enum_label_is_breaking() {
        let key = ObjectKey::new("public", "order_status", ObjectType::TypeEnum);
        let src = ObjectDefinition::UserType(UserTypeDef::new_enum(
            "order_status",
            vec!["new".into(), "paid".into()],
        ));
        let dst = ObjectDefinition::UserType(UserTypeDef::new_enum(
            "order_status",
            vec!["new".into(), "paid".into(), "cancelled".into()],
        ));

        let diff = UserTypeComparator.compare(&key, Some(&src), Some(&dst)).unwrap();
        assert!(diff.attribute_differences[0].breaking);
    }

    #[test]
    fn domain_constraint_change_is_plain_attribute() {
        let key = ObjectKey::new("public", "positive_amount", ObjectType::TypeDomain);
        let mut src = UserTypeDef::new_domain("positive_amount", "numeric(10, 2)");
        src.domain_constraint = Some("VALUE > 0".to_string());
        let mut dst = UserTypeDef::new_domain("positive_amount", "numeric(10, 2)");
        dst.domain_constraint = Some("VALUE >= 0".to_string());

        let diff = UserTypeComparator
            .compare(
                &key,
                Some(&ObjectDefinition::UserType(src)),
                Some(&ObjectDefinition::UserType(dst)),
            )
            .unwrap();
        assert_eq!(diff.attribute_differences.len(), 1);
        assert_eq!(diff.attribute_differences[0].attribute_name, "constraint");
        assert!(!diff.attribute_differences[0].breaking);
    }
}

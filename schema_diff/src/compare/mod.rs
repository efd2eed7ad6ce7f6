//! Object comparators: one strategy per object category
//!
//! Comparators are wired through a single lookup table rather than
//! switch-per-type branches scattered across the codebase. Each strategy
//! receives the optional source and destination definitions for one object
//! and produces zero or one difference record.

pub mod column;
pub mod constraint;
pub mod engine;
pub mod extension;
pub mod index;
pub mod normalize;
pub mod routine;
pub mod sequence;
pub mod table;
pub mod trigger;
pub mod usertype;
pub mod view;

pub use engine::ComparisonEngine;

use crate::model::definition::{ObjectDefinition, ObjectKey};
use crate::model::difference::ObjectDifference;
use crate::model::types::ObjectType;

/// Pairwise comparison strategy for one object category
pub trait ObjectComparator: Send + Sync {
    /// Compare the two sides of one object.
    ///
    /// Exactly one side present yields a MISSING or EXTRA record with no
    /// attribute diffing. Both sides present defers to `compare_both`.
    /// Both absent yields nothing.
    fn compare(
        &self,
        key: &ObjectKey,
        source: Option<&ObjectDefinition>,
        destination: Option<&ObjectDefinition>,
    ) -> Option<ObjectDifference> {
        let mut diff = match (source, destination) {
            (None, None) => return None,
            (Some(src), None) => ObjectDifference::missing(key, src.describe()),
            (None, Some(dst)) => ObjectDifference::extra(key, dst.describe()),
            (Some(src), Some(dst)) => self.compare_both(key, src, dst)?,
        };
        if let Some(def) = source.or(destination) {
            self.attach_dependencies(key, def, &mut diff);
        }
        Some(diff)
    }

    /// Attribute-level comparison when the object exists on both sides.
    /// Returns `None` when the normalized definitions are equal.
    fn compare_both(
        &self,
        key: &ObjectKey,
        source: &ObjectDefinition,
        destination: &ObjectDefinition,
    ) -> Option<ObjectDifference>;

    /// Populate `parent_object_name` and `dependencies` from whichever
    /// definition is available, so the resolver can order the record
    fn attach_dependencies(
        &self,
        _key: &ObjectKey,
        _definition: &ObjectDefinition,
        _diff: &mut ObjectDifference,
    ) {
    }
}

static TABLE: table::TableComparator = table::TableComparator;
static COLUMN: column::ColumnComparator = column::ColumnComparator;
static INDEX: index::IndexComparator = index::IndexComparator;
static CONSTRAINT: constraint::ConstraintComparator = constraint::ConstraintComparator;
static VIEW: view::ViewComparator = view::ViewComparator;
static ROUTINE: routine::RoutineComparator = routine::RoutineComparator;
static TRIGGER: trigger::TriggerComparator = trigger::TriggerComparator;
static SEQUENCE: sequence::SequenceComparator = sequence::SequenceComparator;
static USERTYPE: usertype::UserTypeComparator = usertype::UserTypeComparator;
static EXTENSION: extension::ExtensionComparator = extension::ExtensionComparator;

/// The comparator lookup table: every object category maps to its strategy
pub fn comparator_for(object_type: ObjectType) -> &'static dyn ObjectComparator {
    match object_type {
        ObjectType::Table => &TABLE,
        ObjectType::Column => &COLUMN,
        ObjectType::Index => &INDEX,
        ObjectType::ConstraintPrimary
        | ObjectType::ConstraintForeign
        | ObjectType::ConstraintUnique
        | ObjectType::ConstraintCheck => &CONSTRAINT,
        ObjectType::View | ObjectType::MaterializedView => &VIEW,
        ObjectType::Function | ObjectType::Procedure => &ROUTINE,
        ObjectType::Trigger => &TRIGGER,
        ObjectType::Sequence => &SEQUENCE,
        ObjectType::TypeEnum | ObjectType::TypeComposite | ObjectType::TypeDomain => &USERTYPE,
        ObjectType::Extension => &EXTENSION,
    }
}

/// Qualify `name` with `schema` unless it is already qualified
pub(crate) fn qualify(schema: &str, name: &str) -> String {
    if name.contains('.') {
        name.to_string()
    } else {
        format!("{}.{}", schema, name)
    }
}

//! Core enumerations for the comparison data model

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of schema object categories the engine compares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectType {
    Table,
    Column,
    Index,
    ConstraintPrimary,
    ConstraintForeign,
    ConstraintUnique,
    ConstraintCheck,
    View,
    MaterializedView,
    Function,
    Procedure,
    Trigger,
    Sequence,
    TypeEnum,
    TypeComposite,
    TypeDomain,
    Extension,
}

/// Fixed order in which object categories are scanned during a comparison
/// run. Referenced-before-referencing: types and sequences precede tables,
/// tables precede their children, views and routines come after the relations
/// they read from.
pub const SCAN_ORDER: [ObjectType; 17] = [
    ObjectType::Extension,
    ObjectType::TypeEnum,
    ObjectType::TypeComposite,
    ObjectType::TypeDomain,
    ObjectType::Sequence,
    ObjectType::Table,
    ObjectType::Column,
    ObjectType::ConstraintPrimary,
    ObjectType::ConstraintUnique,
    ObjectType::ConstraintForeign,
    ObjectType::ConstraintCheck,
    ObjectType::Index,
    ObjectType::View,
    ObjectType::MaterializedView,
    ObjectType::Function,
    ObjectType::Procedure,
    ObjectType::Trigger,
];

impl ObjectType {
    /// Whether this category is one of the four constraint kinds
    pub fn is_constraint(&self) -> bool {
        matches!(
            self,
            ObjectType::ConstraintPrimary
                | ObjectType::ConstraintForeign
                | ObjectType::ConstraintUnique
                | ObjectType::ConstraintCheck
        )
    }

    /// Whether objects of this category hold row data, so that creating or
    /// dropping one risks a backfill or data loss
    pub fn can_hold_data(&self) -> bool {
        matches!(self, ObjectType::Table | ObjectType::Column)
    }

    /// Whether objects of this category are compared by their whole
    /// definition body rather than structured attributes
    pub fn is_definitional(&self) -> bool {
        matches!(
            self,
            ObjectType::View
                | ObjectType::MaterializedView
                | ObjectType::Function
                | ObjectType::Procedure
        )
    }

    /// The SQL keyword used in DDL statements for this category
    pub fn sql_keyword(&self) -> &'static str {
        match self {
            ObjectType::Table => "TABLE",
            ObjectType::Column => "COLUMN",
            ObjectType::Index => "INDEX",
            ObjectType::ConstraintPrimary
            | ObjectType::ConstraintForeign
            | ObjectType::ConstraintUnique
            | ObjectType::ConstraintCheck => "CONSTRAINT",
            ObjectType::View => "VIEW",
            ObjectType::MaterializedView => "MATERIALIZED VIEW",
            ObjectType::Function => "FUNCTION",
            ObjectType::Procedure => "PROCEDURE",
            ObjectType::Trigger => "TRIGGER",
            ObjectType::Sequence => "SEQUENCE",
            ObjectType::TypeEnum | ObjectType::TypeComposite => "TYPE",
            ObjectType::TypeDomain => "DOMAIN",
            ObjectType::Extension => "EXTENSION",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectType::Table => "table",
            ObjectType::Column => "column",
            ObjectType::Index => "index",
            ObjectType::ConstraintPrimary => "primary key constraint",
            ObjectType::ConstraintForeign => "foreign key constraint",
            ObjectType::ConstraintUnique => "unique constraint",
            ObjectType::ConstraintCheck => "check constraint",
            ObjectType::View => "view",
            ObjectType::MaterializedView => "materialized view",
            ObjectType::Function => "function",
            ObjectType::Procedure => "procedure",
            ObjectType::Trigger => "trigger",
            ObjectType::Sequence => "sequence",
            ObjectType::TypeEnum => "enum type",
            ObjectType::TypeComposite => "composite type",
            ObjectType::TypeDomain => "domain",
            ObjectType::Extension => "extension",
        };
        write!(f, "{}", name)
    }
}

/// How an object differs between the two snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DifferenceType {
    /// Present in the source snapshot only
    Missing,
    /// Present in the destination snapshot only
    Extra,
    /// Present in both snapshots with unequal definitions
    Modified,
}

impl fmt::Display for DifferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DifferenceType::Missing => "missing",
            DifferenceType::Extra => "extra",
            DifferenceType::Modified => "modified",
        };
        write!(f, "{}", name)
    }
}

/// Reconciliation risk classification for a difference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Additive and safe to apply
    Info,
    /// Requires an ALTER and may affect behavior
    Warning,
    /// Requires a DROP or risks data loss; never auto-applied
    Breaking,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Breaking => "breaking",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_order_covers_every_category_once() {
        for (i, a) in SCAN_ORDER.iter().enumerate() {
            for b in SCAN_ORDER.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
        assert_eq!(SCAN_ORDER.len(), 17);
    }

    #[test]
    fn severity_orders_by_risk() {
        assert!(Severity::Breaking > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }

    #[test]
    fn constraint_predicate_matches_the_four_kinds() {
        assert!(ObjectType::ConstraintCheck.is_constraint());
        assert!(ObjectType::ConstraintForeign.is_constraint());
        assert!(!ObjectType::Index.is_constraint());
        assert!(!ObjectType::Table.is_constraint());
    }
}

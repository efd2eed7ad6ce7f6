//! Severity classification policy
//!
//! The whole mapping lives in one rule table so it can be audited and tested
//! in isolation. Rules are evaluated top to bottom; the first match wins and
//! a final catch-all guarantees every difference is classified. An
//! attribute-level breaking flag overrides the table entirely.

use crate::model::difference::ObjectDifference;
use crate::model::types::{DifferenceType, ObjectType, Severity};

/// Which object categories a rule applies to
#[derive(Debug, Clone, Copy)]
enum TypeSelector {
    Any,
    DataHolding,
    Constraint,
    /// One specific category
    Only(ObjectType),
}

impl TypeSelector {
    fn matches(&self, object_type: ObjectType) -> bool {
        match self {
            TypeSelector::Any => true,
            TypeSelector::DataHolding => object_type.can_hold_data(),
            TypeSelector::Constraint => object_type.is_constraint(),
            TypeSelector::Only(t) => *t == object_type,
        }
    }
}

/// One row of the severity policy
struct ClassificationRule {
    difference_type: DifferenceType,
    selector: TypeSelector,
    severity: Severity,
}

/// The severity policy, in evaluation order.
///
/// MISSING objects that can hold data mean a destination backfill or DROP
/// risk; other MISSING objects are behavioral. EXTRA objects are additive,
/// except constraints, which can reject existing rows the moment they are
/// applied. MODIFIED objects default to an ALTER; attribute flags raise them
/// to BREAKING when reconciliation implies drop-and-recreate.
const RULES: &[ClassificationRule] = &[
    ClassificationRule {
        difference_type: DifferenceType::Missing,
        selector: TypeSelector::DataHolding,
        severity: Severity::Breaking,
    },
    ClassificationRule {
        difference_type: DifferenceType::Missing,
        selector: TypeSelector::Any,
        severity: Severity::Warning,
    },
    ClassificationRule {
        difference_type: DifferenceType::Extra,
        selector: TypeSelector::Constraint,
        severity: Severity::Warning,
    },
    ClassificationRule {
        difference_type: DifferenceType::Extra,
        selector: TypeSelector::Any,
        severity: Severity::Info,
    },
    ClassificationRule {
        difference_type: DifferenceType::Modified,
        selector: TypeSelector::Any,
        severity: Severity::Warning,
    },
];

/// Assigns a severity to every difference from the central rule table
#[derive(Debug, Default)]
pub struct DifferenceClassifier;

impl DifferenceClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Severity for a difference record. Any breaking attribute sub-diff
    /// makes the whole difference BREAKING regardless of the table.
    pub fn classify(&self, diff: &ObjectDifference) -> Severity {
        if diff.has_breaking_attribute() {
            return Severity::Breaking;
        }
        self.lookup(diff.difference_type, diff.object_type)
    }

    /// The table entry for a (difference type, object type) pair
    pub fn lookup(&self, difference_type: DifferenceType, object_type: ObjectType) -> Severity {
        RULES
            .iter()
            .find(|rule| {
                rule.difference_type == difference_type && rule.selector.matches(object_type)
            })
            .map(|rule| rule.severity)
            // The Any selectors above make this unreachable; Warning is the
            // conservative fallback if the table is ever edited badly
            .unwrap_or(Severity::Warning)
    }
}

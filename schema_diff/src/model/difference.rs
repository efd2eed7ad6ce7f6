//! Difference records produced by the comparators
//!
//! An `ObjectDifference` is one record per structurally differing object; it
//! owns its attribute-level sub-diffs exclusively.

use serde::{Deserialize, Serialize};

use crate::model::definition::ObjectKey;
use crate::model::types::{DifferenceType, ObjectType, Severity};

/// One differing attribute of an object present in both snapshots
///
/// Immutable once built: construct through `added`, `removed` or `modified`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDifference {
    pub attribute_name: String,
    pub source_value: Option<String>,
    pub destination_value: Option<String>,
    /// Reconciling this attribute implies a DROP or data-loss risk
    pub breaking: bool,
    pub description: Option<String>,
}

impl AttributeDifference {
    /// Attribute present in the destination only
    pub fn added(attribute_name: &str, destination_value: &str) -> Self {
        Self {
            attribute_name: attribute_name.to_string(),
            source_value: None,
            destination_value: Some(destination_value.to_string()),
            breaking: false,
            description: None,
        }
    }

    /// Attribute present in the source only
    pub fn removed(attribute_name: &str, source_value: &str) -> Self {
        Self {
            attribute_name: attribute_name.to_string(),
            source_value: Some(source_value.to_string()),
            destination_value: None,
            breaking: false,
            description: None,
        }
    }

    /// Attribute present on both sides with unequal values
    pub fn modified(attribute_name: &str, source_value: &str, destination_value: &str) -> Self {
        Self {
            attribute_name: attribute_name.to_string(),
            source_value: Some(source_value.to_string()),
            destination_value: Some(destination_value.to_string()),
            breaking: false,
            description: None,
        }
    }

    pub fn breaking(mut self, breaking: bool) -> Self {
        self.breaking = breaking;
        self
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn is_added(&self) -> bool {
        self.source_value.is_none() && self.destination_value.is_some()
    }

    pub fn is_removed(&self) -> bool {
        self.source_value.is_some() && self.destination_value.is_none()
    }

    pub fn is_modified(&self) -> bool {
        match (&self.source_value, &self.destination_value) {
            (Some(src), Some(dst)) => src != dst,
            _ => false,
        }
    }
}

/// One structurally differing object between the two snapshots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectDifference {
    pub object_name: String,
    pub schema_name: String,
    pub object_type: ObjectType,
    pub difference_type: DifferenceType,
    pub severity: Severity,
    pub source_definition: Option<String>,
    pub destination_definition: Option<String>,
    pub attribute_differences: Vec<AttributeDifference>,
    /// SQL rendered by the generator once the resolver has ordered the run
    pub generated_ddl: Option<String>,
    /// Qualified names of objects this one must be ordered after
    pub dependencies: Vec<String>,
    /// Qualified name of the owning object (table for a column, index,
    /// constraint or trigger), if any
    pub parent_object_name: Option<String>,
}

impl ObjectDifference {
    fn base(key: &ObjectKey, difference_type: DifferenceType) -> Self {
        Self {
            object_name: key.name.clone(),
            schema_name: key.schema.clone(),
            object_type: key.object_type,
            difference_type,
            severity: Severity::Info,
            source_definition: None,
            destination_definition: None,
            attribute_differences: Vec::new(),
            generated_ddl: None,
            dependencies: Vec::new(),
            parent_object_name: None,
        }
    }

    /// Object present in the source snapshot only
    pub fn missing(key: &ObjectKey, source_definition: String) -> Self {
        let mut diff = Self::base(key, DifferenceType::Missing);
        diff.source_definition = Some(source_definition);
        diff
    }

    /// Object present in the destination snapshot only
    pub fn extra(key: &ObjectKey, destination_definition: String) -> Self {
        let mut diff = Self::base(key, DifferenceType::Extra);
        diff.destination_definition = Some(destination_definition);
        diff
    }

    /// Object present in both snapshots with differing definitions
    pub fn modified(
        key: &ObjectKey,
        source_definition: String,
        destination_definition: String,
        attribute_differences: Vec<AttributeDifference>,
    ) -> Self {
        let mut diff = Self::base(key, DifferenceType::Modified);
        diff.source_definition = Some(source_definition);
        diff.destination_definition = Some(destination_definition);
        diff.attribute_differences = attribute_differences;
        diff
    }

    pub fn with_parent(mut self, parent: &str) -> Self {
        self.parent_object_name = Some(parent.to_string());
        self
    }

    pub fn with_dependency(mut self, dependency: &str) -> Self {
        self.dependencies.push(dependency.to_string());
        self
    }

    /// Schema-qualified name, the node id used by the resolver
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema_name, self.object_name)
    }

    /// Whether any attribute-level sub-diff carries the breaking flag
    pub fn has_breaking_attribute(&self) -> bool {
        self.attribute_differences.iter().any(|a| a.breaking)
    }
}

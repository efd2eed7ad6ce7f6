//! Structured object definitions and the snapshot container
//!
//! A snapshot maps `(schema, name, object type)` keys to one definition per
//! object. Definitional objects (views, routines) carry their body as literal
//! SQL text; everything else is structured attributes.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::types::ObjectType;

/// Identifies one schema object within a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey {
    pub schema: String,
    pub name: String,
    pub object_type: ObjectType,
}

impl ObjectKey {
    pub fn new(schema: &str, name: &str, object_type: ObjectType) -> Self {
        Self {
            schema: schema.to_string(),
            name: name.to_string(),
            object_type,
        }
    }

    /// Schema-qualified name, used as the node id in the dependency graph
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}.{}", self.object_type, self.schema, self.name)
    }
}

/// Represents a table definition
///
/// Column definitions are embedded so that CREATE TABLE rendering is
/// self-contained; per-column differences are still detected through the
/// standalone column objects the snapshot also carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDef {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub comment: Option<String>,
}

impl TableDef {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
            comment: None,
        }
    }

    pub fn add_column(&mut self, column: ColumnDef) {
        self.columns.push(column);
    }
}

/// Represents a column definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Table the column belongs to (unqualified name)
    pub table: String,
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub default: Option<String>,
    pub collation: Option<String>,
    pub is_generated: bool,
    pub generation_expression: Option<String>,
    pub comment: Option<String>,
}

impl ColumnDef {
    pub fn new(table: &str, name: &str, data_type: &str) -> Self {
        Self {
            table: table.to_string(),
            name: name.to_string(),
            data_type: data_type.to_string(),
            nullable: false,
            default: None,
            collation: None,
            is_generated: false,
            generation_expression: None,
            comment: None,
        }
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn default_value(mut self, default: &str) -> Self {
        self.default = Some(default.to_string());
        self
    }
}

/// Represents an index definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDef {
    pub table: String,
    pub name: String,
    pub columns: Vec<String>,
    pub is_unique: bool,
    pub method: Option<String>,
    pub predicate: Option<String>,
}

impl IndexDef {
    pub fn new(table: &str, name: &str, columns: Vec<String>) -> Self {
        Self {
            table: table.to_string(),
            name: name.to_string(),
            columns,
            is_unique: false,
            method: None,
            predicate: None,
        }
    }

    pub fn unique(mut self, unique: bool) -> Self {
        self.is_unique = unique;
        self
    }
}

/// Represents a table constraint of any of the four kinds
///
/// Which fields are populated depends on the constraint's object type:
/// foreign keys carry `ref_table`/`ref_columns`, check constraints carry
/// `check_clause`, primary/unique carry `columns` only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintDef {
    pub table: String,
    pub name: String,
    pub columns: Vec<String>,
    pub ref_table: Option<String>,
    pub ref_columns: Vec<String>,
    pub check_clause: Option<String>,
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
    pub deferrable: bool,
}

impl ConstraintDef {
    pub fn new(table: &str, name: &str) -> Self {
        Self {
            table: table.to_string(),
            name: name.to_string(),
            columns: Vec::new(),
            ref_table: None,
            ref_columns: Vec::new(),
            check_clause: None,
            on_delete: None,
            on_update: None,
            deferrable: false,
        }
    }

    pub fn columns(mut self, columns: Vec<String>) -> Self {
        self.columns = columns;
        self
    }

    pub fn references(mut self, table: &str, columns: Vec<String>) -> Self {
        self.ref_table = Some(table.to_string());
        self.ref_columns = columns;
        self
    }

    pub fn check(mut self, clause: &str) -> Self {
        self.check_clause = Some(clause.to_string());
        self
    }
}

/// Represents a view or materialized view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewDef {
    pub name: String,
    /// The SELECT body, literal SQL text
    pub definition: String,
    pub is_materialized: bool,
    /// Qualified names of relations the view reads from
    pub depends_on: Vec<String>,
}

impl ViewDef {
    pub fn new(name: &str, definition: &str) -> Self {
        Self {
            name: name.to_string(),
            definition: definition.to_string(),
            is_materialized: false,
            depends_on: Vec::new(),
        }
    }

    pub fn materialized(mut self, materialized: bool) -> Self {
        self.is_materialized = materialized;
        self
    }
}

/// Represents a function or procedure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineDef {
    pub name: String,
    pub language: String,
    /// Argument list as declared, e.g. `a integer, b text`
    pub arguments: String,
    /// Return type; `None` for procedures
    pub returns: Option<String>,
    /// The routine body, literal SQL text
    pub body: String,
}

impl RoutineDef {
    pub fn new(name: &str, language: &str, body: &str) -> Self {
        Self {
            name: name.to_string(),
            language: language.to_string(),
            arguments: String::new(),
            returns: None,
            body: body.to_string(),
        }
    }
}

/// Represents a trigger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerDef {
    pub table: String,
    pub name: String,
    /// BEFORE, AFTER or INSTEAD OF
    pub timing: String,
    /// INSERT / UPDATE / DELETE / TRUNCATE
    pub events: Vec<String>,
    /// ROW or STATEMENT
    pub orientation: String,
    /// Qualified name of the trigger function
    pub function: String,
    pub condition: Option<String>,
}

impl TriggerDef {
    pub fn new(table: &str, name: &str, timing: &str, function: &str) -> Self {
        Self {
            table: table.to_string(),
            name: name.to_string(),
            timing: timing.to_string(),
            events: Vec::new(),
            orientation: "ROW".to_string(),
            function: function.to_string(),
            condition: None,
        }
    }
}

/// Represents a sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceDef {
    pub name: String,
    pub data_type: String,
    pub start_value: i64,
    pub increment: i64,
    pub min_value: Option<i64>,
    pub max_value: Option<i64>,
    pub cycle: bool,
    /// Qualified `table.column` the sequence is owned by, if any
    pub owned_by: Option<String>,
}

impl SequenceDef {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type: "bigint".to_string(),
            start_value: 1,
            increment: 1,
            min_value: None,
            max_value: None,
            cycle: false,
            owned_by: None,
        }
    }
}

/// One attribute of a composite type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeAttr {
    pub name: String,
    pub data_type: String,
}

/// Represents a user-defined type: enum, composite or domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserTypeDef {
    pub name: String,
    /// Enum labels in declaration order; empty for other kinds
    pub enum_labels: Vec<String>,
    /// Composite attributes in declaration order; empty for other kinds
    pub attributes: Vec<CompositeAttr>,
    /// Domain base type; `None` for other kinds
    pub base_type: Option<String>,
    pub domain_constraint: Option<String>,
    pub domain_not_null: bool,
    pub domain_default: Option<String>,
}

impl UserTypeDef {
    pub fn new_enum(name: &str, labels: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            enum_labels: labels,
            attributes: Vec::new(),
            base_type: None,
            domain_constraint: None,
            domain_not_null: false,
            domain_default: None,
        }
    }

    pub fn new_composite(name: &str, attributes: Vec<CompositeAttr>) -> Self {
        Self {
            name: name.to_string(),
            enum_labels: Vec::new(),
            attributes,
            base_type: None,
            domain_constraint: None,
            domain_not_null: false,
            domain_default: None,
        }
    }

    pub fn new_domain(name: &str, base_type: &str) -> Self {
        Self {
            name: name.to_string(),
            enum_labels: Vec::new(),
            attributes: Vec::new(),
            base_type: Some(base_type.to_string()),
            domain_constraint: None,
            domain_not_null: false,
            domain_default: None,
        }
    }
}

/// Represents an installed extension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionDef {
    pub name: String,
    pub version: String,
    pub schema: String,
}

impl ExtensionDef {
    pub fn new(name: &str, version: &str, schema: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            schema: schema.to_string(),
        }
    }
}

/// One object definition, tagged by category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectDefinition {
    Table(TableDef),
    Column(ColumnDef),
    Index(IndexDef),
    Constraint(ConstraintDef),
    View(ViewDef),
    Routine(RoutineDef),
    Trigger(TriggerDef),
    Sequence(SequenceDef),
    UserType(UserTypeDef),
    Extension(ExtensionDef),
}

impl ObjectDefinition {
    /// Whether this definition shape is valid for the given object category.
    /// A mismatch means the snapshot handed the engine something it cannot
    /// compare, and the object is skipped with a note.
    pub fn matches_type(&self, object_type: ObjectType) -> bool {
        match self {
            ObjectDefinition::Table(_) => object_type == ObjectType::Table,
            ObjectDefinition::Column(_) => object_type == ObjectType::Column,
            ObjectDefinition::Index(_) => object_type == ObjectType::Index,
            ObjectDefinition::Constraint(_) => object_type.is_constraint(),
            ObjectDefinition::View(_) => {
                matches!(object_type, ObjectType::View | ObjectType::MaterializedView)
            }
            ObjectDefinition::Routine(_) => {
                matches!(object_type, ObjectType::Function | ObjectType::Procedure)
            }
            ObjectDefinition::Trigger(_) => object_type == ObjectType::Trigger,
            ObjectDefinition::Sequence(_) => object_type == ObjectType::Sequence,
            ObjectDefinition::UserType(_) => matches!(
                object_type,
                ObjectType::TypeEnum | ObjectType::TypeComposite | ObjectType::TypeDomain
            ),
            ObjectDefinition::Extension(_) => object_type == ObjectType::Extension,
        }
    }

    /// Short single-line rendering used for the source/destination definition
    /// fields on a difference record
    pub fn describe(&self) -> String {
        match self {
            ObjectDefinition::Table(t) => {
                let cols: Vec<String> = t
                    .columns
                    .iter()
                    .map(|c| format!("{} {}", c.name, c.data_type))
                    .collect();
                format!("table ({})", cols.join(", "))
            }
            ObjectDefinition::Column(c) => {
                let nullable = if c.nullable { "null" } else { "not null" };
                let mut s = format!("{} {}", c.data_type, nullable);
                if let Some(default) = &c.default {
                    s.push_str(&format!(" default {}", default));
                }
                s
            }
            ObjectDefinition::Index(i) => {
                let unique = if i.is_unique { "unique index" } else { "index" };
                format!("{} on {} ({})", unique, i.table, i.columns.join(", "))
            }
            ObjectDefinition::Constraint(c) => {
                if let Some(clause) = &c.check_clause {
                    format!("check ({})", clause)
                } else if let Some(ref_table) = &c.ref_table {
                    format!(
                        "foreign key ({}) references {} ({})",
                        c.columns.join(", "),
                        ref_table,
                        c.ref_columns.join(", ")
                    )
                } else {
                    format!("({})", c.columns.join(", "))
                }
            }
            ObjectDefinition::View(v) => v.definition.clone(),
            ObjectDefinition::Routine(r) => {
                format!("{}({}) language {}", r.name, r.arguments, r.language)
            }
            ObjectDefinition::Trigger(t) => {
                format!(
                    "{} {} on {} for each {} execute {}",
                    t.timing,
                    t.events.join(" or "),
                    t.table,
                    t.orientation.to_lowercase(),
                    t.function
                )
            }
            ObjectDefinition::Sequence(s) => {
                format!(
                    "sequence as {} start {} increment {}",
                    s.data_type, s.start_value, s.increment
                )
            }
            ObjectDefinition::UserType(t) => {
                if !t.enum_labels.is_empty() {
                    format!("enum ({})", t.enum_labels.join(", "))
                } else if !t.attributes.is_empty() {
                    let attrs: Vec<String> = t
                        .attributes
                        .iter()
                        .map(|a| format!("{} {}", a.name, a.data_type))
                        .collect();
                    format!("composite ({})", attrs.join(", "))
                } else {
                    format!("domain over {}", t.base_type.as_deref().unwrap_or("?"))
                }
            }
            ObjectDefinition::Extension(e) => format!("extension version {}", e.version),
        }
    }
}

/// A point-in-time capture of one schema's object definitions
///
/// Insertion order is preserved so that identical inputs always produce the
/// same scan order and therefore the same script.
#[derive(Debug, Clone)]
pub struct SchemaSnapshot {
    /// Label identifying where the snapshot came from (instance name or DSN host)
    pub instance: String,
    pub schema_name: String,
    pub captured_at: DateTime<Utc>,
    pub objects: IndexMap<ObjectKey, ObjectDefinition>,
}

impl SchemaSnapshot {
    pub fn new(instance: &str, schema_name: &str) -> Self {
        Self {
            instance: instance.to_string(),
            schema_name: schema_name.to_string(),
            captured_at: Utc::now(),
            objects: IndexMap::new(),
        }
    }

    pub fn add_object(&mut self, key: ObjectKey, definition: ObjectDefinition) {
        self.objects.insert(key, definition);
    }

    pub fn get(&self, key: &ObjectKey) -> Option<&ObjectDefinition> {
        self.objects.get(key)
    }

    pub fn contains(&self, key: &ObjectKey) -> bool {
        self.objects.contains_key(key)
    }

    /// Keys of every object in the given category, in insertion order
    pub fn keys_of_type(&self, object_type: ObjectType) -> Vec<&ObjectKey> {
        self.objects
            .keys()
            .filter(|k| k.object_type == object_type)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

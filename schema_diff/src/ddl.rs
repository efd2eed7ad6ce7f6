//! DDL generation
//!
//! Renders the PostgreSQL statements implied by each difference, in resolver
//! order: CREATE for MISSING objects, DROP for EXTRA objects, ALTER or
//! drop-and-recreate for MODIFIED ones. Statements for BREAKING differences
//! are commented out under a review banner rather than left executable, and
//! so are destructive drops of data-holding objects regardless of severity.

use crate::error::{Error, Result};
use crate::model::definition::{
    ColumnDef, ConstraintDef, ExtensionDef, IndexDef, ObjectDefinition, ObjectKey, SchemaSnapshot,
    SequenceDef, TableDef, TriggerDef, UserTypeDef, ViewDef,
};
use crate::model::difference::ObjectDifference;
use crate::model::types::{DifferenceType, ObjectType, Severity};

/// Renders reconciliation SQL for differences between two snapshots
pub struct DdlGenerator<'a> {
    source: &'a SchemaSnapshot,
    destination: &'a SchemaSnapshot,
}

impl<'a> DdlGenerator<'a> {
    pub fn new(source: &'a SchemaSnapshot, destination: &'a SchemaSnapshot) -> Self {
        Self {
            source,
            destination,
        }
    }

    /// Generate the SQL for one difference
    pub fn generate(&self, diff: &ObjectDifference) -> Result<String> {
        let key = ObjectKey::new(&diff.schema_name, &diff.object_name, diff.object_type);

        let sql = match diff.difference_type {
            DifferenceType::Missing => {
                let def = self.source.get(&key).ok_or_else(|| {
                    Error::DdlGenerationError(format!("no source definition for {}", key))
                })?;
                self.create_sql(&key, def)?
            }
            DifferenceType::Extra => {
                let def = self.destination.get(&key).ok_or_else(|| {
                    Error::DdlGenerationError(format!("no destination definition for {}", key))
                })?;
                self.drop_sql(&key, def)?
            }
            DifferenceType::Modified => {
                let src = self.source.get(&key).ok_or_else(|| {
                    Error::DdlGenerationError(format!("no source definition for {}", key))
                })?;
                let dst = self.destination.get(&key).ok_or_else(|| {
                    Error::DdlGenerationError(format!("no destination definition for {}", key))
                })?;
                self.alter_sql(&key, diff, src, dst)?
            }
        };

        if needs_review(diff) {
            Ok(flag_for_review(diff, &sql))
        } else {
            Ok(sql)
        }
    }

    fn create_sql(&self, key: &ObjectKey, def: &ObjectDefinition) -> Result<String> {
        match def {
            ObjectDefinition::Table(t) => Ok(create_table_sql(key, t)),
            ObjectDefinition::Column(c) => Ok(add_column_sql(key, c)),
            ObjectDefinition::Index(i) => Ok(create_index_sql(key, i)),
            ObjectDefinition::Constraint(c) => Ok(add_constraint_sql(key, c)),
            ObjectDefinition::View(v) => Ok(create_view_sql(key, v)),
            ObjectDefinition::Routine(r) => Ok(create_routine_sql(key, r)),
            ObjectDefinition::Trigger(t) => Ok(create_trigger_sql(key, t)),
            ObjectDefinition::Sequence(s) => Ok(create_sequence_sql(key, s)),
            ObjectDefinition::UserType(t) => Ok(create_type_sql(key, t)),
            ObjectDefinition::Extension(e) => Ok(create_extension_sql(e)),
        }
    }

    fn drop_sql(&self, key: &ObjectKey, def: &ObjectDefinition) -> Result<String> {
        let qualified = key.qualified_name();
        let sql = match def {
            ObjectDefinition::Table(_) => format!("DROP TABLE IF EXISTS {};\n", qualified),
            ObjectDefinition::Column(c) => format!(
                "ALTER TABLE {}.{} DROP COLUMN IF EXISTS {};\n",
                key.schema, c.table, c.name
            ),
            ObjectDefinition::Index(_) => format!("DROP INDEX IF EXISTS {};\n", qualified),
            ObjectDefinition::Constraint(c) => format!(
                "ALTER TABLE {}.{} DROP CONSTRAINT IF EXISTS {};\n",
                key.schema, c.table, c.name
            ),
            ObjectDefinition::View(v) => {
                if v.is_materialized {
                    format!("DROP MATERIALIZED VIEW IF EXISTS {};\n", qualified)
                } else {
                    format!("DROP VIEW IF EXISTS {};\n", qualified)
                }
            }
            ObjectDefinition::Routine(r) => {
                let keyword = key.object_type.sql_keyword();
                format!("DROP {} IF EXISTS {}({});\n", keyword, qualified, r.arguments)
            }
            ObjectDefinition::Trigger(t) => format!(
                "DROP TRIGGER IF EXISTS {} ON {}.{};\n",
                t.name, key.schema, t.table
            ),
            ObjectDefinition::Sequence(_) => format!("DROP SEQUENCE IF EXISTS {};\n", qualified),
            ObjectDefinition::UserType(_) => {
                let keyword = key.object_type.sql_keyword();
                format!("DROP {} IF EXISTS {};\n", keyword, qualified)
            }
            ObjectDefinition::Extension(e) => format!("DROP EXTENSION IF EXISTS {};\n", e.name),
        };
        Ok(sql)
    }

    fn alter_sql(
        &self,
        key: &ObjectKey,
        diff: &ObjectDifference,
        src: &ObjectDefinition,
        dst: &ObjectDefinition,
    ) -> Result<String> {
        match (src, dst) {
            (ObjectDefinition::Table(s), ObjectDefinition::Table(_)) => {
                Ok(alter_table_sql(key, s))
            }
            (ObjectDefinition::Column(s), ObjectDefinition::Column(d)) => {
                Ok(alter_column_sql(key, diff, s, d))
            }
            (ObjectDefinition::Sequence(s), ObjectDefinition::Sequence(_)) => {
                Ok(alter_sequence_sql(key, s))
            }
            (ObjectDefinition::Extension(s), ObjectDefinition::Extension(d)) => {
                Ok(alter_extension_sql(s, d))
            }
            (ObjectDefinition::UserType(s), ObjectDefinition::UserType(d)) => {
                Ok(self.alter_type_sql(key, diff, s, d))
            }
            (ObjectDefinition::View(s), ObjectDefinition::View(_)) => {
                // A changed body is rendered as drop-and-recreate; CREATE OR
                // REPLACE cannot change the column set
                let mut sql = self.drop_sql(key, dst)?;
                sql.push_str(&create_view_sql(key, s));
                Ok(sql)
            }
            (ObjectDefinition::Routine(s), ObjectDefinition::Routine(_)) => {
                let mut sql = self.drop_sql(key, dst)?;
                sql.push_str(&create_routine_sql(key, s));
                Ok(sql)
            }
            // Indexes, constraints and triggers are recreated from the
            // source definition
            (src_def, dst_def) => {
                let mut sql = self.drop_sql(key, dst_def)?;
                sql.push_str(&self.create_sql(key, src_def)?);
                Ok(sql)
            }
        }
    }

    fn alter_type_sql(
        &self,
        key: &ObjectKey,
        diff: &ObjectDifference,
        src: &UserTypeDef,
        dst: &UserTypeDef,
    ) -> String {
        // Label additions can be applied in place; anything breaking falls
        // back to drop-and-recreate (commented by the review flag)
        if key.object_type == ObjectType::TypeEnum && !diff.has_breaking_attribute() {
            let mut sql = String::new();
            for label in &src.enum_labels {
                if !dst.enum_labels.contains(label) {
                    sql.push_str(&format!(
                        "ALTER TYPE {} ADD VALUE IF NOT EXISTS '{}';\n",
                        key.qualified_name(),
                        escape(label)
                    ));
                }
            }
            return sql;
        }

        let mut sql = format!(
            "DROP {} IF EXISTS {};\n",
            key.object_type.sql_keyword(),
            key.qualified_name()
        );
        sql.push_str(&create_type_sql(key, src));
        sql
    }
}

/// Whether the rendered SQL must be commented out for manual review
fn needs_review(diff: &ObjectDifference) -> bool {
    if diff.severity == Severity::Breaking {
        return true;
    }
    // Dropping an extra table or column destroys data even though the
    // difference itself is classified as additive
    diff.difference_type == DifferenceType::Extra && diff.object_type.can_hold_data()
}

/// Comment out every statement line under a review banner
fn flag_for_review(diff: &ObjectDifference, sql: &str) -> String {
    let mut out = format!(
        "-- REVIEW REQUIRED ({}): {} {}.{} is {}; apply manually after verification\n",
        diff.severity,
        diff.object_type,
        diff.schema_name,
        diff.object_name,
        diff.difference_type
    );
    for line in sql.lines() {
        out.push_str("-- ");
        out.push_str(line);
        out.push('\n');
    }
    out
}

fn escape(text: &str) -> String {
    text.replace('\'', "''")
}

fn column_line(column: &ColumnDef) -> String {
    let nullable = if column.nullable { "NULL" } else { "NOT NULL" };
    let default = match &column.default {
        Some(value) => format!(" DEFAULT {}", value),
        None => String::new(),
    };
    format!("  {} {}{} {}", column.name, column.data_type, default, nullable)
}

fn create_table_sql(key: &ObjectKey, table: &TableDef) -> String {
    let mut sql = format!("CREATE TABLE IF NOT EXISTS {} (\n", key.qualified_name());

    let column_defs: Vec<String> = table.columns.iter().map(column_line).collect();
    sql.push_str(&column_defs.join(",\n"));
    sql.push_str("\n);\n");

    if let Some(comment) = &table.comment {
        sql.push_str(&format!(
            "COMMENT ON TABLE {} IS '{}';\n",
            key.qualified_name(),
            escape(comment)
        ));
    }

    for column in &table.columns {
        if let Some(comment) = &column.comment {
            sql.push_str(&format!(
                "COMMENT ON COLUMN {}.{} IS '{}';\n",
                key.qualified_name(),
                column.name,
                escape(comment)
            ));
        }
    }

    sql
}

fn alter_table_sql(key: &ObjectKey, src: &TableDef) -> String {
    // Table-level modifications are comment drift only; column changes are
    // separate differences
    match &src.comment {
        Some(comment) => format!(
            "COMMENT ON TABLE {} IS '{}';\n",
            key.qualified_name(),
            escape(comment)
        ),
        None => format!("COMMENT ON TABLE {} IS NULL;\n", key.qualified_name()),
    }
}

fn add_column_sql(key: &ObjectKey, column: &ColumnDef) -> String {
    let nullable = if column.nullable { "NULL" } else { "NOT NULL" };
    let default = match &column.default {
        Some(value) => format!(" DEFAULT {}", value),
        None => String::new(),
    };
    let mut sql = format!(
        "ALTER TABLE {}.{} ADD COLUMN {} {}{} {};\n",
        key.schema, column.table, column.name, column.data_type, default, nullable
    );
    if let Some(comment) = &column.comment {
        sql.push_str(&format!(
            "COMMENT ON COLUMN {}.{}.{} IS '{}';\n",
            key.schema,
            column.table,
            column.name,
            escape(comment)
        ));
    }
    sql
}

fn alter_column_sql(
    key: &ObjectKey,
    diff: &ObjectDifference,
    src: &ColumnDef,
    _dst: &ColumnDef,
) -> String {
    let table = format!("{}.{}", key.schema, src.table);
    let mut sql = String::new();

    for attr in &diff.attribute_differences {
        match attr.attribute_name.as_str() {
            "data_type" => {
                sql.push_str(&format!(
                    "ALTER TABLE {} ALTER COLUMN {} TYPE {} USING {}::{};\n",
                    table, src.name, src.data_type, src.name, src.data_type
                ));
            }
            "nullable" => {
                if src.nullable {
                    sql.push_str(&format!(
                        "ALTER TABLE {} ALTER COLUMN {} DROP NOT NULL;\n",
                        table, src.name
                    ));
                } else {
                    sql.push_str(&format!(
                        "ALTER TABLE {} ALTER COLUMN {} SET NOT NULL;\n",
                        table, src.name
                    ));
                }
            }
            "default" => match &src.default {
                Some(value) => sql.push_str(&format!(
                    "ALTER TABLE {} ALTER COLUMN {} SET DEFAULT {};\n",
                    table, src.name, value
                )),
                None => sql.push_str(&format!(
                    "ALTER TABLE {} ALTER COLUMN {} DROP DEFAULT;\n",
                    table, src.name
                )),
            },
            "collation" => {
                let collation = src.collation.as_deref().unwrap_or("default");
                sql.push_str(&format!(
                    "ALTER TABLE {} ALTER COLUMN {} TYPE {} COLLATE \"{}\";\n",
                    table, src.name, src.data_type, collation
                ));
            }
            "generation_expression" => {
                sql.push_str(&format!(
                    "ALTER TABLE {} DROP COLUMN IF EXISTS {};\n",
                    table, src.name
                ));
                sql.push_str(&add_column_sql(key, src));
            }
            _ => {}
        }
    }

    sql
}

fn create_index_sql(key: &ObjectKey, index: &IndexDef) -> String {
    let unique = if index.is_unique { "UNIQUE " } else { "" };
    let method = index.method.as_deref().unwrap_or("btree");
    let predicate = match &index.predicate {
        Some(p) => format!(" WHERE {}", p),
        None => String::new(),
    };
    format!(
        "CREATE {}INDEX IF NOT EXISTS {} ON {}.{} USING {} ({}){};\n",
        unique,
        index.name,
        key.schema,
        index.table,
        method,
        index.columns.join(", "),
        predicate
    )
}

fn add_constraint_sql(key: &ObjectKey, constraint: &ConstraintDef) -> String {
    let body = match key.object_type {
        ObjectType::ConstraintPrimary => {
            format!("PRIMARY KEY ({})", constraint.columns.join(", "))
        }
        ObjectType::ConstraintUnique => format!("UNIQUE ({})", constraint.columns.join(", ")),
        ObjectType::ConstraintForeign => {
            let ref_table = constraint.ref_table.as_deref().unwrap_or("");
            let on_delete = constraint.on_delete.as_deref().unwrap_or("NO ACTION");
            let on_update = constraint.on_update.as_deref().unwrap_or("NO ACTION");
            format!(
                "FOREIGN KEY ({}) REFERENCES {}.{} ({}) ON DELETE {} ON UPDATE {}",
                constraint.columns.join(", "),
                key.schema,
                ref_table,
                constraint.ref_columns.join(", "),
                on_delete,
                on_update
            )
        }
        // ConstraintCheck and anything routed here by mistake
        _ => format!(
            "CHECK ({})",
            constraint.check_clause.as_deref().unwrap_or("true")
        ),
    };

    let deferrable = if constraint.deferrable {
        " DEFERRABLE"
    } else {
        ""
    };
    format!(
        "ALTER TABLE {}.{} ADD CONSTRAINT {} {}{};\n",
        key.schema, constraint.table, constraint.name, body, deferrable
    )
}

fn create_view_sql(key: &ObjectKey, view: &ViewDef) -> String {
    if view.is_materialized {
        format!(
            "CREATE MATERIALIZED VIEW IF NOT EXISTS {} AS\n{};\n",
            key.qualified_name(),
            view.definition.trim_end_matches(';')
        )
    } else {
        format!(
            "CREATE OR REPLACE VIEW {} AS\n{};\n",
            key.qualified_name(),
            view.definition.trim_end_matches(';')
        )
    }
}

fn create_routine_sql(key: &ObjectKey, routine: &crate::model::definition::RoutineDef) -> String {
    let keyword = key.object_type.sql_keyword();
    let returns = match &routine.returns {
        Some(r) => format!("\nRETURNS {}", r),
        None => String::new(),
    };
    format!(
        "CREATE OR REPLACE {} {}({}){}\nLANGUAGE {}\nAS $$\n{}\n$$;\n",
        keyword,
        key.qualified_name(),
        routine.arguments,
        returns,
        routine.language,
        routine.body.trim_end_matches(';')
    )
}

fn create_trigger_sql(key: &ObjectKey, trigger: &TriggerDef) -> String {
    let condition = match &trigger.condition {
        Some(c) => format!(" WHEN ({})", c),
        None => String::new(),
    };
    format!(
        "CREATE TRIGGER {} {} {} ON {}.{} FOR EACH {}{} EXECUTE FUNCTION {}();\n",
        trigger.name,
        trigger.timing,
        trigger.events.join(" OR "),
        key.schema,
        trigger.table,
        trigger.orientation,
        condition,
        trigger.function
    )
}

fn sequence_bounds(sequence: &SequenceDef) -> String {
    let min = match sequence.min_value {
        Some(v) => format!(" MINVALUE {}", v),
        None => String::new(),
    };
    let max = match sequence.max_value {
        Some(v) => format!(" MAXVALUE {}", v),
        None => String::new(),
    };
    let cycle = if sequence.cycle { " CYCLE" } else { "" };
    format!("{}{}{}", min, max, cycle)
}

fn create_sequence_sql(key: &ObjectKey, sequence: &SequenceDef) -> String {
    let mut sql = format!(
        "CREATE SEQUENCE IF NOT EXISTS {} AS {} START WITH {} INCREMENT BY {}{};\n",
        key.qualified_name(),
        sequence.data_type,
        sequence.start_value,
        sequence.increment,
        sequence_bounds(sequence)
    );
    if let Some(owned_by) = &sequence.owned_by {
        sql.push_str(&format!(
            "ALTER SEQUENCE {} OWNED BY {}.{};\n",
            key.qualified_name(),
            key.schema,
            owned_by
        ));
    }
    sql
}

fn alter_sequence_sql(key: &ObjectKey, src: &SequenceDef) -> String {
    let mut sql = format!(
        "ALTER SEQUENCE {} AS {} INCREMENT BY {} START WITH {}{};\n",
        key.qualified_name(),
        src.data_type,
        src.increment,
        src.start_value,
        sequence_bounds(src)
    );
    if let Some(owned_by) = &src.owned_by {
        sql.push_str(&format!(
            "ALTER SEQUENCE {} OWNED BY {}.{};\n",
            key.qualified_name(),
            key.schema,
            owned_by
        ));
    }
    sql
}

fn create_type_sql(key: &ObjectKey, usertype: &UserTypeDef) -> String {
    match key.object_type {
        ObjectType::TypeEnum => {
            let labels: Vec<String> = usertype
                .enum_labels
                .iter()
                .map(|l| format!("'{}'", escape(l)))
                .collect();
            format!(
                "CREATE TYPE {} AS ENUM ({});\n",
                key.qualified_name(),
                labels.join(", ")
            )
        }
        ObjectType::TypeComposite => {
            let attrs: Vec<String> = usertype
                .attributes
                .iter()
                .map(|a| format!("{} {}", a.name, a.data_type))
                .collect();
            format!(
                "CREATE TYPE {} AS ({});\n",
                key.qualified_name(),
                attrs.join(", ")
            )
        }
        _ => {
            let base = usertype.base_type.as_deref().unwrap_or("text");
            let default = match &usertype.domain_default {
                Some(d) => format!(" DEFAULT {}", d),
                None => String::new(),
            };
            let not_null = if usertype.domain_not_null {
                " NOT NULL"
            } else {
                ""
            };
            let check = match &usertype.domain_constraint {
                Some(c) => format!(" CHECK ({})", c),
                None => String::new(),
            };
            format!(
                "CREATE DOMAIN {} AS {}{}{}{};\n",
                key.qualified_name(),
                base,
                default,
                not_null,
                check
            )
        }
    }
}

fn create_extension_sql(extension: &ExtensionDef) -> String {
    format!(
        "CREATE EXTENSION IF NOT EXISTS {} WITH SCHEMA {};\n",
        extension.name, extension.schema
    )
}

fn alter_extension_sql(src: &ExtensionDef, dst: &ExtensionDef) -> String {
    let mut sql = String::new();
    if src.version != dst.version {
        sql.push_str(&format!(
            "ALTER EXTENSION {} UPDATE TO '{}';\n",
            src.name,
            escape(&src.version)
        ));
    }
    if src.schema != dst.schema {
        sql.push_str(&format!(
            "ALTER EXTENSION {} SET SCHEMA {};\n",
            src.name, src.schema
        ));
    }
    sql
}

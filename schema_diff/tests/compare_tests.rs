//! Scenario tests driving the comparison engine over hand-built snapshots

use std::time::Duration;

use pretty_assertions::assert_eq;

use schema_diff::model::definition::{
    ColumnDef, ConstraintDef, IndexDef, ObjectDefinition, ObjectKey, SchemaSnapshot, TableDef,
    UserTypeDef, ViewDef,
};
use schema_diff::{
    ComparisonEngine, ComparisonFilter, DifferenceType, FilterPreset, ObjectType, RunState,
    Severity,
};

/// Insert a table plus its standalone column objects, the way the snapshot
/// loader does
fn add_table(snapshot: &mut SchemaSnapshot, name: &str, columns: &[ColumnDef]) {
    let schema = snapshot.schema_name.clone();
    let mut table = TableDef::new(name);
    for column in columns {
        table.add_column(column.clone());
        let key = ObjectKey::new(
            &schema,
            &format!("{}.{}", name, column.name),
            ObjectType::Column,
        );
        snapshot.add_object(key, ObjectDefinition::Column(column.clone()));
    }
    let key = ObjectKey::new(&schema, name, ObjectType::Table);
    snapshot.add_object(key, ObjectDefinition::Table(table));
}

fn orders_columns(status_type: &str) -> Vec<ColumnDef> {
    vec![
        ColumnDef::new("orders", "id", "integer"),
        ColumnDef::new("orders", "status", status_type).nullable(false),
    ]
}

/// A snapshot with one of everything, used for identity checks
fn rich_snapshot(instance: &str) -> SchemaSnapshot {
    let mut snapshot = SchemaSnapshot::new(instance, "public");

    snapshot.add_object(
        ObjectKey::new("public", "order_status", ObjectType::TypeEnum),
        ObjectDefinition::UserType(UserTypeDef::new_enum(
            "order_status",
            vec!["new".into(), "paid".into()],
        )),
    );

    add_table(&mut snapshot, "users", &[ColumnDef::new("users", "id", "integer")]);
    add_table(&mut snapshot, "orders", &orders_columns("varchar(20)"));

    snapshot.add_object(
        ObjectKey::new("public", "pk_orders", ObjectType::ConstraintPrimary),
        ObjectDefinition::Constraint(
            ConstraintDef::new("orders", "pk_orders").columns(vec!["id".into()]),
        ),
    );
    snapshot.add_object(
        ObjectKey::new("public", "fk_orders_user_id", ObjectType::ConstraintForeign),
        ObjectDefinition::Constraint(
            ConstraintDef::new("orders", "fk_orders_user_id")
                .columns(vec!["user_id".into()])
                .references("users", vec!["id".into()]),
        ),
    );
    snapshot.add_object(
        ObjectKey::new("public", "ix_orders_status", ObjectType::Index),
        ObjectDefinition::Index(IndexDef::new(
            "orders",
            "ix_orders_status",
            vec!["status".into()],
        )),
    );
    snapshot.add_object(
        ObjectKey::new("public", "active_orders", ObjectType::View),
        ObjectDefinition::View(ViewDef::new(
            "active_orders",
            "SELECT id FROM orders WHERE status = 'paid'",
        )),
    );

    snapshot
}

fn run_default(source: &SchemaSnapshot, destination: &SchemaSnapshot) -> schema_diff::SchemaComparisonResult {
    ComparisonEngine::new(ComparisonFilter::default()).run(source, destination)
}

#[test]
fn comparing_a_schema_against_itself_is_identical() {
    let source = rich_snapshot("src");
    let destination = rich_snapshot("dst");

    let result = run_default(&source, &destination);

    assert_eq!(result.state, RunState::Succeeded);
    assert!(result.is_identical());
    assert_eq!(result.summary.total_differences(), 0);
    assert_eq!(result.migration_script(), "");
}

#[test]
fn missing_and_extra_are_symmetric_under_operand_swap() {
    let mut with_table = SchemaSnapshot::new("a", "public");
    add_table(&mut with_table, "legacy_users", &[ColumnDef::new("legacy_users", "id", "integer")]);
    let without_table = SchemaSnapshot::new("b", "public");

    let forward = run_default(&with_table, &without_table);
    let reverse = run_default(&without_table, &with_table);

    let forward_diff = &forward.differences_by_object_type(ObjectType::Table)[0];
    let reverse_diff = &reverse.differences_by_object_type(ObjectType::Table)[0];
    assert_eq!(forward_diff.object_name, reverse_diff.object_name);
    assert_eq!(forward_diff.difference_type, DifferenceType::Missing);
    assert_eq!(reverse_diff.difference_type, DifferenceType::Extra);
    assert_eq!(
        forward.summary.missing + forward.summary.modified,
        reverse.summary.extra + reverse.summary.modified
    );
}

#[test]
fn widened_varchar_yields_one_warning_modification() {
    let mut source = SchemaSnapshot::new("src", "public");
    add_table(&mut source, "orders", &orders_columns("varchar(20)"));
    let mut destination = SchemaSnapshot::new("dst", "public");
    add_table(&mut destination, "orders", &orders_columns("varchar(50)"));

    let result = run_default(&source, &destination);

    assert_eq!(result.summary.total_differences(), 1);
    let diff = &result.differences[0];
    assert_eq!(diff.object_type, ObjectType::Column);
    assert_eq!(diff.difference_type, DifferenceType::Modified);
    assert_eq!(diff.severity, Severity::Warning);

    assert_eq!(diff.attribute_differences.len(), 1);
    let attr = &diff.attribute_differences[0];
    assert_eq!(attr.attribute_name, "data_type");
    assert_eq!(attr.source_value.as_deref(), Some("varchar(20)"));
    assert_eq!(attr.destination_value.as_deref(), Some("varchar(50)"));
    assert!(!attr.breaking);
}

#[test]
fn table_present_in_source_only_is_breaking_and_flagged() {
    let mut source = SchemaSnapshot::new("src", "public");
    add_table(
        &mut source,
        "legacy_users",
        &[
            ColumnDef::new("legacy_users", "id", "integer"),
            ColumnDef::new("legacy_users", "name", "varchar(255)"),
        ],
    );
    let destination = SchemaSnapshot::new("dst", "public");

    let result = run_default(&source, &destination);

    // Column objects of a one-sided table are folded into the table record
    assert_eq!(result.summary.total_differences(), 1);
    let diff = &result.differences[0];
    assert_eq!(diff.difference_type, DifferenceType::Missing);
    assert_eq!(diff.severity, Severity::Breaking);

    let ddl = diff.generated_ddl.as_deref().unwrap();
    assert!(ddl.starts_with("-- REVIEW REQUIRED (breaking)"));
    assert!(ddl.lines().all(|l| l.starts_with("--")));
    assert!(ddl.contains("CREATE TABLE IF NOT EXISTS public.legacy_users"));
}

#[test]
fn apply_order_creates_table_before_its_index_and_foreign_key() {
    let mut source = SchemaSnapshot::new("src", "public");
    add_table(&mut source, "t2", &[ColumnDef::new("t2", "id", "integer")]);
    add_table(&mut source, "t", &[ColumnDef::new("t", "id", "integer")]);
    source.add_object(
        ObjectKey::new("public", "i", ObjectType::Index),
        ObjectDefinition::Index(IndexDef::new("t", "i", vec!["id".into()])),
    );
    source.add_object(
        ObjectKey::new("public", "fk", ObjectType::ConstraintForeign),
        ObjectDefinition::Constraint(
            ConstraintDef::new("t2", "fk")
                .columns(vec!["t_id".into()])
                .references("t", vec!["id".into()]),
        ),
    );
    let mut destination = SchemaSnapshot::new("dst", "public");
    add_table(&mut destination, "t2", &[ColumnDef::new("t2", "id", "integer")]);

    let result = run_default(&source, &destination);

    let position = |name: &str| {
        result
            .differences
            .iter()
            .position(|d| d.object_name == name)
            .unwrap()
    };
    assert!(position("t") < position("i"));
    assert!(position("t") < position("fk"));
}

#[test]
fn teardown_order_drops_index_and_foreign_key_before_table() {
    let mut destination = SchemaSnapshot::new("dst", "public");
    add_table(&mut destination, "t2", &[ColumnDef::new("t2", "id", "integer")]);
    add_table(&mut destination, "t", &[ColumnDef::new("t", "id", "integer")]);
    destination.add_object(
        ObjectKey::new("public", "i", ObjectType::Index),
        ObjectDefinition::Index(IndexDef::new("t", "i", vec!["id".into()])),
    );
    destination.add_object(
        ObjectKey::new("public", "fk", ObjectType::ConstraintForeign),
        ObjectDefinition::Constraint(
            ConstraintDef::new("t2", "fk")
                .columns(vec!["t_id".into()])
                .references("t", vec!["id".into()]),
        ),
    );
    let mut source = SchemaSnapshot::new("src", "public");
    add_table(&mut source, "t2", &[ColumnDef::new("t2", "id", "integer")]);

    let result = run_default(&source, &destination);

    let position = |name: &str| {
        result
            .differences
            .iter()
            .position(|d| d.object_name == name)
            .unwrap()
    };
    assert!(position("i") < position("t"));
    assert!(position("fk") < position("t"));
}

#[test]
fn summary_matches_difference_list_after_any_run() {
    let source = rich_snapshot("src");
    let mut destination = rich_snapshot("dst");
    add_table(
        &mut destination,
        "payments",
        &[ColumnDef::new("payments", "id", "integer")],
    );

    let result = run_default(&source, &destination);

    assert_eq!(result.summary.total_differences(), result.differences.len());
    assert!(result.summary.total_differences() > 0);
}

#[test]
fn temp_table_preset_filters_matching_tables_out() {
    let mut source = SchemaSnapshot::new("src", "public");
    add_table(&mut source, "temp_orders", &[ColumnDef::new("temp_orders", "id", "integer")]);
    add_table(&mut source, "orders", &[ColumnDef::new("orders", "id", "integer")]);
    let destination = SchemaSnapshot::new("dst", "public");

    let filter = ComparisonFilter::preset(FilterPreset::ExcludeTempTables);
    let result = ComparisonEngine::new(filter).run(&source, &destination);

    let names: Vec<&str> = result
        .differences
        .iter()
        .map(|d| d.object_name.as_str())
        .collect();
    assert!(names.contains(&"orders"));
    assert!(!names.contains(&"temp_orders"));
}

#[test]
fn excluded_object_type_is_not_scanned() {
    let mut source = rich_snapshot("src");
    source.add_object(
        ObjectKey::new("public", "extra_view", ObjectType::View),
        ObjectDefinition::View(ViewDef::new("extra_view", "select 1")),
    );
    let destination = rich_snapshot("dst");

    let filter = ComparisonFilter {
        excluded_object_types: vec![ObjectType::View],
        ..ComparisonFilter::default()
    };
    let result = ComparisonEngine::new(filter).run(&source, &destination);

    assert!(result.differences_by_object_type(ObjectType::View).is_empty());
}

#[test]
fn zero_deadline_fails_the_run_with_partial_state() {
    let source = rich_snapshot("src");
    let destination = SchemaSnapshot::new("dst", "public");

    let result = ComparisonEngine::new(ComparisonFilter::default())
        .deadline(Duration::ZERO)
        .run(&source, &destination);

    assert_eq!(result.state, RunState::Failed);
    assert!(result.error_message.as_deref().unwrap().contains("deadline"));
    assert!(!result.is_identical());
}

#[test]
fn mismatched_definition_shape_is_skipped_with_a_note() {
    let mut source = SchemaSnapshot::new("src", "public");
    // A table key pointing at a column definition cannot be compared
    source.add_object(
        ObjectKey::new("public", "broken", ObjectType::Table),
        ObjectDefinition::Column(ColumnDef::new("broken", "id", "integer")),
    );
    let destination = SchemaSnapshot::new("dst", "public");

    let result = run_default(&source, &destination);

    assert_eq!(result.state, RunState::Succeeded);
    assert_eq!(result.summary.total_differences(), 0);
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].contains("broken"));
}

#[test]
fn view_cycle_skips_ddl_for_members_but_keeps_the_rest() {
    let mut source = SchemaSnapshot::new("src", "public");
    let mut view_a = ViewDef::new("view_a", "select * from view_b");
    view_a.depends_on = vec!["view_b".to_string()];
    let mut view_b = ViewDef::new("view_b", "select * from view_a");
    view_b.depends_on = vec!["view_a".to_string()];
    source.add_object(
        ObjectKey::new("public", "view_a", ObjectType::View),
        ObjectDefinition::View(view_a),
    );
    source.add_object(
        ObjectKey::new("public", "view_b", ObjectType::View),
        ObjectDefinition::View(view_b),
    );
    add_table(&mut source, "orders", &[ColumnDef::new("orders", "id", "integer")]);
    let destination = SchemaSnapshot::new("dst", "public");

    let result = run_default(&source, &destination);

    // All three differences are still reported
    assert_eq!(result.summary.total_differences(), 3);
    assert!(result.warnings.iter().any(|w| w.contains("cycle")));

    let cyclic: Vec<_> = result
        .differences
        .iter()
        .filter(|d| d.object_type == ObjectType::View)
        .collect();
    assert!(cyclic.iter().all(|d| d.generated_ddl.is_none()));

    let table = result
        .differences
        .iter()
        .find(|d| d.object_name == "orders")
        .unwrap();
    assert!(table.generated_ddl.is_some());
}

#[test]
fn modified_view_body_is_breaking_via_its_definition_attribute() {
    let mut source = SchemaSnapshot::new("src", "public");
    source.add_object(
        ObjectKey::new("public", "v", ObjectType::View),
        ObjectDefinition::View(ViewDef::new("v", "select id from orders")),
    );
    let mut destination = SchemaSnapshot::new("dst", "public");
    destination.add_object(
        ObjectKey::new("public", "v", ObjectType::View),
        ObjectDefinition::View(ViewDef::new("v", "select id, status from orders")),
    );

    let result = run_default(&source, &destination);

    assert_eq!(result.summary.total_differences(), 1);
    let diff = &result.differences[0];
    assert_eq!(diff.severity, Severity::Breaking);
    assert_eq!(diff.attribute_differences[0].attribute_name, "definition");
    assert!(result.has_breaking_changes());
}

#[test]
fn script_concatenates_drops_before_creates() {
    let mut source = SchemaSnapshot::new("src", "public");
    source.add_object(
        ObjectKey::new("public", "ix_new", ObjectType::Index),
        ObjectDefinition::Index(IndexDef::new("orders", "ix_new", vec!["id".into()])),
    );
    let mut destination = SchemaSnapshot::new("dst", "public");
    destination.add_object(
        ObjectKey::new("public", "ix_old", ObjectType::Index),
        ObjectDefinition::Index(IndexDef::new("orders", "ix_old", vec!["id".into()])),
    );

    let result = run_default(&source, &destination);
    let script = result.migration_script();

    let drop_pos = script.find("DROP INDEX IF EXISTS public.ix_old").unwrap();
    let create_pos = script.find("CREATE INDEX IF NOT EXISTS ix_new").unwrap();
    assert!(drop_pos < create_pos);
}

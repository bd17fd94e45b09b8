//! Integration tests for end-to-end migration planning.
//!
//! Each test builds an old and a new snapshot, plans the migration and
//! checks the detected changes, their order and the generated SQL.

mod common;

use common::*;
use schemashift::prelude::*;

// =============================================================================
// Adding a nullable column
// =============================================================================

#[test]
fn nullable_column_addition_is_single_low_risk_change() {
    let old = Schema::new().table(
        Table::new("User")
            .column(Column::new("id", "INTEGER").primary_key())
            .column(Column::new("email", "TEXT")),
    );
    let new = Schema::new().table(
        Table::new("User")
            .column(Column::new("id", "INTEGER").primary_key())
            .column(Column::new("email", "TEXT"))
            .column(Column::new("name", "TEXT").optional()),
    );

    let plan = plan(&old, &new);
    assert_eq!(plan.changes.len(), 1);

    let change = &plan.changes[0];
    assert_eq!(change.change_type(), ChangeType::ColumnAdded);
    assert_eq!(change.table(), "User");
    assert_eq!(change.column(), Some("name"));
    assert_eq!(change.risk, RiskLevel::Low);
    assert!(change.sql.starts_with("ALTER TABLE \"User\" ADD COLUMN \"name\" "));
    assert!(change.sql.ends_with(';'));
    assert_eq!(plan.complexity, Complexity::Simple);
}

// =============================================================================
// Missing tables are not dropped by default
// =============================================================================

#[test]
fn missing_table_is_omitted_without_include_drops() {
    let old = blog_v1();
    let new = Schema::new().table(user_v1());

    let plan = plan(&old, &new);
    assert!(changes_for(&plan, "Post").is_empty());
    assert!(!plan.forward_sql.contains("Post"));
    assert!(plan.is_empty());
}

#[test]
fn missing_table_is_dropped_with_include_drops() {
    let old = blog_v1();
    let new = Schema::new().table(user_v1());

    let plan = plan_with(&old, &new, &with_drops());
    assert_eq!(change_types(&plan), vec![ChangeType::TableRemoved]);
    assert_eq!(plan.changes[0].risk, RiskLevel::High);
    assert_eq!(plan.breaking_changes, 1);
    assert_eq!(plan.forward_sql, "DROP TABLE \"Post\";");
    assert!(plan
        .rollback_sql
        .as_deref()
        .unwrap()
        .starts_with("-- Cannot automatically roll back table_removed on Post"));
}

// =============================================================================
// Table rename detected through identical columns
// =============================================================================

#[test]
fn identical_columns_under_new_name_is_a_rename() {
    let old = Schema::new().table(
        Table::new("Customer")
            .column(Column::new("id", "INTEGER").primary_key())
            .column(Column::new("name", "TEXT")),
    );
    let new = Schema::new().table(
        Table::new("Client")
            .column(Column::new("id", "INTEGER").primary_key())
            .column(Column::new("name", "TEXT")),
    );

    let plan = plan(&old, &new);
    assert_eq!(plan.changes.len(), 1);
    match &plan.changes[0].kind {
        ChangeKind::TableRenamed { old_name, new_name } => {
            assert_eq!(old_name, "Customer");
            assert_eq!(new_name, "Client");
        }
        other => panic!("Expected TableRenamed, got {other:?}"),
    }
    assert_eq!(plan.changes[0].risk, RiskLevel::Medium);
    assert_eq!(
        plan.forward_sql,
        "ALTER TABLE \"Customer\" RENAME TO \"Client\";"
    );
    assert_eq!(
        plan.rollback_sql.as_deref(),
        Some("ALTER TABLE \"Client\" RENAME TO \"Customer\";")
    );
}

// =============================================================================
// Foreign key retargeted
// =============================================================================

#[test]
fn foreign_key_target_change_is_removal_then_addition() {
    let team = Table::new("Team").column(Column::new("id", "INTEGER").primary_key());
    let old = blog_v1().table(team.clone());
    let new = Schema::new().table(user_v1()).table(team).table(
        Table::new("Post")
            .column(Column::new("id", "INTEGER").primary_key())
            .column(Column::new("title", "TEXT"))
            .column(Column::new("author_id", "INTEGER").references(Reference::new("Team", "id")))
            .index(Index::new(["author_id"])),
    );

    let plan = plan(&old, &new);
    let column_changes: Vec<&Change> = plan
        .changes
        .iter()
        .filter(|c| c.column() == Some("author_id"))
        .collect();

    assert_eq!(column_changes.len(), 2);
    assert_eq!(column_changes[0].change_type(), ChangeType::ForeignKeyRemoved);
    assert_eq!(column_changes[1].change_type(), ChangeType::ForeignKeyAdded);
    assert_eq!(
        plan.forward_sql,
        "ALTER TABLE \"Post\" DROP CONSTRAINT \"Post_author_id_fkey\";\n\n\
         ALTER TABLE \"Post\" ADD CONSTRAINT \"Post_author_id_fkey\" FOREIGN KEY (\"author_id\") \
         REFERENCES \"Team\" (\"id\");"
    );
}

// =============================================================================
// Empty old schema
// =============================================================================

#[test]
fn empty_old_schema_only_creates_tables() {
    let new = blog_v2();
    let plan = plan(&Schema::new(), &new);

    assert_eq!(plan.changes.len(), new.tables.len());
    assert!(plan
        .changes
        .iter()
        .all(|c| c.change_type() == ChangeType::TableAdded));
    assert_eq!(plan.breaking_changes, 0);

    // Article references User, so User is created first.
    let order: Vec<&str> = plan.changes.iter().map(Change::table).collect();
    assert_eq!(order, vec!["User", "Article", "Tag"]);
}

#[test]
fn created_table_includes_constraints_and_indexes() {
    let plan = plan(&Schema::new(), &blog_v1());
    assert_eq!(
        plan.changes[1].sql,
        "CREATE TABLE \"Post\" (\n  \"id\" INTEGER PRIMARY KEY,\n  \"title\" TEXT NOT NULL,\n  \
         \"author_id\" INTEGER NOT NULL REFERENCES \"User\" (\"id\") ON DELETE CASCADE\n);\n\
         CREATE INDEX \"idx_Post_author_id\" ON \"Post\" (\"author_id\");"
    );
}

// =============================================================================
// Everything at once
// =============================================================================

#[test]
fn full_blog_migration_is_ordered_by_phase() {
    let plan = plan(&blog_v1(), &blog_v2());

    assert_eq!(
        change_types(&plan),
        vec![
            ChangeType::TableRenamed,
            ChangeType::TableAdded,
            ChangeType::ColumnTypeChanged,
            ChangeType::ColumnConstraintRemoved,
            ChangeType::ColumnAdded,
            ChangeType::ColumnAdded,
        ]
    );

    // Post and Article share every column, so Post is renamed, and the
    // index and foreign key survive the rename untouched.
    assert!(changes_for(&plan, "Article")
        .iter()
        .all(|c| c.change_type() == ChangeType::TableRenamed));

    let unique_drop = &plan.changes[3];
    assert_eq!(
        unique_drop.sql,
        "ALTER TABLE \"User\" DROP CONSTRAINT \"User_email_key\";"
    );

    // "active" is NOT NULL with a default: medium with a backfill warning.
    let active = plan
        .changes
        .iter()
        .find(|c| c.column() == Some("active"))
        .unwrap();
    assert_eq!(active.risk, RiskLevel::Medium);
    assert!(active.warnings[0].contains("backfills"));

    assert_eq!(plan.breaking_changes, 1);
    assert_eq!(plan.complexity, Complexity::Moderate);
}

#[test]
fn schema_name_qualifies_tables() {
    let options = DiffOptions::default().with_schema_name("blog");
    let plan = plan_with(&Schema::new(), &Schema::new().table(user_v1()), &options);

    assert!(plan.forward_sql.starts_with("CREATE TABLE \"blog\".\"User\" ("));
    assert_eq!(plan.rollback_sql.as_deref(), Some("DROP TABLE \"blog\".\"User\";"));
}

#[test]
fn sqlite_plan_flags_unsupported_alterations() {
    let old = Schema::new().table(user_v1());
    let new = Schema::new().table(
        Table::new("User")
            .column(Column::new("id", "INTEGER").primary_key())
            .column(Column::new("email", "TEXT").unique()),
    );

    let plan = plan_migration(&old, &new, &DiffOptions::default(), &SqliteDialect::new()).unwrap();
    assert_eq!(plan.dialect, "sqlite");
    assert!(plan.forward_sql.starts_with("-- ALTER COLUMN email TYPE not directly supported"));
    assert!(plan
        .rollback_sql
        .as_deref()
        .unwrap()
        .starts_with("-- Rollback not implemented for column_type_changed on User.email"));
}

#[test]
fn report_covers_every_section() {
    let plan = plan_with(&blog_v1(), &blog_v2(), &with_drops());
    let report = format_migration_report(&plan);

    assert!(report.contains("High risk (1)"));
    assert!(report.contains("Medium risk"));
    assert!(report.contains("Low risk"));
    assert!(report.contains("[table_renamed] Article"));
    assert!(report.contains("Forward SQL"));
    assert!(report.contains("Rollback SQL"));
}

// =============================================================================
// Dependency-safe ordering
// =============================================================================

#[test]
fn dropped_foreign_key_precedes_dropped_target_table() {
    let old = blog_v1();
    let new = Schema::new().table(
        Table::new("Post")
            .column(Column::new("id", "INTEGER").primary_key())
            .column(Column::new("title", "TEXT")),
    );

    let plan = plan_with(&old, &new, &with_drops());
    assert_eq!(
        change_types(&plan),
        vec![
            ChangeType::ForeignKeyRemoved,
            ChangeType::IndexRemoved,
            ChangeType::TableRemoved,
            ChangeType::ColumnRemoved,
        ]
    );
    assert_eq!(
        plan.forward_sql,
        "ALTER TABLE \"Post\" DROP CONSTRAINT \"Post_author_id_fkey\";\n\n\
         DROP INDEX \"idx_Post_author_id\";\n\n\
         DROP TABLE \"User\";\n\n\
         ALTER TABLE \"Post\" DROP COLUMN \"author_id\";"
    );
}

#[test]
fn reference_to_added_column_is_added_after_the_column() {
    let old = Schema::new().table(user_v1());
    let new = Schema::new()
        .table(user_v1().column(Column::new("code", "TEXT").unique()))
        .table(
            Table::new("Badge")
                .column(Column::new("id", "INTEGER").primary_key())
                .column(Column::new("user_code", "TEXT").references(Reference::new("User", "code"))),
        );

    let plan = plan(&old, &new);
    assert_eq!(
        plan.forward_sql,
        "CREATE TABLE \"Badge\" (\n  \"id\" INTEGER PRIMARY KEY,\n  \"user_code\" TEXT NOT NULL\n);\n\n\
         ALTER TABLE \"User\" ADD COLUMN \"code\" TEXT NOT NULL UNIQUE;\n\n\
         ALTER TABLE \"Badge\" ADD CONSTRAINT \"Badge_user_code_fkey\" FOREIGN KEY (\"user_code\") \
         REFERENCES \"User\" (\"code\");"
    );
}

// =============================================================================
// MySQL
// =============================================================================

#[test]
fn mysql_type_change_keeps_nullability_and_default() {
    let table = |data_type: &str| {
        Table::new("User")
            .column(Column::new("id", "INT").primary_key())
            .column(Column::new("age", data_type).default("0"))
    };
    let old = Schema::new().table(table("INT"));
    let new = Schema::new().table(table("BIGINT"));

    let plan = plan_migration(&old, &new, &DiffOptions::default(), &MySqlDialect::new()).unwrap();
    assert_eq!(
        plan.forward_sql,
        "ALTER TABLE `User` MODIFY COLUMN `age` BIGINT NOT NULL DEFAULT 0;"
    );
    assert_eq!(
        plan.rollback_sql.as_deref(),
        Some("ALTER TABLE `User` MODIFY COLUMN `age` INT NOT NULL DEFAULT 0;")
    );
}

#[test]
fn mysql_declares_foreign_keys_as_constraints() {
    let plan = plan_migration(&Schema::new(), &blog_v1(), &DiffOptions::default(), &MySqlDialect::new())
        .unwrap();

    assert!(plan.forward_sql.contains(
        "`author_id` INTEGER NOT NULL,\n  CONSTRAINT `Post_author_id_fkey` FOREIGN KEY (`author_id`) \
         REFERENCES `User` (`id`) ON DELETE CASCADE\n);"
    ));
}

#![allow(dead_code)]

use schemashift::prelude::*;

pub fn plan(old: &Schema, new: &Schema) -> MigrationPlan {
    plan_with(old, new, &DiffOptions::default())
}

pub fn plan_with(old: &Schema, new: &Schema, options: &DiffOptions) -> MigrationPlan {
    diff_schemas(old, new, options)
        .unwrap_or_else(|e| panic!("Failed to plan migration: {e}"))
}

pub fn with_drops() -> DiffOptions {
    DiffOptions::default().with_include_drops(true)
}

pub fn change_types(plan: &MigrationPlan) -> Vec<ChangeType> {
    plan.changes.iter().map(Change::change_type).collect()
}

pub fn changes_for<'a>(plan: &'a MigrationPlan, table: &str) -> Vec<&'a Change> {
    plan.changes.iter().filter(|c| c.table() == table).collect()
}

pub fn user_v1() -> Table {
    Table::new("User")
        .column(Column::new("id", "INTEGER").primary_key())
        .column(Column::new("email", "VARCHAR(255)").unique())
}

pub fn post_v1() -> Table {
    Table::new("Post")
        .column(Column::new("id", "INTEGER").primary_key())
        .column(Column::new("title", "TEXT"))
        .column(
            Column::new("author_id", "INTEGER")
                .references(Reference::new("User", "id").on_delete(ReferentialAction::Cascade)),
        )
        .index(Index::new(["author_id"]))
}

pub fn blog_v1() -> Schema {
    Schema::new().table(user_v1()).table(post_v1())
}

/// A second version of the blog touching every detector.
pub fn blog_v2() -> Schema {
    Schema::new()
        .table(
            Table::new("User")
                .column(Column::new("id", "INTEGER").primary_key())
                .column(Column::new("email", "VARCHAR(320)"))
                .column(Column::new("display_name", "TEXT").optional())
                .column(Column::new("active", "BOOLEAN").default("true")),
        )
        .table(
            Table::new("Article")
                .column(Column::new("id", "INTEGER").primary_key())
                .column(Column::new("title", "TEXT"))
                .column(
                    Column::new("author_id", "INTEGER").references(
                        Reference::new("User", "id").on_delete(ReferentialAction::Cascade),
                    ),
                )
                .index(Index::new(["author_id"])),
        )
        .table(
            Table::new("Tag")
                .column(Column::new("id", "INTEGER").primary_key())
                .column(Column::new("label", "TEXT").unique()),
        )
}

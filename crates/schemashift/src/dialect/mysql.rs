//! MySQL / MariaDB dialect.
//!
//! Identifiers are quoted with backticks. MySQL has no standalone type or
//! nullability change: `MODIFY COLUMN` replaces the whole definition, so it
//! restates the nullability and default along with the type. Column-level
//! `REFERENCES` clauses are parsed but ignored by InnoDB, so foreign keys are
//! declared as named table constraints. Constraints are dropped by their
//! index or foreign key name rather than with `DROP CONSTRAINT`.

use crate::schema::Column;

use super::{MigrationDialect, Statement, StatementKind};

/// MySQL migration dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

impl MySqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn alter_table(table: &str) -> Statement {
    Statement::new(StatementKind::AlterTable, table)
        .keyword("ALTER TABLE")
        .object(table)
}

/// `MODIFY COLUMN` with the full column definition.
fn modify_column(table: &str, column: &Column) -> Statement {
    let stmt = alter_table(table)
        .keyword("MODIFY COLUMN")
        .ident(&column.name)
        .raw(&column.data_type)
        .keyword(if column.is_optional { "NULL" } else { "NOT NULL" });
    match &column.default {
        Some(expr) => stmt.keyword("DEFAULT").raw(expr),
        None => stmt,
    }
}

impl MigrationDialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    fn rename_table(&self, old_name: &str, new_name: &str) -> Statement {
        Statement::new(StatementKind::AlterTable, old_name)
            .keyword("RENAME TABLE")
            .object(old_name)
            .keyword("TO")
            .object(new_name)
    }

    fn inline_references(&self) -> bool {
        false
    }

    fn alter_column_type(&self, table: &str, column: &Column) -> Statement {
        modify_column(table, column)
    }

    fn set_nullable(&self, table: &str, column: &Column) -> Statement {
        modify_column(table, column)
    }

    fn drop_unique(&self, table: &str, name: &str) -> Statement {
        alter_table(table).keyword("DROP INDEX").ident(name)
    }

    fn drop_foreign_key(&self, table: &str, name: &str) -> Statement {
        alter_table(table).keyword("DROP FOREIGN KEY").ident(name)
    }

    fn drop_index(&self, table: &str, name: &str) -> Statement {
        Statement::new(StatementKind::DropIndex, name)
            .keyword("DROP INDEX")
            .ident(name)
            .keyword("ON")
            .object(table)
    }
}

//! SQLite dialect for migrations.
//!
//! SQLite has limited ALTER TABLE support: column type, nullability and
//! default changes, as well as adding or dropping foreign keys, require
//! the "table recreation" strategy (create a new table, copy data, drop the
//! old table, rename the new table). Those operations are emitted as
//! unsupported placeholders. UNIQUE constraints are managed through unique
//! indexes.

use crate::schema::{Column, Reference};

use super::{MigrationDialect, Statement, StatementKind};

/// SQLite migration dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn recreation_required(table: &str, what: &str) -> Statement {
        Statement::unsupported(
            table,
            format!("{what} not directly supported in SQLite. Table recreation required for: {table}"),
        )
    }
}

impl MigrationDialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn alter_column_type(&self, table: &str, column: &Column) -> Statement {
        Self::recreation_required(table, &format!("ALTER COLUMN {} TYPE", column.name))
    }

    fn set_nullable(&self, table: &str, column: &Column) -> Statement {
        let what = if column.is_optional {
            "DROP NOT NULL"
        } else {
            "SET NOT NULL"
        };
        Self::recreation_required(table, &format!("ALTER COLUMN {} {what}", column.name))
    }

    fn set_default(&self, table: &str, column: &str, _default: Option<&str>) -> Statement {
        Self::recreation_required(table, &format!("ALTER COLUMN {column} DEFAULT"))
    }

    fn add_unique(&self, table: &str, column: &str, name: &str) -> Statement {
        Statement::new(StatementKind::CreateIndex, table)
            .keyword("CREATE UNIQUE INDEX")
            .ident(name)
            .keyword("ON")
            .object(table)
            .ident_list([column])
    }

    fn drop_unique(&self, table: &str, name: &str) -> Statement {
        self.drop_index(table, name)
    }

    fn add_foreign_key(
        &self,
        table: &str,
        _column: &str,
        name: &str,
        _reference: &Reference,
    ) -> Statement {
        Self::recreation_required(table, &format!("ADD CONSTRAINT {name}"))
    }

    fn drop_foreign_key(&self, table: &str, name: &str) -> Statement {
        Self::recreation_required(table, &format!("DROP CONSTRAINT {name}"))
    }
}

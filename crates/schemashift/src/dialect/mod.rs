//! Database dialect implementations.
//!
//! Each dialect knows how to turn a detected change into SQL for that
//! database system. The default method bodies of [`MigrationDialect`] emit
//! ANSI SQL with double-quoted identifiers (PostgreSQL compatible); other
//! dialects override only what differs.

mod ansi;
mod mysql;
mod sqlite;
mod statement;

pub use ansi::AnsiDialect;
pub use mysql::MySqlDialect;
pub use sqlite::SqliteDialect;
pub use statement::{Fragment, Statement, StatementKind};

use crate::change::{foreign_key_name, ChangeKind, ColumnConstraint};
use crate::error::{Result, SchemaShiftError};
use crate::schema::{Column, Index, Reference, Table};

/// Returns the dialect registered under `name`.
pub fn from_name(name: &str) -> Result<Box<dyn MigrationDialect>> {
    match name.to_ascii_lowercase().as_str() {
        "ansi" | "postgres" | "postgresql" => Ok(Box::new(AnsiDialect::new())),
        "mysql" | "mariadb" => Ok(Box::new(MySqlDialect::new())),
        "sqlite" => Ok(Box::new(SqliteDialect::new())),
        _ => Err(SchemaShiftError::UnknownDialect(name.to_string())),
    }
}

/// Column definition fragments shared by `CREATE TABLE` and `ADD COLUMN`.
///
/// `inline_pk` puts `PRIMARY KEY` on the column itself; it implies
/// NOT NULL and UNIQUE so neither is repeated.
#[must_use]
pub fn column_definition(column: &Column, inline_pk: bool) -> Vec<Fragment> {
    let mut parts = vec![
        Fragment::Ident(column.name.clone()),
        Fragment::Raw(column.data_type.clone()),
    ];

    if inline_pk {
        parts.push(Fragment::Keyword("PRIMARY KEY"));
    } else {
        if !column.is_optional {
            parts.push(Fragment::Keyword("NOT NULL"));
        }
        if column.is_unique {
            parts.push(Fragment::Keyword("UNIQUE"));
        }
    }

    if let Some(default) = &column.default {
        parts.push(Fragment::Keyword("DEFAULT"));
        parts.push(Fragment::Raw(default.clone()));
    }

    if let Some(reference) = &column.references {
        parts.push(Fragment::Keyword("REFERENCES"));
        parts.push(Fragment::Object(reference.table.clone()));
        parts.push(Fragment::IdentList(vec![reference.column.clone()]));
        parts.extend(referential_actions(reference));
    }

    parts
}

/// `ON DELETE` / `ON UPDATE` fragments of a reference.
fn referential_actions(reference: &Reference) -> Vec<Fragment> {
    let mut parts = Vec::new();
    if let Some(action) = reference.on_delete {
        parts.push(Fragment::Keyword("ON DELETE"));
        parts.push(Fragment::Keyword(action.to_sql()));
    }
    if let Some(action) = reference.on_update {
        parts.push(Fragment::Keyword("ON UPDATE"));
        parts.push(Fragment::Keyword(action.to_sql()));
    }
    parts
}

/// `CONSTRAINT name FOREIGN KEY (column) REFERENCES ...` fragments.
fn foreign_key_constraint(name: &str, column: &str, reference: &Reference) -> Vec<Fragment> {
    let mut parts = vec![
        Fragment::Keyword("CONSTRAINT"),
        Fragment::Ident(name.to_string()),
        Fragment::Keyword("FOREIGN KEY"),
        Fragment::IdentList(vec![column.to_string()]),
        Fragment::Keyword("REFERENCES"),
        Fragment::Object(reference.table.clone()),
        Fragment::IdentList(vec![reference.column.clone()]),
    ];
    parts.extend(referential_actions(reference));
    parts
}

fn alter_table(table: &str) -> Statement {
    Statement::new(StatementKind::AlterTable, table)
        .keyword("ALTER TABLE")
        .object(table)
}

/// Trait for database-specific SQL generation.
pub trait MigrationDialect: Send + Sync {
    /// Returns the dialect name.
    fn name(&self) -> &'static str;

    /// Quote an identifier (table name, column name, etc.).
    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Quote an object name, prefixing the schema when one is given.
    fn qualify(&self, name: &str, schema: Option<&str>) -> String {
        match schema {
            Some(schema) => format!(
                "{}.{}",
                self.quote_identifier(schema),
                self.quote_identifier(name)
            ),
            None => self.quote_identifier(name),
        }
    }

    /// Whether column-level `REFERENCES` clauses create a foreign key.
    ///
    /// When false, foreign keys are declared as named table constraints
    /// instead.
    fn inline_references(&self) -> bool {
        true
    }

    /// Column definition as declared in `CREATE TABLE` and `ADD COLUMN`.
    fn column_fragments(&self, column: &Column, inline_pk: bool) -> Vec<Fragment> {
        if self.inline_references() || column.references.is_none() {
            return column_definition(column, inline_pk);
        }
        let detached = Column {
            references: None,
            ..column.clone()
        };
        column_definition(&detached, inline_pk)
    }

    /// Builds the statements for a change.
    fn statements(&self, change: &ChangeKind) -> Vec<Statement> {
        match change {
            ChangeKind::TableAdded { table } => self.create_table(table),
            ChangeKind::TableRemoved { table } => vec![self.drop_table(&table.name)],
            ChangeKind::TableRenamed { old_name, new_name } => {
                vec![self.rename_table(old_name, new_name)]
            }
            ChangeKind::ColumnAdded { table, column } => {
                let mut statements = vec![self.add_column(table, column)];
                if let Some(reference) = column.references.as_ref().filter(|_| !self.inline_references()) {
                    let name = foreign_key_name(table, &column.name);
                    statements.push(self.add_foreign_key(table, &column.name, &name, reference));
                }
                statements
            }
            ChangeKind::ColumnRemoved { table, column } => {
                vec![self.drop_column(table, &column.name)]
            }
            ChangeKind::ColumnRenamed {
                table,
                old_name,
                new_name,
            } => vec![self.rename_column(table, old_name, new_name)],
            ChangeKind::ColumnTypeChanged {
                table,
                column,
                new_type,
                is_optional,
                default,
                ..
            } => {
                let target = Column {
                    is_optional: *is_optional,
                    default: default.clone(),
                    ..Column::new(column, new_type)
                };
                vec![self.alter_column_type(table, &target)]
            }
            ChangeKind::ColumnConstraintAdded {
                table,
                column,
                constraint,
                data_type,
                default,
            } => vec![match constraint {
                ColumnConstraint::NotNull => {
                    let target = Column {
                        default: default.clone(),
                        ..Column::new(column, data_type)
                    };
                    self.set_nullable(table, &target)
                }
                ColumnConstraint::Unique { name } => self.add_unique(table, column, name),
            }],
            ChangeKind::ColumnConstraintRemoved {
                table,
                column,
                constraint,
                data_type,
                default,
            } => vec![match constraint {
                ColumnConstraint::NotNull => {
                    let target = Column {
                        default: default.clone(),
                        ..Column::new(column, data_type).optional()
                    };
                    self.set_nullable(table, &target)
                }
                ColumnConstraint::Unique { name } => self.drop_unique(table, name),
            }],
            ChangeKind::ColumnDefaultChanged {
                table,
                column,
                new_default,
                ..
            } => vec![self.set_default(table, column, new_default.as_deref())],
            ChangeKind::ForeignKeyAdded {
                table,
                column,
                constraint_name,
                reference,
            } => vec![self.add_foreign_key(table, column, constraint_name, reference)],
            ChangeKind::ForeignKeyRemoved {
                table,
                constraint_name,
                ..
            } => vec![self.drop_foreign_key(table, constraint_name)],
            ChangeKind::IndexAdded { table, index } => vec![self.create_index(table, index)],
            ChangeKind::IndexRemoved { table, index } => {
                vec![self.drop_index(table, &index.resolved_name(table))]
            }
        }
    }

    /// `CREATE TABLE` followed by one `CREATE INDEX` per index.
    ///
    /// A single primary key column is declared inline; several produce a
    /// trailing `PRIMARY KEY (...)` line.
    fn create_table(&self, table: &Table) -> Vec<Statement> {
        let pk = table.primary_key_columns();
        let inline_pk = match pk.as_slice() {
            [single] => Some(*single),
            _ => None,
        };

        let mut lines: Vec<Vec<Fragment>> = table
            .columns
            .iter()
            .map(|c| self.column_fragments(c, inline_pk == Some(c.name.as_str())))
            .collect();
        if pk.len() > 1 {
            lines.push(vec![
                Fragment::Keyword("PRIMARY KEY"),
                Fragment::IdentList(pk.iter().map(ToString::to_string).collect()),
            ]);
        }
        if !self.inline_references() {
            lines.extend(table.columns.iter().filter_map(|c| {
                let reference = c.references.as_ref()?;
                let name = foreign_key_name(&table.name, &c.name);
                Some(foreign_key_constraint(&name, &c.name, reference))
            }));
        }

        let mut statements = vec![Statement::new(StatementKind::CreateTable, &table.name)
            .keyword("CREATE TABLE")
            .object(&table.name)
            .definitions(lines)];
        statements.extend(
            table
                .indexes
                .iter()
                .map(|index| self.create_index(&table.name, index)),
        );
        statements
    }

    /// `DROP TABLE`.
    fn drop_table(&self, name: &str) -> Statement {
        Statement::new(StatementKind::DropTable, name)
            .keyword("DROP TABLE")
            .object(name)
    }

    /// Table rename.
    fn rename_table(&self, old_name: &str, new_name: &str) -> Statement {
        alter_table(old_name).keyword("RENAME TO").ident(new_name)
    }

    /// `ADD COLUMN`.
    fn add_column(&self, table: &str, column: &Column) -> Statement {
        alter_table(table)
            .keyword("ADD COLUMN")
            .extend(self.column_fragments(column, false))
    }

    /// `DROP COLUMN`.
    fn drop_column(&self, table: &str, column: &str) -> Statement {
        alter_table(table).keyword("DROP COLUMN").ident(column)
    }

    /// `RENAME COLUMN`.
    fn rename_column(&self, table: &str, old_name: &str, new_name: &str) -> Statement {
        alter_table(table)
            .keyword("RENAME COLUMN")
            .ident(old_name)
            .keyword("TO")
            .ident(new_name)
    }

    /// Column type change. `column` carries the new type along with the
    /// nullability and default in effect.
    fn alter_column_type(&self, table: &str, column: &Column) -> Statement {
        alter_table(table)
            .keyword("ALTER COLUMN")
            .ident(&column.name)
            .keyword("TYPE")
            .raw(&column.data_type)
    }

    /// `SET NOT NULL` / `DROP NOT NULL`, towards `column.is_optional`.
    fn set_nullable(&self, table: &str, column: &Column) -> Statement {
        alter_table(table)
            .keyword("ALTER COLUMN")
            .ident(&column.name)
            .keyword(if column.is_optional {
                "DROP NOT NULL"
            } else {
                "SET NOT NULL"
            })
    }

    /// Named UNIQUE constraint.
    fn add_unique(&self, table: &str, column: &str, name: &str) -> Statement {
        alter_table(table)
            .keyword("ADD CONSTRAINT")
            .ident(name)
            .keyword("UNIQUE")
            .ident_list([column])
    }

    /// Drops a named UNIQUE constraint.
    fn drop_unique(&self, table: &str, name: &str) -> Statement {
        alter_table(table).keyword("DROP CONSTRAINT").ident(name)
    }

    /// `SET DEFAULT` / `DROP DEFAULT`.
    fn set_default(&self, table: &str, column: &str, default: Option<&str>) -> Statement {
        let stmt = alter_table(table).keyword("ALTER COLUMN").ident(column);
        match default {
            Some(expr) => stmt.keyword("SET DEFAULT").raw(expr),
            None => stmt.keyword("DROP DEFAULT"),
        }
    }

    /// Named foreign key constraint.
    fn add_foreign_key(
        &self,
        table: &str,
        column: &str,
        name: &str,
        reference: &Reference,
    ) -> Statement {
        alter_table(table)
            .keyword("ADD")
            .extend(foreign_key_constraint(name, column, reference))
    }

    /// Drops a named foreign key constraint.
    fn drop_foreign_key(&self, table: &str, name: &str) -> Statement {
        alter_table(table).keyword("DROP CONSTRAINT").ident(name)
    }

    /// `CREATE [UNIQUE] INDEX`.
    fn create_index(&self, table: &str, index: &Index) -> Statement {
        let name = index.resolved_name(table);
        Statement::new(StatementKind::CreateIndex, table)
            .keyword(if index.unique {
                "CREATE UNIQUE INDEX"
            } else {
                "CREATE INDEX"
            })
            .ident(name)
            .keyword("ON")
            .object(table)
            .ident_list(index.columns.iter().cloned())
    }

    /// `DROP INDEX`.
    fn drop_index(&self, _table: &str, name: &str) -> Statement {
        Statement::new(StatementKind::DropIndex, name)
            .keyword("DROP INDEX")
            .object(name)
    }

    /// Renders one fragment.
    fn render_fragment(&self, fragment: &Fragment, schema: Option<&str>) -> String {
        match fragment {
            Fragment::Keyword(keyword) => (*keyword).to_string(),
            Fragment::Ident(name) => self.quote_identifier(name),
            Fragment::Object(name) => self.qualify(name, schema),
            Fragment::IdentList(names) => {
                let quoted: Vec<String> = names.iter().map(|n| self.quote_identifier(n)).collect();
                format!("({})", quoted.join(", "))
            }
            Fragment::Raw(sql) => sql.clone(),
            Fragment::Definitions(lines) => {
                let rendered: Vec<String> = lines
                    .iter()
                    .map(|line| {
                        line.iter()
                            .map(|f| self.render_fragment(f, schema))
                            .collect::<Vec<_>>()
                            .join(" ")
                    })
                    .collect();
                format!("(\n  {}\n)", rendered.join(",\n  "))
            }
        }
    }

    /// Renders a statement. SQL statements end with `;`, comments are
    /// prefixed with `--` on every line.
    fn render(&self, statement: &Statement, schema: Option<&str>) -> String {
        let body = statement
            .fragments
            .iter()
            .map(|f| self.render_fragment(f, schema))
            .collect::<Vec<_>>()
            .join(" ");
        if statement.is_comment() {
            body.lines()
                .map(|line| format!("-- {line}"))
                .collect::<Vec<_>>()
                .join("\n")
        } else {
            format!("{body};")
        }
    }

    /// Renders every statement of a change, one per line.
    fn generate_sql(&self, change: &ChangeKind, schema: Option<&str>) -> String {
        self.statements(change)
            .iter()
            .map(|s| self.render(s, schema))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ReferentialAction;

    #[test]
    fn test_from_name() {
        assert_eq!(from_name("ansi").unwrap().name(), "ansi");
        assert_eq!(from_name("PostgreSQL").unwrap().name(), "ansi");
        assert_eq!(from_name("mysql").unwrap().name(), "mysql");
        assert_eq!(from_name("sqlite").unwrap().name(), "sqlite");
        assert!(matches!(
            from_name("oracle"),
            Err(SchemaShiftError::UnknownDialect(name)) if name == "oracle"
        ));
    }

    #[test]
    fn test_column_definition() {
        let d = AnsiDialect::new();
        let col = Column::new("org_id", "BIGINT").unique().references(
            Reference::new("orgs", "id")
                .on_delete(ReferentialAction::Cascade)
                .on_update(ReferentialAction::NoAction),
        );
        let rendered: Vec<String> = column_definition(&col, false)
            .iter()
            .map(|f| d.render_fragment(f, None))
            .collect();
        assert_eq!(
            rendered.join(" "),
            "\"org_id\" BIGINT NOT NULL UNIQUE REFERENCES \"orgs\" (\"id\") \
             ON DELETE CASCADE ON UPDATE NO ACTION"
        );
    }

    #[test]
    fn test_inline_primary_key_skips_not_null() {
        let d = AnsiDialect::new();
        let col = Column::new("id", "INTEGER").primary_key();
        let rendered: Vec<String> = column_definition(&col, true)
            .iter()
            .map(|f| d.render_fragment(f, None))
            .collect();
        assert_eq!(rendered.join(" "), "\"id\" INTEGER PRIMARY KEY");
    }

    #[test]
    fn test_comment_rendering() {
        let d = AnsiDialect::new();
        let stmt = Statement::comment("users", "line one\nline two");
        assert_eq!(d.render(&stmt, None), "-- line one\n-- line two");
    }

    #[test]
    fn test_quote_identifier_escapes_quotes() {
        assert_eq!(AnsiDialect::new().quote_identifier("a\"b"), "\"a\"\"b\"");
    }
}

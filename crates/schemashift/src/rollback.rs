//! Rollback script generation.

use tracing::debug;

use crate::change::Change;
use crate::dialect::{MigrationDialect, Statement};

/// Builds a best-effort script undoing `changes`.
///
/// Changes are walked in reverse. Every change contributes either its
/// inverse SQL or a comment explaining why it has none, so the script always
/// accounts for the whole plan.
#[must_use]
pub fn generate_rollback(
    changes: &[Change],
    dialect: &dyn MigrationDialect,
    schema: Option<&str>,
) -> String {
    let mut blocks = Vec::with_capacity(changes.len());

    for change in changes.iter().rev() {
        let Some(inverse) = change.kind.reverse() else {
            debug!(change = %change.change_type(), target = %change.target(), "No automatic rollback");
            let note = format!(
                "Cannot automatically roll back {} on {}: the dropped data is not recoverable",
                change.change_type(),
                change.target()
            );
            blocks.push(dialect.render(&Statement::comment(change.table(), note), schema));
            continue;
        };

        let statements = dialect.statements(&inverse);
        if statements.iter().any(|s| s.is_unsupported()) {
            let note = format!(
                "Rollback not implemented for {} on {} in the {} dialect",
                change.change_type(),
                change.target(),
                dialect.name()
            );
            blocks.push(dialect.render(&Statement::comment(change.table(), note), schema));
            continue;
        }

        blocks.push(
            statements
                .iter()
                .map(|s| dialect.render(s, schema))
                .collect::<Vec<_>>()
                .join("\n"),
        );
    }

    blocks.join("\n\n")
}

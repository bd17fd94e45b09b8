//! ANSI / PostgreSQL dialect.
//!
//! The trait defaults already produce this dialect's SQL; this type only
//! names it.

use super::MigrationDialect;

/// ANSI SQL migration dialect, compatible with PostgreSQL.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiDialect;

impl AnsiDialect {
    /// Creates a new ANSI dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl MigrationDialect for AnsiDialect {
    fn name(&self) -> &'static str {
        "ansi"
    }
}

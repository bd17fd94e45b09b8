//! Diff and planning options.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaShiftError};

/// Schema name that is never used as a qualifier.
pub const DEFAULT_SCHEMA: &str = "public";

/// Default similarity threshold for rename detection.
pub const DEFAULT_RENAME_THRESHOLD: f64 = 0.7;

/// Options controlling detection and SQL generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiffOptions {
    /// Report table and column removals.
    pub include_drops: bool,
    /// Produce rollback SQL.
    pub generate_rollback: bool,
    /// Schema qualifier for table names; `public` means unqualified.
    pub schema_name: String,
    /// Whether callers may apply destructive SQL. Detection ignores it.
    pub allow_destructive: bool,
    /// Minimum similarity for rename detection, in `[0.0, 1.0]`.
    pub rename_threshold: f64,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            include_drops: false,
            generate_rollback: true,
            schema_name: DEFAULT_SCHEMA.to_string(),
            allow_destructive: false,
            rename_threshold: DEFAULT_RENAME_THRESHOLD,
        }
    }
}

impl DiffOptions {
    /// Creates options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether removals are reported.
    #[must_use]
    pub const fn with_include_drops(mut self, include_drops: bool) -> Self {
        self.include_drops = include_drops;
        self
    }

    /// Sets whether rollback SQL is produced.
    #[must_use]
    pub const fn with_rollback(mut self, generate_rollback: bool) -> Self {
        self.generate_rollback = generate_rollback;
        self
    }

    /// Sets the schema qualifier.
    #[must_use]
    pub fn with_schema_name(mut self, schema_name: impl Into<String>) -> Self {
        self.schema_name = schema_name.into();
        self
    }

    /// Sets whether destructive SQL may be applied.
    #[must_use]
    pub const fn with_allow_destructive(mut self, allow_destructive: bool) -> Self {
        self.allow_destructive = allow_destructive;
        self
    }

    /// Sets the rename similarity threshold.
    #[must_use]
    pub const fn with_rename_threshold(mut self, rename_threshold: f64) -> Self {
        self.rename_threshold = rename_threshold;
        self
    }

    /// Rejects options that cannot produce a meaningful plan.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.rename_threshold) {
            return Err(SchemaShiftError::InvalidOption {
                option: "rename_threshold",
                reason: format!("must be within [0.0, 1.0], got {}", self.rename_threshold),
            });
        }
        if self.schema_name.trim().is_empty() {
            return Err(SchemaShiftError::InvalidOption {
                option: "schema_name",
                reason: "must not be empty".to_string(),
            });
        }
        if self.schema_name.contains(['"', '`']) {
            return Err(SchemaShiftError::InvalidOption {
                option: "schema_name",
                reason: format!("must not contain quote characters, got {}", self.schema_name),
            });
        }
        Ok(())
    }

    /// Schema to prefix table names with, or `None` for `public`.
    #[must_use]
    pub fn schema_qualifier(&self) -> Option<&str> {
        if self.schema_name == DEFAULT_SCHEMA {
            None
        } else {
            Some(&self.schema_name)
        }
    }
}

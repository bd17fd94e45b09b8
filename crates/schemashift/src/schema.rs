//! Schema representation types.
//!
//! These types are the dialect-agnostic intermediate representation (IR)
//! every importer produces and every exporter consumes. The diff engine only
//! reads them: snapshots are built once by the parsing collaborators and are
//! never mutated by a diff.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaShiftError};

/// Referential action for `ON DELETE` / `ON UPDATE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferentialAction {
    /// No action (error if the referenced row is deleted/updated).
    #[serde(rename = "NO ACTION", alias = "no_action")]
    NoAction,
    /// Restrict (same as `NoAction` but checked immediately).
    #[serde(rename = "RESTRICT", alias = "restrict")]
    Restrict,
    /// Cascade the delete/update to referencing rows.
    #[serde(rename = "CASCADE", alias = "cascade")]
    Cascade,
    /// Set the referencing column to NULL.
    #[serde(rename = "SET NULL", alias = "set_null")]
    SetNull,
    /// Set the referencing column to its default value.
    #[serde(rename = "SET DEFAULT", alias = "set_default")]
    SetDefault,
}

impl ReferentialAction {
    /// Returns the SQL representation of this action.
    #[must_use]
    pub const fn to_sql(self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }
}

/// Foreign key target of a single column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    /// Referenced table name.
    pub table: String,
    /// Referenced column name.
    pub column: String,
    /// Action on delete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<ReferentialAction>,
    /// Action on update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<ReferentialAction>,
}

impl Reference {
    /// Creates a reference without referential actions.
    #[must_use]
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            on_delete: None,
            on_update: None,
        }
    }

    /// Sets the ON DELETE action.
    #[must_use]
    pub const fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    /// Sets the ON UPDATE action.
    #[must_use]
    pub const fn on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = Some(action);
        self
    }
}

/// Schema definition for a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Dialect-agnostic type token, e.g. `VARCHAR(255)`.
    #[serde(rename = "type")]
    pub data_type: String,
    /// Whether this column is (part of) the primary key.
    #[serde(default)]
    pub is_primary_key: bool,
    /// Whether the column allows NULL values.
    #[serde(default)]
    pub is_optional: bool,
    /// Whether this column has a UNIQUE constraint.
    #[serde(default)]
    pub is_unique: bool,
    /// Raw default value expression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Foreign key reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<Reference>,
}

impl Column {
    /// Creates a NOT NULL column without constraints.
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_primary_key: false,
            is_optional: false,
            is_unique: false,
            default: None,
            references: None,
        }
    }

    /// Marks the column as the primary key.
    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    /// Marks the column as nullable.
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    /// Marks the column as unique.
    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    /// Sets the default expression.
    #[must_use]
    pub fn default(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }

    /// Sets the foreign key reference.
    #[must_use]
    pub fn references(mut self, reference: Reference) -> Self {
        self.references = Some(reference);
        self
    }

    /// The `name:type` token used for column-set similarity.
    #[must_use]
    pub fn signature(&self) -> String {
        format!("{}:{}", self.name, normalize_type(&self.data_type))
    }
}

/// Normalizes a type token for comparison: upper case, collapsed whitespace,
/// no spaces around parentheses or commas.
#[must_use]
pub fn normalize_type(data_type: &str) -> String {
    let collapsed = data_type.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .to_uppercase()
        .replace(" (", "(")
        .replace("( ", "(")
        .replace(" )", ")")
        .replace(" ,", ",")
        .replace(", ", ",")
}

/// Schema definition for an index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Index {
    /// Index name; derived from the table and columns when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Columns included in the index, in order.
    pub columns: Vec<String>,
    /// Whether this is a unique index.
    #[serde(default)]
    pub unique: bool,
}

impl Index {
    /// Creates a non-unique index over the given columns.
    #[must_use]
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: None,
            columns: columns.into_iter().map(Into::into).collect(),
            unique: false,
        }
    }

    /// Makes this a unique index.
    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Sets an explicit index name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Two indexes are equivalent if they cover the same ordered columns
    /// with the same uniqueness. Names are ignored because they may differ
    /// between environments.
    #[must_use]
    pub fn equivalent(&self, other: &Self) -> bool {
        self.columns == other.columns && self.unique == other.unique
    }

    /// Returns the explicit name or the derived `idx_`/`uq_` name.
    #[must_use]
    pub fn resolved_name(&self, table: &str) -> String {
        self.name.clone().unwrap_or_else(|| {
            let prefix = if self.unique { "uq" } else { "idx" };
            format!("{prefix}_{table}_{}", self.columns.join("_"))
        })
    }
}

/// Complete schema definition for a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    /// Table name.
    pub name: String,
    /// Column definitions, in declaration order.
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Composite primary key column names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<Vec<String>>,
    /// Index definitions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<Index>,
}

impl Table {
    /// Creates a new table without columns.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: None,
            indexes: Vec::new(),
        }
    }

    /// Adds a column to the table.
    #[must_use]
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Sets the composite primary key columns.
    #[must_use]
    pub fn primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Adds an index.
    #[must_use]
    pub fn index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    /// Gets a column by name.
    #[must_use]
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns the primary key column names: the composite list when
    /// present, otherwise every column flagged as primary key.
    #[must_use]
    pub fn primary_key_columns(&self) -> Vec<&str> {
        match &self.primary_key {
            Some(columns) if !columns.is_empty() => columns.iter().map(String::as_str).collect(),
            _ => self
                .columns
                .iter()
                .filter(|c| c.is_primary_key)
                .map(|c| c.name.as_str())
                .collect(),
        }
    }

    /// Names of other tables this table references through foreign keys.
    pub fn referenced_tables(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter_map(|c| c.references.as_ref())
            .map(|r| r.table.as_str())
            .filter(move |t| *t != self.name)
    }
}

/// An ordered collection of tables: one snapshot of a schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// All tables, in snapshot order.
    #[serde(default)]
    pub tables: Vec<Table>,
}

impl Schema {
    /// Creates a new empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table to the schema.
    #[must_use]
    pub fn table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    /// Gets a table by name.
    #[must_use]
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Returns table names.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.name.as_str())
    }

    /// Decodes a snapshot from its JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a snapshot from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|source| SchemaShiftError::Snapshot {
            path: path.to_path_buf(),
            source,
        })
    }
}

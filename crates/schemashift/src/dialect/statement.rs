//! Structured DDL statements.
//!
//! Statements are assembled from fragments and only turned into text by a
//! [`MigrationDialect`](super::MigrationDialect), so quoting and schema
//! qualification stay out of the detection logic.

/// Broad category of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    /// `CREATE TABLE`.
    CreateTable,
    /// `DROP TABLE`.
    DropTable,
    /// `ALTER TABLE` (and MySQL's `RENAME TABLE`).
    AlterTable,
    /// `CREATE INDEX`.
    CreateIndex,
    /// `DROP INDEX`.
    DropIndex,
    /// Informational comment, rendered as `-- ...`.
    Comment,
    /// The dialect cannot express the operation; rendered as a comment.
    Unsupported,
}

/// A piece of a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Emitted verbatim.
    Keyword(&'static str),
    /// Quoted identifier (column, constraint or index name).
    Ident(String),
    /// Quoted, schema-qualified object name (tables).
    Object(String),
    /// Parenthesised, comma-separated list of quoted identifiers.
    IdentList(Vec<String>),
    /// Raw SQL text: type tokens, default expressions.
    Raw(String),
    /// Parenthesised definitions, one per line (`CREATE TABLE` body).
    Definitions(Vec<Vec<Fragment>>),
}

/// A single DDL statement before rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Statement category.
    pub kind: StatementKind,
    /// Table (or index) the statement acts on.
    pub target: String,
    /// Statement body.
    pub fragments: Vec<Fragment>,
}

impl Statement {
    /// Creates an empty statement.
    #[must_use]
    pub fn new(kind: StatementKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
            fragments: Vec::new(),
        }
    }

    /// Creates a comment statement.
    #[must_use]
    pub fn comment(target: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(StatementKind::Comment, target).raw(text)
    }

    /// Creates a placeholder for an operation the dialect cannot express.
    #[must_use]
    pub fn unsupported(target: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(StatementKind::Unsupported, target).raw(text)
    }

    /// Returns true if the statement renders as a comment.
    #[must_use]
    pub fn is_comment(&self) -> bool {
        matches!(self.kind, StatementKind::Comment | StatementKind::Unsupported)
    }

    /// Returns true if the dialect could not express the operation.
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        self.kind == StatementKind::Unsupported
    }

    /// Appends a keyword.
    #[must_use]
    pub fn keyword(mut self, keyword: &'static str) -> Self {
        self.fragments.push(Fragment::Keyword(keyword));
        self
    }

    /// Appends a quoted identifier.
    #[must_use]
    pub fn ident(mut self, name: impl Into<String>) -> Self {
        self.fragments.push(Fragment::Ident(name.into()));
        self
    }

    /// Appends a qualified object name.
    #[must_use]
    pub fn object(mut self, name: impl Into<String>) -> Self {
        self.fragments.push(Fragment::Object(name.into()));
        self
    }

    /// Appends a parenthesised identifier list.
    #[must_use]
    pub fn ident_list<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fragments
            .push(Fragment::IdentList(names.into_iter().map(Into::into).collect()));
        self
    }

    /// Appends raw SQL.
    #[must_use]
    pub fn raw(mut self, sql: impl Into<String>) -> Self {
        self.fragments.push(Fragment::Raw(sql.into()));
        self
    }

    /// Appends several fragments.
    #[must_use]
    pub fn extend(mut self, fragments: impl IntoIterator<Item = Fragment>) -> Self {
        self.fragments.extend(fragments);
        self
    }

    /// Appends a definitions block.
    #[must_use]
    pub fn definitions(mut self, lines: Vec<Vec<Fragment>>) -> Self {
        self.fragments.push(Fragment::Definitions(lines));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_fragments() {
        let stmt = Statement::new(StatementKind::AlterTable, "users")
            .keyword("ALTER TABLE")
            .object("users")
            .keyword("DROP COLUMN")
            .ident("email");

        assert_eq!(stmt.target, "users");
        assert_eq!(stmt.fragments.len(), 4);
        assert_eq!(stmt.fragments[1], Fragment::Object("users".to_string()));
        assert!(!stmt.is_comment());
    }

    #[test]
    fn test_unsupported_is_comment() {
        let stmt = Statement::unsupported("users", "nope");
        assert!(stmt.is_comment());
        assert!(stmt.is_unsupported());
        assert!(!Statement::comment("users", "note").is_unsupported());
    }
}

//! Error types for the query parser.

use std::path::PathBuf;

/// Errors that can occur while parsing and typing query files.
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    /// The PostgreSQL grammar rejected the input.
    #[error("syntax error: {0}")]
    ParseSyntax(String),

    /// The query uses a shape the rebuilt query cannot express.
    #[error("{0}")]
    Unsupported(String),

    /// The server rejected the prepared statement.
    #[error("prepare: {0}")]
    Prepare(String),

    /// The number of columns or arguments reported by the server differs from
    /// the number found in the query text.
    #[error("expected {expected} {what}, got {got}")]
    TypeCountMismatch {
        /// `columns` or `args`.
        what: &'static str,
        /// Count reported by the server.
        expected: usize,
        /// Count found by the parser.
        got: usize,
    },

    /// A statement has no leading `-- name` comment.
    #[error("no comment before statement at byte {0}")]
    MissingQueryComment(usize),

    /// A `*` target carries a configuration comment.
    #[error("no comments after STAR column")]
    StarAfterPrefixed,

    /// Two edit rules touch the same bytes.
    #[error("overlapping edit rules: rule at {start}..{end} starts before cursor {cursor}")]
    OverlappingEditRules {
        /// Start of the rejected rule.
        start: usize,
        /// End of the rejected rule.
        end: usize,
        /// Position already consumed by earlier rules.
        cursor: usize,
    },

    /// An edit rule points outside of the input.
    #[error("out of bounds: {0}")]
    OutOfBounds(usize),

    /// A file contained no statements.
    #[error("no statements found")]
    NoStatements,

    /// Database error during introspection or typing.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error while reading query files or configuration.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration file.
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Multiple errors occurred.
    #[error("multiple errors occurred:\n{}", .0.iter().map(|e| format!("  - {e}")).collect::<Vec<_>>().join("\n"))]
    Multiple(Vec<GenError>),

    /// An error inside a specific file.
    #[error("{}: {source}", .path.display())]
    InFile {
        /// The file being parsed.
        path: PathBuf,
        /// The underlying error.
        source: Box<GenError>,
    },
}

impl GenError {
    /// Collapses a list of errors: none is `Ok`, one is returned as is, more
    /// become [`GenError::Multiple`].
    ///
    /// # Errors
    ///
    /// Returns the collected errors when the list is not empty.
    pub fn collect(mut errors: Vec<Self>) -> Result<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(Self::Multiple(errors)),
        }
    }
}

impl From<pg_query::Error> for GenError {
    fn from(err: pg_query::Error) -> Self {
        Self::ParseSyntax(err.to_string())
    }
}

/// Result type for parser operations.
pub type Result<T> = std::result::Result<T, GenError>;

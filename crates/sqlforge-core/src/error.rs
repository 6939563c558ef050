//! Error types for rendering and executing queries.

/// Errors that can occur while rendering or executing a query.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A clause is not available in the active dialect.
    #[error("{clause} is not supported by the {dialect} dialect")]
    DialectMismatch {
        /// The clause that was rendered.
        clause: &'static str,
        /// Name of the active dialect.
        dialect: &'static str,
    },

    /// A VALUES clause (or query) with no rows.
    #[error("VALUES requires at least one row")]
    EmptyValues,

    /// An UPDATE or DO UPDATE without assignments.
    #[error("SET requires at least one assignment")]
    EmptySet,

    /// A nested expression failed to render.
    #[error("{path}: {source}")]
    Sub {
        /// The clause path leading to the failing expression.
        path: String,
        /// The underlying error.
        #[source]
        source: Box<RenderError>,
    },

    /// A raw fragment has a different number of `?` than arguments.
    #[error("raw fragment has {placeholders} placeholders but {args} arguments")]
    RawPlaceholderMismatch {
        /// Number of `?` found in the fragment.
        placeholders: usize,
        /// Number of arguments supplied.
        args: usize,
    },

    /// A CASE expression without any WHEN branch.
    #[error("CASE requires at least one WHEN branch")]
    MissingCaseWhen,

    /// A window frame without RANGE, ROWS or GROUPS.
    #[error("window frame has no mode")]
    MissingFrameMode,

    /// A window frame without a start bound.
    #[error("window frame has no start")]
    MissingFrameStart,

    /// A named argument was not supplied.
    #[error("named argument '{0}' was not supplied")]
    MissingNamedArg(String),

    /// The executor reported a failure.
    #[error("executor error: {0}")]
    Executor(String),
}

impl RenderError {
    /// Wraps the error with the clause path it occurred in.
    #[must_use]
    pub fn within(self, path: impl Into<String>) -> Self {
        match self {
            Self::Sub { path: inner, source } => Self::Sub {
                path: format!("{}.{inner}", path.into()),
                source,
            },
            other => Self::Sub {
                path: path.into(),
                source: Box::new(other),
            },
        }
    }

    /// Returns the innermost error, skipping path wrappers.
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::Sub { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;

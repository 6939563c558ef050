//! UNION, INTERSECT and EXCEPT.

use crate::error::Result;
use crate::expr::Expr;
use crate::render::{Expression, Writer};

/// Set operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineStrategy {
    /// `UNION`.
    Union,
    /// `INTERSECT`.
    Intersect,
    /// `EXCEPT`.
    Except,
}

impl CombineStrategy {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Union => "UNION",
            Self::Intersect => "INTERSECT",
            Self::Except => "EXCEPT",
        }
    }
}

/// `STRATEGY [ALL] query`.
#[derive(Debug, Clone)]
pub struct Combine {
    /// Set operation.
    pub strategy: CombineStrategy,
    /// Renders `ALL`.
    pub all: bool,
    /// The combined query.
    pub query: Expr,
}

impl Expression for Combine {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        w.write_str(self.strategy.as_str());
        w.write_str(if self.all { " ALL " } else { " " });
        w.express(&self.query)
    }
}

//! SQL Dialect support.
//!
//! Different databases have slightly different SQL syntax. This module provides
//! a trait for dialect-specific behavior: how placeholders are numbered, how
//! identifiers are quoted and which clauses may be rendered at all.

mod generic;
mod postgres;

pub use generic::GenericDialect;
pub use postgres::Postgres;

use crate::error::{RenderError, Result};

/// Trait for SQL dialect-specific behavior.
pub trait Dialect: Send + Sync {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the identifier quote character.
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Writes the placeholder for the argument at `position` (1-based).
    fn write_arg(&self, w: &mut String, position: usize);

    /// Writes a dot-separated quoted identifier, doubling embedded quotes.
    fn write_quoted(&self, w: &mut String, segments: &[&str]) {
        let quote = self.identifier_quote();
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                w.push('.');
            }
            w.push(quote);
            for c in segment.chars() {
                if c == quote {
                    w.push(quote);
                }
                w.push(c);
            }
            w.push(quote);
        }
    }

    /// Returns whether the dialect supports RETURNING clause.
    fn supports_returning(&self) -> bool {
        false
    }

    /// Returns whether the dialect supports UPSERT (ON CONFLICT).
    fn supports_upsert(&self) -> bool {
        false
    }

    /// Returns whether the dialect supports MERGE statements.
    fn supports_merge(&self) -> bool {
        false
    }

    /// Returns whether the dialect supports `DISTINCT ON (...)`.
    fn supports_distinct_on(&self) -> bool {
        false
    }

    /// Returns whether the dialect supports `FOR UPDATE` style row locks.
    fn supports_locking(&self) -> bool {
        false
    }
}

/// Fails with [`RenderError::DialectMismatch`] unless `supported` holds.
pub(crate) fn require(d: &dyn Dialect, supported: bool, clause: &'static str) -> Result<()> {
    if supported {
        Ok(())
    } else {
        Err(RenderError::DialectMismatch {
            clause,
            dialect: d.name(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_quoted_segments() {
        let mut w = String::new();
        Postgres.write_quoted(&mut w, &["public", "users"]);
        assert_eq!(w, r#""public"."users""#);
    }

    #[test]
    fn test_write_quoted_doubles_quotes() {
        let mut w = String::new();
        Postgres.write_quoted(&mut w, &[r#"we"ird"#]);
        assert_eq!(w, r#""we""ird""#);
    }

    #[test]
    fn test_require() {
        assert!(require(&Postgres, true, "MERGE").is_ok());
        let err = require(&GenericDialect, false, "MERGE").unwrap_err();
        assert_eq!(err.to_string(), "MERGE is not supported by the generic dialect");
    }
}

//! PostgreSQL dialect.

use std::fmt::Write;

use super::Dialect;

/// PostgreSQL: `$N` placeholders and the full clause set.
#[derive(Debug, Default, Clone, Copy)]
pub struct Postgres;

impl Postgres {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn write_arg(&self, w: &mut String, position: usize) {
        let _ = write!(w, "${position}");
    }

    fn supports_returning(&self) -> bool {
        true
    }

    fn supports_upsert(&self) -> bool {
        true
    }

    fn supports_merge(&self) -> bool {
        true
    }

    fn supports_distinct_on(&self) -> bool {
        true
    }

    fn supports_locking(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_placeholders() {
        let mut w = String::new();
        Postgres::new().write_arg(&mut w, 1);
        w.push_str(", ");
        Postgres::new().write_arg(&mut w, 12);
        assert_eq!(w, "$1, $12");
    }

    #[test]
    fn test_postgres_features() {
        let d = Postgres::new();
        assert_eq!(d.name(), "postgres");
        assert!(d.supports_returning());
        assert!(d.supports_upsert());
        assert!(d.supports_merge());
        assert!(d.supports_distinct_on());
    }
}

//! Generic SQL dialect.

use super::Dialect;

/// A generic SQL dialect using ANSI SQL standards and `?` placeholders.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericDialect;

impl GenericDialect {
    /// Creates a new generic dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for GenericDialect {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn write_arg(&self, w: &mut String, _position: usize) {
        w.push('?');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_dialect() {
        let dialect = GenericDialect::new();
        assert_eq!(dialect.name(), "generic");
        assert_eq!(dialect.identifier_quote(), '"');
        assert!(!dialect.supports_returning());
        assert!(!dialect.supports_upsert());
        assert!(!dialect.supports_merge());

        let mut w = String::new();
        dialect.write_arg(&mut w, 3);
        assert_eq!(w, "?");
    }
}

//! Qualified column lists.

use crate::error::Result;
use crate::render::{Expression, Writer};

/// A list of columns rendered as `"parent"."col" AS "prefixcol", ...`.
#[derive(Debug, Clone, Default)]
pub struct ColumnsExpr {
    parent: Vec<String>,
    names: Vec<String>,
    prefix: String,
    alias_disabled: bool,
}

impl ColumnsExpr {
    /// Creates a column list, dropping empty names.
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names
                .into_iter()
                .map(Into::into)
                .filter(|n: &String| !n.is_empty())
                .collect(),
            ..Self::default()
        }
    }

    /// Returns the column names.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Qualifies every column with `parent` segments.
    #[must_use]
    pub fn with_parent<I, S>(mut self, parent: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parent = parent.into_iter().map(Into::into).collect();
        self
    }

    /// Prefixes every alias.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Omits the `AS "alias"` part.
    #[must_use]
    pub const fn without_alias(mut self) -> Self {
        self.alias_disabled = true;
        self
    }

    /// Keeps only the given columns.
    #[must_use]
    pub fn only(mut self, cols: &[&str]) -> Self {
        self.names.retain(|n| cols.contains(&n.as_str()));
        self
    }

    /// Drops the given columns.
    #[must_use]
    pub fn except(mut self, cols: &[&str]) -> Self {
        self.names.retain(|n| !cols.contains(&n.as_str()));
        self
    }
}

impl Expression for ColumnsExpr {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        let parent: Vec<&str> = self
            .parent
            .iter()
            .map(String::as_str)
            .filter(|p| !p.is_empty())
            .collect();

        for (i, name) in self.names.iter().enumerate() {
            if i > 0 {
                w.write_str(", ");
            }
            let mut segments = parent.clone();
            segments.push(name);
            w.write_quoted(&segments);

            if !self.alias_disabled {
                w.write_str(" AS ");
                w.write_quoted(&[format!("{}{name}", self.prefix)]);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Postgres;
    use crate::render::{render, Context};

    fn sql(c: &ColumnsExpr) -> String {
        render(c, &Context::new(), &Postgres, 0).unwrap().0
    }

    #[test]
    fn test_columns_with_parent_and_prefix() {
        let c = ColumnsExpr::new(["id", "name"])
            .with_parent(["users"])
            .with_prefix("u.");
        assert_eq!(
            sql(&c),
            r#""users"."id" AS "u.id", "users"."name" AS "u.name""#
        );
    }

    #[test]
    fn test_columns_only_except() {
        let c = ColumnsExpr::new(["a", "b", "c", ""]);
        assert_eq!(c.names().len(), 3);
        assert_eq!(sql(&c.clone().only(&["a"]).without_alias()), r#""a""#);
        assert_eq!(sql(&c.except(&["a", "b"])), r#""c" AS "c""#);
    }
}

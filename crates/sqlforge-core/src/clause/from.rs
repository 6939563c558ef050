//! Table references, FROM items and joins.

use crate::error::Result;
use crate::expr::Expr;
use crate::render::{Expression, Writer};

/// A FROM item: `[ONLY] [LATERAL] expr [WITH ORDINALITY] [AS "a"][("c", ...)]`
/// followed by its joins.
#[derive(Debug, Clone, Default)]
pub struct TableRef {
    /// The table, function or subquery.
    pub expr: Option<Expr>,
    /// Renders `ONLY`.
    pub only: bool,
    /// Renders `LATERAL`.
    pub lateral: bool,
    /// Renders `WITH ORDINALITY`.
    pub with_ordinality: bool,
    /// Optional alias.
    pub alias: Option<String>,
    /// Column aliases.
    pub columns: Vec<String>,
    /// Joins attached to this item.
    pub joins: Vec<Join>,
}

impl TableRef {
    /// Creates a reference to `expr`.
    #[must_use]
    pub fn new(expr: impl Into<Expr>) -> Self {
        Self {
            expr: Some(expr.into()),
            ..Self::default()
        }
    }

    /// Returns true when no table is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.expr.is_none()
    }

    /// Sets the alias.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Sets column aliases.
    #[must_use]
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Renders `ONLY`.
    #[must_use]
    pub const fn only(mut self) -> Self {
        self.only = true;
        self
    }

    /// Renders `LATERAL`.
    #[must_use]
    pub const fn lateral(mut self) -> Self {
        self.lateral = true;
        self
    }

    /// Renders `WITH ORDINALITY`.
    #[must_use]
    pub const fn with_ordinality(mut self) -> Self {
        self.with_ordinality = true;
        self
    }
}

impl Expression for TableRef {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        let Some(expr) = &self.expr else {
            return Ok(());
        };

        if self.only {
            w.write_str("ONLY ");
        }
        if self.lateral {
            w.write_str("LATERAL ");
        }
        w.express(expr)?;
        if self.with_ordinality {
            w.write_str(" WITH ORDINALITY");
        }
        if let Some(alias) = &self.alias {
            w.write_str(" AS ");
            w.write_quoted(&[alias]);
        }
        if !self.columns.is_empty() {
            w.write_char('(');
            write_quoted_list(w, &self.columns);
            w.write_char(')');
        }
        w.express_slice(&self.joins, "\n", "\n", "")
    }
}

pub(crate) fn write_quoted_list(w: &mut Writer<'_>, names: &[String]) {
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            w.write_str(", ");
        }
        w.write_quoted(&[name]);
    }
}

/// An INSERT target: `expr [AS "alias"] [("c1", "c2")]`.
#[derive(Debug, Clone, Default)]
pub struct Table {
    /// The table expression.
    pub expr: Option<Expr>,
    /// Optional alias.
    pub alias: Option<String>,
    /// Target columns.
    pub columns: Vec<String>,
}

impl Expression for Table {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        if let Some(expr) = &self.expr {
            w.express(expr)?;
        }
        if let Some(alias) = &self.alias {
            w.write_str(" AS ");
            w.write_quoted(&[alias]);
        }
        if !self.columns.is_empty() {
            w.write_str(" (");
            write_quoted_list(w, &self.columns);
            w.write_char(')');
        }
        Ok(())
    }
}

/// Join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// `INNER JOIN`.
    Inner,
    /// `LEFT JOIN`.
    Left,
    /// `RIGHT JOIN`.
    Right,
    /// `FULL JOIN`.
    Full,
    /// `CROSS JOIN`.
    Cross,
}

impl JoinKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Full => "FULL JOIN",
            Self::Cross => "CROSS JOIN",
        }
    }
}

/// `[NATURAL] kind to [ON a AND b] [USING ("c", ...)]`.
#[derive(Debug, Clone)]
pub struct Join {
    /// Join type.
    pub kind: JoinKind,
    /// Joined item.
    pub to: TableRef,
    /// Renders `NATURAL`.
    pub natural: bool,
    /// ON conditions, AND-joined.
    pub on: Vec<Expr>,
    /// USING columns.
    pub using: Vec<String>,
}

impl Join {
    /// Creates a join to `to`.
    #[must_use]
    pub const fn new(kind: JoinKind, to: TableRef) -> Self {
        Self {
            kind,
            to,
            natural: false,
            on: Vec::new(),
            using: Vec::new(),
        }
    }

    /// Adds an ON condition.
    #[must_use]
    pub fn on(mut self, condition: impl Into<Expr>) -> Self {
        self.on.push(condition.into());
        self
    }

    /// Adds USING columns.
    #[must_use]
    pub fn using<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.using.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Renders `NATURAL`.
    #[must_use]
    pub const fn natural(mut self) -> Self {
        self.natural = true;
        self
    }
}

impl Expression for Join {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        if self.natural {
            w.write_str("NATURAL ");
        }
        w.write_str(self.kind.as_str());
        w.write_char(' ');
        w.express(&self.to)?;
        w.express_slice(&self.on, " ON ", " AND ", "")?;
        if !self.using.is_empty() {
            w.write_str(" USING(");
            write_quoted_list(w, &self.using);
            w.write_char(')');
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Postgres;
    use crate::expr::{arg, quote, raw, Function, Functions};
    use crate::render::{render, Context};

    fn sql<E: Expression>(e: &E) -> String {
        render(e, &Context::new(), &Postgres, 0).unwrap().0
    }

    #[test]
    fn test_table_ref_full() {
        let t = TableRef::new(Functions(vec![Function::new(
            "generate_series",
            [arg(1), arg(3)],
        )]))
        .lateral()
        .with_ordinality()
        .alias("g")
        .columns(["n", "i"]);
        assert_eq!(
            sql(&t),
            r#"LATERAL generate_series($1, $2) WITH ORDINALITY AS "g"("n", "i")"#
        );
    }

    #[test]
    fn test_table_ref_with_joins() {
        let mut t = TableRef::new(raw("users")).alias("u");
        t.joins.push(
            Join::new(JoinKind::Left, TableRef::new(raw("orders")).alias("o"))
                .on(raw("o.user_id = u.id")),
        );
        t.joins
            .push(Join::new(JoinKind::Inner, TableRef::new(raw("teams"))).using(["team_id"]));
        assert_eq!(
            sql(&t),
            "users AS \"u\"\nLEFT JOIN orders AS \"o\" ON o.user_id = u.id\n\
             INNER JOIN teams USING(\"team_id\")"
        );
    }

    #[test]
    fn test_insert_table() {
        let t = Table {
            expr: Some(quote(["distributors"])),
            alias: Some("d".into()),
            columns: vec!["did".into(), "dname".into()],
        };
        assert_eq!(sql(&t), r#""distributors" AS "d" ("did", "dname")"#);
    }

    #[test]
    fn test_natural_join() {
        let j = Join::new(JoinKind::Cross, TableRef::new(raw("b"))).natural();
        assert_eq!(sql(&j), "NATURAL CROSS JOIN b");
    }
}

//! Chainable operators on [`Expr`].
//!
//! Every chained operator renders in parentheses, so a tree built by chaining
//! keeps its shape under SQL precedence: `a.minus(b.minus(c))` renders
//! `(a - (b - c))`.

use super::Expr;

impl Expr {
    fn binary(self, op: &'static str, rhs: impl Into<Self>) -> Self {
        Self::Group(vec![Self::Binary(Box::new(self), op, Box::new(rhs.into()))])
    }

    /// `(self = rhs)`.
    #[must_use]
    pub fn eq(self, rhs: impl Into<Self>) -> Self {
        self.binary("=", rhs)
    }

    /// `(self <> rhs)`.
    #[must_use]
    pub fn ne(self, rhs: impl Into<Self>) -> Self {
        self.binary("<>", rhs)
    }

    /// `(self < rhs)`.
    #[must_use]
    pub fn lt(self, rhs: impl Into<Self>) -> Self {
        self.binary("<", rhs)
    }

    /// `(self <= rhs)`.
    #[must_use]
    pub fn lte(self, rhs: impl Into<Self>) -> Self {
        self.binary("<=", rhs)
    }

    /// `(self > rhs)`.
    #[must_use]
    pub fn gt(self, rhs: impl Into<Self>) -> Self {
        self.binary(">", rhs)
    }

    /// `(self >= rhs)`.
    #[must_use]
    pub fn gte(self, rhs: impl Into<Self>) -> Self {
        self.binary(">=", rhs)
    }

    /// `(self IS DISTINCT FROM rhs)`.
    #[must_use]
    pub fn is_distinct_from(self, rhs: impl Into<Self>) -> Self {
        self.binary("IS DISTINCT FROM", rhs)
    }

    /// `(self IS NOT DISTINCT FROM rhs)`.
    #[must_use]
    pub fn is_not_distinct_from(self, rhs: impl Into<Self>) -> Self {
        self.binary("IS NOT DISTINCT FROM", rhs)
    }

    /// `(self LIKE pattern)`.
    #[must_use]
    pub fn like(self, pattern: impl Into<Self>) -> Self {
        self.binary("LIKE", pattern)
    }

    /// `(self NOT LIKE pattern)`.
    #[must_use]
    pub fn not_like(self, pattern: impl Into<Self>) -> Self {
        self.binary("NOT LIKE", pattern)
    }

    /// `(self ILIKE pattern)`.
    #[must_use]
    pub fn ilike(self, pattern: impl Into<Self>) -> Self {
        self.binary("ILIKE", pattern)
    }

    /// `(self + rhs)`.
    #[must_use]
    pub fn plus(self, rhs: impl Into<Self>) -> Self {
        self.binary("+", rhs)
    }

    /// `(self - rhs)`.
    #[must_use]
    pub fn minus(self, rhs: impl Into<Self>) -> Self {
        self.binary("-", rhs)
    }

    /// `(self * rhs)`.
    #[must_use]
    pub fn times(self, rhs: impl Into<Self>) -> Self {
        self.binary("*", rhs)
    }

    /// `(self / rhs)`.
    #[must_use]
    pub fn divided_by(self, rhs: impl Into<Self>) -> Self {
        self.binary("/", rhs)
    }

    /// `(self || rhs || ...)`; a single operand renders unchanged.
    #[must_use]
    pub fn concat<I, E>(self, rest: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Self>,
    {
        let mut exprs = vec![self];
        exprs.extend(rest.into_iter().map(Into::into));
        if exprs.len() == 1 {
            return exprs.remove(0);
        }
        Self::Group(vec![Self::Join(exprs, String::from(" || "))])
    }

    /// `(self AND rhs)`.
    #[must_use]
    pub fn and(self, rhs: impl Into<Self>) -> Self {
        Self::Group(vec![Self::Join(
            vec![self, rhs.into()],
            String::from(" AND "),
        )])
    }

    /// `(self OR rhs)`.
    #[must_use]
    pub fn or(self, rhs: impl Into<Self>) -> Self {
        Self::Group(vec![Self::Join(
            vec![self, rhs.into()],
            String::from(" OR "),
        )])
    }

    /// `NOT self`, grouping compound operands.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        let operand = match self {
            Self::Join(..)
            | Self::Binary(..)
            | Self::Between { .. }
            | Self::In { .. }
            | Self::Postfix(..) => {
                Self::Group(vec![self])
            }
            other => other,
        };
        Self::Prefix("NOT ", Box::new(operand))
    }

    /// `(self IS NULL)`.
    #[must_use]
    pub fn is_null(self) -> Self {
        Self::Group(vec![Self::Postfix(Box::new(self), " IS NULL")])
    }

    /// `(self IS NOT NULL)`.
    #[must_use]
    pub fn is_not_null(self) -> Self {
        Self::Group(vec![Self::Postfix(Box::new(self), " IS NOT NULL")])
    }

    /// `(self IN (items))`; an empty list renders `FALSE`.
    #[must_use]
    pub fn in_list<I, E>(self, items: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Self>,
    {
        self.in_impl(items.into_iter().map(Into::into).collect(), false)
    }

    /// `(self NOT IN (items))`; an empty list renders `TRUE`.
    #[must_use]
    pub fn not_in_list<I, E>(self, items: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Self>,
    {
        self.in_impl(items.into_iter().map(Into::into).collect(), true)
    }

    fn in_impl(self, items: Vec<Self>, negated: bool) -> Self {
        let empty = items.is_empty();
        let node = Self::In {
            expr: Box::new(self),
            items,
            negated,
        };
        if empty {
            node
        } else {
            Self::Group(vec![node])
        }
    }

    /// `(self BETWEEN low AND high)`.
    #[must_use]
    pub fn between(self, low: impl Into<Self>, high: impl Into<Self>) -> Self {
        self.between_impl(low.into(), high.into(), false, false)
    }

    /// `(self BETWEEN SYMMETRIC low AND high)`.
    #[must_use]
    pub fn between_symmetric(self, low: impl Into<Self>, high: impl Into<Self>) -> Self {
        self.between_impl(low.into(), high.into(), false, true)
    }

    /// `(self NOT BETWEEN low AND high)`.
    #[must_use]
    pub fn not_between(self, low: impl Into<Self>, high: impl Into<Self>) -> Self {
        self.between_impl(low.into(), high.into(), true, false)
    }

    fn between_impl(self, low: Self, high: Self, negated: bool, symmetric: bool) -> Self {
        Self::Group(vec![Self::Between {
            expr: Box::new(self),
            low: Box::new(low),
            high: Box::new(high),
            negated,
            symmetric,
        }])
    }

    /// `self AS "alias"`.
    #[must_use]
    pub fn as_(self, alias: impl Into<String>) -> Self {
        Self::As(Box::new(self), alias.into())
    }
}

#[cfg(test)]
mod tests {
    use crate::dialect::Postgres;
    use crate::expr::{arg, quote, raw, Expr};
    use crate::render::{render, Context};
    use crate::value::Value;

    fn sql(e: &Expr) -> String {
        render(e, &Context::new(), &Postgres, 0).unwrap().0
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(sql(&raw("a").eq(arg(1))), "(a = $1)");
        assert_eq!(sql(&raw("a").ne(arg(1))), "(a <> $1)");
        assert_eq!(sql(&raw("a").lte(arg(1))), "(a <= $1)");
        assert_eq!(sql(&raw("a").ilike(arg("x%"))), "(a ILIKE $1)");
        assert_eq!(sql(&raw("a").is_distinct_from(raw("b"))), "(a IS DISTINCT FROM b)");
    }

    #[test]
    fn test_between_variants() {
        assert_eq!(sql(&raw("a").between(arg(1), arg(2))), "(a BETWEEN $1 AND $2)");
        assert_eq!(
            sql(&raw("a").between_symmetric(arg(1), arg(2))),
            "(a BETWEEN SYMMETRIC $1 AND $2)"
        );
        assert_eq!(sql(&raw("a").not_between(arg(1), arg(2))), "(a NOT BETWEEN $1 AND $2)");
    }

    #[test]
    fn test_concat() {
        assert_eq!(sql(&raw("a").concat(Vec::<Expr>::new())), "a");
        assert_eq!(sql(&raw("a").concat([raw("b"), raw("c")])), "(a || b || c)");
    }

    #[test]
    fn test_not_groups_compound() {
        assert_eq!(sql(&raw("a").not()), "NOT a");
        assert_eq!(sql(&raw("a").and(raw("b")).not()), "NOT (a AND b)");
        assert_eq!(sql(&raw("a").eq(raw("b")).not()), "NOT (a = b)");
    }

    #[test]
    fn test_null_checks() {
        assert_eq!(sql(&raw("a").is_null()), "(a IS NULL)");
        assert_eq!(sql(&raw("a").is_not_null()), "(a IS NOT NULL)");
    }

    #[test]
    fn test_nested_operators_keep_their_shape() {
        let right_nested = quote(["a"]).minus(quote(["b"]).minus(quote(["c"])));
        assert_eq!(sql(&right_nested), r#"("a" - ("b" - "c"))"#);

        let (text, args) = render(
            &quote(["a"]).plus(quote(["b"])).times(arg(2)),
            &Context::new(),
            &Postgres,
            0,
        )
        .unwrap();
        assert_eq!(text, r#"(("a" + "b") * $1)"#);
        assert_eq!(args, vec![Value::Int(2)]);

        let chained = raw("x").eq(arg(1)).eq(raw("y").is_null());
        assert_eq!(sql(&chained), "((x = $1) = (y IS NULL))");

        let mixed = raw("a").or(raw("b")).and(raw("c").in_list([arg(1)]));
        assert_eq!(sql(&mixed), "((a OR b) AND (c IN ($1)))");
    }

    #[test]
    fn test_concat_inside_comparison() {
        let e = raw("a").concat([raw("b")]).eq(raw("c").between(raw("d"), raw("e")));
        assert_eq!(sql(&e), "((a || b) = (c BETWEEN d AND e))");
    }

    #[test]
    fn test_as_quotes_alias() {
        assert_eq!(sql(&raw("count(*)").as_("n")), r#"count(*) AS "n""#);
    }
}

//! CASE expressions.

use super::Expr;
use crate::error::{RenderError, Result};
use crate::render::{Expression, Writer};

/// `CASE WHEN c THEN r ... [ELSE e] END`.
#[derive(Debug, Clone, Default)]
pub struct Case {
    /// `(condition, result)` branches.
    pub whens: Vec<(Expr, Expr)>,
    /// Optional `ELSE` result.
    pub otherwise: Option<Expr>,
}

impl Case {
    /// Creates a CASE with no branches.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `WHEN condition THEN result` branch.
    #[must_use]
    pub fn when(mut self, condition: impl Into<Expr>, then: impl Into<Expr>) -> Self {
        self.whens.push((condition.into(), then.into()));
        self
    }

    /// Sets the `ELSE` result.
    #[must_use]
    pub fn otherwise(mut self, result: impl Into<Expr>) -> Self {
        self.otherwise = Some(result.into());
        self
    }
}

impl Expression for Case {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        if self.whens.is_empty() {
            return Err(RenderError::MissingCaseWhen);
        }

        w.write_str("CASE");
        for (condition, then) in &self.whens {
            w.write_str(" WHEN ");
            w.express(condition)?;
            w.write_str(" THEN ");
            w.express(then)?;
        }
        w.express_opt(self.otherwise.as_ref(), " ELSE ", "")?;
        w.write_str(" END");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Postgres;
    use crate::expr::{arg, raw, s};
    use crate::render::{render, Context};

    #[test]
    fn test_case_with_else() {
        let c = Case::new()
            .when(raw("a").gt(arg(1)), s("big"))
            .otherwise(s("small"));
        let (text, args) = render(&c, &Context::new(), &Postgres, 0).unwrap();
        assert_eq!(text, "CASE WHEN (a > $1) THEN 'big' ELSE 'small' END");
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_case_without_when_fails() {
        let err = render(&Case::new(), &Context::new(), &Postgres, 0).unwrap_err();
        assert!(matches!(err, RenderError::MissingCaseWhen));
    }
}

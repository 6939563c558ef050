//! LIMIT, OFFSET and FETCH.

use crate::error::Result;
use crate::expr::Expr;
use crate::render::{Expression, Writer};

/// `LIMIT count`.
#[derive(Debug, Clone, Default)]
pub struct Limit {
    /// Row count.
    pub count: Option<Expr>,
}

impl Expression for Limit {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        w.express_opt(self.count.as_ref(), "LIMIT ", "")
    }
}

/// `OFFSET count`.
#[derive(Debug, Clone, Default)]
pub struct Offset {
    /// Rows to skip.
    pub count: Option<Expr>,
}

impl Expression for Offset {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        w.express_opt(self.count.as_ref(), "OFFSET ", "")
    }
}

/// `FETCH NEXT n ROWS {ONLY | WITH TIES}`.
#[derive(Debug, Clone, Default)]
pub struct Fetch {
    /// Row count.
    pub count: Option<i64>,
    /// Renders `WITH TIES` instead of `ONLY`.
    pub with_ties: bool,
}

impl Expression for Fetch {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        let Some(count) = self.count else {
            return Ok(());
        };
        w.write_str("FETCH NEXT ");
        w.write_str(&count.to_string());
        w.write_str(" ROWS ");
        w.write_str(if self.with_ties { "WITH TIES" } else { "ONLY" });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Postgres;
    use crate::expr::arg;
    use crate::render::{render, Context};

    fn sql<E: Expression>(e: &E) -> String {
        render(e, &Context::new(), &Postgres, 0).unwrap().0
    }

    #[test]
    fn test_limit_offset_fetch() {
        assert_eq!(sql(&Limit { count: Some(arg(10)) }), "LIMIT $1");
        assert_eq!(sql(&Offset { count: None }), "");
        assert_eq!(
            sql(&Fetch {
                count: Some(5),
                with_ties: true
            }),
            "FETCH NEXT 5 ROWS WITH TIES"
        );
        assert_eq!(
            sql(&Fetch {
                count: Some(1),
                with_ties: false
            }),
            "FETCH NEXT 1 ROWS ONLY"
        );
    }
}

//! GROUP BY.

use crate::error::Result;
use crate::expr::Expr;
use crate::render::{Expression, Writer};

/// `GROUP BY [DISTINCT] groups`.
#[derive(Debug, Clone, Default)]
pub struct GroupBy {
    /// Grouping expressions.
    pub groups: Vec<Expr>,
    /// Renders `GROUP BY DISTINCT`.
    pub distinct: bool,
}

impl Expression for GroupBy {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        if self.groups.is_empty() {
            return Ok(());
        }
        w.write_str("GROUP BY ");
        if self.distinct {
            w.write_str("DISTINCT ");
        }
        w.express_slice(&self.groups, "", ", ", "")
    }
}

/// Kind of a grouping set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupingSetKind {
    /// `GROUPING SETS`.
    Sets,
    /// `CUBE`.
    Cube,
    /// `ROLLUP`.
    Rollup,
}

/// `ROLLUP (a, b)`, `CUBE (...)` or `GROUPING SETS (...)`.
#[derive(Debug, Clone)]
pub struct GroupingSet {
    /// Set kind.
    pub kind: GroupingSetKind,
    /// Members of the set.
    pub groups: Vec<Expr>,
}

impl Expression for GroupingSet {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        w.write_str(match self.kind {
            GroupingSetKind::Sets => "GROUPING SETS",
            GroupingSetKind::Cube => "CUBE",
            GroupingSetKind::Rollup => "ROLLUP",
        });
        w.write_str(" (");
        w.express_slice(&self.groups, "", ", ", "")?;
        w.write_char(')');
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Postgres;
    use crate::expr::{node, raw};
    use crate::render::{render, Context};

    #[test]
    fn test_group_by_distinct_rollup() {
        let g = GroupBy {
            groups: vec![
                raw("a"),
                node(GroupingSet {
                    kind: GroupingSetKind::Rollup,
                    groups: vec![raw("b"), raw("c")],
                }),
            ],
            distinct: true,
        };
        let (text, _) = render(&g, &Context::new(), &Postgres, 0).unwrap();
        assert_eq!(text, "GROUP BY DISTINCT a, ROLLUP (b, c)");
    }

    #[test]
    fn test_empty_group_by_renders_nothing() {
        let (text, _) = render(&GroupBy::default(), &Context::new(), &Postgres, 0).unwrap();
        assert!(text.is_empty());
    }
}

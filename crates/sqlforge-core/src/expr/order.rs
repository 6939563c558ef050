//! ORDER BY items.

use super::Expr;
use crate::error::Result;
use crate::render::{Expression, Writer};

/// Sort direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Direction {
    /// `ASC`.
    Asc,
    /// `DESC`.
    Desc,
    /// `USING operator`.
    Using(String),
}

/// Placement of NULLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nulls {
    /// `NULLS FIRST`.
    First,
    /// `NULLS LAST`.
    Last,
}

/// `expr [COLLATE c] [direction] [NULLS FIRST|LAST]`.
#[derive(Debug, Clone)]
pub struct OrderDef {
    /// Sorted expression.
    pub expr: Expr,
    /// Optional direction.
    pub direction: Option<Direction>,
    /// Optional NULL placement.
    pub nulls: Option<Nulls>,
    /// Optional collation name.
    pub collation: Option<String>,
}

impl OrderDef {
    /// Creates an order item with default direction.
    #[must_use]
    pub fn new(expr: impl Into<Expr>) -> Self {
        Self {
            expr: expr.into(),
            direction: None,
            nulls: None,
            collation: None,
        }
    }

    /// Sorts ascending.
    #[must_use]
    pub fn asc(mut self) -> Self {
        self.direction = Some(Direction::Asc);
        self
    }

    /// Sorts descending.
    #[must_use]
    pub fn desc(mut self) -> Self {
        self.direction = Some(Direction::Desc);
        self
    }

    /// Sorts with `USING op`.
    #[must_use]
    pub fn using(mut self, op: impl Into<String>) -> Self {
        self.direction = Some(Direction::Using(op.into()));
        self
    }

    /// Places NULLs first.
    #[must_use]
    pub const fn nulls_first(mut self) -> Self {
        self.nulls = Some(Nulls::First);
        self
    }

    /// Places NULLs last.
    #[must_use]
    pub const fn nulls_last(mut self) -> Self {
        self.nulls = Some(Nulls::Last);
        self
    }

    /// Sorts with the given collation.
    #[must_use]
    pub fn collate(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }
}

impl From<Expr> for OrderDef {
    fn from(expr: Expr) -> Self {
        Self::new(expr)
    }
}

impl Expression for OrderDef {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        w.express(&self.expr)?;
        if let Some(collation) = &self.collation {
            w.write_str(" COLLATE ");
            w.write_quoted(&[collation]);
        }
        match &self.direction {
            Some(Direction::Asc) => w.write_str(" ASC"),
            Some(Direction::Desc) => w.write_str(" DESC"),
            Some(Direction::Using(op)) => {
                w.write_str(" USING ");
                w.write_str(op);
            }
            None => {}
        }
        match self.nulls {
            Some(Nulls::First) => w.write_str(" NULLS FIRST"),
            Some(Nulls::Last) => w.write_str(" NULLS LAST"),
            None => {}
        }
        Ok(())
    }
}

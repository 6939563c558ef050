//! WHERE and HAVING.

use crate::error::Result;
use crate::expr::Expr;
use crate::render::{Expression, Writer};

/// `WHERE a AND b ...`.
#[derive(Debug, Clone, Default)]
pub struct Where {
    /// Conditions, AND-joined.
    pub conditions: Vec<Expr>,
}

impl Expression for Where {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        w.express_slice(&self.conditions, "WHERE ", " AND ", "")
    }
}

/// `HAVING a AND b ...`.
#[derive(Debug, Clone, Default)]
pub struct Having {
    /// Conditions, AND-joined.
    pub conditions: Vec<Expr>,
}

impl Expression for Having {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        w.express_slice(&self.conditions, "HAVING ", " AND ", "")
    }
}

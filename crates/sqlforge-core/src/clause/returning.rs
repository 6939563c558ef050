//! RETURNING.

use crate::dialect::require;
use crate::error::Result;
use crate::expr::Expr;
use crate::render::{Expression, Writer};

/// `RETURNING a, b, ...`.
#[derive(Debug, Clone, Default)]
pub struct Returning {
    /// Returned expressions.
    pub exprs: Vec<Expr>,
}

impl Returning {
    /// Returns true when nothing is returned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }
}

impl Expression for Returning {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        if self.exprs.is_empty() {
            return Ok(());
        }
        let d = w.dialect();
        require(d, d.supports_returning(), "RETURNING")?;
        w.express_slice(&self.exprs, "RETURNING ", ", ", "")
    }
}

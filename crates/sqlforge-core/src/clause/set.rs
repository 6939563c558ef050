//! SET assignments.

use crate::error::{RenderError, Result};
use crate::expr::Expr;
use crate::render::{Expression, Writer};

/// Assignments of an UPDATE or `DO UPDATE`, one per line.
#[derive(Debug, Clone, Default)]
pub struct Set {
    /// Assignment expressions such as `"a" = $1`.
    pub assignments: Vec<Expr>,
}

impl Set {
    /// Returns true when there are no assignments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

impl Expression for Set {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        if self.assignments.is_empty() {
            return Err(RenderError::EmptySet);
        }
        w.express_slice(&self.assignments, "", ",\n", "")
    }
}

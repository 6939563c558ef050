//! The WINDOW clause.

use crate::error::Result;
use crate::expr::NamedWindow;
use crate::render::{Expression, Writer};

/// `WINDOW w1 AS (...), w2 AS (...)`.
#[derive(Debug, Clone, Default)]
pub struct Windows {
    /// Named window definitions.
    pub windows: Vec<NamedWindow>,
}

impl Expression for Windows {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        w.express_slice(&self.windows, "WINDOW ", ", ", "")
    }
}

//! ORDER BY.

use crate::error::Result;
use crate::expr::OrderDef;
use crate::render::{Expression, Writer};

/// `ORDER BY a, b DESC, ...`.
#[derive(Debug, Clone, Default)]
pub struct OrderBy {
    /// Sort items.
    pub items: Vec<OrderDef>,
}

impl Expression for OrderBy {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        w.express_slice(&self.items, "ORDER BY ", ", ", "")
    }
}

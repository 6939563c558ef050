//! VALUES mods.

pub use super::mods::{fetch, limit, offset, order_by};

use crate::clause::Row;
use crate::expr::Expr;
use crate::query::{Mod, ValuesQuery};

/// Appends one row.
#[must_use]
pub fn value_row<I, E>(values: I) -> Mod<ValuesQuery>
where
    I: IntoIterator<Item = E>,
    E: Into<Expr>,
{
    let row = Row(values.into_iter().map(Into::into).collect());
    Mod::new(move |q: &mut ValuesQuery| q.rows.push(row))
}

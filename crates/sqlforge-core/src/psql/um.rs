//! UPDATE mods.

pub use super::mods::{
    cross_join, from, from_function, full_join, inner_join, left_join, recursive, returning,
    right_join, set_col, set_cols, where_, with,
};

use crate::clause::Table;
use crate::expr::Expr;
use crate::query::{Mod, UpdateQuery};

/// Renders `UPDATE ONLY`.
#[must_use]
pub fn only() -> Mod<UpdateQuery> {
    Mod::new(|q: &mut UpdateQuery| q.only = true)
}

/// Sets the target table.
#[must_use]
pub fn table(name: impl Into<Expr>) -> Mod<UpdateQuery> {
    let name = name.into();
    Mod::new(move |q: &mut UpdateQuery| {
        q.table = Table {
            expr: Some(name),
            ..Table::default()
        };
    })
}

/// Sets the target table with an alias.
#[must_use]
pub fn table_as(name: impl Into<Expr>, alias: impl Into<String>) -> Mod<UpdateQuery> {
    let name = name.into();
    let alias = alias.into();
    Mod::new(move |q: &mut UpdateQuery| {
        q.table = Table {
            expr: Some(name),
            alias: Some(alias),
            columns: Vec::new(),
        };
    })
}

/// Appends assignments, typically built with [`set_col`] or [`set_cols`].
#[must_use]
pub fn set<I, E>(assignments: I) -> Mod<UpdateQuery>
where
    I: IntoIterator<Item = E>,
    E: Into<Expr>,
{
    let assignments: Vec<Expr> = assignments.into_iter().map(Into::into).collect();
    Mod::new(move |q: &mut UpdateQuery| q.set.assignments.extend(assignments))
}

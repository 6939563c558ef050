//! DELETE mods.

pub use super::mods::{
    cross_join, full_join, inner_join, left_join, recursive, returning, right_join, where_, with,
};

use super::mods::{self, FromChain};
use crate::clause::Table;
use crate::expr::Expr;
use crate::query::{DeleteQuery, Mod};

/// Renders `DELETE FROM ONLY`.
#[must_use]
pub fn only() -> Mod<DeleteQuery> {
    Mod::new(|q: &mut DeleteQuery| q.only = true)
}

/// Sets the target table.
#[must_use]
pub fn from(table: impl Into<Expr>) -> Mod<DeleteQuery> {
    let table = table.into();
    Mod::new(move |q: &mut DeleteQuery| {
        q.table = Table {
            expr: Some(table),
            ..Table::default()
        };
    })
}

/// Sets the target table with an alias.
#[must_use]
pub fn from_as(table: impl Into<Expr>, alias: impl Into<String>) -> Mod<DeleteQuery> {
    let table = table.into();
    let alias = alias.into();
    Mod::new(move |q: &mut DeleteQuery| {
        q.table = Table {
            expr: Some(table),
            alias: Some(alias),
            columns: Vec::new(),
        };
    })
}

/// Sets the `USING` table; joins attach to it.
#[must_use]
pub fn using(table: impl Into<Expr>) -> FromChain<DeleteQuery> {
    mods::from(table)
}

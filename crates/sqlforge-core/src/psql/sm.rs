//! SELECT mods.

pub use super::mods::{
    cross_join, fetch, from, from_function, full_join, inner_join, left_join, limit, offset,
    order_by, recursive, right_join, where_, with,
};

use crate::clause::{Combine, CombineStrategy, Fetch, GroupingSet, GroupingSetKind, Lock, LockStrength};
use crate::expr::{node, Expr, NamedWindow, OrderDef, WindowDef};
use crate::query::{Distinct, Mod, SelectQuery};

/// `DISTINCT`, or `DISTINCT ON (exprs)` when `on` is not empty.
#[must_use]
pub fn distinct<I, E>(on: I) -> Mod<SelectQuery>
where
    I: IntoIterator<Item = E>,
    E: Into<Expr>,
{
    let on: Vec<Expr> = on.into_iter().map(Into::into).collect();
    Mod::new(move |q: &mut SelectQuery| q.distinct = Some(Distinct { on }))
}

/// Appends to the select list.
#[must_use]
pub fn columns<I, E>(exprs: I) -> Mod<SelectQuery>
where
    I: IntoIterator<Item = E>,
    E: Into<Expr>,
{
    let exprs: Vec<Expr> = exprs.into_iter().map(Into::into).collect();
    Mod::new(move |q: &mut SelectQuery| q.columns.extend(exprs))
}

/// Adds a GROUP BY item.
#[must_use]
pub fn group_by(e: impl Into<Expr>) -> Mod<SelectQuery> {
    let e = e.into();
    Mod::new(move |q: &mut SelectQuery| q.group_by.groups.push(e))
}

/// Renders `GROUP BY DISTINCT`.
#[must_use]
pub fn group_by_distinct(distinct: bool) -> Mod<SelectQuery> {
    Mod::new(move |q: &mut SelectQuery| q.group_by.distinct = distinct)
}

fn grouping(kind: GroupingSetKind, groups: Vec<Expr>) -> Mod<SelectQuery> {
    group_by(node(GroupingSet { kind, groups }))
}

/// Adds `ROLLUP (exprs)` to GROUP BY.
#[must_use]
pub fn rollup<I: IntoIterator<Item = Expr>>(groups: I) -> Mod<SelectQuery> {
    grouping(GroupingSetKind::Rollup, groups.into_iter().collect())
}

/// Adds `CUBE (exprs)` to GROUP BY.
#[must_use]
pub fn cube<I: IntoIterator<Item = Expr>>(groups: I) -> Mod<SelectQuery> {
    grouping(GroupingSetKind::Cube, groups.into_iter().collect())
}

/// Adds `GROUPING SETS (exprs)` to GROUP BY.
#[must_use]
pub fn grouping_sets<I: IntoIterator<Item = Expr>>(groups: I) -> Mod<SelectQuery> {
    grouping(GroupingSetKind::Sets, groups.into_iter().collect())
}

/// Adds an AND-joined HAVING condition.
#[must_use]
pub fn having(condition: impl Into<Expr>) -> Mod<SelectQuery> {
    let condition = condition.into();
    Mod::new(move |q: &mut SelectQuery| q.having.conditions.push(condition))
}

/// Adds `WINDOW name AS (definition)`.
#[must_use]
pub fn window(name: impl Into<String>, definition: WindowDef) -> Mod<SelectQuery> {
    let window = NamedWindow::new(name, definition);
    Mod::new(move |q: &mut SelectQuery| q.windows.windows.push(window))
}

fn combine(strategy: CombineStrategy, all: bool, query: Expr) -> Mod<SelectQuery> {
    Mod::new(move |q: &mut SelectQuery| {
        q.combines.push(Combine {
            strategy,
            all,
            query,
        });
    })
}

/// `UNION query`.
#[must_use]
pub fn union(query: impl Into<Expr>) -> Mod<SelectQuery> {
    combine(CombineStrategy::Union, false, query.into())
}

/// `UNION ALL query`.
#[must_use]
pub fn union_all(query: impl Into<Expr>) -> Mod<SelectQuery> {
    combine(CombineStrategy::Union, true, query.into())
}

/// `INTERSECT query`.
#[must_use]
pub fn intersect(query: impl Into<Expr>) -> Mod<SelectQuery> {
    combine(CombineStrategy::Intersect, false, query.into())
}

/// `INTERSECT ALL query`.
#[must_use]
pub fn intersect_all(query: impl Into<Expr>) -> Mod<SelectQuery> {
    combine(CombineStrategy::Intersect, true, query.into())
}

/// `EXCEPT query`.
#[must_use]
pub fn except(query: impl Into<Expr>) -> Mod<SelectQuery> {
    combine(CombineStrategy::Except, false, query.into())
}

/// `EXCEPT ALL query`.
#[must_use]
pub fn except_all(query: impl Into<Expr>) -> Mod<SelectQuery> {
    combine(CombineStrategy::Except, true, query.into())
}

/// ORDER BY applied after the combined queries.
#[must_use]
pub fn order_combined(order: impl Into<OrderDef>) -> Mod<SelectQuery> {
    let order = order.into();
    Mod::new(move |q: &mut SelectQuery| q.combined_order_by.items.push(order))
}

/// LIMIT applied after the combined queries.
#[must_use]
pub fn limit_combined(count: impl Into<Expr>) -> Mod<SelectQuery> {
    let count = count.into();
    Mod::new(move |q: &mut SelectQuery| q.combined_limit.count = Some(count))
}

/// OFFSET applied after the combined queries.
#[must_use]
pub fn offset_combined(count: impl Into<Expr>) -> Mod<SelectQuery> {
    let count = count.into();
    Mod::new(move |q: &mut SelectQuery| q.combined_offset.count = Some(count))
}

/// FETCH applied after the combined queries.
#[must_use]
pub fn fetch_combined(count: i64, with_ties: bool) -> Mod<SelectQuery> {
    Mod::new(move |q: &mut SelectQuery| {
        q.combined_fetch = Fetch {
            count: Some(count),
            with_ties,
        };
    })
}

fn lock<I, S>(strength: LockStrength, tables: I) -> LockChain
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    LockChain {
        lock: Lock::new(strength).of(tables),
    }
}

/// `FOR UPDATE [OF tables]`.
#[must_use]
pub fn for_update<I: IntoIterator<Item = S>, S: Into<String>>(tables: I) -> LockChain {
    lock(LockStrength::Update, tables)
}

/// `FOR NO KEY UPDATE [OF tables]`.
#[must_use]
pub fn for_no_key_update<I: IntoIterator<Item = S>, S: Into<String>>(tables: I) -> LockChain {
    lock(LockStrength::NoKeyUpdate, tables)
}

/// `FOR SHARE [OF tables]`.
#[must_use]
pub fn for_share<I: IntoIterator<Item = S>, S: Into<String>>(tables: I) -> LockChain {
    lock(LockStrength::Share, tables)
}

/// `FOR KEY SHARE [OF tables]`.
#[must_use]
pub fn for_key_share<I: IntoIterator<Item = S>, S: Into<String>>(tables: I) -> LockChain {
    lock(LockStrength::KeyShare, tables)
}

/// Collects the options of a locking clause.
#[derive(Debug)]
pub struct LockChain {
    lock: Lock,
}

impl LockChain {
    /// Adds `NOWAIT`.
    #[must_use]
    pub fn no_wait(mut self) -> Self {
        self.lock = self.lock.no_wait();
        self
    }

    /// Adds `SKIP LOCKED`.
    #[must_use]
    pub fn skip_locked(mut self) -> Self {
        self.lock = self.lock.skip_locked();
        self
    }
}

impl From<LockChain> for Mod<SelectQuery> {
    fn from(chain: LockChain) -> Self {
        let lock = chain.lock;
        Self::new(move |q: &mut SelectQuery| q.locks.push(lock))
    }
}

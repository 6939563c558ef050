//! MERGE mods.

pub use super::mods::{recursive, returning, set_col, set_cols, with};

use crate::clause::{
    MergeAction, MergeMatch, MergeSource, MergeUsing, MergeWhen, Overriding, Set, Table,
};
use crate::expr::Expr;
use crate::query::{HasReturning, MergeQuery, Mod, Statement};

/// Server major version from which MERGE supports RETURNING.
pub const MERGE_RETURNING_VERSION: u32 = 17;

fn into_table(name: Expr, alias: Option<String>) -> Mod<MergeQuery> {
    Mod::new(move |q: &mut MergeQuery| {
        q.table = Table {
            expr: Some(name),
            alias,
            columns: Vec::new(),
        };
    })
}

/// Sets the target table.
#[must_use]
pub fn into(name: impl Into<Expr>) -> Mod<MergeQuery> {
    into_table(name.into(), None)
}

/// Sets the target table with an alias.
#[must_use]
pub fn into_as(name: impl Into<Expr>, alias: impl Into<String>) -> Mod<MergeQuery> {
    into_table(name.into(), Some(alias.into()))
}

/// Renders `MERGE INTO ONLY`.
#[must_use]
pub fn only() -> Mod<MergeQuery> {
    Mod::new(|q: &mut MergeQuery| q.only = true)
}

/// Uses a table as the data source; finish with `on`.
#[must_use]
pub fn using(source: impl Into<Expr>) -> UsingChain {
    UsingChain::new(MergeSource::Table(source.into()))
}

/// Uses a subquery as the data source; finish with `on`.
#[must_use]
pub fn using_query(query: impl Into<Expr>) -> UsingChain {
    UsingChain::new(MergeSource::Query(query.into()))
}

/// The data source under construction.
#[derive(Debug)]
pub struct UsingChain {
    using: MergeUsing,
}

impl UsingChain {
    const fn new(source: MergeSource) -> Self {
        Self {
            using: MergeUsing {
                only: false,
                source,
                alias: None,
                condition: None,
            },
        }
    }

    /// Aliases the source.
    #[must_use]
    pub fn as_(mut self, alias: impl Into<String>) -> Self {
        self.using.alias = Some(alias.into());
        self
    }

    /// Renders `USING ONLY`.
    #[must_use]
    pub const fn only(mut self) -> Self {
        self.using.only = true;
        self
    }

    /// Sets the join condition.
    #[must_use]
    pub fn on(mut self, condition: impl Into<Expr>) -> Mod<MergeQuery> {
        self.using.condition = Some(condition.into());
        let using = self.using;
        Mod::new(move |q: &mut MergeQuery| q.using = Some(using))
    }

    /// Sets `left = right` as the join condition.
    #[must_use]
    pub fn on_eq(self, left: impl Into<Expr>, right: impl Into<Expr>) -> Mod<MergeQuery> {
        self.on(left.into().eq(right))
    }
}

fn when<I>(kind: MergeMatch, mods: I) -> Mod<MergeQuery>
where
    I: IntoIterator<Item = Mod<MergeWhen>>,
{
    let mut clause = MergeWhen {
        kind,
        condition: None,
        action: MergeAction::DoNothing,
    };
    for m in mods {
        m.apply(&mut clause);
    }
    Mod::new(move |q: &mut MergeQuery| q.whens.push(clause))
}

/// `WHEN MATCHED ...`.
#[must_use]
pub fn when_matched<I: IntoIterator<Item = Mod<MergeWhen>>>(mods: I) -> Mod<MergeQuery> {
    when(MergeMatch::Matched, mods)
}

/// `WHEN NOT MATCHED ...`.
#[must_use]
pub fn when_not_matched<I: IntoIterator<Item = Mod<MergeWhen>>>(mods: I) -> Mod<MergeQuery> {
    when(MergeMatch::NotMatched, mods)
}

/// `WHEN NOT MATCHED BY TARGET ...`.
#[must_use]
pub fn when_not_matched_by_target<I: IntoIterator<Item = Mod<MergeWhen>>>(
    mods: I,
) -> Mod<MergeQuery> {
    when(MergeMatch::NotMatchedByTarget, mods)
}

/// `WHEN NOT MATCHED BY SOURCE ...`.
#[must_use]
pub fn when_not_matched_by_source<I: IntoIterator<Item = Mod<MergeWhen>>>(
    mods: I,
) -> Mod<MergeQuery> {
    when(MergeMatch::NotMatchedBySource, mods)
}

/// Adds `AND condition` to a WHEN branch.
#[must_use]
pub fn and(condition: impl Into<Expr>) -> Mod<MergeWhen> {
    let condition = condition.into();
    Mod::new(move |w: &mut MergeWhen| {
        w.condition = Some(match w.condition.take() {
            Some(existing) => existing.and(condition),
            None => condition,
        });
    })
}

/// `THEN DO NOTHING`.
#[must_use]
pub fn then_do_nothing() -> Mod<MergeWhen> {
    Mod::new(|w: &mut MergeWhen| w.action = MergeAction::DoNothing)
}

/// `THEN DELETE`.
#[must_use]
pub fn then_delete() -> Mod<MergeWhen> {
    Mod::new(|w: &mut MergeWhen| w.action = MergeAction::Delete)
}

/// `THEN UPDATE SET ...`.
#[must_use]
pub fn then_update<I, E>(assignments: I) -> Mod<MergeWhen>
where
    I: IntoIterator<Item = E>,
    E: Into<Expr>,
{
    let set = Set {
        assignments: assignments.into_iter().map(Into::into).collect(),
    };
    Mod::new(move |w: &mut MergeWhen| w.action = MergeAction::Update { set })
}

/// The INSERT action of a WHEN branch under construction.
#[derive(Debug, Default)]
pub struct InsertAction {
    columns: Vec<String>,
    overriding: Option<Overriding>,
    values: Vec<Expr>,
}

/// `THEN INSERT ...`.
#[must_use]
pub fn then_insert<I: IntoIterator<Item = Mod<InsertAction>>>(mods: I) -> Mod<MergeWhen> {
    let mut action = InsertAction::default();
    for m in mods {
        m.apply(&mut action);
    }
    Mod::new(move |w: &mut MergeWhen| {
        w.action = MergeAction::Insert {
            columns: action.columns,
            overriding: action.overriding,
            values: action.values,
        };
    })
}

/// `THEN INSERT DEFAULT VALUES`.
#[must_use]
pub fn then_insert_default_values() -> Mod<MergeWhen> {
    then_insert(std::iter::empty())
}

/// Sets the inserted columns.
#[must_use]
pub fn columns<I, S>(columns: I) -> Mod<InsertAction>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
    Mod::new(move |a: &mut InsertAction| a.columns.extend(columns))
}

/// Sets the inserted values.
#[must_use]
pub fn values<I, E>(values: I) -> Mod<InsertAction>
where
    I: IntoIterator<Item = E>,
    E: Into<Expr>,
{
    let values: Vec<Expr> = values.into_iter().map(Into::into).collect();
    Mod::new(move |a: &mut InsertAction| a.values.extend(values))
}

/// `OVERRIDING SYSTEM VALUE`.
#[must_use]
pub fn overriding_system() -> Mod<InsertAction> {
    Mod::new(|a: &mut InsertAction| a.overriding = Some(Overriding::System))
}

/// `OVERRIDING USER VALUE`.
#[must_use]
pub fn overriding_user() -> Mod<InsertAction> {
    Mod::new(|a: &mut InsertAction| a.overriding = Some(Overriding::User))
}

/// Adds RETURNING expressions only when the server is known to support
/// `MERGE ... RETURNING`.
///
/// The check runs on every render against the context's server version.
#[must_use]
pub fn returning_if_supported<I, E>(exprs: I) -> Mod<MergeQuery>
where
    I: IntoIterator<Item = E>,
    E: Into<Expr>,
{
    let exprs: Vec<Expr> = exprs.into_iter().map(Into::into).collect();
    Mod::new(move |q: &mut MergeQuery| {
        q.append_contextual_mod(move |ctx, q: &mut MergeQuery| {
            if ctx.version_at_least(MERGE_RETURNING_VERSION) {
                q.append_returning(exprs.clone());
            }
            Ok(ctx)
        });
    })
}

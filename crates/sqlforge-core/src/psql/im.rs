//! INSERT mods.

pub use super::mods::{recursive, returning, with};

use crate::clause::{Conflict, ConflictAction, ConflictTarget, Overriding, Row, Set, Table, Where};
use crate::expr::{binary, join, quote, raw, Expr};
use crate::query::{InsertQuery, Mod};

fn into_table(name: Expr, alias: Option<String>, columns: Vec<String>) -> Mod<InsertQuery> {
    Mod::new(move |q: &mut InsertQuery| {
        q.table = Table {
            expr: Some(name),
            alias,
            columns,
        };
    })
}

/// Sets the target table and column list.
#[must_use]
pub fn into<I, S>(name: impl Into<Expr>, columns: I) -> Mod<InsertQuery>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    into_table(name.into(), None, columns.into_iter().map(Into::into).collect())
}

/// Sets the target table with an alias and column list.
#[must_use]
pub fn into_as<I, S>(name: impl Into<Expr>, alias: impl Into<String>, columns: I) -> Mod<InsertQuery>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    into_table(
        name.into(),
        Some(alias.into()),
        columns.into_iter().map(Into::into).collect(),
    )
}

/// `OVERRIDING SYSTEM VALUE`.
#[must_use]
pub fn overriding_system() -> Mod<InsertQuery> {
    Mod::new(|q: &mut InsertQuery| q.overriding = Some(Overriding::System))
}

/// `OVERRIDING USER VALUE`.
#[must_use]
pub fn overriding_user() -> Mod<InsertQuery> {
    Mod::new(|q: &mut InsertQuery| q.overriding = Some(Overriding::User))
}

/// Appends one row of values.
#[must_use]
pub fn values<I, E>(values: I) -> Mod<InsertQuery>
where
    I: IntoIterator<Item = E>,
    E: Into<Expr>,
{
    let row = Row(values.into_iter().map(Into::into).collect());
    Mod::new(move |q: &mut InsertQuery| q.values.rows.push(row))
}

/// Appends several rows.
#[must_use]
pub fn rows<I: IntoIterator<Item = Vec<Expr>>>(rows: I) -> Mod<InsertQuery> {
    let rows: Vec<Row> = rows.into_iter().map(Row).collect();
    Mod::new(move |q: &mut InsertQuery| q.values.rows.extend(rows))
}

/// Inserts the result of a query instead of rows.
#[must_use]
pub fn query(query: impl Into<Expr>) -> Mod<InsertQuery> {
    let query = query.into();
    Mod::new(move |q: &mut InsertQuery| q.values.query = Some(query))
}

/// `ON CONFLICT [(columns)]`; finish with `do_nothing` or `do_update`.
#[must_use]
pub fn on_conflict<I, E>(columns: I) -> ConflictChain
where
    I: IntoIterator<Item = E>,
    E: Into<Expr>,
{
    let columns: Vec<Expr> = columns.into_iter().map(Into::into).collect();
    let target = if columns.is_empty() {
        ConflictTarget::Any
    } else {
        ConflictTarget::Columns {
            columns,
            conditions: Vec::new(),
        }
    };
    ConflictChain { target }
}

/// `ON CONFLICT ON CONSTRAINT name`.
#[must_use]
pub fn on_conflict_on_constraint(name: impl Into<String>) -> ConflictChain {
    ConflictChain {
        target: ConflictTarget::Constraint(name.into()),
    }
}

/// The conflict target under construction.
#[derive(Debug)]
pub struct ConflictChain {
    target: ConflictTarget,
}

impl ConflictChain {
    /// Adds a partial-index predicate to a column target.
    #[must_use]
    pub fn where_(mut self, condition: impl Into<Expr>) -> Self {
        if let ConflictTarget::Columns { conditions, .. } = &mut self.target {
            conditions.push(condition.into());
        }
        self
    }

    /// `DO NOTHING`.
    #[must_use]
    pub fn do_nothing(self) -> Mod<InsertQuery> {
        let conflict = Conflict {
            target: self.target,
            action: ConflictAction::Nothing,
        };
        Mod::new(move |q: &mut InsertQuery| q.conflict = Some(conflict))
    }

    /// `DO UPDATE`; assignments go on the returned chain.
    #[must_use]
    pub fn do_update(self) -> ConflictUpdate {
        ConflictUpdate {
            target: self.target,
            set: Set::default(),
            filter: Where::default(),
        }
    }
}

/// The `DO UPDATE` action under construction.
#[derive(Debug)]
pub struct ConflictUpdate {
    target: ConflictTarget,
    set: Set,
    filter: Where,
}

impl ConflictUpdate {
    /// Adds assignments.
    #[must_use]
    pub fn set<I, E>(mut self, assignments: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        self.set
            .assignments
            .extend(assignments.into_iter().map(Into::into));
        self
    }

    /// Adds `"col" = EXCLUDED."col"` for every column.
    #[must_use]
    pub fn set_excluded<I, S>(self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let assignments: Vec<Expr> = columns
            .into_iter()
            .map(Into::into)
            .filter(|c: &String| !c.is_empty())
            .map(|c| binary(quote([c.clone()]), "=", join([raw("EXCLUDED."), quote([c])], "")))
            .collect();
        self.set(assignments)
    }

    /// Adds an AND-joined update filter.
    #[must_use]
    pub fn where_(mut self, condition: impl Into<Expr>) -> Self {
        self.filter.conditions.push(condition.into());
        self
    }
}

impl From<ConflictUpdate> for Mod<InsertQuery> {
    fn from(chain: ConflictUpdate) -> Self {
        let conflict = Conflict {
            target: chain.target,
            action: ConflictAction::Update {
                set: chain.set,
                filter: chain.filter,
            },
        };
        Self::new(move |q: &mut InsertQuery| q.conflict = Some(conflict))
    }
}

//! Mods shared by several query kinds.
//!
//! Each query-kind module (`sm`, `im`, `um`, `dm`, `mm`, `vm`) re-exports the
//! subset that applies to it. Chains such as [`FromChain`] collect options and
//! turn into a [`Mod`] through `From`, so they can sit in the same mod list as
//! plain mods once converted with `.into()`.

use std::marker::PhantomData;

use crate::clause::{
    Cte, CteCycle, Fetch, Join, JoinKind, Row, SearchOrder, TableRef,
};
use crate::expr::{arg, binary, quote, raw, Expr, Function, Functions, OrderDef};
use crate::query::{HasPaging, HasReturning, HasTableRef, HasWhere, HasWith, Mod};
use crate::value::ToValue;

/// Starts a CTE named `name`; finish it with [`CteChain::as_`].
#[must_use]
pub fn with<Q: HasWith + 'static>(name: impl Into<String>) -> CteChain<Q> {
    CteChain {
        cte: Cte::new(name, raw("")),
        _q: PhantomData,
    }
}

/// Collects the options of one CTE.
#[derive(Debug)]
pub struct CteChain<Q> {
    cte: Cte,
    _q: PhantomData<fn(&mut Q)>,
}

impl<Q> CteChain<Q> {
    /// Names the CTE columns.
    #[must_use]
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cte = self.cte.columns(columns);
        self
    }

    /// Sets the CTE body.
    #[must_use]
    pub fn as_(mut self, query: impl Into<Expr>) -> Self {
        self.cte.query = query.into();
        self
    }

    /// Renders `MATERIALIZED`.
    #[must_use]
    pub const fn materialized(mut self) -> Self {
        self.cte.materialized = Some(true);
        self
    }

    /// Renders `NOT MATERIALIZED`.
    #[must_use]
    pub const fn not_materialized(mut self) -> Self {
        self.cte.materialized = Some(false);
        self
    }

    /// Adds `SEARCH BREADTH FIRST BY cols SET set`.
    #[must_use]
    pub fn search_breadth<I, S>(mut self, set: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cte = self.cte.search(SearchOrder::Breadth, columns, set);
        self
    }

    /// Adds `SEARCH DEPTH FIRST BY cols SET set`.
    #[must_use]
    pub fn search_depth<I, S>(mut self, set: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cte = self.cte.search(SearchOrder::Depth, columns, set);
        self
    }

    /// Adds `CYCLE cols SET set USING using`.
    #[must_use]
    pub fn cycle<I, S>(mut self, set: impl Into<String>, using: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cte = self.cte.cycle(CteCycle {
            columns: columns.into_iter().map(Into::into).collect(),
            set: set.into(),
            using: using.into(),
            set_val: None,
            default_val: None,
        });
        self
    }

    /// Sets the `TO value DEFAULT value` pair of the CYCLE clause.
    #[must_use]
    pub fn cycle_value(mut self, set_val: impl Into<Expr>, default_val: impl Into<Expr>) -> Self {
        if let Some(cycle) = &mut self.cte.cycle {
            cycle.set_val = Some(set_val.into());
            cycle.default_val = Some(default_val.into());
        }
        self
    }
}

impl<Q: HasWith + 'static> From<CteChain<Q>> for Mod<Q> {
    fn from(chain: CteChain<Q>) -> Self {
        let cte = chain.cte;
        Self::new(move |q: &mut Q| q.append_cte(cte))
    }
}

/// Marks the WITH clause as `RECURSIVE`.
#[must_use]
pub fn recursive<Q: HasWith + 'static>(recursive: bool) -> Mod<Q> {
    Mod::new(move |q: &mut Q| q.set_recursive(recursive))
}

/// Adds an AND-joined WHERE condition.
#[must_use]
pub fn where_<Q: HasWhere + 'static>(condition: impl Into<Expr>) -> Mod<Q> {
    let condition = condition.into();
    Mod::new(move |q: &mut Q| q.append_where(condition))
}

/// Adds RETURNING expressions.
#[must_use]
pub fn returning<Q, I, E>(exprs: I) -> Mod<Q>
where
    Q: HasReturning + 'static,
    I: IntoIterator<Item = E>,
    E: Into<Expr>,
{
    let exprs: Vec<Expr> = exprs.into_iter().map(Into::into).collect();
    Mod::new(move |q: &mut Q| q.append_returning(exprs))
}

/// Sets the FROM (or USING) table; extra options go on the chain.
#[must_use]
pub fn from<Q: HasTableRef + 'static>(table: impl Into<Expr>) -> FromChain<Q> {
    FromChain {
        table: TableRef::new(table),
        _q: PhantomData,
    }
}

/// Uses one or more functions as the FROM item.
#[must_use]
pub fn from_function<Q, I>(functions: I) -> FromChain<Q>
where
    Q: HasTableRef + 'static,
    I: IntoIterator<Item = Function>,
{
    from(Functions(functions.into_iter().collect()))
}

/// Collects the options of a FROM item.
#[derive(Debug)]
pub struct FromChain<Q> {
    table: TableRef,
    _q: PhantomData<fn(&mut Q)>,
}

impl<Q> FromChain<Q> {
    /// Adds an alias.
    #[must_use]
    pub fn as_(mut self, alias: impl Into<String>) -> Self {
        self.table = self.table.alias(alias);
        self
    }

    /// Adds column aliases.
    #[must_use]
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.table = self.table.columns(columns);
        self
    }

    /// Renders `ONLY`.
    #[must_use]
    pub fn only(mut self) -> Self {
        self.table = self.table.only();
        self
    }

    /// Renders `LATERAL`.
    #[must_use]
    pub fn lateral(mut self) -> Self {
        self.table = self.table.lateral();
        self
    }

    /// Renders `WITH ORDINALITY`.
    #[must_use]
    pub fn with_ordinality(mut self) -> Self {
        self.table = self.table.with_ordinality();
        self
    }
}

impl<Q: HasTableRef + 'static> From<FromChain<Q>> for Mod<Q> {
    fn from(chain: FromChain<Q>) -> Self {
        let mut table = chain.table;
        Self::new(move |q: &mut Q| {
            table.joins = std::mem::take(&mut q.table_ref_mut().joins);
            q.set_table_ref(table);
        })
    }
}

fn join<Q>(kind: JoinKind, to: impl Into<Expr>) -> JoinChain<Q> {
    JoinChain {
        join: Join::new(kind, TableRef::new(to)),
        _q: PhantomData,
    }
}

/// `INNER JOIN to`.
#[must_use]
pub fn inner_join<Q: HasTableRef + 'static>(to: impl Into<Expr>) -> JoinChain<Q> {
    join(JoinKind::Inner, to)
}

/// `LEFT JOIN to`.
#[must_use]
pub fn left_join<Q: HasTableRef + 'static>(to: impl Into<Expr>) -> JoinChain<Q> {
    join(JoinKind::Left, to)
}

/// `RIGHT JOIN to`.
#[must_use]
pub fn right_join<Q: HasTableRef + 'static>(to: impl Into<Expr>) -> JoinChain<Q> {
    join(JoinKind::Right, to)
}

/// `FULL JOIN to`.
#[must_use]
pub fn full_join<Q: HasTableRef + 'static>(to: impl Into<Expr>) -> JoinChain<Q> {
    join(JoinKind::Full, to)
}

/// `CROSS JOIN to`.
#[must_use]
pub fn cross_join<Q: HasTableRef + 'static>(to: impl Into<Expr>) -> JoinChain<Q> {
    join(JoinKind::Cross, to)
}

/// Collects the options of a join.
#[derive(Debug)]
pub struct JoinChain<Q> {
    join: Join,
    _q: PhantomData<fn(&mut Q)>,
}

impl<Q> JoinChain<Q> {
    /// Aliases the joined table.
    #[must_use]
    pub fn as_(mut self, alias: impl Into<String>) -> Self {
        self.join.to = self.join.to.alias(alias);
        self
    }

    /// Renders `LATERAL` before the joined item.
    #[must_use]
    pub fn lateral(mut self) -> Self {
        self.join.to = self.join.to.lateral();
        self
    }

    /// Renders `NATURAL`.
    #[must_use]
    pub const fn natural(mut self) -> Self {
        self.join.natural = true;
        self
    }

    /// Adds an ON condition.
    #[must_use]
    pub fn on(mut self, condition: impl Into<Expr>) -> Self {
        self.join = self.join.on(condition);
        self
    }

    /// Adds `left = right` as an ON condition.
    #[must_use]
    pub fn on_eq(self, left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        self.on(left.into().eq(right))
    }

    /// Adds `USING (cols)`.
    #[must_use]
    pub fn using<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.join = self.join.using(columns);
        self
    }
}

impl<Q: HasTableRef + 'static> From<JoinChain<Q>> for Mod<Q> {
    fn from(chain: JoinChain<Q>) -> Self {
        let join = chain.join;
        Self::new(move |q: &mut Q| q.append_join(join))
    }
}

/// Adds an ORDER BY item; direction and NULLS go on the chain.
#[must_use]
pub fn order_by<Q: HasPaging + 'static>(e: impl Into<Expr>) -> OrderChain<Q> {
    OrderChain {
        order: OrderDef::new(e),
        _q: PhantomData,
    }
}

/// Collects the options of one ORDER BY item.
#[derive(Debug)]
pub struct OrderChain<Q> {
    order: OrderDef,
    _q: PhantomData<fn(&mut Q)>,
}

impl<Q> OrderChain<Q> {
    /// Sorts ascending.
    #[must_use]
    pub fn asc(mut self) -> Self {
        self.order = self.order.asc();
        self
    }

    /// Sorts descending.
    #[must_use]
    pub fn desc(mut self) -> Self {
        self.order = self.order.desc();
        self
    }

    /// Sorts with `USING op`.
    #[must_use]
    pub fn using(mut self, op: impl Into<String>) -> Self {
        self.order = self.order.using(op);
        self
    }

    /// Places NULLs first.
    #[must_use]
    pub fn nulls_first(mut self) -> Self {
        self.order = self.order.nulls_first();
        self
    }

    /// Places NULLs last.
    #[must_use]
    pub fn nulls_last(mut self) -> Self {
        self.order = self.order.nulls_last();
        self
    }

    /// Sorts with a collation.
    #[must_use]
    pub fn collate(mut self, collation: impl Into<String>) -> Self {
        self.order = self.order.collate(collation);
        self
    }

    /// Returns the collected item.
    #[must_use]
    pub fn into_order(self) -> OrderDef {
        self.order
    }
}

impl<Q: HasPaging + 'static> From<OrderChain<Q>> for Mod<Q> {
    fn from(chain: OrderChain<Q>) -> Self {
        let order = chain.order;
        Self::new(move |q: &mut Q| q.order_by_mut().items.push(order))
    }
}

/// Sets LIMIT.
#[must_use]
pub fn limit<Q: HasPaging + 'static>(count: impl Into<Expr>) -> Mod<Q> {
    let count = count.into();
    Mod::new(move |q: &mut Q| q.limit_mut().count = Some(count))
}

/// Sets OFFSET.
#[must_use]
pub fn offset<Q: HasPaging + 'static>(count: impl Into<Expr>) -> Mod<Q> {
    let count = count.into();
    Mod::new(move |q: &mut Q| q.offset_mut().count = Some(count))
}

/// Sets `FETCH NEXT count ROWS {ONLY|WITH TIES}`.
#[must_use]
pub fn fetch<Q: HasPaging + 'static>(count: i64, with_ties: bool) -> Mod<Q> {
    Mod::new(move |q: &mut Q| {
        *q.fetch_mut() = Fetch {
            count: Some(count),
            with_ties,
        };
    })
}

/// Starts a `"col" = value` assignment.
#[must_use]
pub fn set_col(column: impl Into<String>) -> SetCol {
    SetCol {
        column: column.into(),
    }
}

/// A single-column assignment under construction.
#[derive(Debug, Clone)]
pub struct SetCol {
    column: String,
}

impl SetCol {
    /// `"col" = value`.
    #[must_use]
    pub fn to(self, value: impl Into<Expr>) -> Expr {
        binary(quote([self.column]), "=", value)
    }

    /// `"col" = $N`.
    #[must_use]
    pub fn to_arg<T: ToValue>(self, value: T) -> Expr {
        self.to(arg(value))
    }

    /// `"col" = DEFAULT`.
    #[must_use]
    pub fn to_default(self) -> Expr {
        self.to(raw("DEFAULT"))
    }
}

/// Starts a `("a", "b") = ...` assignment.
#[must_use]
pub fn set_cols<I, S>(columns: I) -> SetCols
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    SetCols {
        columns: columns.into_iter().map(|c| quote([c])).collect(),
    }
}

/// A multi-column assignment under construction.
#[derive(Debug, Clone)]
pub struct SetCols {
    columns: Vec<Expr>,
}

impl SetCols {
    fn assign(self, rhs: Expr) -> Expr {
        Expr::Binary(Box::new(Expr::Group(self.columns)), "=", Box::new(rhs))
    }

    /// `(cols) = ROW (values)`.
    #[must_use]
    pub fn to_row<I, E>(self, values: I) -> Expr
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        let row = Row(values.into_iter().map(Into::into).collect());
        self.assign(Expr::Prefix("ROW ", Box::new(crate::expr::node(row))))
    }

    /// `(cols) = (values)`.
    #[must_use]
    pub fn to_exprs<I, E>(self, values: I) -> Expr
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        self.assign(crate::expr::group(values))
    }

    /// `(cols) = (subquery)`.
    #[must_use]
    pub fn to_query(self, query: impl Into<Expr>) -> Expr {
        self.assign(Expr::Group(vec![query.into()]))
    }
}

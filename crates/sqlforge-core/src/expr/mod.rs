//! Expression AST.
//!
//! [`Expr`] is the sum type every clause is built from. Chain methods such as
//! [`Expr::eq`] live in [`ops`](self::ops); function calls, window
//! definitions, ordering and CASE have their own modules.

mod case;
mod columns;
mod function;
mod ops;
mod order;
mod window;

use std::sync::Arc;

pub use case::Case;
pub use columns::ColumnsExpr;
pub use function::{Function, Functions};
pub use order::{Direction, Nulls, OrderDef};
pub use window::{Frame, FrameBound, FrameExclusion, FrameMode, NamedWindow, WindowDef};

use crate::error::{RenderError, Result};
use crate::render::{write_raw, Expression, Writer};
use crate::value::{ToValue, Value};

/// A SQL expression.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Text written as-is.
    Literal(String),
    /// A single-quoted string literal.
    Str(String),
    /// A quoted identifier made of one or more segments.
    Quoted(Vec<String>),
    /// Comma-separated positional arguments.
    Arg(Vec<Value>),
    /// Positional arguments wrapped in parentheses.
    ArgGroup(Vec<Value>),
    /// An argument resolved from the render context by name.
    Named(String),
    /// A placeholder left unbound until after rendering.
    Placeholder(String),
    /// A raw fragment whose `?` are numbered with the surrounding args.
    Raw(String, Vec<Value>),
    /// Comma-separated expressions in parentheses.
    Group(Vec<Expr>),
    /// Expressions joined by a separator.
    Join(Vec<Expr>, String),
    /// A prefix operator such as `NOT `.
    Prefix(&'static str, Box<Expr>),
    /// A postfix operator such as ` IS NULL`.
    Postfix(Box<Expr>, &'static str),
    /// A binary operator, rendered `left op right`.
    Binary(Box<Expr>, &'static str, Box<Expr>),
    /// `x [NOT ]BETWEEN [SYMMETRIC ]low AND high`.
    Between {
        /// Tested expression.
        expr: Box<Expr>,
        /// Lower bound.
        low: Box<Expr>,
        /// Upper bound.
        high: Box<Expr>,
        /// Renders `NOT BETWEEN`.
        negated: bool,
        /// Renders `BETWEEN SYMMETRIC`.
        symmetric: bool,
    },
    /// `x [NOT ]IN (items)`.
    In {
        /// Tested expression.
        expr: Box<Expr>,
        /// Candidate list.
        items: Vec<Expr>,
        /// Renders `NOT IN`.
        negated: bool,
    },
    /// `x AS "alias"`.
    As(Box<Expr>, String),
    /// `CAST(x AS type)`.
    Cast(Box<Expr>, String),
    /// A function call.
    Function(Box<Function>),
    /// A CASE expression.
    Case(Box<Case>),
    /// A list of qualified columns.
    Columns(ColumnsExpr),
    /// Any other node, typically a subquery.
    Node(Arc<dyn Expression>),
}

impl Expression for Expr {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        match self {
            Self::Literal(s) => w.write_str(s),
            Self::Str(s) => w.write_str(&Value::Text(s.clone()).to_sql_inline()),
            Self::Quoted(segments) => w.write_quoted(segments),
            Self::Arg(values) => write_args(w, values),
            Self::ArgGroup(values) => {
                w.write_char('(');
                write_args(w, values);
                w.write_char(')');
            }
            Self::Named(name) => {
                let value = w
                    .ctx()
                    .named_arg(name)
                    .cloned()
                    .ok_or_else(|| RenderError::MissingNamedArg(name.clone()))?;
                w.write_arg(value);
            }
            Self::Placeholder(name) => w.write_arg(Value::Unbound(name.clone())),
            Self::Raw(sql, args) => write_raw(w, sql, args)?,
            Self::Group(exprs) => {
                w.write_char('(');
                w.express_slice(exprs, "", ", ", "")?;
                w.write_char(')');
            }
            Self::Join(exprs, sep) => w.express_slice(exprs, "", sep, "")?,
            Self::Prefix(op, e) => {
                w.write_str(op);
                w.express(e.as_ref())?;
            }
            Self::Postfix(e, op) => {
                w.express(e.as_ref())?;
                w.write_str(op);
            }
            Self::Binary(left, op, right) => {
                w.express(left.as_ref())?;
                w.write_char(' ');
                w.write_str(op);
                w.write_char(' ');
                w.express(right.as_ref())?;
            }
            Self::Between {
                expr,
                low,
                high,
                negated,
                symmetric,
            } => {
                w.express(expr.as_ref())?;
                w.write_str(if *negated { " NOT BETWEEN " } else { " BETWEEN " });
                if *symmetric {
                    w.write_str("SYMMETRIC ");
                }
                w.express(low.as_ref())?;
                w.write_str(" AND ");
                w.express(high.as_ref())?;
            }
            Self::In {
                expr,
                items,
                negated,
            } => {
                if items.is_empty() {
                    // x IN () is invalid SQL; the empty set matches nothing
                    w.write_str(if *negated { "TRUE" } else { "FALSE" });
                    return Ok(());
                }
                w.express(expr.as_ref())?;
                w.write_str(if *negated { " NOT IN (" } else { " IN (" });
                w.express_slice(items, "", ", ", "")?;
                w.write_char(')');
            }
            Self::As(e, alias) => {
                w.express(e.as_ref())?;
                w.write_str(" AS ");
                w.write_quoted(&[alias]);
            }
            Self::Cast(e, ty) => {
                w.write_str("CAST(");
                w.express(e.as_ref())?;
                w.write_str(" AS ");
                w.write_str(ty);
                w.write_char(')');
            }
            Self::Function(f) => w.express(f.as_ref())?,
            Self::Case(c) => w.express(c.as_ref())?,
            Self::Columns(c) => w.express(c)?,
            Self::Node(node) => w.express(node.as_ref())?,
        }
        Ok(())
    }
}

fn write_args(w: &mut Writer<'_>, values: &[Value]) {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            w.write_str(", ");
        }
        w.write_arg(value.clone());
    }
}

impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        Self::Literal(String::from(s))
    }
}

impl From<String> for Expr {
    fn from(s: String) -> Self {
        Self::Literal(s)
    }
}

impl From<Function> for Expr {
    fn from(f: Function) -> Self {
        Self::Function(Box::new(f))
    }
}

impl From<Functions> for Expr {
    fn from(f: Functions) -> Self {
        Self::Node(Arc::new(f))
    }
}

impl From<Case> for Expr {
    fn from(c: Case) -> Self {
        Self::Case(Box::new(c))
    }
}

impl From<ColumnsExpr> for Expr {
    fn from(c: ColumnsExpr) -> Self {
        Self::Columns(c)
    }
}

/// Raw SQL written as-is.
#[must_use]
pub fn raw(sql: impl Into<String>) -> Expr {
    Expr::Literal(sql.into())
}

/// Raw SQL whose `?` become numbered placeholders for `args`.
#[must_use]
pub fn raw_args(sql: impl Into<String>, args: impl IntoIterator<Item = Value>) -> Expr {
    Expr::Raw(sql.into(), args.into_iter().collect())
}

/// A single-quoted string literal.
#[must_use]
pub fn s(value: impl Into<String>) -> Expr {
    Expr::Str(value.into())
}

/// A quoted identifier, e.g. `quote(["public", "users"])`.
#[must_use]
pub fn quote<I, S>(segments: I) -> Expr
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Expr::Quoted(segments.into_iter().map(Into::into).collect())
}

/// A single positional argument.
#[must_use]
pub fn arg<T: ToValue>(value: T) -> Expr {
    Expr::Arg(vec![value.to_value()])
}

/// Several comma-separated positional arguments.
#[must_use]
pub fn args<T: ToValue>(values: impl IntoIterator<Item = T>) -> Expr {
    Expr::Arg(values.into_iter().map(ToValue::to_value).collect())
}

/// Positional arguments in parentheses.
#[must_use]
pub fn arg_group<T: ToValue>(values: impl IntoIterator<Item = T>) -> Expr {
    Expr::ArgGroup(values.into_iter().map(ToValue::to_value).collect())
}

/// An argument taken from the render context by name.
#[must_use]
pub fn named(name: impl Into<String>) -> Expr {
    Expr::Named(name.into())
}

/// A placeholder bound by name after rendering.
#[must_use]
pub fn placeholder(name: impl Into<String>) -> Expr {
    Expr::Placeholder(name.into())
}

/// Expressions in parentheses, comma separated.
#[must_use]
pub fn group<I, E>(exprs: I) -> Expr
where
    I: IntoIterator<Item = E>,
    E: Into<Expr>,
{
    Expr::Group(exprs.into_iter().map(Into::into).collect())
}

/// Expressions joined by `sep`.
#[must_use]
pub fn join<I, E>(exprs: I, sep: impl Into<String>) -> Expr
where
    I: IntoIterator<Item = E>,
    E: Into<Expr>,
{
    Expr::Join(exprs.into_iter().map(Into::into).collect(), sep.into())
}

/// `left op right` without parentheses.
///
/// Chained operators such as [`Expr::eq`] group themselves; this form is for
/// assignments and for callers that place the grouping themselves.
#[must_use]
pub fn binary(left: impl Into<Expr>, op: &'static str, right: impl Into<Expr>) -> Expr {
    Expr::Binary(Box::new(left.into()), op, Box::new(right.into()))
}

/// All expressions joined with `||`, without parentheses.
#[must_use]
pub fn concat<I, E>(exprs: I) -> Expr
where
    I: IntoIterator<Item = E>,
    E: Into<Expr>,
{
    join(exprs, " || ")
}

/// All expressions joined with `AND`.
#[must_use]
pub fn and<I, E>(exprs: I) -> Expr
where
    I: IntoIterator<Item = E>,
    E: Into<Expr>,
{
    join(exprs, " AND ")
}

/// All expressions joined with `OR`, in parentheses.
#[must_use]
pub fn or<I, E>(exprs: I) -> Expr
where
    I: IntoIterator<Item = E>,
    E: Into<Expr>,
{
    Expr::Group(vec![join(exprs, " OR ")])
}

/// `NOT x`.
#[must_use]
pub fn not(e: impl Into<Expr>) -> Expr {
    e.into().not()
}

/// `EXISTS (query)`.
#[must_use]
pub fn exists(query: impl Into<Expr>) -> Expr {
    Expr::Prefix("EXISTS ", Box::new(Expr::Group(vec![query.into()])))
}

/// `CAST(x AS ty)`.
#[must_use]
pub fn cast(e: impl Into<Expr>, ty: impl Into<String>) -> Expr {
    Expr::Cast(Box::new(e.into()), ty.into())
}

/// Wraps any node as an expression.
#[must_use]
pub fn node<E: Expression + 'static>(e: E) -> Expr {
    Expr::Node(Arc::new(e))
}

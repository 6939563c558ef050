//! Function calls.

use super::{Expr, OrderDef, WindowDef};
use crate::error::Result;
use crate::render::{Expression, Writer};

/// A function call such as `count(DISTINCT x) FILTER (WHERE y) OVER (w)`.
#[derive(Debug, Clone)]
pub struct Function {
    /// Function name, written as-is.
    pub name: String,
    /// Call arguments.
    pub args: Vec<Expr>,
    /// Renders `DISTINCT` before the arguments.
    pub distinct: bool,
    /// Aggregate ordering.
    pub order_by: Vec<OrderDef>,
    /// Moves the ordering into `WITHIN GROUP (...)`.
    pub within_group: bool,
    /// `FILTER (WHERE ...)` conditions, AND-joined.
    pub filter: Vec<Expr>,
    /// Alias written before the column definitions.
    pub alias: Option<String>,
    /// Column definitions for set-returning functions.
    pub columns: Vec<(String, String)>,
    /// Window for `OVER (...)`.
    pub over: Option<WindowDef>,
}

impl Function {
    /// Creates a call of `name` with `args`.
    #[must_use]
    pub fn new<I, E>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
            distinct: false,
            order_by: Vec::new(),
            within_group: false,
            filter: Vec::new(),
            alias: None,
            columns: Vec::new(),
            over: None,
        }
    }

    /// Renders `name(DISTINCT ...)`.
    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Adds an aggregate ORDER BY item.
    #[must_use]
    pub fn order_by(mut self, order: impl Into<OrderDef>) -> Self {
        self.order_by.push(order.into());
        self
    }

    /// Writes the ordering as `WITHIN GROUP (ORDER BY ...)`.
    #[must_use]
    pub const fn within_group(mut self) -> Self {
        self.within_group = true;
        self
    }

    /// Adds a FILTER condition.
    #[must_use]
    pub fn filter(mut self, condition: impl Into<Expr>) -> Self {
        self.filter.push(condition.into());
        self
    }

    /// Sets the alias used before column definitions.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Adds a column definition `name type`.
    #[must_use]
    pub fn col(mut self, name: impl Into<String>, data_type: impl Into<String>) -> Self {
        self.columns.push((name.into(), data_type.into()));
        self
    }

    /// Sets the window for `OVER (...)`.
    #[must_use]
    pub fn over(mut self, window: WindowDef) -> Self {
        self.over = Some(window);
        self
    }
}

impl Expression for Function {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        if self.name.is_empty() {
            return Ok(());
        }

        w.write_str(&self.name);
        w.write_char('(');
        if self.distinct {
            w.write_str("DISTINCT ");
        }
        w.express_slice(&self.args, "", ", ", "")?;
        if !self.within_group {
            w.express_slice(&self.order_by, " ORDER BY ", ", ", "")?;
        }
        w.write_char(')');

        if self.within_group {
            w.express_slice(&self.order_by, " WITHIN GROUP (ORDER BY ", ", ", ")")?;
        }
        w.express_slice(&self.filter, " FILTER (WHERE ", " AND ", ")")?;

        if !self.columns.is_empty() || self.alias.is_some() {
            w.write_str(" AS ");
        }
        if let Some(alias) = &self.alias {
            w.write_str(alias);
            w.write_char(' ');
        }
        if !self.columns.is_empty() {
            w.write_char('(');
            for (i, (name, data_type)) in self.columns.iter().enumerate() {
                if i > 0 {
                    w.write_str(", ");
                }
                w.write_str(name);
                w.write_char(' ');
                w.write_str(data_type);
            }
            w.write_char(')');
        }

        w.express_opt(self.over.as_ref(), " OVER (", ")")
    }
}

/// One or more functions used as a table source.
///
/// More than one function renders as `ROWS FROM (f1(), f2())`.
#[derive(Debug, Clone, Default)]
pub struct Functions(pub Vec<Function>);

impl Expression for Functions {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        let rows_from = self.0.len() > 1;
        if rows_from {
            w.write_str("ROWS FROM (");
        }
        w.express_slice(&self.0, "", ", ", "")?;
        if rows_from {
            w.write_char(')');
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Postgres;
    use crate::expr::{arg, raw};
    use crate::render::{render, Context};
    use crate::value::Value;

    fn sql<E: Expression>(e: &E) -> (String, Vec<Value>) {
        render(e, &Context::new(), &Postgres, 0).unwrap()
    }

    #[test]
    fn test_function_filter_and_over() {
        let f = Function::new("count", [raw("*")])
            .filter(raw("x").gt(arg(1)))
            .over(WindowDef::new().partition_by([raw("dept")]));
        let (text, args) = sql(&f);
        assert_eq!(text, "count(*) FILTER (WHERE (x > $1)) OVER (PARTITION BY dept)");
        assert_eq!(args, vec![Value::Int(1)]);
    }

    #[test]
    fn test_function_distinct_order() {
        let f = Function::new("string_agg", [raw("name"), raw("','")])
            .distinct()
            .order_by(OrderDef::new(raw("name")).desc());
        assert_eq!(sql(&f).0, "string_agg(DISTINCT name, ',' ORDER BY name DESC)");
    }

    #[test]
    fn test_function_within_group() {
        let f = Function::new("percentile_cont", [raw("0.5")])
            .order_by(raw("salary"))
            .within_group();
        assert_eq!(sql(&f).0, "percentile_cont(0.5) WITHIN GROUP (ORDER BY salary)");
    }

    #[test]
    fn test_rows_from_with_column_defs() {
        let fs = Functions(vec![
            Function::new("json_to_recordset", [arg("[]")]).col("a", "int"),
            Function::new("generate_series", [arg(1), arg(3)]),
        ]);
        let (text, args) = sql(&fs);
        assert_eq!(
            text,
            "ROWS FROM (json_to_recordset($1) AS (a int), generate_series($2, $3))"
        );
        assert_eq!(args.len(), 3);
    }
}

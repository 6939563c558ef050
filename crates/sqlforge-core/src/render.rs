//! The rendering pipeline.
//!
//! Every AST node implements [`Expression`] and writes itself into a
//! [`Writer`]. The writer owns the SQL buffer and the argument list, so a
//! placeholder always carries `start + N` where `N` counts the arguments
//! emitted so far; nested subqueries continue the same numbering.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::dialect::Dialect;
use crate::error::{RenderError, Result};
use crate::value::Value;

/// Per-render context handed to contextual mods and expressions.
#[derive(Debug, Clone, Default)]
pub struct Context {
    server_version: Option<u32>,
    skip_contextual_mods: bool,
    named: Arc<HashMap<String, Value>>,
}

impl Context {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the server version as `major * 10000 + minor` or just the major.
    #[must_use]
    pub const fn with_server_version(mut self, version: u32) -> Self {
        self.server_version = Some(version);
        self
    }

    /// Disables contextual mods for this render.
    #[must_use]
    pub const fn skipping_contextual_mods(mut self) -> Self {
        self.skip_contextual_mods = true;
        self
    }

    /// Supplies values for named arguments.
    #[must_use]
    pub fn with_named_args(mut self, named: HashMap<String, Value>) -> Self {
        self.named = Arc::new(named);
        self
    }

    /// Returns the server major version, if known.
    ///
    /// Both `17` and `170004` style numbers yield `17`.
    #[must_use]
    pub const fn server_version(&self) -> Option<u32> {
        match self.server_version {
            Some(v) if v >= 10000 => Some(v / 10000),
            other => other,
        }
    }

    /// Returns true when the server major version is known and at least `major`.
    #[must_use]
    pub fn version_at_least(&self, major: u32) -> bool {
        self.server_version().is_some_and(|v| v >= major)
    }

    /// Returns true when contextual mods must not run.
    #[must_use]
    pub const fn skip_contextual_mods(&self) -> bool {
        self.skip_contextual_mods
    }

    /// Looks up a named argument.
    #[must_use]
    pub fn named_arg(&self, name: &str) -> Option<&Value> {
        self.named.get(name)
    }
}

/// A node that renders to SQL text plus arguments.
pub trait Expression: fmt::Debug + Send + Sync {
    /// Writes the node into `w`.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] when the node (or a child) cannot be rendered.
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()>;
}

impl<T: Expression + ?Sized> Expression for Box<T> {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        (**self).write_sql(w)
    }
}

impl<T: Expression + ?Sized> Expression for Arc<T> {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        (**self).write_sql(w)
    }
}

/// Accumulates SQL text and arguments for one render.
pub struct Writer<'a> {
    ctx: Context,
    dialect: &'a dyn Dialect,
    start: usize,
    sql: String,
    args: Vec<Value>,
}

impl<'a> Writer<'a> {
    /// Creates a writer whose first placeholder is `start + 1`.
    #[must_use]
    pub fn new(ctx: Context, dialect: &'a dyn Dialect, start: usize) -> Self {
        Self {
            ctx,
            dialect,
            start,
            sql: String::new(),
            args: Vec::new(),
        }
    }

    /// Returns the active context.
    #[must_use]
    pub const fn ctx(&self) -> &Context {
        &self.ctx
    }

    /// Replaces the context, returning the previous one.
    pub fn swap_ctx(&mut self, ctx: Context) -> Context {
        std::mem::replace(&mut self.ctx, ctx)
    }

    /// Returns the active dialect.
    #[must_use]
    pub const fn dialect(&self) -> &'a dyn Dialect {
        self.dialect
    }

    /// Returns the number of arguments emitted so far, offset by `start`.
    #[must_use]
    pub fn position(&self) -> usize {
        self.start + self.args.len()
    }

    /// Appends raw text.
    pub fn write_str(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    /// Appends a single character.
    pub fn write_char(&mut self, c: char) {
        self.sql.push(c);
    }

    /// Writes a placeholder and records its value.
    pub fn write_arg(&mut self, value: Value) {
        let position = self.position() + 1;
        self.dialect.write_arg(&mut self.sql, position);
        self.args.push(value);
    }

    /// Writes a quoted, dot-separated identifier.
    pub fn write_quoted<S: AsRef<str>>(&mut self, segments: &[S]) {
        let segments: Vec<&str> = segments.iter().map(AsRef::as_ref).collect();
        self.dialect.write_quoted(&mut self.sql, &segments);
    }

    /// Renders `e` in place.
    ///
    /// # Errors
    ///
    /// Propagates the error of `e`.
    pub fn express<E: Expression + ?Sized>(&mut self, e: &E) -> Result<()> {
        e.write_sql(self)
    }

    /// Renders `prefix`, `e`, `suffix` only when `cond` holds.
    ///
    /// # Errors
    ///
    /// Propagates the error of `e`.
    pub fn express_if<E: Expression + ?Sized>(
        &mut self,
        e: &E,
        cond: bool,
        prefix: &str,
        suffix: &str,
    ) -> Result<()> {
        if !cond {
            return Ok(());
        }
        self.write_str(prefix);
        e.write_sql(self)?;
        self.write_str(suffix);
        Ok(())
    }

    /// Renders an optional node surrounded by `prefix` and `suffix`.
    ///
    /// # Errors
    ///
    /// Propagates the error of `e`.
    pub fn express_opt<E: Expression>(
        &mut self,
        e: Option<&E>,
        prefix: &str,
        suffix: &str,
    ) -> Result<()> {
        match e {
            Some(e) => self.express_if(e, true, prefix, suffix),
            None => Ok(()),
        }
    }

    /// Renders `items` joined by `sep`; writes nothing for an empty slice.
    ///
    /// # Errors
    ///
    /// Propagates the first item error.
    pub fn express_slice<E: Expression>(
        &mut self,
        items: &[E],
        prefix: &str,
        sep: &str,
        suffix: &str,
    ) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        self.write_str(prefix);
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.write_str(sep);
            }
            item.write_sql(self)?;
        }
        self.write_str(suffix);
        Ok(())
    }

    /// Renders a child clause, tagging any error with `path`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Sub`] wrapping the child's error.
    pub fn express_in<E: Expression + ?Sized>(&mut self, path: &str, e: &E) -> Result<()> {
        e.write_sql(self).map_err(|err| err.within(path))
    }

    /// Consumes the writer, returning the text and arguments.
    #[must_use]
    pub fn finish(self) -> (String, Vec<Value>) {
        (self.sql, self.args)
    }
}

/// Renders `e` with placeholders numbered from `start + 1`.
///
/// # Errors
///
/// Returns the first [`RenderError`] raised by the tree.
pub fn render<E: Expression + ?Sized>(
    e: &E,
    ctx: &Context,
    dialect: &dyn Dialect,
    start: usize,
) -> Result<(String, Vec<Value>)> {
    let mut w = Writer::new(ctx.clone(), dialect, start);
    e.write_sql(&mut w)?;
    Ok(w.finish())
}

/// Writes `sql`, replacing each unescaped `?` with the next placeholder.
///
/// `\?` is written as a literal `?`.
///
/// # Errors
///
/// Returns [`RenderError::RawPlaceholderMismatch`] when the number of `?`
/// differs from `args.len()`.
pub fn write_raw(w: &mut Writer<'_>, sql: &str, args: &[Value]) -> Result<()> {
    let placeholders = count_raw_placeholders(sql);
    if placeholders != args.len() {
        return Err(RenderError::RawPlaceholderMismatch {
            placeholders,
            args: args.len(),
        });
    }

    let mut args = args.iter();
    let mut chars = sql.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'?') => {
                chars.next();
                w.write_char('?');
            }
            '?' => {
                if let Some(arg) = args.next() {
                    w.write_arg(arg.clone());
                }
            }
            other => w.write_char(other),
        }
    }
    Ok(())
}

fn count_raw_placeholders(sql: &str) -> usize {
    let mut count = 0;
    let mut escaped = false;
    for c in sql.chars() {
        match c {
            '\\' => {
                escaped = !escaped;
                continue;
            }
            '?' if !escaped => count += 1,
            _ => {}
        }
        escaped = false;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Postgres;

    #[test]
    fn test_writer_numbers_from_start() {
        let mut w = Writer::new(Context::new(), &Postgres, 3);
        w.write_arg(Value::Int(1));
        w.write_str(", ");
        w.write_arg(Value::Int(2));
        let (sql, args) = w.finish();
        assert_eq!(sql, "$4, $5");
        assert_eq!(args, vec![Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn test_write_raw_placeholders() {
        let mut w = Writer::new(Context::new(), &Postgres, 0);
        write_raw(&mut w, "a = ? AND b \\? ?", &[Value::Int(1), Value::Int(2)]).unwrap();
        assert_eq!(w.finish().0, "a = $1 AND b ? $2");
    }

    #[test]
    fn test_write_raw_mismatch() {
        let mut w = Writer::new(Context::new(), &Postgres, 0);
        let err = write_raw(&mut w, "a = ?", &[]).unwrap_err();
        assert!(matches!(
            err,
            RenderError::RawPlaceholderMismatch {
                placeholders: 1,
                args: 0
            }
        ));
    }

    #[test]
    fn test_context_version() {
        assert_eq!(Context::new().server_version(), None);
        assert_eq!(Context::new().with_server_version(170_004).server_version(), Some(17));
        assert!(Context::new().with_server_version(16).version_at_least(16));
        assert!(!Context::new().with_server_version(16).version_at_least(17));
        assert!(!Context::new().version_at_least(1));
    }
}

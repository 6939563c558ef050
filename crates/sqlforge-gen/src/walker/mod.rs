//! Depth-first walk over a parsed statement.
//!
//! The walker builds a [`NodeInfo`] tree for the statement and records, keyed
//! by span, the names and nullability predicates of the expressions it meets.
//! Argument placeholders, value groups and rebuild fragments are registered as
//! [`EditRule`]s; their final positions are only known once the rules are
//! applied by [`Walker::format`].

mod nodes;
mod statements;

use std::borrow::Borrow;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pg_query::protobuf as pg;
use pg_query::protobuf::Token as Kind;
use pg_query::NodeEnum;
use tracing::debug;

use crate::catalog::Table;
use crate::edit::{self, EditRule};
use crate::error::{GenError, Result};
use crate::mods::ModCall;
use crate::nullable::Nullability;
use crate::span::{NodeInfo, Span};
use crate::tokens::TokenStream;

/// One occurrence of an argument: where it was written and where it ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArgPos {
    /// Span in the input.
    pub original: Span,
    /// Byte range in the rewritten SQL.
    pub edited: (usize, usize),
}

/// What an edit rule reports back once applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Mark {
    /// Placeholder `$N`, zero-based.
    Arg { index: usize, original: Span },
    /// A parenthesised group of values.
    Group { original: Span, multiple: bool },
    /// A span that may be expanded to several values.
    Multiple,
    /// A rebuild fragment line.
    Mod(ModCall),
}

/// The rewritten SQL and everything located in it.
#[derive(Debug, Clone, Default)]
pub struct Formatted {
    /// SQL with comments removed and placeholders renumbered.
    pub sql: String,
    /// Occurrences of every argument, indexed by original number minus one.
    pub args: Vec<Vec<ArgPos>>,
    /// Value groups, in a stable order.
    pub groups: Vec<ArgPos>,
    /// Edited spans that accept several values.
    pub multiple: HashSet<(usize, usize)>,
    /// The rebuild fragment.
    pub mods: String,
    /// Modules the fragment refers to.
    pub imports: Vec<String>,
}

/// Walker state for a single statement.
pub struct Walker<'s> {
    pub(crate) tables: &'s [Table],
    pub(crate) shared_schema: &'s str,
    pub(crate) tokens: TokenStream<'s>,
    pub(crate) names: HashMap<Span, String>,
    pub(crate) nullability: HashMap<Span, Nullability>,
    pub(crate) rules: Vec<EditRule<'static, Mark>>,
    pub(crate) mods: Vec<String>,
    pub(crate) imports: BTreeSet<&'static str>,
    pub(crate) errors: Vec<GenError>,
    arg_count: usize,
    atom: Arc<AtomicUsize>,
    position: i32,
}

impl<'s> Walker<'s> {
    /// Creates a walker over `input`.
    ///
    /// # Errors
    ///
    /// Returns the scanner's error.
    pub fn new(input: &'s str, tables: &'s [Table], shared_schema: &'s str) -> Result<Self> {
        Ok(Self {
            tables,
            shared_schema,
            tokens: TokenStream::scan(input)?,
            names: HashMap::new(),
            nullability: HashMap::new(),
            rules: Vec::new(),
            mods: Vec::new(),
            imports: BTreeSet::new(),
            errors: Vec::new(),
            arg_count: 0,
            atom: Arc::new(AtomicUsize::new(0)),
            position: 0,
        })
    }

    /// The input text.
    #[must_use]
    pub const fn input(&self) -> &'s str {
        self.tokens.input()
    }

    /// The name recorded for `span`, or an empty string.
    #[must_use]
    pub fn name(&self, span: Span) -> &str {
        self.names.get(&span).map_or("", String::as_str)
    }

    /// Number of distinct placeholders (the highest `$N`).
    #[must_use]
    pub const fn arg_count(&self) -> usize {
        self.arg_count
    }

    pub(crate) fn maybe_set_name(&mut self, span: Span, name: &str) {
        if !span.is_valid() || self.names.contains_key(&span) {
            return;
        }
        let name = unquote_literal(name);
        if name.is_empty() {
            return;
        }
        self.names.insert(span, name.to_string());
    }

    pub(crate) fn match_names(&mut self, a: Span, b: Span) {
        let a_name = self.name(a).to_string();
        let b_name = self.name(b).to_string();
        self.maybe_set_name(a, &b_name);
        self.maybe_set_name(b, &a_name);
    }

    pub(crate) fn set_null(&mut self, span: Span, n: Option<Nullability>) {
        let Some(n) = n else { return };
        if !span.is_valid() {
            return;
        }
        let combined = match self.nullability.remove(&span) {
            Some(prev) => n.or(prev),
            None => n,
        };
        self.nullability.insert(span, combined);
    }

    pub(crate) fn record(&mut self, span: Span, mark: Mark) {
        if let Some(range) = span.range() {
            self.rules.push(EditRule::record_points(range, mark));
        }
    }

    pub(crate) fn record_mod(&mut self, span: Span, call: ModCall) {
        self.record(span, Mark::Mod(call));
    }

    pub(crate) fn push_placeholder(&mut self, number: i32, span: Span) {
        let Ok(number) = usize::try_from(number) else { return };
        if number == 0 {
            return;
        }
        self.arg_count = self.arg_count.max(number);
        let Some(range) = span.range() else { return };
        let atom = Arc::clone(&self.atom);
        self.rules.push(
            EditRule::replace_by(range, move || {
                format!("${}", atom.fetch_add(1, Ordering::Relaxed) + 1)
            })
            .with_callback(Mark::Arg {
                index: number - 1,
                original: span,
            }),
        );
    }

    const fn update_position(&mut self, pos: i32) {
        if pos > 0 {
            self.position = pos;
        }
    }

    pub(crate) const fn position(&self) -> i32 {
        self.position
    }

    pub(crate) const fn set_position(&mut self, pos: i32) {
        self.position = pos;
    }

    const fn done(&mut self, info: NodeInfo) -> NodeInfo {
        self.update_position(info.end);
        info
    }

    /// Walks a node with an optional `location`, letting `fields` add the
    /// children in grammar order, then balances parentheses.
    fn walk_struct(
        &mut self,
        location: Option<i32>,
        fields: impl FnOnce(&mut Self, NodeInfo) -> NodeInfo,
    ) -> NodeInfo {
        let mut info = NodeInfo::invalid();
        if let Some(loc) = location {
            info.start = loc;
            self.update_position(loc);
            info.end = self.tokens.end_of(loc);
        }
        let info = fields(self, info);
        self.tokens.balance_parens(info)
    }

    fn node_field(&mut self, info: NodeInfo, name: &str, node: Option<&pg::Node>) -> NodeInfo {
        let child = node.map_or_else(NodeInfo::invalid, |n| self.walk_node(n));
        info.add_child(name, child)
    }

    fn list_field(&mut self, info: NodeInfo, name: &str, nodes: &[pg::Node]) -> NodeInfo {
        let child = self.walk_list(nodes);
        info.add_child(name, child)
    }

    fn walk_list(&mut self, nodes: &[pg::Node]) -> NodeInfo {
        let mut info = NodeInfo::invalid();
        for (i, node) in nodes.iter().enumerate() {
            let child = self.walk_node(node);
            info = info.add_child(i.to_string(), child);
        }
        self.done(info)
    }

    /// Walks a node; the returned info wraps the variant's info under the
    /// variant name.
    pub fn walk_node(&mut self, node: &pg::Node) -> NodeInfo {
        let Some(inner) = &node.node else {
            return NodeInfo::invalid();
        };
        let (key, child) = match inner {
            NodeEnum::SelectStmt(s) => ("SelectStmt", self.walk_select_stmt(s)),
            NodeEnum::InsertStmt(s) => ("InsertStmt", self.walk_insert_stmt(s)),
            NodeEnum::UpdateStmt(s) => ("UpdateStmt", self.walk_update_stmt(s)),
            NodeEnum::DeleteStmt(s) => ("DeleteStmt", self.walk_delete_stmt(s)),
            NodeEnum::ResTarget(n) => ("ResTarget", self.walk_res_target(n)),
            NodeEnum::ColumnRef(n) => ("ColumnRef", self.walk_column_ref(n)),
            NodeEnum::AStar(_) => ("AStar", self.walk_a_star()),
            NodeEnum::AConst(n) => ("AConst", self.walk_a_const(n)),
            NodeEnum::ParamRef(n) => ("ParamRef", self.walk_param_ref(n)),
            NodeEnum::AExpr(n) => ("AExpr", self.walk_a_expr(n)),
            NodeEnum::BoolExpr(n) => ("BoolExpr", self.walk_bool_expr(n)),
            NodeEnum::NullTest(n) => ("NullTest", self.walk_null_test(n)),
            NodeEnum::BooleanTest(n) => ("BooleanTest", self.walk_boolean_test(n)),
            NodeEnum::CoalesceExpr(n) => ("CoalesceExpr", self.walk_coalesce_expr(n)),
            NodeEnum::MinMaxExpr(n) => ("MinMaxExpr", self.walk_min_max_expr(n)),
            NodeEnum::FuncCall(n) => ("FuncCall", self.walk_func_call(n)),
            NodeEnum::TypeCast(n) => ("TypeCast", self.walk_type_cast(n)),
            NodeEnum::TypeName(n) => ("TypeName", self.walk_type_name(n)),
            NodeEnum::CaseExpr(n) => ("CaseExpr", self.walk_case_expr(n)),
            NodeEnum::CaseWhen(n) => ("CaseWhen", self.walk_case_when(n)),
            NodeEnum::SubLink(n) => ("SubLink", self.walk_sub_link(n)),
            NodeEnum::RowExpr(n) => ("RowExpr", self.walk_row_expr(n)),
            NodeEnum::AArrayExpr(n) => ("AArrayExpr", self.walk_a_array_expr(n)),
            NodeEnum::AIndirection(n) => ("AIndirection", self.walk_a_indirection(n)),
            NodeEnum::AIndices(n) => ("AIndices", self.walk_a_indices(n)),
            NodeEnum::List(n) => ("List", self.walk_list_node(n)),
            NodeEnum::String(n) => ("String", self.walk_string(n)),
            NodeEnum::SortBy(n) => ("SortBy", self.walk_sort_by(n)),
            NodeEnum::WindowDef(n) => ("WindowDef", self.walk_window_def(n)),
            NodeEnum::RangeVar(n) => ("RangeVar", self.walk_range_var(n)),
            NodeEnum::Alias(n) => ("Alias", self.walk_alias(n)),
            NodeEnum::JoinExpr(n) => ("JoinExpr", self.walk_join_expr(n)),
            NodeEnum::RangeSubselect(n) => ("RangeSubselect", self.walk_range_subselect(n)),
            NodeEnum::RangeFunction(n) => ("RangeFunction", self.walk_range_function(n)),
            NodeEnum::CommonTableExpr(n) => ("CommonTableExpr", self.walk_cte(n)),
            NodeEnum::WithClause(n) => ("WithClause", self.walk_with_clause(n)),
            NodeEnum::OnConflictClause(n) => ("OnConflictClause", self.walk_on_conflict(n)),
            NodeEnum::InferClause(n) => ("InferClause", self.walk_infer_clause(n)),
            NodeEnum::IndexElem(n) => ("IndexElem", self.walk_index_elem(n)),
            NodeEnum::LockingClause(n) => ("LockingClause", self.walk_locking_clause(n)),
            NodeEnum::MultiAssignRef(n) => ("MultiAssignRef", self.walk_multi_assign_ref(n)),
            NodeEnum::SetToDefault(n) => ("SetToDefault", self.walk_located(n.location)),
            NodeEnum::CollateClause(n) => ("CollateClause", self.walk_collate_clause(n)),
            NodeEnum::NamedArgExpr(n) => ("NamedArgExpr", self.walk_named_arg_expr(n)),
            NodeEnum::GroupingSet(n) => ("GroupingSet", self.walk_grouping_set(n)),
            other => {
                debug!(node = ?std::mem::discriminant(other), "node has no span rules");
                return NodeInfo::invalid();
            }
        };
        let info = NodeInfo::invalid().add_child(key, child);
        let info = self.tokens.balance_parens(info);
        self.done(info)
    }

    /// Applies the comment-stripping rules and every recorded edit rule.
    ///
    /// # Errors
    ///
    /// Returns the edit engine's error for overlapping or out-of-bounds rules.
    pub fn format(&mut self) -> Result<Formatted> {
        let mut rules = Vec::with_capacity(self.rules.len());
        for t in self.tokens.tokens() {
            let Some(range) = t.span().range() else { continue };
            if t.is(Kind::SqlComment) {
                rules.push(EditRule::delete(range.start..range.end + 1));
            } else if t.is(Kind::CComment) {
                rules.push(EditRule::delete(range));
            }
        }
        rules.append(&mut self.rules);

        let edited = edit::apply(self.input(), rules)?;

        let mut out = Formatted {
            sql: edited.text,
            args: vec![Vec::new(); self.arg_count],
            mods: self.mods.concat(),
            imports: self.imports.iter().map(ToString::to_string).collect(),
            ..Formatted::default()
        };
        let mut groups = BTreeSet::new();
        for m in edited.marks {
            let edited_span = (m.start, m.end);
            match m.mark {
                Mark::Arg { index, original } => {
                    if let Some(slot) = out.args.get_mut(index) {
                        slot.push(ArgPos {
                            original,
                            edited: edited_span,
                        });
                    }
                }
                Mark::Group { original, multiple } => {
                    groups.insert(ArgPos {
                        original,
                        edited: edited_span,
                    });
                    if multiple {
                        out.multiple.insert(edited_span);
                    }
                }
                Mark::Multiple => {
                    out.multiple.insert(edited_span);
                }
                Mark::Mod(call) => out.mods.push_str(&call.render(m.start, m.end)),
            }
        }
        out.groups = groups.into_iter().collect();

        Ok(out)
    }
}

/// Borrows an optional message field whether or not it is boxed.
pub(crate) fn field<T, B: Borrow<T>>(value: &Option<B>) -> Option<&T> {
    value.as_ref().map(Borrow::borrow)
}

/// Strips one layer of `"…"` or `'…'` quoting.
fn unquote_literal(name: &str) -> &str {
    let bytes = name.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &name[1..name.len() - 1];
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unquote_literal() {
        assert_eq!(unquote_literal("'abc'"), "abc");
        assert_eq!(unquote_literal("\"Name\""), "Name");
        assert_eq!(unquote_literal("plain"), "plain");
        assert_eq!(unquote_literal("'"), "'");
    }

    #[test]
    fn test_names_are_never_overwritten() {
        let mut w = Walker::new("SELECT 1", &[], "public").unwrap();
        let span = Span::new(7, 8);
        w.maybe_set_name(span, "'first'");
        w.maybe_set_name(span, "second");
        w.maybe_set_name(Span::INVALID, "ignored");
        assert_eq!(w.name(span), "first");
        assert!(w.names.len() == 1);
    }

    #[test]
    fn test_set_null_combines_predicates() {
        let mut w = Walker::new("SELECT 1", &[], "public").unwrap();
        let span = Span::new(7, 8);
        w.set_null(span, Some(Nullability::Column(vec![span])));
        w.set_null(span, Some(Nullability::Always));
        assert!(matches!(w.nullability[&span], Nullability::AnyOf(ref v) if v.len() == 2));
    }
}

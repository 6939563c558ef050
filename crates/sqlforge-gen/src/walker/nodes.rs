//! Expression and clause nodes.

use pg_query::protobuf as pg;
use pg_query::protobuf::{KeywordKind, Token as Kind};

use super::{field, Mark, Walker};
use crate::nullable::Nullability;
use crate::span::NodeInfo;

impl Walker<'_> {
    pub(super) fn walk_a_star(&mut self) -> NodeInfo {
        let info = self.tokens.find_token_after(self.position(), &[Kind::Ascii42]);
        if info.is_valid() {
            let text = self.tokens.text(info.span());
            self.maybe_set_name(info.span(), text);
        }
        self.done(info)
    }

    /// A leaf spanning the single token at `location`.
    pub(super) fn walk_located(&mut self, location: i32) -> NodeInfo {
        self.update_position(location);
        let info = NodeInfo::leaf(location, self.tokens.end_of(location));
        self.done(info)
    }

    pub(super) fn walk_a_const(&mut self, c: &pg::AConst) -> NodeInfo {
        self.update_position(c.location);
        let info = NodeInfo::leaf(c.location, self.tokens.end_of(c.location));
        let text = self.tokens.text(info.span());
        self.maybe_set_name(info.span(), text);
        self.done(info)
    }

    pub(super) fn walk_param_ref(&mut self, p: &pg::ParamRef) -> NodeInfo {
        self.update_position(p.location);
        let info = NodeInfo::leaf(p.location, self.tokens.end_of(p.location));
        self.push_placeholder(p.number, info.span());
        self.done(info)
    }

    pub(super) fn walk_a_expr(&mut self, e: &pg::AExpr) -> NodeInfo {
        let info = self.walk_struct(Some(e.location), |w, info| {
            let info = w.list_field(info, "Name", &e.name);
            let info = w.node_field(info, "Lexpr", e.lexpr.as_deref());
            w.node_field(info, "Rexpr", e.rexpr.as_deref())
        });

        let left = info.child("Lexpr");
        let right = info.child("Rexpr");
        let kind = e.kind;

        if kind == pg::AExprKind::AexprOp as i32
            || kind == pg::AExprKind::AexprDistinct as i32
            || kind == pg::AExprKind::AexprNotDistinct as i32
        {
            self.match_names(left.span(), right.span());
        } else if kind == pg::AExprKind::AexprOpAny as i32 || kind == pg::AExprKind::AexprOpAll as i32 {
            for element in right.child("AArrayExpr").child("Elements").children.values() {
                self.match_names(left.span(), element.span());
            }
        } else if kind == pg::AExprKind::AexprIn as i32 {
            let row = left.child("RowExpr");
            let is_row = row.has("Args");
            for item in right.child("List").child("Items").children.values() {
                self.match_names(left.span(), item.span());
                if !is_row {
                    continue;
                }
                for (key, row_item) in &item.child("RowExpr").child("Args").children {
                    self.match_names(row.child("Args").child(key).span(), row_item.span());
                }
            }
        }

        self.done(info)
    }

    pub(super) fn walk_bool_expr(&mut self, b: &pg::BoolExpr) -> NodeInfo {
        let info = self.walk_struct(Some(b.location), |w, info| w.list_field(info, "Args", &b.args));
        self.done(info)
    }

    pub(super) fn walk_null_test(&mut self, n: &pg::NullTest) -> NodeInfo {
        let mut info = self.walk_struct(Some(n.location), |w, info| {
            w.node_field(info, "Arg", n.arg.as_deref())
        });
        let null = self.tokens.find_token_after(info.end, &[Kind::NullP]);
        if null.end != -1 {
            info.end = null.end;
        }
        self.set_null(info.child("Arg").span(), Some(Nullability::Always));
        self.done(info)
    }

    pub(super) fn walk_boolean_test(&mut self, b: &pg::BooleanTest) -> NodeInfo {
        let info = self.walk_struct(Some(b.location), |w, info| {
            w.node_field(info, "Arg", b.arg.as_deref())
        });
        self.done(info)
    }

    pub(super) fn walk_coalesce_expr(&mut self, c: &pg::CoalesceExpr) -> NodeInfo {
        let info = self.walk_struct(Some(c.location), |w, info| w.list_field(info, "Args", &c.args));
        for arg in info.child("Args").children.values() {
            self.set_null(arg.span(), Some(Nullability::Always));
        }
        self.done(info)
    }

    pub(super) fn walk_min_max_expr(&mut self, m: &pg::MinMaxExpr) -> NodeInfo {
        let info = self.walk_struct(Some(m.location), |w, info| w.list_field(info, "Args", &m.args));
        self.done(info)
    }

    pub(super) fn walk_func_call(&mut self, f: &pg::FuncCall) -> NodeInfo {
        let info = self.walk_struct(Some(f.location), |w, info| {
            let info = w.list_field(info, "Funcname", &f.funcname);
            let info = w.list_field(info, "Args", &f.args);
            let info = w.list_field(info, "AggOrder", &f.agg_order);
            let info = w.node_field(info, "AggFilter", f.agg_filter.as_deref());
            let over = field(&f.over).map_or_else(NodeInfo::invalid, |o| w.walk_window_def(o));
            info.add_child("Over", over)
        });

        let name = info.child("Funcname").item(0);
        if name.is_valid() {
            let name = self.name(name.span()).to_string();
            self.maybe_set_name(info.span(), &name);
        }
        self.done(info)
    }

    pub(super) fn walk_type_cast(&mut self, t: &pg::TypeCast) -> NodeInfo {
        let info = self.walk_struct(Some(t.location), |w, info| {
            let info = w.node_field(info, "Arg", t.arg.as_deref());
            let type_name = field(&t.type_name).map_or_else(NodeInfo::invalid, |n| w.walk_type_name(n));
            info.add_child("TypeName", type_name)
        });
        self.done(info)
    }

    pub(super) fn walk_type_name(&mut self, t: &pg::TypeName) -> NodeInfo {
        let info = self.walk_struct(Some(t.location), |w, info| {
            let info = w.list_field(info, "Names", &t.names);
            let info = w.list_field(info, "Typmods", &t.typmods);
            w.list_field(info, "ArrayBounds", &t.array_bounds)
        });
        self.done(info)
    }

    pub(super) fn walk_case_expr(&mut self, c: &pg::CaseExpr) -> NodeInfo {
        let info = self.walk_struct(Some(c.location), |w, info| {
            let info = w.node_field(info, "Arg", c.arg.as_deref());
            let info = w.list_field(info, "Args", &c.args);
            w.node_field(info, "Defresult", c.defresult.as_deref())
        });
        self.done(info)
    }

    pub(super) fn walk_case_when(&mut self, c: &pg::CaseWhen) -> NodeInfo {
        let info = self.walk_struct(Some(c.location), |w, info| {
            let info = w.node_field(info, "Expr", c.expr.as_deref());
            w.node_field(info, "Result", c.result.as_deref())
        });
        self.done(info)
    }

    pub(super) fn walk_sub_link(&mut self, s: &pg::SubLink) -> NodeInfo {
        let info = self.walk_struct(Some(s.location), |w, info| {
            let info = w.node_field(info, "Testexpr", s.testexpr.as_deref());
            let info = w.list_field(info, "OperName", &s.oper_name);
            w.node_field(info, "Subselect", s.subselect.as_deref())
        });
        self.done(info)
    }

    pub(super) fn walk_row_expr(&mut self, r: &pg::RowExpr) -> NodeInfo {
        let info = self.walk_struct(Some(r.location), |w, info| {
            let info = w.list_field(info, "Args", &r.args);
            w.list_field(info, "Colnames", &r.colnames)
        });
        self.record(
            info.span(),
            Mark::Group {
                original: info.span(),
                multiple: false,
            },
        );
        self.done(info)
    }

    pub(super) fn walk_a_array_expr(&mut self, a: &pg::AArrayExpr) -> NodeInfo {
        let mut info = self.walk_struct(Some(a.location), |w, info| {
            w.list_field(info, "Elements", &a.elements)
        });
        info.end = self.tokens.end_of_token_after(info.end, &[Kind::Ascii93]);

        let elements = info.child("Elements").span();
        if a.elements.len() == 1 {
            self.record(
                elements,
                Mark::Group {
                    original: elements,
                    multiple: true,
                },
            );
        } else {
            self.record(
                info.span(),
                Mark::Group {
                    original: info.span(),
                    multiple: false,
                },
            );
        }
        self.done(info)
    }

    pub(super) fn walk_a_indirection(&mut self, a: &pg::AIndirection) -> NodeInfo {
        let info = self.walk_struct(None, |w, info| {
            let info = w.node_field(info, "Arg", a.arg.as_deref());
            w.list_field(info, "Indirection", &a.indirection)
        });
        self.done(info)
    }

    pub(super) fn walk_a_indices(&mut self, a: &pg::AIndices) -> NodeInfo {
        let info = self.walk_struct(None, |w, info| {
            let info = w.node_field(info, "Lidx", a.lidx.as_deref());
            w.node_field(info, "Uidx", a.uidx.as_deref())
        });
        self.done(info)
    }

    pub(super) fn walk_list_node(&mut self, l: &pg::List) -> NodeInfo {
        let mut info = self.walk_struct(None, |w, info| w.list_field(info, "Items", &l.items));
        info.start = self.tokens.start_of_token_before(info.start, &[Kind::Ascii40]);
        info.end = self.tokens.end_of_token_after(info.end, &[Kind::Ascii41]);

        self.record(
            info.span(),
            Mark::Group {
                original: info.span(),
                multiple: false,
            },
        );
        if l.items.len() == 1 {
            self.record(info.child("Items").span(), Mark::Multiple);
        }
        self.done(info)
    }

    pub(super) fn walk_string(&mut self, s: &pg::String) -> NodeInfo {
        let ident = self.tokens.ident_after(self.position());
        if !ident.is_valid() {
            return NodeInfo::invalid();
        }

        let quoted = self.tokens.text(ident.span());
        let unquoted = quoted
            .strip_prefix('"')
            .and_then(|q| q.strip_suffix('"'))
            .unwrap_or(quoted);
        if !unquoted.eq_ignore_ascii_case(&s.sval) {
            return NodeInfo::invalid();
        }

        self.maybe_set_name(ident.span(), unquoted);
        self.done(ident)
    }

    pub(super) fn walk_sort_by(&mut self, s: &pg::SortBy) -> NodeInfo {
        self.update_position(s.location);
        let mut info = self.walk_struct(Some(s.location), |w, info| {
            let info = w.node_field(info, "Node", s.node.as_deref());
            w.list_field(info, "UseOp", &s.use_op)
        });

        let has_nulls = s.sortby_nulls > pg::SortByNulls::SortbyNullsDefault as i32;
        let has_dir = s.sortby_dir > pg::SortByDir::SortbyDefault as i32;
        if has_nulls {
            info.end = self
                .tokens
                .end_of_token_after(info.start, &[Kind::FirstP, Kind::LastP]);
        } else if has_dir && s.sortby_dir != pg::SortByDir::SortbyUsing as i32 {
            info.end = self.tokens.end_of_token_after(info.start, &[Kind::Asc, Kind::Desc]);
        }
        self.done(info)
    }

    pub(super) fn walk_window_def(&mut self, d: &pg::WindowDef) -> NodeInfo {
        let info = self.walk_struct(Some(d.location), |w, info| {
            let info = w.list_field(info, "PartitionClause", &d.partition_clause);
            let info = w.list_field(info, "OrderClause", &d.order_clause);
            let info = w.node_field(info, "StartOffset", d.start_offset.as_deref());
            w.node_field(info, "EndOffset", d.end_offset.as_deref())
        });
        self.done(info)
    }

    pub(super) fn walk_column_ref(&mut self, c: &pg::ColumnRef) -> NodeInfo {
        let info = self.walk_struct(Some(c.location), |w, info| w.list_field(info, "Fields", &c.fields));

        let fields = info.child("Fields");
        if let Some(last) = c.fields.len().checked_sub(1).map(|i| fields.item(i)) {
            if last.is_valid() {
                let name = self.name(last.span()).to_string();
                self.maybe_set_name(info.span(), &name);
            }
        }
        let spans = (0..c.fields.len()).map(|i| fields.item(i).span()).collect();
        self.set_null(info.span(), Some(Nullability::Column(spans)));

        self.done(info)
    }

    pub(super) fn walk_res_target(&mut self, r: &pg::ResTarget) -> NodeInfo {
        self.update_position(r.location);
        let mut info = self.walk_struct(Some(r.location), |w, info| {
            let info = w.list_field(info, "Indirection", &r.indirection);
            w.node_field(info, "Val", r.val.as_deref())
        });

        if !r.name.is_empty() {
            let mut name = NodeInfo::invalid();
            self.tokens.find_after(info.end, |_, t| {
                if t.is_ident_like() {
                    name = NodeInfo::leaf(t.start, t.end);
                    false
                } else {
                    !t.is(Kind::As)
                }
            });
            info = info.add_child("Name", name);
            self.maybe_set_name(info.span(), &r.name);
        }

        let val = info.child("Val").span();
        let val_name = self.name(val).to_string();
        self.maybe_set_name(info.span(), &val_name);
        let val_null = self.nullability.get(&val).cloned();
        self.set_null(info.span(), val_null);

        if !r.name.is_empty() {
            self.maybe_set_name(val, &r.name);
        }

        self.done(info)
    }

    pub(super) fn walk_range_var(&mut self, r: &pg::RangeVar) -> NodeInfo {
        self.update_position(r.location);
        let first = NodeInfo::leaf(r.location, self.tokens.end_of(r.location));

        let mut info = NodeInfo::invalid();
        if !r.catalogname.is_empty() {
            let schema = self.tokens.ident_after(first.end);
            let rel = self.tokens.ident_after(schema.end);
            self.maybe_set_name(first.span(), &r.catalogname);
            self.maybe_set_name(schema.span(), &r.schemaname);
            self.maybe_set_name(rel.span(), &r.relname);
            info = info
                .add_child("Catalogname", first)
                .add_child("Schemaname", schema)
                .add_child("Relname", rel);
        } else if !r.schemaname.is_empty() {
            let rel = self.tokens.ident_after(first.end);
            self.maybe_set_name(first.span(), &r.schemaname);
            self.maybe_set_name(rel.span(), &r.relname);
            info = info.add_child("Schemaname", first).add_child("Relname", rel);
        } else {
            self.maybe_set_name(first.span(), &r.relname);
            info = info.add_child("Relname", first);
        }

        self.set_position(info.end);
        let alias = field(&r.alias).map_or_else(NodeInfo::invalid, |a| self.walk_alias(a));
        let info = info.add_child("Alias", alias);
        self.done(info)
    }

    pub(super) fn walk_alias(&mut self, a: &pg::Alias) -> NodeInfo {
        let name = self.tokens.ident_after(self.position());
        self.maybe_set_name(name.span(), &a.aliasname);
        self.update_position(name.end);

        let info = NodeInfo::invalid().add_child("Aliasname", name);
        let info = self.list_field(info, "Colnames", &a.colnames);
        let info = self.tokens.balance_parens(info);
        self.done(info)
    }

    pub(super) fn walk_join_expr(&mut self, j: &pg::JoinExpr) -> NodeInfo {
        let info = self.walk_struct(None, |w, info| {
            let info = w.node_field(info, "Larg", j.larg.as_deref());
            let info = w.node_field(info, "Rarg", j.rarg.as_deref());
            let info = w.list_field(info, "UsingClause", &j.using_clause);
            let using_alias = field(&j.join_using_alias).map_or_else(NodeInfo::invalid, |a| w.walk_alias(a));
            let info = info.add_child("JoinUsingAlias", using_alias);
            let info = w.node_field(info, "Quals", j.quals.as_deref());
            let alias = field(&j.alias).map_or_else(NodeInfo::invalid, |a| w.walk_alias(a));
            info.add_child("Alias", alias)
        });
        self.done(info)
    }

    pub(super) fn walk_range_subselect(&mut self, r: &pg::RangeSubselect) -> NodeInfo {
        let info = self.walk_struct(None, |w, info| {
            let info = w.node_field(info, "Subquery", r.subquery.as_deref());
            let alias = field(&r.alias).map_or_else(NodeInfo::invalid, |a| w.walk_alias(a));
            info.add_child("Alias", alias)
        });
        self.done(info)
    }

    pub(super) fn walk_range_function(&mut self, r: &pg::RangeFunction) -> NodeInfo {
        let info = self.walk_struct(None, |w, info| {
            let info = w.list_field(info, "Functions", &r.functions);
            let alias = field(&r.alias).map_or_else(NodeInfo::invalid, |a| w.walk_alias(a));
            let info = info.add_child("Alias", alias);
            w.list_field(info, "Coldeflist", &r.coldeflist)
        });
        self.done(info)
    }

    pub(super) fn walk_cte(&mut self, c: &pg::CommonTableExpr) -> NodeInfo {
        let info = self.walk_struct(Some(c.location), |w, info| {
            let info = w.list_field(info, "Aliascolnames", &c.aliascolnames);
            w.node_field(info, "Ctequery", c.ctequery.as_deref())
        });
        self.done(info)
    }

    pub(super) fn walk_with_clause(&mut self, with: &pg::WithClause) -> NodeInfo {
        let info = self.walk_struct(Some(with.location), |w, info| w.list_field(info, "Ctes", &with.ctes));
        self.done(info)
    }

    pub(super) fn walk_on_conflict(&mut self, o: &pg::OnConflictClause) -> NodeInfo {
        let mut info = self.walk_struct(Some(o.location), |w, info| {
            let infer = field(&o.infer).map_or_else(NodeInfo::invalid, |i| w.walk_infer_clause(i));
            let info = info.add_child("Infer", infer);
            let info = w.list_field(info, "TargetList", &o.target_list);
            w.node_field(info, "WhereClause", o.where_clause.as_deref())
        });

        let mut do_token = None;
        let mut action_token = None;
        let found = self.tokens.find_after(info.start, |i, t| {
            if t.is(Kind::Do) && t.is_keyword(KeywordKind::ReservedKeyword) {
                do_token = Some((i, *t));
            } else if t.is_any(&[Kind::Update, Kind::Nothing]) && t.is_keyword(KeywordKind::UnreservedKeyword) {
                action_token = Some((i, *t));
            }
            matches!((do_token, action_token), (Some((d, _)), Some((a, _))) if a == d + 1)
        });
        if let (true, Some((_, d)), Some((_, a))) = (found.is_valid(), do_token, action_token) {
            info = info.add_child("Action", NodeInfo::leaf(d.start, a.end));
        }

        self.done(info)
    }

    pub(super) fn walk_infer_clause(&mut self, i: &pg::InferClause) -> NodeInfo {
        let info = self.walk_struct(Some(i.location), |w, info| {
            let info = w.list_field(info, "IndexElems", &i.index_elems);
            w.node_field(info, "WhereClause", i.where_clause.as_deref())
        });
        self.done(info)
    }

    pub(super) fn walk_index_elem(&mut self, e: &pg::IndexElem) -> NodeInfo {
        let info = self.walk_struct(None, |w, info| w.node_field(info, "Expr", e.expr.as_deref()));
        self.done(info)
    }

    pub(super) fn walk_locking_clause(&mut self, l: &pg::LockingClause) -> NodeInfo {
        let info = self.walk_struct(None, |w, info| w.list_field(info, "LockedRels", &l.locked_rels));
        self.done(info)
    }

    pub(super) fn walk_multi_assign_ref(&mut self, m: &pg::MultiAssignRef) -> NodeInfo {
        let info = self.walk_struct(None, |w, info| w.node_field(info, "Source", m.source.as_deref()));
        self.done(info)
    }

    pub(super) fn walk_collate_clause(&mut self, c: &pg::CollateClause) -> NodeInfo {
        let info = self.walk_struct(Some(c.location), |w, info| {
            let info = w.node_field(info, "Arg", c.arg.as_deref());
            w.list_field(info, "Collname", &c.collname)
        });
        self.done(info)
    }

    pub(super) fn walk_named_arg_expr(&mut self, n: &pg::NamedArgExpr) -> NodeInfo {
        let info = self.walk_struct(Some(n.location), |w, info| w.node_field(info, "Arg", n.arg.as_deref()));
        self.done(info)
    }

    pub(super) fn walk_grouping_set(&mut self, g: &pg::GroupingSet) -> NodeInfo {
        let info = self.walk_struct(Some(g.location), |w, info| w.list_field(info, "Content", &g.content));
        self.done(info)
    }
}

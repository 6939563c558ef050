//! The rebuild fragment: statements that recreate a parsed query on top of a
//! query builder `q`, slicing expressions out of the rewritten SQL with
//! `EXPR.subExpr(start, end)`.
//!
//! Clauses whose text is copied verbatim (limits, locks, flags) are written
//! while walking. Clauses that point into the rewritten SQL are recorded as
//! [`ModCall`] marks and written once their final offsets are known.

use std::fmt::Write;

use pg_query::protobuf as pg;
use pg_query::NodeEnum;

use crate::span::NodeInfo;
use crate::walker::{field, Walker};

const CLAUSE: &str = "sqlforge_core::clause";
const PSQL: &str = "sqlforge_core::psql";

/// A builder call that slices the rewritten SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModCall {
    AppendCte,
    AppendDistinctOn,
    AppendSelect,
    SetTable,
    AppendColumns,
    AppendWhere,
    AppendGroup { distinct: bool },
    AppendHaving,
    AppendWindow,
    AppendCombine { strategy: &'static str, all: bool },
    AppendOrder,
    AppendValues,
    SetQuery,
    SetConflict,
    AppendSet,
    SetFrom,
    AppendUsing,
    AppendReturning,
}

impl ModCall {
    /// Renders the call for the rewritten span `start..end`.
    #[must_use]
    pub fn render(&self, start: usize, end: usize) -> String {
        let expr = format!("EXPR.subExpr({start}, {end})");
        match self {
            Self::AppendCte => format!("q.AppendCTE({expr})\n"),
            Self::AppendDistinctOn => format!("q.AppendDistinctOn({expr})\n"),
            Self::AppendSelect => format!("q.AppendSelect({expr})\n"),
            Self::SetTable => format!("q.SetTable({expr})\n"),
            Self::AppendColumns => format!("q.AppendColumns({expr})\n"),
            Self::AppendWhere => format!("q.AppendWhere({expr})\n"),
            Self::AppendGroup { distinct } => {
                let mut out = String::new();
                if *distinct {
                    out.push_str("q.SetGroupByDistinct(true)\n");
                }
                let _ = writeln!(out, "q.AppendGroup({expr})");
                out
            }
            Self::AppendHaving => format!("q.AppendHaving({expr})\n"),
            Self::AppendWindow => format!("q.AppendWindow({expr})\n"),
            Self::AppendCombine { strategy, all } => {
                format!("q.AppendCombine({strategy:?}, {all}, {expr})\n")
            }
            Self::AppendOrder => format!("q.AppendOrder({expr})\n"),
            Self::AppendValues => format!("q.AppendValues({expr})\n"),
            Self::SetQuery => format!("q.SetQuery({expr})\n"),
            Self::SetConflict => format!("q.SetConflict({expr})\n"),
            Self::AppendSet => format!("q.AppendSet({expr})\n"),
            Self::SetFrom => format!("q.SetFrom({expr})\n"),
            Self::AppendUsing => format!("q.AppendUsing({expr})\n"),
            Self::AppendReturning => format!("q.AppendReturning({expr})\n"),
        }
    }
}

impl Walker<'_> {
    /// Records the rebuild fragment of the statement at the root.
    pub fn record_mods(&mut self, root: &pg::Node, info: &NodeInfo) {
        match &root.node {
            Some(NodeEnum::SelectStmt(s)) => self.mod_select(s, info.child("SelectStmt")),
            Some(NodeEnum::InsertStmt(s)) => self.mod_insert(s, info.child("InsertStmt")),
            Some(NodeEnum::UpdateStmt(s)) => self.mod_update(s, info.child("UpdateStmt")),
            Some(NodeEnum::DeleteStmt(s)) => self.mod_delete(s, info.child("DeleteStmt")),
            _ => {}
        }
    }

    fn mod_with(&mut self, with: Option<&pg::WithClause>, info: &NodeInfo) {
        let Some(with) = with else { return };
        if with.recursive {
            self.mods.push("q.SetRecursive(true)\n".into());
        }
        if !with.ctes.is_empty() {
            self.record_mod(info.child("Ctes").span(), ModCall::AppendCte);
        }
    }

    fn record_if(&mut self, info: &NodeInfo, name: &str, call: ModCall) {
        if info.has(name) {
            self.record_mod(info.child(name).span(), call);
        }
    }

    fn raw(&self, info: &NodeInfo) -> String {
        format!("{:?}", self.tokens.text(info.span()))
    }

    fn mod_select(&mut self, stmt: &pg::SelectStmt, info: &NodeInfo) {
        self.mod_with(field(&stmt.with_clause), info.child("WithClause"));

        let mut main = stmt;
        let mut main_info = info;
        let mut combines = Vec::new();
        while let Some(larg) = &main.larg {
            combines.push((main.op, main.all, main_info.child("Rarg")));
            main = &**larg;
            main_info = main_info.child("Larg");
        }

        match main.distinct_clause.as_slice() {
            [] => {}
            [only] if only.node.is_none() => self.mods.push("q.SetDistinct()\n".into()),
            _ => self.record_if(main_info, "DistinctClause", ModCall::AppendDistinctOn),
        }

        self.record_if(main_info, "TargetList", ModCall::AppendSelect);
        self.record_if(main_info, "FromClause", ModCall::SetTable);
        self.record_if(main_info, "WhereClause", ModCall::AppendWhere);
        self.record_if(
            main_info,
            "GroupClause",
            ModCall::AppendGroup {
                distinct: main.group_distinct,
            },
        );
        self.record_if(main_info, "HavingClause", ModCall::AppendHaving);

        for window in main_info.child("WindowClause").children.values() {
            let start = self
                .tokens
                .start_of_token_before(window.start, &[pg::Token::Ident]);
            self.record_mod(NodeInfo::leaf(start, window.end).span(), ModCall::AppendWindow);
        }

        for (op, all, rarg) in combines.into_iter().rev() {
            let strategy = if op == pg::SetOperation::SetopIntersect as i32 {
                "INTERSECT"
            } else if op == pg::SetOperation::SetopExcept as i32 {
                "EXCEPT"
            } else {
                "UNION"
            };
            self.record_mod(rarg.span(), ModCall::AppendCombine { strategy, all });
        }

        if info.has("LimitCount") {
            self.imports.insert(PSQL);
            let raw = self.raw(info.child("LimitCount"));
            if stmt.limit_option == pg::LimitOption::WithTies as i32 {
                self.mods.push(format!("q.SetFetch(psql::raw({raw}), true)\n"));
            } else {
                self.mods.push(format!("q.SetLimit(psql::raw({raw}))\n"));
            }
        }
        if info.has("LimitOffset") {
            self.imports.insert(PSQL);
            let raw = self.raw(info.child("LimitOffset"));
            self.mods.push(format!("q.SetOffset(psql::raw({raw}))\n"));
        }

        self.record_if(info, "SortClause", ModCall::AppendOrder);

        for (i, node) in stmt.locking_clause.iter().enumerate() {
            let Some(NodeEnum::LockingClause(lock)) = &node.node else {
                continue;
            };
            let Some(strength) = lock_strength(lock.strength) else {
                continue;
            };
            let mut call = format!("Lock::new(LockStrength::{strength})");
            if !lock.locked_rels.is_empty() {
                let tables = self.raw(info.child("LockingClause").item(i));
                let _ = write!(call, ".of([{tables}])");
            }
            if lock.wait_policy == pg::LockWaitPolicy::LockWaitSkip as i32 {
                call.push_str(".skip_locked()");
            } else if lock.wait_policy == pg::LockWaitPolicy::LockWaitError as i32 {
                call.push_str(".no_wait()");
            }
            self.imports.insert(CLAUSE);
            self.mods.push(format!("q.AppendLock({call})\n"));
        }
    }

    fn mod_insert(&mut self, stmt: &pg::InsertStmt, info: &NodeInfo) {
        self.mod_with(field(&stmt.with_clause), info.child("WithClause"));
        self.record_if(info, "Relation", ModCall::SetTable);
        self.record_if(info, "Cols", ModCall::AppendColumns);

        let values = match stmt.select_stmt.as_ref().and_then(|n| n.node.as_ref()) {
            Some(NodeEnum::SelectStmt(s)) if !s.values_lists.is_empty() => s.values_lists.len(),
            _ => 0,
        };
        if values > 0 {
            let rows = info.child("SelectStmt").child("SelectStmt").child("ValuesLists");
            for i in 0..values {
                self.record_mod(rows.item(i).span(), ModCall::AppendValues);
            }
        } else {
            self.record_if(info, "SelectStmt", ModCall::SetQuery);
        }

        self.record_if(info, "OnConflictClause", ModCall::SetConflict);
        self.record_if(info, "ReturningList", ModCall::AppendReturning);
    }

    fn mod_update(&mut self, stmt: &pg::UpdateStmt, info: &NodeInfo) {
        self.mod_with(field(&stmt.with_clause), info.child("WithClause"));
        self.record_if(info, "Relation", ModCall::SetTable);
        self.record_if(info, "TargetList", ModCall::AppendSet);
        if !stmt.from_clause.is_empty() {
            self.record_mod(info.child("FromClause").item(0).span(), ModCall::SetFrom);
        }
        self.record_if(info, "WhereClause", ModCall::AppendWhere);
        self.record_if(info, "ReturningList", ModCall::AppendReturning);
    }

    fn mod_delete(&mut self, stmt: &pg::DeleteStmt, info: &NodeInfo) {
        self.mod_with(field(&stmt.with_clause), info.child("WithClause"));
        self.record_if(info, "Relation", ModCall::SetTable);
        if !stmt.using_clause.is_empty() {
            self.record_mod(info.child("UsingClause").item(0).span(), ModCall::AppendUsing);
        }
        self.record_if(info, "WhereClause", ModCall::AppendWhere);
        self.record_if(info, "ReturningList", ModCall::AppendReturning);
    }
}

fn lock_strength(strength: i32) -> Option<&'static str> {
    use pg::LockClauseStrength as S;
    [
        (S::LcsForkeyshare, "KeyShare"),
        (S::LcsForshare, "Share"),
        (S::LcsFornokeyupdate, "NoKeyUpdate"),
        (S::LcsForupdate, "Update"),
    ]
    .into_iter()
    .find(|(s, _)| *s as i32 == strength)
    .map(|(_, name)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_calls() {
        assert_eq!(
            ModCall::AppendWhere.render(30, 42),
            "q.AppendWhere(EXPR.subExpr(30, 42))\n"
        );
        assert_eq!(
            ModCall::AppendGroup { distinct: true }.render(1, 2),
            "q.SetGroupByDistinct(true)\nq.AppendGroup(EXPR.subExpr(1, 2))\n"
        );
        assert_eq!(
            ModCall::AppendCombine {
                strategy: "UNION",
                all: true
            }
            .render(5, 9),
            "q.AppendCombine(\"UNION\", true, EXPR.subExpr(5, 9))\n"
        );
        assert_eq!(
            ModCall::AppendCombine {
                strategy: "EXCEPT",
                all: false
            }
            .render(0, 3),
            "q.AppendCombine(\"EXCEPT\", false, EXPR.subExpr(0, 3))\n"
        );
    }

    #[test]
    fn test_lock_strength() {
        assert_eq!(lock_strength(pg::LockClauseStrength::LcsForupdate as i32), Some("Update"));
        assert_eq!(lock_strength(pg::LockClauseStrength::LcsNone as i32), None);
    }
}

//! Statement nodes and the structural checks run on them.

use pg_query::protobuf as pg;
use pg_query::protobuf::Token as Kind;
use pg_query::NodeEnum;

use super::{field, Mark, Walker};
use crate::error::GenError;
use crate::nullable::Nullability;
use crate::span::NodeInfo;

impl Walker<'_> {
    pub(super) fn walk_select_stmt(&mut self, s: &pg::SelectStmt) -> NodeInfo {
        let mut info = self.walk_struct(None, |w, info| {
            let info = w.list_field(info, "DistinctClause", &s.distinct_clause);
            let info = w.list_field(info, "TargetList", &s.target_list);
            let info = w.list_field(info, "FromClause", &s.from_clause);
            let info = w.node_field(info, "WhereClause", s.where_clause.as_deref());
            let info = w.list_field(info, "GroupClause", &s.group_clause);
            let info = w.node_field(info, "HavingClause", s.having_clause.as_deref());
            let info = w.list_field(info, "WindowClause", &s.window_clause);
            let info = w.list_field(info, "ValuesLists", &s.values_lists);
            let info = w.list_field(info, "SortClause", &s.sort_clause);
            let info = w.node_field(info, "LimitOffset", s.limit_offset.as_deref());
            let info = w.node_field(info, "LimitCount", s.limit_count.as_deref());
            let info = w.list_field(info, "LockingClause", &s.locking_clause);
            let with = field(&s.with_clause).map_or_else(NodeInfo::invalid, |c| w.walk_with_clause(c));
            let info = info.add_child("WithClause", with);
            let larg = s.larg.as_deref().map_or_else(NodeInfo::invalid, |l| w.walk_select_stmt(l));
            let info = info.add_child("Larg", larg);
            let rarg = s.rarg.as_deref().map_or_else(NodeInfo::invalid, |r| w.walk_select_stmt(r));
            info.add_child("Rarg", rarg)
        });
        info.start = self
            .tokens
            .start_of_token_before(info.start, &[Kind::Select, Kind::Values]);

        if let Err(e) = verify_select(s, &info) {
            self.errors.push(e);
        }

        let rows = info.child("ValuesLists");
        for i in 0..s.values_lists.len() {
            let row = rows.item(i).span();
            self.record(
                row,
                Mark::Group {
                    original: row,
                    multiple: s.values_lists.len() == 1,
                },
            );
        }

        self.done(info)
    }

    pub(super) fn walk_insert_stmt(&mut self, s: &pg::InsertStmt) -> NodeInfo {
        let mut info = self.walk_struct(None, |w, info| {
            let rel = field(&s.relation).map_or_else(NodeInfo::invalid, |r| w.walk_range_var(r));
            let info = info.add_child("Relation", rel);
            let info = w.list_field(info, "Cols", &s.cols);
            let info = w.node_field(info, "SelectStmt", s.select_stmt.as_deref());
            let conflict = field(&s.on_conflict_clause).map_or_else(NodeInfo::invalid, |o| w.walk_on_conflict(o));
            let info = info.add_child("OnConflictClause", conflict);
            let info = w.list_field(info, "ReturningList", &s.returning_list);
            let with = field(&s.with_clause).map_or_else(NodeInfo::invalid, |c| w.walk_with_clause(c));
            info.add_child("WithClause", with)
        });
        info.start = self.tokens.start_of_token_before(info.start, &[Kind::Insert]);

        self.name_inserted_values(s, &info);

        self.done(info)
    }

    /// Names each VALUES item after its target column, and marks items bound
    /// for nullable columns as nullable.
    fn name_inserted_values(&mut self, s: &pg::InsertStmt, info: &NodeInfo) {
        let Some(NodeEnum::SelectStmt(select)) = s.select_stmt.as_ref().and_then(|n| n.node.as_ref()) else {
            return;
        };
        if select.values_lists.is_empty() {
            return;
        }

        let table = field(&s.relation).map_or_else(Default::default, |r| self.table_source(r, info.child("Relation")));
        let names: Vec<String> = if s.cols.is_empty() {
            table.columns.iter().map(|c| c.name.clone()).collect()
        } else {
            (0..s.cols.len())
                .map(|i| self.name(info.child("Cols").item(i).span()).to_string())
                .collect()
        };

        let rows = info.child("SelectStmt").child("SelectStmt").child("ValuesLists");
        for i in 0..select.values_lists.len() {
            let items = rows.item(i).child("List").child("Items");
            for (col, name) in names.iter().enumerate() {
                if !items.has(&col.to_string()) {
                    continue;
                }
                let item = items.item(col).span();
                self.maybe_set_name(item, name);
                if table.columns.iter().any(|c| &c.name == name && c.nullable) {
                    self.set_null(item, Some(Nullability::Always));
                }
            }
        }
    }

    pub(super) fn walk_update_stmt(&mut self, s: &pg::UpdateStmt) -> NodeInfo {
        let mut info = self.walk_struct(None, |w, info| {
            let rel = field(&s.relation).map_or_else(NodeInfo::invalid, |r| w.walk_range_var(r));
            let info = info.add_child("Relation", rel);
            let info = w.list_field(info, "TargetList", &s.target_list);
            let info = w.node_field(info, "WhereClause", s.where_clause.as_deref());
            let info = w.list_field(info, "FromClause", &s.from_clause);
            let info = w.list_field(info, "ReturningList", &s.returning_list);
            let with = field(&s.with_clause).map_or_else(NodeInfo::invalid, |c| w.walk_with_clause(c));
            info.add_child("WithClause", with)
        });
        info.start = self.tokens.start_of_token_before(info.start, &[Kind::Update]);

        if s.from_clause.len() > 1 {
            self.errors.push(GenError::Unsupported(
                "multiple FROM tables are not supported, convert to a CROSS JOIN".into(),
            ));
        }

        self.done(info)
    }

    pub(super) fn walk_delete_stmt(&mut self, s: &pg::DeleteStmt) -> NodeInfo {
        let mut info = self.walk_struct(None, |w, info| {
            let rel = field(&s.relation).map_or_else(NodeInfo::invalid, |r| w.walk_range_var(r));
            let info = info.add_child("Relation", rel);
            let info = w.list_field(info, "UsingClause", &s.using_clause);
            let info = w.node_field(info, "WhereClause", s.where_clause.as_deref());
            let info = w.list_field(info, "ReturningList", &s.returning_list);
            let with = field(&s.with_clause).map_or_else(NodeInfo::invalid, |c| w.walk_with_clause(c));
            info.add_child("WithClause", with)
        });
        info.start = self.tokens.start_of_token_before(info.start, &[Kind::DeleteP]);

        if s.using_clause.len() > 1 {
            self.errors.push(GenError::Unsupported(
                "multiple USING tables are not supported, convert to a CROSS JOIN".into(),
            ));
        }

        self.done(info)
    }
}

fn verify_select(s: &pg::SelectStmt, info: &NodeInfo) -> Result<(), GenError> {
    if s.from_clause.len() > 1 {
        return Err(GenError::Unsupported(
            "multiple FROM tables are not supported, convert to a CROSS JOIN".into(),
        ));
    }

    // FETCH ... WITH TIES must come after OFFSET in the text.
    if s.limit_option == pg::LimitOption::WithTies as i32 {
        let offset = info.child("LimitOffset");
        let count = info.child("LimitCount");
        if offset.is_valid() && count.is_valid() && offset.start > count.start {
            return Err(GenError::Unsupported(
                "FETCH ... WITH TIES followed by OFFSET is not supported, move OFFSET first".into(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(sql: &str) -> pg::SelectStmt {
        let parsed = pg_query::parse(sql).unwrap();
        let stmt = parsed.protobuf.stmts[0].stmt.clone().unwrap();
        match stmt.node.unwrap() {
            NodeEnum::SelectStmt(s) => *s,
            other => panic!("expected SELECT, got {other:?}"),
        }
    }

    #[test]
    fn test_verify_rejects_multiple_from() {
        let s = select("SELECT 1 FROM a, b");
        let err = verify_select(&s, &NodeInfo::invalid()).unwrap_err();
        assert!(err.to_string().contains("CROSS JOIN"));
    }

    #[test]
    fn test_verify_with_ties_order() {
        let s = select("SELECT a FROM t ORDER BY a OFFSET 5 FETCH FIRST 3 ROWS WITH TIES");
        let info = NodeInfo::invalid()
            .add_child("LimitOffset", NodeInfo::leaf(34, 35))
            .add_child("LimitCount", NodeInfo::leaf(48, 49));
        assert!(verify_select(&s, &info).is_ok());

        let info = NodeInfo::invalid()
            .add_child("LimitOffset", NodeInfo::leaf(60, 61))
            .add_child("LimitCount", NodeInfo::leaf(40, 41));
        assert!(verify_select(&s, &info).is_err());
    }
}

//! Resolution of the relations a statement reads from and the columns it
//! returns.

use pg_query::protobuf as pg;
use pg_query::NodeEnum;
use sqlforge_core::dialect::{Dialect, Postgres};

use crate::edit::EditRule;
use crate::error::GenError;
use crate::span::{NodeInfo, Span};
use crate::walker::{field, Walker};

/// A column of a [`QueryResult`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Output name.
    pub name: String,
    /// Whether the column can be NULL.
    pub nullable: bool,
    /// Span of the expression in the query, for computed columns.
    pub span: Option<Span>,
}

impl Column {
    /// A catalogue column.
    #[must_use]
    pub fn new(name: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            nullable,
            span: None,
        }
    }
}

/// A relation visible to a statement: a table, a subquery or a CTE.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResult {
    /// Schema name, empty for the shared schema and for aliased relations.
    pub schema: String,
    /// Relation name or alias.
    pub name: String,
    /// Columns in output order.
    pub columns: Vec<Column>,
    /// Only reachable through a qualified reference (CTEs).
    pub must_be_qualified: bool,
}

struct Joined<'n> {
    node: &'n pg::Node,
    info: NodeInfo,
    join_type: i32,
}

impl Walker<'_> {
    /// Resolves the output of `node` given the relations already in scope.
    pub fn source_of(&mut self, node: &pg::Node, info: &NodeInfo, sources: &[QueryResult]) -> QueryResult {
        let Some(inner) = &node.node else {
            return QueryResult::default();
        };
        match inner {
            NodeEnum::SelectStmt(s) => self.select_source(s, info.child("SelectStmt"), sources.to_vec()),
            NodeEnum::InsertStmt(s) => self.insert_source(s, info.child("InsertStmt")),
            NodeEnum::UpdateStmt(s) => self.update_source(s, info.child("UpdateStmt"), sources.to_vec()),
            NodeEnum::DeleteStmt(s) => self.delete_source(s, info.child("DeleteStmt"), sources.to_vec()),
            NodeEnum::RangeVar(r) => {
                let info = if info.has("RangeVar") { info.child("RangeVar") } else { info };
                let cte = sources
                    .iter()
                    .rev()
                    .find(|s| s.must_be_qualified && r.schemaname.is_empty() && s.name == r.relname);
                match cte {
                    Some(cte) => {
                        let mut source = QueryResult {
                            must_be_qualified: false,
                            ..cte.clone()
                        };
                        self.apply_alias(&mut source, r, info);
                        source
                    }
                    None => self.table_source(r, info),
                }
            }
            NodeEnum::RangeSubselect(sub) => {
                let info = if info.has("RangeSubselect") {
                    info.child("RangeSubselect")
                } else {
                    info
                };
                let mut source = sub.subquery.as_ref().map_or_else(QueryResult::default, |q| {
                    self.source_of(q, info.child("Subquery"), sources)
                });
                if let Some(alias) = &sub.alias {
                    source.name.clone_from(&alias.aliasname);
                    self.rename_columns(&mut source, info.child("Alias").child("Colnames"), alias.colnames.len());
                }
                source
            }
            _ => QueryResult::default(),
        }
    }

    fn rename_columns(&self, source: &mut QueryResult, names: &NodeInfo, count: usize) {
        if source.columns.len() != count {
            return;
        }
        for (i, col) in source.columns.iter_mut().enumerate() {
            let alias = self.name(names.item(i).span());
            if !alias.is_empty() {
                col.name = alias.to_string();
            }
        }
    }

    pub(crate) fn table_source(&self, rel: &pg::RangeVar, info: &NodeInfo) -> QueryResult {
        let schema = self.name(info.child("Schemaname").span());
        let name = self.name(info.child("Relname").span());

        let found = self.tables.iter().find(|t| {
            t.name == name && (t.schema == schema || (t.schema.is_empty() && schema == self.shared_schema))
        });
        let Some(table) = found else {
            return QueryResult::default();
        };

        let mut source = QueryResult {
            schema: table.schema.clone(),
            name: table.name.clone(),
            columns: table
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), c.nullable))
                .collect(),
            must_be_qualified: false,
        };

        self.apply_alias(&mut source, rel, info);
        source
    }

    fn apply_alias(&self, source: &mut QueryResult, rel: &pg::RangeVar, info: &NodeInfo) {
        if let Some(alias) = &rel.alias {
            source.schema.clear();
            source.name.clone_from(&alias.aliasname);
            self.rename_columns(source, info.child("Alias").child("Colnames"), alias.colnames.len());
        }
    }

    fn select_source(&mut self, stmt: &pg::SelectStmt, info: &NodeInfo, sources: Vec<QueryResult>) -> QueryResult {
        if let Some(NodeEnum::List(list)) = stmt.values_lists.first().and_then(|n| n.node.as_ref()) {
            let items = info.child("ValuesLists").item(0).child("List").child("Items");
            return self.list_source(list, items, &sources);
        }

        let mut sources = self.with_sources(field(&stmt.with_clause), info.child("WithClause"), sources);

        let mut main = stmt;
        let mut main_info = info;
        while let Some(larg) = &main.larg {
            main = &**larg;
            main_info = main_info.child("Larg");
        }

        if let Some(from) = main.from_clause.first() {
            sources = self.from_item_sources(from, main_info.child("FromClause").item(0), sources);
        }

        self.target_source(&main.target_list, main_info.child("TargetList"), &sources)
    }

    fn insert_source(&mut self, stmt: &pg::InsertStmt, info: &NodeInfo) -> QueryResult {
        let table = stmt
            .relation
            .as_ref()
            .map_or_else(QueryResult::default, |r| self.table_source(r, info.child("Relation")));
        self.target_source(&stmt.returning_list, info.child("ReturningList"), &[table])
    }

    fn update_source(&mut self, stmt: &pg::UpdateStmt, info: &NodeInfo, sources: Vec<QueryResult>) -> QueryResult {
        let mut sources = self.with_sources(field(&stmt.with_clause), info.child("WithClause"), sources);
        if let Some(rel) = &stmt.relation {
            sources.push(self.table_source(rel, info.child("Relation")));
        }
        if let Some(from) = stmt.from_clause.first() {
            sources = self.from_item_sources(from, info.child("FromClause").item(0), sources);
        }
        self.target_source(&stmt.returning_list, info.child("ReturningList"), &sources)
    }

    fn delete_source(&mut self, stmt: &pg::DeleteStmt, info: &NodeInfo, sources: Vec<QueryResult>) -> QueryResult {
        let mut sources = self.with_sources(field(&stmt.with_clause), info.child("WithClause"), sources);
        if let Some(rel) = &stmt.relation {
            sources.push(self.table_source(rel, info.child("Relation")));
        }
        if let Some(using) = stmt.using_clause.first() {
            sources = self.from_item_sources(using, info.child("UsingClause").item(0), sources);
        }
        self.target_source(&stmt.returning_list, info.child("ReturningList"), &sources)
    }

    fn with_sources(
        &mut self,
        with: Option<&pg::WithClause>,
        info: &NodeInfo,
        mut sources: Vec<QueryResult>,
    ) -> Vec<QueryResult> {
        let Some(with) = with else {
            return sources;
        };

        let ctes = info.child("Ctes");
        for (i, node) in with.ctes.iter().enumerate() {
            let Some(NodeEnum::CommonTableExpr(cte)) = &node.node else {
                continue;
            };
            let cte_info = ctes.item(i).child("CommonTableExpr");

            let mut source = cte.ctequery.as_ref().map_or_else(QueryResult::default, |q| {
                self.source_of(q, cte_info.child("Ctequery"), &sources)
            });
            source.name.clone_from(&cte.ctename);
            source.schema.clear();
            source.must_be_qualified = true;
            self.rename_columns(&mut source, cte_info.child("Aliascolnames"), cte.aliascolnames.len());
            sources.push(source);
        }

        sources
    }

    fn from_item_sources(&mut self, from: &pg::Node, info: &NodeInfo, mut sources: Vec<QueryResult>) -> Vec<QueryResult> {
        let mut joined = Vec::new();
        let mut from = from;
        let mut info = info.clone();

        while let Some(NodeEnum::JoinExpr(join)) = &from.node {
            let join_info = info.child("JoinExpr").clone();
            let (Some(larg), Some(rarg)) = (&join.larg, &join.rarg) else {
                break;
            };
            let key = rarg.node.as_ref().map_or("", from_item_key);
            joined.push(Joined {
                node: rarg,
                info: join_info.child("Rarg").child(key).clone(),
                join_type: join.jointype,
            });
            from = &**larg;
            info = join_info.child("Larg").clone();
        }
        joined.push(Joined {
            node: from,
            info,
            join_type: pg::JoinType::JoinInner as i32,
        });

        let mut join_sources: Vec<QueryResult> = Vec::with_capacity(joined.len());
        for j in joined.iter().rev() {
            let mut source = self.source_of(j.node, &j.info, &sources);

            let right = j.join_type == pg::JoinType::JoinRight as i32 || j.join_type == pg::JoinType::JoinFull as i32;
            let left = j.join_type == pg::JoinType::JoinLeft as i32 || j.join_type == pg::JoinType::JoinFull as i32;

            if right {
                for earlier in &mut join_sources {
                    for col in &mut earlier.columns {
                        col.nullable = true;
                    }
                }
            }
            if left {
                for col in &mut source.columns {
                    col.nullable = true;
                }
            }

            join_sources.push(source);
        }

        sources.append(&mut join_sources);
        sources
    }

    fn target_source(&mut self, targets: &[pg::Node], infos: &NodeInfo, sources: &[QueryResult]) -> QueryResult {
        let mut result = QueryResult::default();
        if targets.len() != infos.children.len() {
            return result;
        }

        let mut prefix = String::new();

        for (i, target) in targets.iter().enumerate() {
            let target_info = infos.item(i);
            let span = target_info.span();

            if let Some(p) = self.tokens.prefix_annotation(span.start) {
                prefix = p;
            }

            if self.name(span) == "*" {
                if !self.tokens.block_comment_after(span.end).is_empty() {
                    self.errors.push(GenError::StarAfterPrefixed);
                }
                let mut columns = self.star_columns(target_info, &prefix, sources);
                result.columns.append(&mut columns);
                continue;
            }

            let mut column = Column {
                name: self.name(span).to_string(),
                nullable: self
                    .nullability
                    .get(&span)
                    .is_some_and(|n| n.is_null(&self.names, sources)),
                span: Some(span),
            };
            if let Some(NodeEnum::ResTarget(res)) = &target.node {
                if !res.name.is_empty() {
                    column.name.clone_from(&res.name);
                }
            }
            column.name = format!("{prefix}{}", column.name);

            if !prefix.is_empty() {
                let val = target_info.child("ResTarget").child("Val");
                if let Some(range) = Span::new(val.end, target_info.end).range() {
                    let mut alias = String::from(" AS ");
                    Postgres.write_quoted(&mut alias, &[&column.name]);
                    self.rules.push(EditRule::replace(range, alias));
                }
            }

            result.columns.push(column);
        }

        result
    }

    fn list_source(&self, list: &pg::List, items: &NodeInfo, sources: &[QueryResult]) -> QueryResult {
        let columns = (0..list.items.len())
            .map(|i| {
                let span = items.item(i).span();
                Column {
                    name: format!("column{}", i + 1),
                    nullable: self
                        .nullability
                        .get(&span)
                        .is_some_and(|n| n.is_null(&self.names, sources)),
                    span: Some(span),
                }
            })
            .collect();
        QueryResult {
            columns,
            ..QueryResult::default()
        }
    }

    /// Expands a `*` or `t.*` target into the visible columns, rewriting the
    /// target into an explicit column list.
    fn star_columns(&mut self, info: &NodeInfo, prefix: &str, sources: &[QueryResult]) -> Vec<Column> {
        let fields = info.child("ResTarget").child("Val").child("ColumnRef").child("Fields");
        let count = fields.children.len();
        if count == 0 {
            return Vec::new();
        }

        let name_at = |back: usize| -> String {
            count
                .checked_sub(back)
                .map_or_else(String::new, |i| self.name(fields.item(i).span()).to_string())
        };
        let (column, table, schema) = (name_at(1), name_at(2), name_at(3));
        if column != "*" {
            return Vec::new();
        }

        let Some(range) = fields.span().range() else {
            return Vec::new();
        };

        let mut columns = Vec::new();
        let mut list = String::new();
        for source in sources {
            if source.must_be_qualified
                || (!table.is_empty() && source.name != table)
                || (!schema.is_empty() && source.schema != schema)
            {
                continue;
            }
            if !list.is_empty() && !source.columns.is_empty() {
                list.push_str(", ");
            }
            write_quoted_source(&mut list, source, prefix);
            columns.extend(source.columns.iter().cloned());
        }

        let start = range.start;
        self.rules.push(EditRule::delete(range));
        self.rules.push(EditRule::insert(start, list));

        for col in &mut columns {
            col.name = format!("{prefix}{}", col.name);
        }
        columns
    }
}

fn from_item_key(node: &NodeEnum) -> &'static str {
    match node {
        NodeEnum::RangeVar(_) => "RangeVar",
        NodeEnum::RangeSubselect(_) => "RangeSubselect",
        NodeEnum::RangeFunction(_) => "RangeFunction",
        NodeEnum::JoinExpr(_) => "JoinExpr",
        _ => "",
    }
}

fn write_quoted_source(buf: &mut String, source: &QueryResult, prefix: &str) {
    for (i, col) in source.columns.iter().enumerate() {
        if i > 0 {
            buf.push_str(", ");
        }
        if source.schema.is_empty() {
            Postgres.write_quoted(buf, &[&source.name, &col.name]);
        } else {
            Postgres.write_quoted(buf, &[&source.schema, &source.name, &col.name]);
        }
        buf.push_str(" AS ");
        Postgres.write_quoted(buf, &[&format!("{prefix}{}", col.name)]);
    }
}

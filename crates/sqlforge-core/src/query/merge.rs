//! MERGE.

use super::{write_statement, ContextualMods, HasReturning, HasWith, QueryType, Statement};
use crate::clause::{MergeUsing, MergeWhen, Returning, Table, With};
use crate::dialect::require;
use crate::error::Result;
use crate::expr::{node, Expr};
use crate::render::{Expression, Writer};

/// A MERGE statement.
#[derive(Debug, Clone, Default)]
pub struct MergeQuery {
    pub with: With,
    pub only: bool,
    pub table: Table,
    pub using: Option<MergeUsing>,
    pub whens: Vec<MergeWhen>,
    pub returning: Returning,
    pub contextual_mods: ContextualMods<Self>,
}

impl Statement for MergeQuery {
    const KIND: QueryType = QueryType::Merge;

    fn contextual_mods_mut(&mut self) -> &mut ContextualMods<Self> {
        &mut self.contextual_mods
    }

    fn write_clauses(&self, w: &mut Writer<'_>) -> Result<()> {
        let d = w.dialect();
        require(d, d.supports_merge(), "MERGE")?;

        w.express_if(&self.with, !self.with.is_empty(), "", "\n")?;
        w.write_str("MERGE INTO ");
        if self.only {
            w.write_str("ONLY ");
        }
        w.express_in("table", &self.table)?;
        w.express_opt(self.using.as_ref(), "\n", "")?;
        w.express_slice(&self.whens, "\n", "\n", "")?;
        w.express_if(&self.returning, !self.returning.is_empty(), "\n", "")
    }
}

impl Expression for MergeQuery {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        write_statement(self, w)
    }
}

impl From<MergeQuery> for Expr {
    fn from(q: MergeQuery) -> Self {
        node(q)
    }
}

impl HasWith for MergeQuery {
    fn with_mut(&mut self) -> &mut With {
        &mut self.with
    }
}

impl HasReturning for MergeQuery {
    fn returning_mut(&mut self) -> &mut Returning {
        &mut self.returning
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause::{MergeAction, MergeMatch, MergeSource};
    use crate::dialect::GenericDialect;
    use crate::error::RenderError;
    use crate::expr::{quote, raw};
    use crate::render::Context;

    fn merge() -> MergeQuery {
        MergeQuery {
            table: Table {
                expr: Some(raw("target")),
                ..Table::default()
            },
            using: Some(MergeUsing {
                only: false,
                source: MergeSource::Table(raw("source")),
                alias: Some("s".into()),
                condition: Some(quote(["s", "id"]).eq(quote(["target", "id"]))),
            }),
            whens: vec![MergeWhen {
                kind: MergeMatch::Matched,
                condition: None,
                action: MergeAction::Delete,
            }],
            ..MergeQuery::default()
        }
    }

    #[test]
    fn test_merge_layout() {
        let (sql, _) = merge().build(&Context::new()).unwrap();
        assert_eq!(
            sql,
            "MERGE INTO target\nUSING source AS \"s\" ON (\"s\".\"id\" = \"target\".\"id\")\n\
             WHEN MATCHED THEN DELETE"
        );
    }

    #[test]
    fn test_merge_requires_dialect_support() {
        let err = merge()
            .build_with(&Context::new(), &GenericDialect, 0)
            .unwrap_err();
        assert!(matches!(err, RenderError::DialectMismatch { clause: "MERGE", .. }));
    }
}

//! ON CONFLICT.

use super::{Set, Where};
use crate::dialect::require;
use crate::error::Result;
use crate::expr::Expr;
use crate::render::{Expression, Writer};

/// What the conflict is detected on.
#[derive(Debug, Clone, Default)]
pub enum ConflictTarget {
    /// No explicit target.
    #[default]
    Any,
    /// `(cols) [WHERE ...]`.
    Columns {
        /// Index columns or expressions.
        columns: Vec<Expr>,
        /// Partial index predicate, AND-joined.
        conditions: Vec<Expr>,
    },
    /// `ON CONSTRAINT name`.
    Constraint(String),
}

impl Expression for ConflictTarget {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        match self {
            Self::Any => Ok(()),
            Self::Constraint(name) => {
                w.write_str(" ON CONSTRAINT ");
                w.write_str(name);
                Ok(())
            }
            Self::Columns {
                columns,
                conditions,
            } => {
                w.express_slice(columns, " (", ", ", ")")?;
                w.express_slice(conditions, " WHERE ", " AND ", "")
            }
        }
    }
}

/// What happens on conflict.
#[derive(Debug, Clone, Default)]
pub enum ConflictAction {
    /// `DO NOTHING`.
    #[default]
    Nothing,
    /// `DO UPDATE SET ... [WHERE ...]`.
    Update {
        /// Assignments.
        set: Set,
        /// Update filter.
        filter: Where,
    },
}

/// `ON CONFLICT target DO action`.
#[derive(Debug, Clone, Default)]
pub struct Conflict {
    /// Conflict target.
    pub target: ConflictTarget,
    /// Conflict action.
    pub action: ConflictAction,
}

impl Expression for Conflict {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        let d = w.dialect();
        require(d, d.supports_upsert(), "ON CONFLICT")?;

        w.write_str("ON CONFLICT");
        w.express(&self.target)?;
        match &self.action {
            ConflictAction::Nothing => w.write_str(" DO NOTHING"),
            ConflictAction::Update { set, filter } => {
                w.write_str(" DO UPDATE");
                w.express_if(set, !set.is_empty(), " SET\n", "")?;
                w.express_if(filter, !filter.conditions.is_empty(), "\n", "")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Postgres;
    use crate::expr::raw;
    use crate::render::{render, Context};

    fn sql(c: &Conflict) -> String {
        render(c, &Context::new(), &Postgres, 0).unwrap().0
    }

    #[test]
    fn test_conflict_do_nothing() {
        assert_eq!(sql(&Conflict::default()), "ON CONFLICT DO NOTHING");
        let c = Conflict {
            target: ConflictTarget::Constraint("pk".into()),
            action: ConflictAction::Nothing,
        };
        assert_eq!(sql(&c), "ON CONFLICT ON CONSTRAINT pk DO NOTHING");
    }

    #[test]
    fn test_conflict_do_update() {
        let c = Conflict {
            target: ConflictTarget::Columns {
                columns: vec![raw("did")],
                conditions: vec![raw("active")],
            },
            action: ConflictAction::Update {
                set: Set {
                    assignments: vec![raw("dname = EXCLUDED.dname")],
                },
                filter: Where {
                    conditions: vec![raw("zipcode <> '21201'")],
                },
            },
        };
        assert_eq!(
            sql(&c),
            "ON CONFLICT (did) WHERE active DO UPDATE SET\ndname = EXCLUDED.dname\n\
             WHERE zipcode <> '21201'"
        );
    }
}

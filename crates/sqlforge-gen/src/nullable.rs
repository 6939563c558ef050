//! Nullability predicates attached to expression spans.

use std::collections::HashMap;

use crate::source::QueryResult;
use crate::span::Span;

/// Decides whether an expression can produce NULL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Nullability {
    /// Always nullable (`IS NULL` operands, `COALESCE` arguments, nullable
    /// insert targets).
    Always,
    /// Nullable when any member is.
    AnyOf(Vec<Nullability>),
    /// A column reference; the spans are the reference's fields
    /// (`schema.table.column`, trailing fields required).
    Column(Vec<Span>),
}

impl Nullability {
    /// Joins `self` with a predicate already recorded for the same span.
    #[must_use]
    pub fn or(self, prev: Self) -> Self {
        Self::AnyOf(vec![self, prev])
    }

    /// Evaluates the predicate against the visible `sources`.
    #[must_use]
    pub fn is_null(&self, names: &HashMap<Span, String>, sources: &[QueryResult]) -> bool {
        match self {
            Self::Always => true,
            Self::AnyOf(all) => all.iter().any(|n| n.is_null(names, sources)),
            Self::Column(fields) => column_is_null(fields, names, sources),
        }
    }
}

fn column_is_null(fields: &[Span], names: &HashMap<Span, String>, sources: &[QueryResult]) -> bool {
    if sources.is_empty() || fields.is_empty() || fields.len() > 3 {
        return false;
    }

    let name = |i: usize| -> &str {
        fields
            .len()
            .checked_sub(i)
            .and_then(|idx| fields.get(idx))
            .and_then(|span| names.get(span))
            .map_or("", String::as_str)
    };
    let column = name(1);
    let table = name(2);
    let schema = name(3);

    for source in sources.iter().rev() {
        if table.is_empty() && source.must_be_qualified {
            continue;
        }
        if !table.is_empty() && (schema != source.schema || table != source.name) {
            continue;
        }
        if let Some(col) = source.columns.iter().find(|c| c.name == column) {
            return col.nullable;
        }
    }

    false
}

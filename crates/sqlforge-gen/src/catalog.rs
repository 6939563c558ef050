//! Database catalogue: tables, enums and domains of a live database.

use serde::Serialize;
use sqlx::PgPool;
use tracing::info;

use crate::error::Result;

/// A column of a catalogue table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableColumn {
    /// Column name.
    pub name: String,
    /// Whether the column accepts NULL.
    pub nullable: bool,
}

/// A table or view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    /// Schema name; empty for tables of the shared schema.
    pub schema: String,
    /// Table name.
    pub name: String,
    /// Columns in ordinal order.
    pub columns: Vec<TableColumn>,
}

impl Table {
    /// Creates a table in the shared schema.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: String::new(),
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Moves the table into `schema`.
    #[must_use]
    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Adds a column.
    #[must_use]
    pub fn column(mut self, name: impl Into<String>, nullable: bool) -> Self {
        self.columns.push(TableColumn {
            name: name.into(),
            nullable,
        });
        self
    }
}

/// A user-defined enum type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumType {
    /// Schema name.
    pub schema: String,
    /// Type name.
    pub name: String,
    /// Labels in sort order.
    pub labels: Vec<String>,
}

/// A domain over a base type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Domain {
    /// Schema name.
    pub schema: String,
    /// Domain name.
    pub name: String,
    /// Name of the underlying type.
    pub base_type: String,
}

/// Everything the parser needs to know about the database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    /// Tables and views.
    pub tables: Vec<Table>,
    /// Enum types.
    pub enums: Vec<EnumType>,
    /// Domains.
    pub domains: Vec<Domain>,
}

const COLUMNS_QUERY: &str = r"
SELECT c.table_schema::text, c.table_name::text, c.column_name::text, c.is_nullable::text = 'YES'
FROM information_schema.columns c
WHERE c.table_schema NOT IN ('pg_catalog', 'information_schema')
ORDER BY c.table_schema, c.table_name, c.ordinal_position";

const ENUMS_QUERY: &str = r"
SELECT n.nspname::text, t.typname::text, e.enumlabel::text
FROM pg_enum e
JOIN pg_type t ON t.oid = e.enumtypid
JOIN pg_namespace n ON n.oid = t.typnamespace
ORDER BY n.nspname, t.typname, e.enumsortorder";

const DOMAINS_QUERY: &str = r"
SELECT d.domain_schema::text, d.domain_name::text, d.udt_name::text
FROM information_schema.domains d
WHERE d.domain_schema NOT IN ('pg_catalog', 'information_schema')
ORDER BY d.domain_schema, d.domain_name";

impl Catalog {
    /// Loads the catalogue. Tables of `shared_schema` are stored with an
    /// empty schema so unqualified references match them.
    ///
    /// # Errors
    ///
    /// Returns any database error.
    pub async fn load(pool: &PgPool, shared_schema: &str) -> Result<Self> {
        let rows: Vec<(String, String, String, bool)> =
            sqlx::query_as(COLUMNS_QUERY).fetch_all(pool).await?;

        let mut tables: Vec<Table> = Vec::new();
        for (schema, table, column, nullable) in rows {
            let schema = if schema == shared_schema {
                String::new()
            } else {
                schema
            };
            match tables.last_mut() {
                Some(t) if t.schema == schema && t.name == table => {
                    t.columns.push(TableColumn {
                        name: column,
                        nullable,
                    });
                }
                _ => tables.push(Table::new(table).in_schema(schema).column(column, nullable)),
            }
        }

        let rows: Vec<(String, String, String)> =
            sqlx::query_as(ENUMS_QUERY).fetch_all(pool).await?;
        let mut enums: Vec<EnumType> = Vec::new();
        for (schema, name, label) in rows {
            match enums.last_mut() {
                Some(e) if e.schema == schema && e.name == name => e.labels.push(label),
                _ => enums.push(EnumType {
                    schema,
                    name,
                    labels: vec![label],
                }),
            }
        }

        let domains = sqlx::query_as::<_, (String, String, String)>(DOMAINS_QUERY)
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(|(schema, name, base_type)| Domain {
                schema,
                name,
                base_type,
            })
            .collect();

        let catalog = Self {
            tables,
            enums,
            domains,
        };
        info!(
            tables = catalog.tables.len(),
            enums = catalog.enums.len(),
            "loaded database catalogue"
        );
        Ok(catalog)
    }

    /// Looks up a domain by name.
    #[must_use]
    pub fn domain(&self, name: &str) -> Option<&Domain> {
        self.domains.iter().find(|d| d.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_builder() {
        let t = Table::new("users")
            .column("id", false)
            .column("email", true)
            .in_schema("auth");
        assert_eq!(t.schema, "auth");
        assert_eq!(t.columns.len(), 2);
        assert!(t.columns[1].nullable);
    }

    #[test]
    fn test_domain_lookup() {
        let catalog = Catalog {
            domains: vec![Domain {
                schema: "public".into(),
                name: "email".into(),
                base_type: "text".into(),
            }],
            ..Catalog::default()
        };
        assert_eq!(catalog.domain("email").map(|d| d.base_type.as_str()), Some("text"));
        assert!(catalog.domain("missing").is_none());
    }
}

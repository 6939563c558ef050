//! Parameter and result types of a statement, as the server sees them.
//!
//! The statement is prepared under a fresh name, its types are read back from
//! `pg_prepared_statements`, and the prepared statement is deallocated again.

use futures::future::BoxFuture;
use futures::FutureExt;
use sqlx::pool::PoolConnection;
use sqlx::{PgPool, Postgres};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{GenError, Result};
use crate::translate::TypeInfo;

/// Types of a statement's parameters and result columns, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Described {
    /// One entry per `$N`.
    pub params: Vec<TypeInfo>,
    /// One entry per result column.
    pub results: Vec<TypeInfo>,
}

/// Something that can type a statement.
pub trait TypeResolver: Send + Sync {
    /// Describes `sql`.
    fn describe<'a>(&'a self, sql: &'a str) -> BoxFuture<'a, Result<Described>>;
}

const QUERY_INFO: &str = r"
WITH prepared_details AS (
  SELECT 'parameter' AS kind, u.*
  FROM pg_prepared_statements
  CROSS JOIN unnest(parameter_types::oid[]) WITH ORDINALITY AS u (oid, index)
  WHERE name = $1
  UNION ALL
  SELECT 'result' AS kind, u.*
  FROM pg_prepared_statements
  CROSS JOIN unnest(result_types::oid[]) WITH ORDINALITY AS u (oid, index)
  WHERE name = $1
)
SELECT
  prep.kind::text,
  COALESCE(CASE
    WHEN t.typtype = 'e' THEN 'ENUM'
    WHEN t.typelem > 0 THEN 'ARRAY'
    ELSE t.typname::text
  END, '') AS column_type,
  COALESCE(t.typname::text, '') AS udt_name,
  COALESCE(n.nspname::text, '') AS udt_schema,
  COALESCE(CASE WHEN t.typtype = 'e' THEN 'USER-DEFINED' ELSE t.typname::text END, '') AS arr_type
FROM prepared_details prep
LEFT JOIN pg_type t ON t.oid = prep.oid
LEFT JOIN pg_namespace n ON n.oid = t.typnamespace
ORDER BY prep.kind, prep.index";

/// Types statements with `PREPARE` against a live database.
#[derive(Debug, Clone)]
pub struct PgTypeResolver {
    pool: PgPool,
}

impl PgTypeResolver {
    /// Creates a resolver using connections from `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn describe_sql(&self, sql: &str) -> Result<Described> {
        let conn = self.pool.acquire().await?;
        let mut prepared = Prepared {
            conn: Some(conn),
            name: Uuid::new_v4().to_string(),
        };

        let prepare = format!("PREPARE \"{}\" AS {sql}", prepared.name);
        {
            let conn = prepared.conn()?;
            sqlx::raw_sql(&prepare)
                .execute(&mut **conn)
                .await
                .map_err(prepare_error)?;
        }

        let rows: Vec<(String, String, String, String, String)> = {
            let name = prepared.name.clone();
            let conn = prepared.conn()?;
            sqlx::query_as(QUERY_INFO)
                .bind(name)
                .fetch_all(&mut **conn)
                .await?
        };
        prepared.deallocate().await?;

        let mut described = Described::default();
        for (kind, column_type, udt_name, udt_schema, arr_type) in rows {
            let info = TypeInfo {
                column_type,
                udt_name,
                udt_schema,
                arr_type,
            };
            match kind.as_str() {
                "parameter" => described.params.push(info),
                "result" => described.results.push(info),
                other => return Err(GenError::Prepare(format!("unknown type kind {other}"))),
            }
        }
        debug!(
            params = described.params.len(),
            results = described.results.len(),
            "described statement"
        );
        Ok(described)
    }
}

impl TypeResolver for PgTypeResolver {
    fn describe<'a>(&'a self, sql: &'a str) -> BoxFuture<'a, Result<Described>> {
        self.describe_sql(sql).boxed()
    }
}

fn prepare_error(err: sqlx::Error) -> GenError {
    match err {
        sqlx::Error::Database(db) => GenError::Prepare(db.message().to_string()),
        other => GenError::Database(other),
    }
}

/// A prepared statement that is deallocated when dropped.
struct Prepared {
    conn: Option<PoolConnection<Postgres>>,
    name: String,
}

impl Prepared {
    fn conn(&mut self) -> Result<&mut PoolConnection<Postgres>> {
        self.conn
            .as_mut()
            .ok_or_else(|| GenError::Prepare("connection already released".into()))
    }

    async fn deallocate(mut self) -> Result<()> {
        if let Some(mut conn) = self.conn.take() {
            let stmt = format!("DEALLOCATE \"{}\"", self.name);
            sqlx::raw_sql(&stmt).execute(&mut *conn).await?;
        }
        Ok(())
    }
}

impl Drop for Prepared {
    fn drop(&mut self) {
        let Some(mut conn) = self.conn.take() else {
            return;
        };
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(statement = %self.name, "no runtime to deallocate prepared statement");
            return;
        };
        let stmt = format!("DEALLOCATE \"{}\"", self.name);
        handle.spawn(async move {
            if let Err(e) = sqlx::raw_sql(&stmt).execute(&mut *conn).await {
                warn!(error = %e, "failed to deallocate prepared statement");
            }
        });
    }
}

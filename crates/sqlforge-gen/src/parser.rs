//! Parsing annotated query files into [`Query`] descriptions.

use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt};
use pg_query::NodeEnum;
use sqlforge_core::QueryType;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::error::{GenError, Result};
use crate::query::{Query, QueryCol, QueryConfig, QueryFile, QueryFolder};
use crate::translate::Translator;
use crate::typing::TypeResolver;
use crate::walker::Walker;

/// Parses query files against a database catalogue.
pub struct Parser<R> {
    catalog: Catalog,
    shared_schema: String,
    translator: Translator,
    resolver: R,
    concurrency: usize,
}

impl<R: TypeResolver> Parser<R> {
    /// Creates a parser. `shared_schema` is the schema whose tables are
    /// referenced without qualification.
    pub fn new(catalog: Catalog, shared_schema: impl Into<String>, translator: Translator, resolver: R) -> Self {
        Self {
            catalog,
            shared_schema: shared_schema.into(),
            translator,
            resolver,
            concurrency: 10,
        }
    }

    /// Sets how many files are typed at once.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// The type resolver.
    #[must_use]
    pub const fn resolver(&self) -> &R {
        &self.resolver
    }

    /// The translator, with every type registered so far.
    #[must_use]
    pub const fn translator(&self) -> &Translator {
        &self.translator
    }

    /// Parses every `.sql` file directly inside each of `paths`. Files are
    /// read in lexicographic order and typed concurrently.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::Multiple`] holding every failed file.
    pub async fn parse_folders(&self, paths: &[PathBuf]) -> Result<Vec<QueryFolder>> {
        let mut folders = Vec::with_capacity(paths.len());
        let mut errors = Vec::new();

        for path in paths {
            let files = sql_files(path).map_err(|e| in_file(path, e))?;
            let results: Vec<Result<QueryFile>> = stream::iter(files)
                .map(|file| self.parse_file(file))
                .buffered(self.concurrency)
                .collect()
                .await;

            let mut parsed = Vec::with_capacity(results.len());
            for result in results {
                match result {
                    Ok(file) => parsed.push(file),
                    Err(e) => errors.push(e),
                }
            }
            folders.push(QueryFolder {
                path: path.clone(),
                files: parsed,
            });
        }

        match errors.len() {
            0 => Ok(folders),
            _ => Err(GenError::Multiple(errors)),
        }
    }

    async fn parse_file(&self, path: PathBuf) -> Result<QueryFile> {
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| in_file(&path, e.into()))?;
        let queries = self
            .parse_queries(&content)
            .await
            .map_err(|e| in_file(&path, e))?;
        info!(path = %path.display(), queries = queries.len(), "parsed query file");
        Ok(QueryFile { path, queries })
    }

    /// Parses every statement of `input`, in source order. Each statement
    /// runs from the end of the previous one, so it keeps its leading
    /// comment.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::NoStatements`] for empty input, the syntax error,
    /// or every failed statement.
    pub async fn parse_queries(&self, input: &str) -> Result<Vec<Query>> {
        let parsed = pg_query::parse(input)?;
        let stmts = &parsed.protobuf.stmts;
        if stmts.is_empty() {
            return Err(GenError::NoStatements);
        }

        let mut queries = Vec::with_capacity(stmts.len());
        let mut errors = Vec::new();
        let mut end = 0;
        for stmt in stmts {
            let start = end;
            end = match usize::try_from(stmt.stmt_location + stmt.stmt_len) {
                Ok(e) if stmt.stmt_len > 0 => e.min(input.len()),
                _ => input.len(),
            };
            let text = input
                .get(start..end)
                .ok_or(GenError::OutOfBounds(end))?
                .trim_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | ';'));

            match self.parse_query(text).await {
                Ok(q) => queries.push(q),
                Err(e) => errors.push(e),
            }
        }

        GenError::collect(errors)?;
        Ok(queries)
    }

    /// Parses a single annotated statement.
    ///
    /// # Errors
    ///
    /// Returns the typing error, the syntax error, the walker's errors, or a
    /// count mismatch between the server and the query text.
    pub async fn parse_query(&self, input: &str) -> Result<Query> {
        let described = self.resolver.describe(input).await?;

        let parsed = pg_query::parse(input)?;
        let stmts = &parsed.protobuf.stmts;
        if stmts.len() != 1 {
            return Err(GenError::Unsupported(format!(
                "expected 1 statement, got {}",
                stmts.len()
            )));
        }
        let root = stmts[0].stmt.as_deref().ok_or(GenError::NoStatements)?;

        let (kind, key) = match &root.node {
            Some(NodeEnum::SelectStmt(s)) if !s.values_lists.is_empty() => {
                return Err(GenError::Unsupported("VALUES statement is not supported".into()));
            }
            Some(NodeEnum::SelectStmt(_)) => (QueryType::Select, "SelectStmt"),
            Some(NodeEnum::InsertStmt(_)) => (QueryType::Insert, "InsertStmt"),
            Some(NodeEnum::UpdateStmt(_)) => (QueryType::Update, "UpdateStmt"),
            Some(NodeEnum::DeleteStmt(_)) => (QueryType::Delete, "DeleteStmt"),
            _ => {
                return Err(GenError::Unsupported(
                    "only SELECT, INSERT, UPDATE and DELETE statements are supported".into(),
                ))
            }
        };

        let mut w = Walker::new(input, &self.catalog.tables, &self.shared_schema)?;
        let info = w.walk_node(root);
        w.record_mods(root, &info);
        let source = w.source_of(root, &info, &[]);
        GenError::collect(std::mem::take(&mut w.errors))?;

        if source.columns.len() != described.results.len() {
            return Err(GenError::TypeCountMismatch {
                what: "columns",
                expected: described.results.len(),
                got: source.columns.len(),
            });
        }
        if w.arg_count() != described.params.len() {
            return Err(GenError::TypeCountMismatch {
                what: "args",
                expected: described.params.len(),
                got: w.arg_count(),
            });
        }

        let formatted = w.format()?;

        let start = info.child(key).start;
        let comment = w
            .tokens
            .line_comment_before(start)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| GenError::MissingQueryComment(usize::try_from(start).unwrap_or_default()))?;
        let (name, config) = comment.split_once(' ').unwrap_or((comment.as_str(), ""));

        let arg_types: Vec<String> = described.params.iter().map(|t| self.translator.translate(t)).collect();
        let columns = source
            .columns
            .iter()
            .zip(&described.results)
            .map(|(col, typ)| {
                let annotation = col
                    .span
                    .map(|s| w.tokens.block_comment_after(s.end))
                    .unwrap_or_default();
                QueryCol {
                    name: col.name.clone(),
                    db_name: col.name.clone(),
                    nullable: Some(col.nullable),
                    type_name: self.translator.translate(typ),
                }
                .merge([QueryCol::parse_config(&annotation)])
            })
            .collect();

        debug!(name, kind = %kind, args = arg_types.len(), "parsed statement");

        Ok(Query {
            name: name.to_string(),
            config: QueryConfig::parse(config.trim()),
            args: w.query_args(&formatted, &arg_types),
            sql: formatted.sql,
            kind,
            columns,
            mods: formatted.mods,
            imports: formatted.imports,
        })
    }
}

fn in_file(path: &Path, source: GenError) -> GenError {
    GenError::InFile {
        path: path.to_path_buf(),
        source: Box::new(source),
    }
}

/// The `.sql` files directly inside `dir`, sorted by name.
fn sql_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "sql") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_files_are_sorted_and_filtered() {
        let dir = std::env::temp_dir().join(format!("sqlforge-files-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(dir.join("nested.sql")).unwrap();
        for name in ["b.sql", "a.sql", "notes.txt"] {
            std::fs::write(dir.join(name), "").unwrap();
        }

        let files = sql_files(&dir).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.sql", "b.sql"]);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}

use crate::core::{Pipeline, QuerySource, Storage};
use crate::domain::model::{NamedQuery, QueryOutcome, QueryResult, RenderedQuery};
use crate::utils::error::Result;
use crate::utils::table::GridTable;

pub struct QueryPipeline<Q: QuerySource, S: Storage> {
    source: Q,
    storage: S,
    queries: Vec<NamedQuery>,
}

impl<Q: QuerySource, S: Storage> QueryPipeline<Q, S> {
    pub fn new(source: Q, storage: S, queries: Vec<NamedQuery>) -> Self {
        Self {
            source,
            storage,
            queries,
        }
    }

    /// Executes one query and materializes every row.
    pub async fn run_query(&self, query: &NamedQuery) -> Result<QueryResult> {
        tracing::debug!("Running query '{}'", query.name);
        let result = self.source.fetch_all(&query.sql).await?;
        tracing::debug!("Query '{}' returned {} rows", query.name, result.len());
        Ok(result)
    }

    /// Prints a short preview of each query; nothing is saved.
    pub async fn explore(&self, queries: &[NamedQuery], preview_rows: usize) -> usize {
        let mut succeeded = 0;
        for query in queries {
            match self.run_query(query).await {
                Ok(result) => {
                    println!("{}", preview(query, &result, preview_rows));
                    succeeded += 1;
                }
                Err(e) => tracing::error!("❌ Error executing '{}': {}", query.name, e),
            }
        }
        succeeded
    }

    pub fn into_source(self) -> Q {
        self.source
    }
}

fn banner(title: &str) -> String {
    let rule = "=".repeat(80);
    format!("\n{}\n{}\n{}", rule, title, rule)
}

pub fn render_result(result: &QueryResult) -> String {
    // 欄名取自第一列，沒有資料列時沒有表頭可畫
    if result.columns.is_empty() {
        return "(no rows)".to_string();
    }
    let mut table = GridTable::new(result.columns.as_slice());
    table.extend_rows(result.cells());
    table.render()
}

fn report(query: &NamedQuery, result: &QueryResult, table: &str) -> String {
    format!(
        "{}\n\nSQL Query:\n{}\n\nResults ({} rows):\n{}\n",
        banner(&query.description),
        query.sql,
        result.len(),
        table
    )
}

fn preview(query: &NamedQuery, result: &QueryResult, preview_rows: usize) -> String {
    let mut lines = vec![
        banner(&query.description),
        format!("Columns: {}", result.columns.join(", ")),
        format!("Results: {} rows\n", result.len()),
    ];
    for row in result.cells().into_iter().take(preview_rows) {
        lines.push(format!("({})", row.join(", ")));
    }
    if result.len() > preview_rows {
        lines.push(format!("\n... and {} more rows", result.len() - preview_rows));
    }
    lines.join("\n")
}

#[async_trait::async_trait]
impl<Q: QuerySource, S: Storage> Pipeline for QueryPipeline<Q, S> {
    type Extracted = Vec<QueryOutcome>;
    type Transformed = Vec<RenderedQuery>;

    async fn extract(&self) -> Result<Vec<QueryOutcome>> {
        let mut outcomes = Vec::with_capacity(self.queries.len());
        let mut failed = 0;

        for query in &self.queries {
            let result = match self.run_query(query).await {
                Ok(result) => Some(result),
                Err(e) => {
                    tracing::error!("❌ Query error in '{}': {}", query.name, e);
                    failed += 1;
                    None
                }
            };
            outcomes.push(QueryOutcome {
                query: query.clone(),
                result,
            });
        }

        if failed > 0 {
            tracing::warn!("{} of {} queries failed", failed, self.queries.len());
        }
        Ok(outcomes)
    }

    async fn transform(&self, data: Vec<QueryOutcome>) -> Result<Vec<RenderedQuery>> {
        let rendered = data
            .into_iter()
            .filter_map(|outcome| {
                let result = outcome.result?;
                let table = render_result(&result);
                println!("{}", report(&outcome.query, &result, &table));
                Some(RenderedQuery {
                    query: outcome.query,
                    row_count: result.len(),
                    table,
                })
            })
            .collect();
        Ok(rendered)
    }

    async fn load(&self, rendered: Vec<RenderedQuery>) -> Result<Option<String>> {
        let mut saved = 0;

        for item in rendered {
            let Some(file) = &item.query.output_file else {
                continue;
            };
            if item.row_count == 0 {
                tracing::info!("Skipping empty result for '{}'", item.query.name);
                continue;
            }
            self.storage.write_file(file, item.table.as_bytes()).await?;
            println!("✓ Saved to {}", self.storage.location(file));
            saved += 1;
        }

        if saved == 0 {
            return Ok(None);
        }
        Ok(Some(self.storage.location("")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Record;
    use crate::utils::error::EtlError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn file_names(&self) -> Vec<String> {
            let mut names: Vec<String> = self.files.lock().await.keys().cloned().collect();
            names.sort();
            names
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }

        fn location(&self, path: &str) -> String {
            format!("results/{}", path)
        }
    }

    /// Answers by exact SQL text; anything else is a database error.
    struct MockSource {
        answers: HashMap<String, QueryResult>,
    }

    #[async_trait]
    impl QuerySource for MockSource {
        async fn fetch_all(&self, sql: &str) -> Result<QueryResult> {
            self.answers
                .get(sql)
                .cloned()
                .ok_or_else(|| EtlError::DatabaseError(sqlx::Error::RowNotFound))
        }
    }

    fn named(name: &str, sql: &str) -> NamedQuery {
        NamedQuery {
            name: name.to_string(),
            description: format!("Query {}", name),
            sql: sql.to_string(),
            output_file: Some(format!("{}.txt", name)),
        }
    }

    fn tiger_result() -> QueryResult {
        let mut data = HashMap::new();
        data.insert("tiger_count".to_string(), json!(8));
        QueryResult {
            columns: vec!["tiger_count".to_string()],
            rows: vec![Record { data }],
        }
    }

    fn pipeline() -> (QueryPipeline<MockSource, MockStorage>, MockStorage) {
        let mut answers = HashMap::new();
        answers.insert("SELECT tigers".to_string(), tiger_result());
        answers.insert("SELECT nothing".to_string(), QueryResult::default());

        let storage = MockStorage::new();
        let queries = vec![
            named("tigers", "SELECT tigers"),
            named("broken", "SELECT broken"),
            named("empty", "SELECT nothing"),
        ];
        (
            QueryPipeline::new(MockSource { answers }, storage.clone(), queries),
            storage,
        )
    }

    #[tokio::test]
    async fn test_run_query_with_zero_rows() {
        let (pipeline, _) = pipeline();
        let result = pipeline.run_query(&named("empty", "SELECT nothing")).await.unwrap();
        assert!(result.is_empty());
        assert_eq!(result.len(), 0);
    }

    #[tokio::test]
    async fn test_failed_query_is_skipped() {
        let (pipeline, _) = pipeline();

        let outcomes = pipeline.extract().await.unwrap();

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].result.is_some());
        assert!(outcomes[1].result.is_none());
        assert!(outcomes[2].result.as_ref().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_only_non_empty_results_are_saved() {
        let (pipeline, storage) = pipeline();

        let outcomes = pipeline.extract().await.unwrap();
        let rendered = pipeline.transform(outcomes).await.unwrap();
        assert_eq!(rendered.len(), 2);

        let location = pipeline.load(rendered).await.unwrap();

        assert_eq!(location.as_deref(), Some("results/"));
        assert_eq!(storage.file_names().await, vec!["tigers.txt"]);
        let table = String::from_utf8(storage.read_file("tigers.txt").await.unwrap()).unwrap();
        assert!(table.contains("| tiger_count |"));
        assert!(table.contains("|           8 |"));
    }

    #[tokio::test]
    async fn test_load_without_results_returns_none() {
        let (pipeline, storage) = pipeline();
        assert!(pipeline.load(Vec::new()).await.unwrap().is_none());
        assert!(storage.file_names().await.is_empty());
    }

    #[tokio::test]
    async fn test_explore_counts_successes() {
        let (pipeline, _) = pipeline();
        let queries = vec![named("tigers", "SELECT tigers"), named("broken", "SELECT broken")];
        assert_eq!(pipeline.explore(&queries, 10).await, 1);
    }

    #[test]
    fn test_render_result_without_rows() {
        assert_eq!(render_result(&QueryResult::default()), "(no rows)");

        let table = render_result(&tiger_result());
        assert!(table.starts_with("+-"));
        assert!(table.contains("| tiger_count |"));
    }

    #[test]
    fn test_preview_truncates_rows() {
        let mut result = QueryResult {
            columns: vec!["Tables_in_Rfam".to_string()],
            rows: Vec::new(),
        };
        for name in ["family", "rfamseq", "taxonomy"] {
            let mut data = HashMap::new();
            data.insert("Tables_in_Rfam".to_string(), json!(name));
            result.rows.push(Record { data });
        }

        let text = preview(&named("tables", "SHOW TABLES"), &result, 2);

        assert!(text.contains("Columns: Tables_in_Rfam"));
        assert!(text.contains("Results: 3 rows"));
        assert!(text.contains("(family)"));
        assert!(!text.contains("(taxonomy)"));
        assert!(text.ends_with("... and 1 more rows"));
    }
}

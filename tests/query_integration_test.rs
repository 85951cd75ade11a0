use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use sift_etl::config::AppConfig;
use sift_etl::core::{QueryResult, QuerySource, Record};
use sift_etl::{EtlEngine, EtlError, LocalStorage, QueryPipeline};
use std::collections::HashMap;
use std::sync::Mutex;
use tempfile::TempDir;

/// Stands in for the Rfam mirror: answers by keyword, records every statement.
struct FakeRfam {
    executed: Mutex<Vec<String>>,
}

impl FakeRfam {
    fn new() -> Self {
        Self {
            executed: Mutex::new(Vec::new()),
        }
    }
}

fn row(pairs: &[(&str, serde_json::Value)]) -> Record {
    Record {
        data: pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect::<HashMap<_, _>>(),
    }
}

#[async_trait]
impl QuerySource for FakeRfam {
    async fn fetch_all(&self, sql: &str) -> sift_etl::Result<QueryResult> {
        self.executed.lock().unwrap().push(sql.to_string());

        if sql.contains("COUNT(*)") {
            return Ok(QueryResult {
                columns: vec!["tiger_count".to_string()],
                rows: vec![row(&[("tiger_count", json!(8))])],
            });
        }
        if sql.contains("sumatrae") {
            return Ok(QueryResult {
                columns: vec![
                    "ncbi_id".to_string(),
                    "species".to_string(),
                    "tax_string".to_string(),
                ],
                rows: vec![row(&[
                    ("ncbi_id", json!(9695)),
                    ("species", json!("Panthera tigris sumatrae (Sumatran tiger)")),
                    ("tax_string", json!("Eukaryota; Metazoa; Chordata;")),
                ])],
            });
        }
        if sql.contains("Oryza") {
            // 空結果不應寫檔
            return Ok(QueryResult::default());
        }
        Err(EtlError::ProcessingError {
            message: format!("unsupported statement: {}", sql),
        })
    }
}

#[tokio::test]
async fn test_default_reports_against_fake_database() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let results_dir = temp_dir.path().join("query_results");
    let config = AppConfig::default();

    let pipeline = QueryPipeline::new(
        FakeRfam::new(),
        LocalStorage::new(results_dir.to_str().unwrap().to_string()),
        config.query.queries.clone(),
    );
    let engine = EtlEngine::new(pipeline);

    let location = engine.run().await?;
    assert!(location.is_some());

    // 五個查詢都執行過，失敗的不影響其餘
    let source = engine.into_pipeline().into_source();
    assert_eq!(source.executed.lock().unwrap().len(), 5);

    let mut saved: Vec<String> = std::fs::read_dir(&results_dir)?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<std::result::Result<_, _>>()?;
    saved.sort();
    assert_eq!(
        saved,
        vec!["question_1a_tiger_count.txt", "question_1b_sumatran_tiger.txt"]
    );

    let report = std::fs::read_to_string(results_dir.join("question_1b_sumatran_tiger.txt"))?;
    let header = report.lines().nth(1).unwrap();
    assert!(header.starts_with("| ncbi_id | species"));
    assert!(report.contains("|    9695 | Panthera tigris sumatrae (Sumatran tiger) |"));
    Ok(())
}

#[tokio::test]
async fn test_all_queries_failing_saves_nothing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let results_dir = temp_dir.path().join("query_results");

    let queries = AppConfig::default().query.explore;
    let pipeline = QueryPipeline::new(
        FakeRfam::new(),
        LocalStorage::new(results_dir.to_str().unwrap().to_string()),
        queries,
    );

    let location = EtlEngine::new(pipeline).run().await?;

    assert!(location.is_none());
    assert!(!results_dir.exists());
    Ok(())
}

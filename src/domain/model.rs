use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Sentinel written into any listing field no locator could fill.
pub const UNKNOWN: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

impl Record {
    /// Cell rendered for tables: strings unquoted, NULL blank.
    pub fn display(&self, column: &str) -> String {
        match self.data.get(column) {
            None | Some(serde_json::Value::Null) => String::new(),
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// Fully materialized result of one statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

impl QueryResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as display strings, in column order.
    pub fn cells(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| self.columns.iter().map(|c| row.display(c)).collect())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Price")]
    pub price: String,
}

impl ListingRecord {
    pub fn has_title(&self) -> bool {
        self.title != UNKNOWN
    }
}

impl Default for ListingRecord {
    fn default() -> Self {
        Self {
            title: UNKNOWN.to_string(),
            description: UNKNOWN.to_string(),
            price: UNKNOWN.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedQuery {
    pub name: String,
    pub description: String,
    pub sql: String,
    /// Report file under the results directory; exploration queries leave it unset.
    #[serde(default)]
    pub output_file: Option<String>,
}

/// Outcome of one configured query; `result` is `None` when execution failed.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub query: NamedQuery,
    pub result: Option<QueryResult>,
}

#[derive(Debug, Clone)]
pub struct RenderedQuery {
    pub query: NamedQuery,
    pub row_count: usize,
    pub table: String,
}

#[derive(Debug, Clone, Default)]
pub struct ListingBatch {
    pub records: Vec<ListingRecord>,
    pub table: String,
    pub csv_output: String,
}

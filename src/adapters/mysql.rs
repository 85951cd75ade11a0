use crate::config::toml_config::DatabaseConfig;
use crate::domain::model::{QueryResult, Record};
use crate::domain::ports::QuerySource;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Column, ConnectOptions, Connection, Row, TypeInfo, ValueRef};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// One MySQL connection held for the whole run.
pub struct MySqlSource {
    conn: Mutex<MySqlConnection>,
}

impl MySqlSource {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database);

        tracing::debug!(
            "Connecting to mysql://{}@{}:{}/{}",
            config.user,
            config.host,
            config.port,
            config.database
        );
        let mut conn = options.connect().await?;

        let version: (String,) = sqlx::query_as("SELECT VERSION()")
            .fetch_one(&mut conn)
            .await?;
        tracing::info!("✓ Connected to MySQL server version {}", version.0);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub async fn close(self) -> Result<()> {
        self.conn.into_inner().close().await?;
        tracing::info!("✓ Connection closed");
        Ok(())
    }
}

#[async_trait]
impl QuerySource for MySqlSource {
    async fn fetch_all(&self, sql: &str) -> Result<QueryResult> {
        let mut conn = self.conn.lock().await;
        // 文字協定：SHOW / DESCRIBE 也能執行，不需要預備語句
        let conn: &mut MySqlConnection = &mut conn;
        let rows = sqlx::Executor::fetch_all(conn, sqlx::raw_sql(sql)).await?;
        rows_to_result(&rows)
    }
}

fn rows_to_result(rows: &[MySqlRow]) -> Result<QueryResult> {
    let columns: Vec<String> = rows
        .first()
        .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
        .unwrap_or_default();

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let mut data = HashMap::with_capacity(columns.len());
        for (idx, name) in columns.iter().enumerate() {
            data.insert(name.clone(), decode_cell(row, idx)?);
        }
        records.push(Record { data });
    }

    Ok(QueryResult {
        columns,
        rows: records,
    })
}

fn decode_cell(row: &MySqlRow, idx: usize) -> Result<Value> {
    let type_name = {
        let raw = row.try_get_raw(idx)?;
        if raw.is_null() {
            return Ok(Value::Null);
        }
        raw.type_info().name().to_string()
    };

    let value = match type_name.as_str() {
        "BOOLEAN" => Value::Bool(row.try_get::<bool, _>(idx)?),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            Value::from(row.try_get::<i64, _>(idx)?)
        }
        t if t.ends_with("UNSIGNED") => Value::from(row.try_get::<u64, _>(idx)?),
        "FLOAT" => Value::from(widen_float(row.try_get::<f32, _>(idx)?)),
        "DOUBLE" => Value::from(row.try_get::<f64, _>(idx)?),
        "DATE" => Value::String(row.try_get::<chrono::NaiveDate, _>(idx)?.to_string()),
        "DATETIME" => Value::String(row.try_get::<chrono::NaiveDateTime, _>(idx)?.to_string()),
        "TIMESTAMP" => Value::String(
            row.try_get::<chrono::DateTime<chrono::Utc>, _>(idx)?
                .to_rfc3339(),
        ),
        _ => match row.try_get::<String, _>(idx) {
            Ok(text) => Value::String(text),
            // DECIMAL、二進位字串等：直接取位元組
            Err(_) => {
                let bytes = row.try_get_unchecked::<Vec<u8>, _>(idx)?;
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            }
        },
    };

    Ok(value)
}

/// Widens through the shortest decimal form so `1.2f32` stays `1.2`.
fn widen_float(value: f32) -> f64 {
    value.to_string().parse().unwrap_or(value as f64)
}

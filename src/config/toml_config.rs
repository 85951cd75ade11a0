use crate::core::extractor::FieldExtractor;
use crate::core::filter::KeywordFilter;
use crate::domain::model::NamedQuery;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub query: QueryConfig,
    pub scrape: ScrapeConfig,
    pub filter: KeywordFilter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "mysql-rfam-public.ebi.ac.uk".to_string(),
            port: 4497,
            user: "rfamro".to_string(),
            password: String::new(),
            database: "Rfam".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub results_dir: String,
    /// 探索模式每個查詢顯示的列數
    pub preview_rows: usize,
    pub queries: Vec<NamedQuery>,
    pub explore: Vec<NamedQuery>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            results_dir: "query_results".to_string(),
            preview_rows: 10,
            queries: default_analysis_queries(),
            explore: default_explore_queries(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// 依序嘗試，直到累積足夠的結果
    pub urls: Vec<String>,
    pub max_per_page: usize,
    pub min_results: usize,
    pub output_dir: String,
    pub output_file: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub render_wait_ms: u64,
    pub browserless_url: Option<String>,
    pub browserless_token: Option<String>,
    pub container_selectors: Vec<String>,
    pub fields: FieldExtractor,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            urls: vec![
                "https://www.olx.in/cars/spare-parts-accessories/q-car-cover".to_string(),
                "https://www.olx.in/items/q-car-body-cover".to_string(),
            ],
            max_per_page: 25,
            min_results: 10,
            output_dir: ".".to_string(),
            output_file: "car_cover_listings.csv".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
            timeout_seconds: 30,
            render_wait_ms: 5000,
            browserless_url: None,
            browserless_token: None,
            container_selectors: vec![
                r#"li[data-aut-id="itemBox"]"#.to_string(),
                r#"div[data-aut-id="itemBox"]"#.to_string(),
                "li".to_string(),
            ],
            fields: FieldExtractor::default(),
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置，未指定的欄位使用預設值
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${RFAM_PASSWORD})，未設定的變數視為空字串
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| {
                tracing::warn!("Environment variable {} is not set, using an empty value", var_name);
                String::new()
            })
        });

        Ok(result.to_string())
    }

    /// 驗證查詢相關設定
    pub fn validate_query(&self) -> Result<()> {
        validation::validate_non_empty_string("database.host", &self.database.host)?;
        validation::validate_non_empty_string("database.user", &self.database.user)?;
        validation::validate_non_empty_string("database.database", &self.database.database)?;
        validation::validate_path("query.results_dir", &self.query.results_dir)?;

        for (i, query) in self.query.queries.iter().chain(&self.query.explore).enumerate() {
            validation::validate_non_empty_string(&format!("query[{}].sql", i), &query.sql)?;
            if let Some(file) = &query.output_file {
                validation::validate_path(&format!("query[{}].output_file", i), file)?;
            }
        }
        Ok(())
    }

    /// 驗證爬蟲相關設定
    pub fn validate_scrape(&self) -> Result<()> {
        let scrape = &self.scrape;

        validation::validate_non_empty_list("scrape.urls", &scrape.urls)?;
        for url in &scrape.urls {
            validation::validate_url("scrape.urls", url)?;
        }
        if let Some(endpoint) = &scrape.browserless_url {
            validation::validate_url("scrape.browserless_url", endpoint)?;
        }
        validation::validate_positive_number("scrape.max_per_page", scrape.max_per_page, 1)?;
        validation::validate_positive_number(
            "scrape.timeout_seconds",
            scrape.timeout_seconds as usize,
            1,
        )?;
        validation::validate_path("scrape.output_dir", &scrape.output_dir)?;
        validation::validate_file_extensions(
            "scrape.output_file",
            std::slice::from_ref(&scrape.output_file),
            &["csv"],
        )?;

        validation::validate_non_empty_list("scrape.container_selectors", &scrape.container_selectors)?;
        for selector in &scrape.container_selectors {
            validation::validate_css_selector("scrape.container_selectors", selector)?;
        }

        validation::validate_non_empty_list("scrape.fields.title", &scrape.fields.title)?;
        for (field, keywords) in [
            ("filter.exclusion", &self.filter.exclusion),
            ("filter.overrides", &self.filter.overrides),
        ] {
            for keyword in keywords {
                // 空關鍵字會匹配所有文字
                validation::validate_non_empty_string(field, keyword)?;
            }
        }
        for (field, selector) in scrape.fields.css_selectors() {
            validation::validate_css_selector(&format!("scrape.fields.{}", field), selector)?;
        }
        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_query()?;
        self.validate_scrape()
    }
}

fn query(name: &str, description: &str, sql: &str, output_file: Option<&str>) -> NamedQuery {
    NamedQuery {
        name: name.to_string(),
        description: description.to_string(),
        sql: sql.trim().to_string(),
        output_file: output_file.map(str::to_string),
    }
}

pub fn default_analysis_queries() -> Vec<NamedQuery> {
    vec![
        query(
            "tiger_count",
            "QUESTION 1A: Count of Tiger Types",
            r#"
SELECT COUNT(*) AS tiger_count
FROM taxonomy
WHERE species LIKE '%Panthera tigris%'
"#,
            Some("question_1a_tiger_count.txt"),
        ),
        query(
            "sumatran_tiger",
            "QUESTION 1B: Sumatran Tiger NCBI ID",
            r#"
SELECT ncbi_id, species, tax_string
FROM taxonomy
WHERE species LIKE '%Panthera tigris sumatrae%'
   OR species = 'Panthera tigris sumatrae'
"#,
            Some("question_1b_sumatran_tiger.txt"),
        ),
        query(
            "table_connections",
            "QUESTION 2: Table Relationships (Foreign Keys)",
            r#"
SELECT 'taxonomy' AS table_name, 'ncbi_id' AS column_name, 'PRIMARY KEY' AS key_type, 'Used by rfamseq, genseq' AS connections
UNION ALL
SELECT 'rfamseq', 'ncbi_id', 'FOREIGN KEY', 'References taxonomy.ncbi_id'
UNION ALL
SELECT 'rfamseq', 'rfamseq_acc', 'PRIMARY KEY', 'Used by full_region, seed_region'
UNION ALL
SELECT 'family', 'rfam_acc', 'PRIMARY KEY', 'Used by full_region, seed_region, family_ncbi'
UNION ALL
SELECT 'full_region', 'rfam_acc', 'FOREIGN KEY', 'References family.rfam_acc'
UNION ALL
SELECT 'full_region', 'rfamseq_acc', 'FOREIGN KEY', 'References rfamseq.rfamseq_acc'
"#,
            Some("question_2_table_connections.txt"),
        ),
        query(
            "rice_longest_sequence",
            "QUESTION 3: Rice Species with Longest DNA Sequence",
            r#"
SELECT t.species, t.ncbi_id, r.length AS sequence_length, r.description
FROM taxonomy t
JOIN rfamseq r ON t.ncbi_id = r.ncbi_id
WHERE t.species LIKE '%Oryza%'
ORDER BY r.length DESC
LIMIT 1
"#,
            Some("question_3_rice_sequence.txt"),
        ),
        // 第 9 頁，每頁 15 筆：OFFSET = (9 - 1) * 15
        query(
            "paginated_families",
            "QUESTION 4: Paginated Family Query (Page 9)",
            r#"
SELECT f.rfam_acc, f.rfam_id, MAX(r.length) AS max_length
FROM family f
JOIN full_region fr ON f.rfam_acc = fr.rfam_acc
JOIN rfamseq r ON fr.rfamseq_acc = r.rfamseq_acc
GROUP BY f.rfam_acc, f.rfam_id
HAVING MAX(r.length) > 1000000
ORDER BY max_length DESC
LIMIT 15 OFFSET 120
"#,
            Some("question_4_pagination.txt"),
        ),
    ]
}

pub fn default_explore_queries() -> Vec<NamedQuery> {
    vec![
        query("tables", "Available Tables in Rfam Database", "SHOW TABLES", None),
        query("taxonomy", "Taxonomy Table Structure", "DESCRIBE taxonomy", None),
        query("rfamseq", "Rfamseq Table Structure", "DESCRIBE rfamseq", None),
        query("family", "Family Table Structure", "DESCRIBE family", None),
    ]
}

use crate::config::toml_config::AppConfig;
use crate::utils::error::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "sift-etl")]
#[command(about = "Fixed Rfam reports and keyword-filtered classifieds scraping")]
pub struct CliConfig {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the analysis queries and save each result table
    Query,
    /// Preview schema exploration queries
    Explore {
        /// Rows shown per query
        #[arg(short = 'n', long)]
        rows: Option<usize>,
    },
    /// Scrape listings and write them to CSV
    Scrape {
        /// Search URL to try, in order (repeatable; replaces configured URLs)
        #[arg(long = "url")]
        urls: Vec<String>,

        /// Output CSV file name
        #[arg(short, long)]
        output: Option<String>,

        /// Maximum listings accepted per page
        #[arg(long)]
        max_per_page: Option<usize>,
    },
}

impl CliConfig {
    /// 載入設定檔並套用命令列覆蓋
    pub fn load_app_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };

        match &self.command {
            Command::Query => {}
            Command::Explore { rows } => {
                if let Some(rows) = rows {
                    config.query.preview_rows = *rows;
                }
            }
            Command::Scrape {
                urls,
                output,
                max_per_page,
            } => {
                if !urls.is_empty() {
                    config.scrape.urls = urls.clone();
                }
                if let Some(output) = output {
                    config.scrape.output_file = output.clone();
                }
                if let Some(max) = max_per_page {
                    config.scrape.max_per_page = *max;
                }
            }
        }

        Ok(config)
    }
}

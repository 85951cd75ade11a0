use clap::Parser;
use sift_etl::config::{AppConfig, CliConfig, Command};
use sift_etl::core::PageSource;
use sift_etl::utils::error::ErrorSeverity;
use sift_etl::utils::logger;
use sift_etl::{
    BrowserlessPageSource, EtlEngine, EtlError, HttpPageSource, ListingPipeline, LocalStorage,
    MySqlSource, QueryPipeline, Result,
};
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli);

    let config = match cli.load_app_config() {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    let validated = match cli.command {
        Command::Query | Command::Explore { .. } => config.validate_query(),
        Command::Scrape { .. } => config.validate_scrape(),
    };
    if let Err(e) = validated {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(&e);
    }

    let outcome = match cli.command {
        Command::Query => run_queries(&config).await,
        Command::Explore { .. } => run_explore(&config).await,
        Command::Scrape { .. } => run_scrape(&config).await,
    };

    if let Err(e) = outcome {
        tracing::error!(
            "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        exit_with(&e);
    }

    Ok(())
}

fn exit_with(e: &EtlError) -> ! {
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

fn headline(title: &str) {
    println!("{}", "=".repeat(80));
    println!("{}", title);
    println!("{}", "=".repeat(80));
}

async fn run_queries(config: &AppConfig) -> Result<()> {
    headline("RFAM DATABASE ANALYSIS");

    // 連線失敗是唯一的致命錯誤
    let source = MySqlSource::connect(&config.database).await?;
    let storage = LocalStorage::new(config.query.results_dir.clone());
    let engine = EtlEngine::new(QueryPipeline::new(
        source,
        storage,
        config.query.queries.clone(),
    ));

    let outcome = engine.run().await;
    if let Err(e) = engine.into_pipeline().into_source().close().await {
        tracing::warn!("Failed to close database connection cleanly: {}", e);
    }

    match outcome? {
        Some(location) => {
            println!("\n{}", "=".repeat(80));
            println!("✓ All queries completed");
            println!("✓ Results saved to {}", location);
            println!("{}", "=".repeat(80));
        }
        None => println!("\nNo query produced rows; nothing was saved"),
    }
    Ok(())
}

async fn run_explore(config: &AppConfig) -> Result<()> {
    headline("RFAM DATABASE EXPLORER");

    let source = MySqlSource::connect(&config.database).await?;
    let storage = LocalStorage::new(config.query.results_dir.clone());
    let pipeline = QueryPipeline::new(source, storage, Vec::new());

    let succeeded = pipeline
        .explore(&config.query.explore, config.query.preview_rows)
        .await;
    tracing::info!(
        "{} of {} exploration queries succeeded",
        succeeded,
        config.query.explore.len()
    );

    pipeline.into_source().close().await
}

async fn run_scrape(config: &AppConfig) -> Result<()> {
    headline("LISTING SCRAPER");

    let scrape = &config.scrape;
    let timeout = Duration::from_secs(scrape.timeout_seconds);
    let storage = LocalStorage::new(scrape.output_dir.clone());

    match &scrape.browserless_url {
        Some(endpoint) => {
            let source = BrowserlessPageSource::new(
                endpoint,
                scrape.browserless_token.as_deref().filter(|t| !t.is_empty()),
                Duration::from_millis(scrape.render_wait_ms),
                timeout,
            )?;
            scrape_with(source, storage, config).await
        }
        None => {
            let source = HttpPageSource::new(&scrape.user_agent, timeout)?;
            scrape_with(source, storage, config).await
        }
    }
}

async fn scrape_with<P: PageSource>(
    source: P,
    storage: LocalStorage,
    config: &AppConfig,
) -> Result<()> {
    let pipeline = ListingPipeline::new(
        storage,
        source,
        config.scrape.clone(),
        config.filter.clone(),
    );

    if EtlEngine::new(pipeline).run().await?.is_none() {
        println!("\n❌ No listings found!");
    }
    Ok(())
}

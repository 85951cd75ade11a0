use crate::config::toml_config::ScrapeConfig;
use crate::core::dedupe::dedupe_by_title;
use crate::core::extractor::select_containers;
use crate::core::filter::KeywordFilter;
use crate::core::harvest::{harvest, Harvest};
use crate::core::{PageSource, Pipeline, Storage};
use crate::domain::model::{ListingBatch, ListingRecord};
use crate::utils::error::{EtlError, Result};
use crate::utils::table::GridTable;
use scraper::Html;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub struct ListingPipeline<S: Storage, P: PageSource> {
    storage: S,
    source: P,
    settings: ScrapeConfig,
    filter: KeywordFilter,
}

impl<S: Storage, P: PageSource> ListingPipeline<S, P> {
    pub fn new(storage: S, source: P, settings: ScrapeConfig, filter: KeywordFilter) -> Self {
        Self {
            storage,
            source,
            settings,
            filter,
        }
    }

    /// Containers, extraction and filtering for one page of HTML.
    pub fn harvest_html(&self, html: &str) -> Harvest {
        let document = Html::parse_document(html);
        let containers = select_containers(&document, &self.settings.container_selectors);
        tracing::info!("Found {} potential ads", containers.len());

        let outcome = harvest(
            containers,
            &self.settings.fields,
            &self.filter,
            Some(self.settings.max_per_page),
        );
        tracing::info!(
            "Extracted {} listings from {} examined, skipped {} ({} untitled, {} irrelevant)",
            outcome.records.len(),
            outcome.examined,
            outcome.skipped(),
            outcome.untitled,
            outcome.filtered
        );
        outcome
    }

    async fn scrape_page(&self, url: &str) -> Harvest {
        tracing::info!("URL: {}", url);
        match self.source.fetch(url).await {
            Ok(html) => self.harvest_html(&html),
            Err(e) => {
                tracing::error!("❌ Error during scraping {}: {}", url, e);
                Harvest::default()
            }
        }
    }
}

pub fn listings_to_csv(records: &[ListingRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    let bytes = writer.into_inner().map_err(|e| EtlError::ProcessingError {
        message: format!("CSV flush failed: {}", e),
    })?;
    String::from_utf8(bytes).map_err(|e| EtlError::ProcessingError {
        message: format!("CSV output is not UTF-8: {}", e),
    })
}

pub fn listings_table(records: &[ListingRecord]) -> String {
    let mut table = GridTable::new(&["Title", "Description", "Price"]).with_index();
    table.extend_rows(
        records
            .iter()
            .map(|r| vec![r.title.clone(), r.description.clone(), r.price.clone()]),
    );
    table.render()
}

#[async_trait::async_trait]
impl<S: Storage, P: PageSource> Pipeline for ListingPipeline<S, P> {
    type Extracted = Vec<ListingRecord>;
    type Transformed = ListingBatch;

    async fn extract(&self) -> Result<Vec<ListingRecord>> {
        let mut collected = Vec::new();

        for (i, url) in self.settings.urls.iter().enumerate() {
            if i > 0 {
                if collected.len() >= self.settings.min_results {
                    break;
                }
                tracing::warn!(
                    "⚠️  Not enough results ({} < {}). Trying alternative URL...",
                    collected.len(),
                    self.settings.min_results
                );
            }
            collected.extend(self.scrape_page(url).await.records);
        }

        tracing::info!("Collected {} listings", collected.len());
        Ok(collected)
    }

    async fn transform(&self, data: Vec<ListingRecord>) -> Result<ListingBatch> {
        let before = data.len();
        let records = dedupe_by_title(data);
        if records.len() < before {
            tracing::debug!("Removed {} duplicate titles", before - records.len());
        }

        if records.is_empty() {
            return Ok(ListingBatch::default());
        }

        Ok(ListingBatch {
            table: listings_table(&records),
            csv_output: listings_to_csv(&records)?,
            records,
        })
    }

    async fn load(&self, batch: ListingBatch) -> Result<Option<String>> {
        if batch.records.is_empty() {
            tracing::warn!("❌ No listings found");
            tracing::warn!("Possible reasons: the page layout changed, the search returned only excluded listings, or the network blocked the request");
            return Ok(None);
        }

        println!("\n{}", "=".repeat(80));
        println!("LISTINGS - {} RESULTS", batch.records.len());
        println!("{}", "=".repeat(80));
        println!("{}", batch.table);

        let mut data = Vec::with_capacity(UTF8_BOM.len() + batch.csv_output.len());
        data.extend_from_slice(UTF8_BOM);
        data.extend_from_slice(batch.csv_output.as_bytes());
        self.storage
            .write_file(&self.settings.output_file, &data)
            .await?;

        let location = self.storage.location(&self.settings.output_file);
        println!("\n✓ Results saved to {}", location);
        println!("✓ Total records: {}", batch.records.len());
        Ok(Some(location))
    }
}

use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<Option<String>> {
        let started = Instant::now();
        tracing::info!("Starting ETL process...");

        tracing::info!("Extracting data...");
        let raw_data = self.pipeline.extract().await?;

        tracing::info!("Transforming data...");
        let transformed = self.pipeline.transform(raw_data).await?;

        tracing::info!("Loading data...");
        let output = self.pipeline.load(transformed).await?;

        match &output {
            Some(path) => tracing::info!("Output saved to: {}", path),
            None => tracing::warn!("Nothing was written"),
        }
        tracing::debug!("ETL finished in {:?}", started.elapsed());

        Ok(output)
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// 取回管道以便釋放其持有的資源
    pub fn into_pipeline(self) -> P {
        self.pipeline
    }
}

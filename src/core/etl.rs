use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

/// Drives a pipeline through extract, transform and load, in that order.
/// An error in any phase stops the run before anything later executes.
pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("Starting email domain aggregation...");

        let sources = self.pipeline.extract().await?;
        tracing::debug!(
            "Extracted {} disposable and {} provider sources in {:?}",
            sources.disposable_sources.len(),
            sources.provider_sources.len(),
            started.elapsed()
        );

        let aggregation = self.pipeline.transform(sources).await?;
        tracing::debug!(
            "Partitioned {} domains in {:?}",
            aggregation.partitioned.total(),
            started.elapsed()
        );

        let output_path = self.pipeline.load(aggregation).await?;
        tracing::info!("Aggregation complete in {:?}", started.elapsed());

        Ok(output_path)
    }
}

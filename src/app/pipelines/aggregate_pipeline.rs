use crate::config::sources::SourcesConfig;
use crate::core::fetcher::SourceFetcher;
use crate::core::writer::{self, OutputWriter};
use crate::core::{loader, partition, report, ConfigProvider, Pipeline, Storage};
use crate::domain::model::{Aggregation, SourceKind, SourceSets};
use crate::utils::error::Result;
use chrono::Utc;

/// Fetches every configured source, partitions the domains, and writes all
/// output artifacts.
pub struct AggregatePipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) fetcher: SourceFetcher,
}

impl<S: Storage, C: ConfigProvider> AggregatePipeline<S, C> {
    pub fn new(storage: S, config: C, fetcher: SourceFetcher) -> Self {
        Self {
            storage,
            config,
            fetcher,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for AggregatePipeline<S, C> {
    async fn extract(&self) -> Result<SourceSets> {
        let sources = SourcesConfig::load(&self.storage, self.config.sources_file()).await?;
        let temp_dir = self.config.temp_dir();

        tracing::info!("Loading disposable domain sources...");
        let disposable_sources = self
            .fetcher
            .fetch_all(&self.storage, temp_dir, SourceKind::Disposable, &sources.disposable)
            .await?;

        let custom_disposable =
            loader::load_optional(&self.storage, self.config.custom_disposable_file()).await?;
        tracing::info!("  - custom disposable: {} domains", custom_disposable.len());

        let paid_personal =
            loader::load_optional(&self.storage, self.config.paid_personal_file()).await?;
        tracing::info!("Paid personal domains: {} domains", paid_personal.len());

        tracing::info!("Loading free/paid email provider sources...");
        let provider_sources = self
            .fetcher
            .fetch_all(&self.storage, temp_dir, SourceKind::FreePaid, &sources.free_paid)
            .await?;

        let allowlist = loader::load_optional(&self.storage, self.config.allowlist_file()).await?;
        tracing::info!("Allowlist domains: {} domains", allowlist.len());

        let sets = SourceSets {
            disposable_sources,
            custom_disposable,
            paid_personal,
            provider_sources,
            allowlist,
        };
        tracing::info!(
            "Total disposable domains (after deduplication): {}",
            sets.disposable_union()
                .union(&sets.custom_disposable)
                .count()
        );
        tracing::info!(
            "Total free/paid domains (after deduplication): {}",
            sets.provider_union().len()
        );

        Ok(sets)
    }

    async fn transform(&self, sources: SourceSets) -> Result<Aggregation> {
        tracing::info!("Categorizing domains...");
        let partitioned = partition::partition(&sources);

        tracing::info!("Final categorization:");
        tracing::info!("  - Disposable: {} domains", partitioned.disposable.len());
        tracing::info!("  - Free: {} domains", partitioned.free.len());
        tracing::info!("  - Paid Personal: {} domains", partitioned.paid_personal.len());

        let stats = report::source_stats(
            &sources.named_sources(),
            &partitioned,
            writer::format_timestamp(Utc::now()),
        );

        Ok(Aggregation { partitioned, stats })
    }

    async fn load(&self, aggregation: Aggregation) -> Result<String> {
        let writer = OutputWriter::new(&self.storage, self.config.output_dir());

        // must be read before the new outputs overwrite it
        let previous = writer.load_previous().await?;
        let delta = report::compute_delta(&aggregation.partitioned, &previous.categories);

        writer.write_source_stats(&aggregation.stats).await?;
        writer
            .write_outputs(&aggregation.partitioned, previous.output.as_ref(), Utc::now())
            .await?;
        writer.write_delta(&delta).await?;

        Ok(writer.path(writer::JSON_FILE))
    }
}

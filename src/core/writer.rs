use crate::core::{loader, Storage};
use crate::domain::model::{
    AggregateOutput, Category, DeltaReport, DomainSet, DomainsByCategory, Partitioned,
    PreviousSnapshot, SourceStatsReport,
};
use crate::utils::error::{FilterError, Result};
use chrono::{DateTime, SecondsFormat, Utc};

pub const JSON_FILE: &str = "email_domains.json";
pub const CSV_FILE: &str = "email_domains.csv";
pub const SOURCE_STATS_FILE: &str = "source_stats.json";
pub const DELTA_FILE: &str = "delta.json";

pub fn category_file(category: Category) -> String {
    format!("{}.txt", category.as_str())
}

/// ISO 8601 with microseconds and an explicit `+00:00` offset.
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Picks the `generated` stamp for a new output. The previous stamp is kept
/// when the domain payload is identical; the flag reports whether it changed.
pub fn resolve_timestamp(
    domains: &DomainsByCategory,
    previous: Option<&AggregateOutput>,
    now: DateTime<Utc>,
) -> (String, bool) {
    match previous {
        Some(prev) if prev.domains == *domains => (prev.metadata.generated.clone(), false),
        _ => (format_timestamp(now), true),
    }
}

/// Compact JSON, no whitespace between tokens.
pub fn render_json(output: &AggregateOutput) -> Result<String> {
    Ok(serde_json::to_string(output)?)
}

/// `domain,category` rows, all disposable first, then free, then paid personal.
pub fn render_csv(partitioned: &Partitioned) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["domain", "category"])?;

    for category in Category::EXPLICIT {
        if let Some(domains) = partitioned.get(category) {
            for domain in domains {
                writer.write_record([domain.as_str(), category.as_str()])?;
            }
        }
    }

    writer
        .into_inner()
        .map_err(|e| FilterError::IoError(e.into_error()))
}

pub fn render_text(domains: &DomainSet) -> String {
    domains.iter().fold(String::new(), |mut out, domain| {
        out.push_str(domain);
        out.push('\n');
        out
    })
}

/// Parses a previous primary output. Errors are reported as `CorruptOutput`
/// so callers can decide to carry on without it.
pub fn parse_previous_output(path: &str, bytes: &[u8]) -> Result<AggregateOutput> {
    serde_json::from_slice(bytes).map_err(|e| FilterError::CorruptOutput {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

/// Writes every artifact under one output directory.
pub struct OutputWriter<'a, S: Storage> {
    storage: &'a S,
    output_dir: String,
}

impl<'a, S: Storage> OutputWriter<'a, S> {
    pub fn new(storage: &'a S, output_dir: impl Into<String>) -> Self {
        Self {
            storage,
            output_dir: output_dir.into(),
        }
    }

    pub fn path(&self, file: &str) -> String {
        format!("{}/{}", self.output_dir, file)
    }

    /// Reads whatever the previous run left. A missing or unparseable JSON
    /// file yields no previous output; missing text files yield empty sets.
    pub async fn load_previous(&self) -> Result<PreviousSnapshot> {
        let json_path = self.path(JSON_FILE);
        let output = if self.storage.exists(&json_path).await {
            let bytes = self.storage.read_file(&json_path).await?;
            match parse_previous_output(&json_path, &bytes) {
                Ok(output) => Some(output),
                Err(e) => {
                    tracing::warn!("{}; treating this as a fresh run", e);
                    None
                }
            }
        } else {
            None
        };

        let categories = Partitioned {
            disposable: self.load_category(Category::Disposable).await?,
            free: self.load_category(Category::Free).await?,
            paid_personal: self.load_category(Category::PaidPersonal).await?,
        };

        Ok(PreviousSnapshot { output, categories })
    }

    async fn load_category(&self, category: Category) -> Result<DomainSet> {
        loader::load_optional(self.storage, &self.path(&category_file(category))).await
    }

    /// Writes the JSON, CSV and per-category text files. Returns the output
    /// that was written and whether its timestamp was refreshed.
    pub async fn write_outputs(
        &self,
        partitioned: &Partitioned,
        previous: Option<&AggregateOutput>,
        now: DateTime<Utc>,
    ) -> Result<(AggregateOutput, bool)> {
        let domains = partitioned.to_domains();
        let (generated, changed) = resolve_timestamp(&domains, previous, now);
        let output = AggregateOutput::new(partitioned, generated);

        let json_path = self.path(JSON_FILE);
        self.storage
            .write_file(&json_path, render_json(&output)?.as_bytes())
            .await?;
        self.storage
            .write_file(&self.path(CSV_FILE), &render_csv(partitioned)?)
            .await?;

        for category in Category::EXPLICIT {
            if let Some(set) = partitioned.get(category) {
                self.storage
                    .write_file(&self.path(&category_file(category)), render_text(set).as_bytes())
                    .await?;
            }
        }

        tracing::info!("Generated outputs:");
        tracing::info!("  - Disposable: {} domains", output.metadata.categories.disposable);
        tracing::info!("  - Free: {} domains", output.metadata.categories.free);
        tracing::info!("  - Paid Personal: {} domains", output.metadata.categories.paid_personal);
        tracing::info!("  - Total: {} domains", output.metadata.total_domains);
        if changed {
            tracing::info!("  Domain content has changed - timestamp updated");
        } else {
            tracing::info!("  Domain content unchanged - timestamp preserved");
        }

        Ok((output, changed))
    }

    pub async fn write_source_stats(&self, stats: &SourceStatsReport) -> Result<()> {
        let path = self.path(SOURCE_STATS_FILE);
        self.storage
            .write_file(&path, serde_json::to_string_pretty(stats)?.as_bytes())
            .await?;
        tracing::info!("  Source stats written to {}", path);
        Ok(())
    }

    pub async fn write_delta(&self, delta: &DeltaReport) -> Result<()> {
        self.storage
            .write_file(&self.path(DELTA_FILE), serde_json::to_string_pretty(delta)?.as_bytes())
            .await?;
        tracing::info!("  Delta: +{} / -{} domains", delta.total_added, delta.total_removed);
        Ok(())
    }
}

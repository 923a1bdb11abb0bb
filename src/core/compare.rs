use crate::core::fetcher::SourceFetcher;
use crate::core::{loader, writer, Storage};
use crate::domain::model::DomainSet;
use crate::utils::error::Result;

pub const DISPOSABLE_LIST_URL: &str = "https://raw.githubusercontent.com/disposable-email-domains/disposable-email-domains/refs/heads/main/disposable_email_blocklist.conf";
pub const ALL_PROVIDERS_URL: &str = "https://gist.githubusercontent.com/ammarshah/f5c2624d767f91a7cbdc4e54db8dd0bf/raw/660fd949eba09c0b86574d9d3aa0f2137161fc7c/all_email_provider_domains.txt";

const SAMPLE_SIZE: usize = 20;

/// How a disposable list and an all-providers list relate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceComparison {
    pub disposable: DomainSet,
    pub providers: DomainSet,
    /// Providers that are not disposable.
    pub candidates: DomainSet,
    pub overlap: DomainSet,
}

pub fn compare(disposable: DomainSet, providers: DomainSet) -> SourceComparison {
    let candidates = providers.difference(&disposable).cloned().collect();
    let overlap = disposable.intersection(&providers).cloned().collect();
    SourceComparison {
        disposable,
        providers,
        candidates,
        overlap,
    }
}

pub fn render_analysis(comparison: &SourceComparison) -> String {
    let mut out = format!(
        "Analysis Results:\n\
         Disposable domains: {}\n\
         All provider domains: {}\n\
         Overlapping domains: {}\n\
         Free/Paid candidates: {}\n\n\
         Sample overlapping domains:\n",
        comparison.disposable.len(),
        comparison.providers.len(),
        comparison.overlap.len(),
        comparison.candidates.len(),
    );
    for domain in comparison.overlap.iter().take(SAMPLE_SIZE) {
        out.push_str("  ");
        out.push_str(domain);
        out.push('\n');
    }
    out
}

/// Downloads both lists into `temp_dir` (subject to the fetcher's policy),
/// compares them, and writes the three analysis files into `output_dir`.
pub async fn run_comparison<S: Storage>(
    storage: &S,
    fetcher: &SourceFetcher,
    temp_dir: &str,
    output_dir: &str,
    disposable_url: &str,
    providers_url: &str,
) -> Result<SourceComparison> {
    let disposable_path = format!("{}/disposable.txt", temp_dir);
    let providers_path = format!("{}/all_providers.txt", temp_dir);

    fetcher.download(storage, disposable_url, &disposable_path).await?;
    fetcher.download(storage, providers_url, &providers_path).await?;

    tracing::info!("Loading domain sets...");
    let disposable = loader::load_required(storage, &disposable_path).await?;
    let providers = loader::load_required(storage, &providers_path).await?;
    tracing::info!("Disposable domains: {}", disposable.len());
    tracing::info!("All provider domains: {}", providers.len());

    let comparison = compare(disposable, providers);
    tracing::info!(
        "Free/Paid candidates (after removing disposable overlap): {}",
        comparison.candidates.len()
    );
    tracing::info!("Overlapping domains: {}", comparison.overlap.len());

    storage
        .write_file(
            &format!("{}/disposable_domains.txt", output_dir),
            writer::render_text(&comparison.disposable).as_bytes(),
        )
        .await?;
    storage
        .write_file(
            &format!("{}/free_paid_candidates.txt", output_dir),
            writer::render_text(&comparison.candidates).as_bytes(),
        )
        .await?;
    storage
        .write_file(
            &format!("{}/overlap_analysis.txt", output_dir),
            render_analysis(&comparison).as_bytes(),
        )
        .await?;

    Ok(comparison)
}

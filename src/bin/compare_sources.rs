use clap::Parser;
use email_domain_filter::core::compare::{self, ALL_PROVIDERS_URL, DISPOSABLE_LIST_URL};
use email_domain_filter::core::FetchPolicy;
use email_domain_filter::utils::logger;
use email_domain_filter::CliConfig;

/// Downloads (once) a disposable list and an all-providers list and reports
/// how they overlap.
#[derive(Parser)]
#[command(name = "compare_sources")]
#[command(about = "Compare a disposable list against an all-providers list")]
struct Args {
    #[command(flatten)]
    cli: CliConfig,

    #[arg(long, default_value = DISPOSABLE_LIST_URL)]
    disposable_url: String,

    #[arg(long, default_value = ALL_PROVIDERS_URL)]
    providers_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init(args.cli.verbose, args.cli.json_logs);

    let mut config = args.cli.resolve()?;
    // cached downloads are the point of this tool
    config.fetch_policy = FetchPolicy::ReuseExisting;

    let storage = config.storage();
    let fetcher = config.fetcher()?;

    let comparison = compare::run_comparison(
        &storage,
        &fetcher,
        &config.temp_dir,
        &config.output_dir,
        &args.disposable_url,
        &args.providers_url,
    )
    .await?;

    println!("Disposable domains: {}", comparison.disposable.len());
    println!("All provider domains: {}", comparison.providers.len());
    println!("Overlapping domains: {}", comparison.overlap.len());
    println!("Free/Paid candidates: {}", comparison.candidates.len());
    Ok(())
}

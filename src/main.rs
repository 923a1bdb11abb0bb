use clap::Parser;
use email_domain_filter::utils::logger;
use email_domain_filter::{AggregatePipeline, CliConfig, EtlEngine, FilterError};

#[derive(Parser)]
#[command(name = "email-domain-filter")]
#[command(about = "Aggregate email domain lists into disposable, free and paid personal categories")]
struct Args {
    #[command(flatten)]
    cli: CliConfig,
}

fn exit_with(e: &FilterError) -> ! {
    tracing::error!(
        "Aggregation failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code().max(1));
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logger::init(args.cli.verbose, args.cli.json_logs);

    let config = match args.cli.resolve() {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };
    tracing::debug!("Resolved config: {:?}", config);

    let fetcher = match config.fetcher() {
        Ok(fetcher) => fetcher,
        Err(e) => exit_with(&e),
    };

    let storage = config.storage();
    let pipeline = AggregatePipeline::new(storage, config, fetcher);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            println!("✅ Aggregation complete!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => exit_with(&e),
    }
}

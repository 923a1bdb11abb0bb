use clap::Parser;
use email_domain_filter::core::Storage;
use email_domain_filter::utils::logger;
use email_domain_filter::{CliConfig, DomainClassifier};

#[derive(Parser)]
#[command(name = "classify_emails")]
#[command(about = "Categorize email addresses and apply block rules")]
struct Args {
    #[command(flatten)]
    cli: CliConfig,

    /// Addresses to check
    emails: Vec<String>,

    /// Load the published JSON instead of the local output
    #[arg(long)]
    remote: bool,

    /// Let disposable addresses through
    #[arg(long)]
    allow_disposable: bool,

    /// Reject free provider addresses
    #[arg(long)]
    block_free: bool,

    /// Reject paid personal provider addresses
    #[arg(long)]
    block_paid_personal: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init(args.cli.verbose, args.cli.json_logs);
    let config = args.cli.resolve()?;

    let storage = config.storage();
    let json_path = config.json_output_path();
    let classifier = if !args.remote && storage.exists(&json_path).await {
        DomainClassifier::load(&storage, &json_path).await?
    } else {
        if !args.remote {
            tracing::warn!("{} not found, fetching published data", json_path);
        }
        let fetcher = config.fetcher()?;
        DomainClassifier::fetch_remote(fetcher.client(), &config.remote_url).await?
    };

    let mut rules = config.block_rules;
    rules.block_disposable &= !args.allow_disposable;
    rules.block_free |= args.block_free;
    rules.block_paid_personal |= args.block_paid_personal;

    for email in &args.emails {
        let category = classifier
            .categorize_email(email)
            .map(|category| category.to_string())
            .unwrap_or_else(|_| "invalid".to_string());
        let business = if classifier.is_business_email(email) {
            "business"
        } else {
            "not business"
        };
        let decision = classifier.should_block(email, &rules);
        let status = if decision.blocked { "🚫 BLOCK" } else { "✅ ALLOW" };

        println!(
            "{:<30} → {:<13} {:<13} {:<10} ({})",
            email, category, business, status, decision.reason
        );
    }

    Ok(())
}

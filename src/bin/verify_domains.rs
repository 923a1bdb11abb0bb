use clap::Parser;
use email_domain_filter::core::verify::{self, KNOWN_DOMAINS};
use email_domain_filter::core::Storage;
use email_domain_filter::utils::logger;
use email_domain_filter::{CliConfig, DomainClassifier};

#[derive(Parser)]
#[command(name = "verify_domains")]
#[command(about = "Check the generated output against known classifications")]
struct Args {
    #[command(flatten)]
    cli: CliConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init(args.cli.verbose, args.cli.json_logs);
    let config = args.cli.resolve()?;
    let storage = config.storage();

    println!("Email Provider Filter - Domain Categorization Test");
    println!("{}", "=".repeat(60));

    let json_path = config.json_output_path();
    if !storage.exists(&json_path).await {
        println!("❌ Output files not found. Run 'email-domain-filter' first.");
        std::process::exit(1);
    }

    let classifier = match DomainClassifier::load(&storage, &json_path).await {
        Ok(classifier) => classifier,
        Err(e) => {
            tracing::warn!("{}; falling back to the per-category text files", e);
            DomainClassifier::load_text_files(&storage, &config.output_dir).await?
        }
    };

    let report = verify::verify(&classifier, KNOWN_DOMAINS);

    println!("\nTesting {} domain classifications...", report.cases.len());
    println!("{}", "-".repeat(60));
    for case in &report.cases {
        let status = if case.passed() { "✅ PASS" } else { "❌ FAIL" };
        println!(
            "{} | {:<20} | Expected: {:<15} | Actual: {}",
            status,
            case.domain,
            case.expected.as_str(),
            case.actual
        );
    }
    println!("{}", "-".repeat(60));
    println!(
        "Results: {} passed, {} failed",
        report.cases.len() - report.failed_cases(),
        report.failed_cases()
    );

    let sets = classifier.sets();
    println!("\nDataset Statistics:");
    println!("- Disposable domains: {}", sets.disposable.len());
    println!("- Free domains: {}", sets.free.len());
    println!("- Paid personal domains: {}", sets.paid_personal.len());
    println!("- Total domains: {}", sets.total());

    println!("\nTesting for overlapping domains between categories...");
    if report.overlaps.is_empty() {
        println!("✅ No overlapping domains found");
    } else {
        println!("❌ OVERLAP DETECTED:");
        for overlap in &report.overlaps {
            println!("  {} ∩ {}: {} domains", overlap.left, overlap.right, overlap.domains.len());
            for domain in overlap.domains.iter().take(5) {
                println!("    - {}", domain);
            }
            if overlap.domains.len() > 5 {
                println!("    ... and {} more", overlap.domains.len() - 5);
            }
        }
    }

    println!("\n{}", "=".repeat(60));
    if report.passed() {
        println!("🎉 ALL TESTS PASSED! Domain categorization is working correctly.");
        Ok(())
    } else {
        println!("⚠️  Some tests failed. Please review the categorization logic.");
        std::process::exit(1);
    }
}

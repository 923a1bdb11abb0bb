pub mod cli;
pub mod memory;
pub mod sources;
pub mod toml_config;

use crate::config::toml_config::FileConfig;
use crate::core::classifier::{BlockRules, DEFAULT_REMOTE_URL};
use crate::core::fetcher::{SourceFetcher, DEFAULT_TIMEOUT_SECONDS, DEFAULT_USER_AGENT};
use crate::core::{ConfigProvider, FetchPolicy};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use std::path::PathBuf;
use std::time::Duration;

/// Every path and knob one run needs. File paths are relative to `root`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatorConfig {
    pub root: PathBuf,
    pub sources_file: String,
    pub custom_disposable_file: String,
    pub paid_personal_file: String,
    pub allowlist_file: String,
    pub output_dir: String,
    pub temp_dir: String,
    pub fetch_policy: FetchPolicy,
    pub timeout_seconds: u64,
    pub user_agent: String,
    pub remote_url: String,
    pub block_rules: BlockRules,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            sources_file: "sources/sources.json".to_string(),
            custom_disposable_file: "sources/custom_disposable.txt".to_string(),
            paid_personal_file: "sources/paid_personal.txt".to_string(),
            allowlist_file: "sources/allowlist.txt".to_string(),
            output_dir: "output".to_string(),
            temp_dir: "temp".to_string(),
            fetch_policy: FetchPolicy::Always,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            remote_url: DEFAULT_REMOTE_URL.to_string(),
            block_rules: BlockRules::default(),
        }
    }
}

impl AggregatorConfig {
    /// Overlays the keys present in a settings file.
    pub fn apply_file(&mut self, file: FileConfig) {
        if let Some(paths) = file.paths {
            if let Some(root) = paths.root {
                self.root = PathBuf::from(root);
            }
            let overrides = [
                (paths.sources_file, &mut self.sources_file),
                (paths.custom_disposable_file, &mut self.custom_disposable_file),
                (paths.paid_personal_file, &mut self.paid_personal_file),
                (paths.allowlist_file, &mut self.allowlist_file),
                (paths.output_dir, &mut self.output_dir),
                (paths.temp_dir, &mut self.temp_dir),
            ];
            for (value, slot) in overrides {
                if let Some(value) = value {
                    *slot = value;
                }
            }
        }

        if let Some(fetch) = file.fetch {
            if let Some(policy) = fetch.policy {
                self.fetch_policy = policy;
            }
            if let Some(timeout) = fetch.timeout_seconds {
                self.timeout_seconds = timeout;
            }
            if let Some(user_agent) = fetch.user_agent {
                self.user_agent = user_agent;
            }
        }

        if let Some(classifier) = file.classifier {
            if let Some(url) = classifier.remote_url {
                self.remote_url = url;
            }
            if let Some(rules) = classifier.rules {
                self.block_rules = rules;
            }
        }
    }

    pub fn storage(&self) -> cli::LocalStorage {
        cli::LocalStorage::new(self.root.clone())
    }

    pub fn fetcher(&self) -> Result<SourceFetcher> {
        SourceFetcher::new(
            self.fetch_policy,
            Duration::from_secs(self.timeout_seconds),
            &self.user_agent,
        )
    }

    pub fn json_output_path(&self) -> String {
        format!("{}/{}", self.output_dir, crate::core::writer::JSON_FILE)
    }
}

impl ConfigProvider for AggregatorConfig {
    fn sources_file(&self) -> &str {
        &self.sources_file
    }

    fn custom_disposable_file(&self) -> &str {
        &self.custom_disposable_file
    }

    fn paid_personal_file(&self) -> &str {
        &self.paid_personal_file
    }

    fn allowlist_file(&self) -> &str {
        &self.allowlist_file
    }

    fn output_dir(&self) -> &str {
        &self.output_dir
    }

    fn temp_dir(&self) -> &str {
        &self.temp_dir
    }

    fn fetch_policy(&self) -> FetchPolicy {
        self.fetch_policy
    }
}

impl Validate for AggregatorConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("paths.sources_file", &self.sources_file)?;
        validation::validate_path("paths.custom_disposable_file", &self.custom_disposable_file)?;
        validation::validate_path("paths.paid_personal_file", &self.paid_personal_file)?;
        validation::validate_path("paths.allowlist_file", &self.allowlist_file)?;
        validation::validate_path("paths.output_dir", &self.output_dir)?;
        validation::validate_path("paths.temp_dir", &self.temp_dir)?;
        validation::validate_range("fetch.timeout_seconds", self.timeout_seconds, 1, 3600)?;
        validation::validate_non_empty_string("fetch.user_agent", &self.user_agent)?;
        validation::validate_url("classifier.remote_url", &self.remote_url)
    }
}

#[cfg(feature = "cli")]
pub use args::CliConfig;

#[cfg(feature = "cli")]
mod args {
    use super::*;
    use clap::Parser;

    /// Flags shared by every binary. Flags override the settings file, which
    /// overrides the defaults.
    #[derive(Debug, Clone, Default, Parser)]
    pub struct CliConfig {
        /// Project root containing sources/ and output/
        #[arg(long)]
        pub root: Option<PathBuf>,

        /// Optional TOML settings file
        #[arg(long)]
        pub config: Option<PathBuf>,

        /// HTTP timeout per download, in seconds
        #[arg(long)]
        pub timeout_seconds: Option<u64>,

        /// Reuse downloads already present in the temp directory
        #[arg(long)]
        pub reuse_downloads: bool,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Emit logs as JSON")]
        pub json_logs: bool,
    }

    impl CliConfig {
        pub fn resolve(&self) -> Result<AggregatorConfig> {
            let mut config = AggregatorConfig::default();

            if let Some(path) = &self.config {
                config.apply_file(FileConfig::from_file(path)?);
            }
            if let Some(root) = &self.root {
                config.root = root.clone();
            }
            if let Some(timeout) = self.timeout_seconds {
                config.timeout_seconds = timeout;
            }
            if self.reuse_downloads {
                config.fetch_policy = FetchPolicy::ReuseExisting;
            }

            config.validate()?;
            Ok(config)
        }
    }
}

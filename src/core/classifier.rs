use crate::core::{writer, Storage};
use crate::domain::model::{normalize_domain, AggregateOutput, Category, DomainSet, Partitioned};
use crate::utils::error::{FilterError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Published copy of `email_domains.json`, for consumers without local output.
pub const DEFAULT_REMOTE_URL: &str =
    "https://raw.githubusercontent.com/Rohithzr/email-provider-filter/main/output/email_domains.json";

/// Which categories cause an address to be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockRules {
    pub block_disposable: bool,
    pub block_free: bool,
    pub block_paid_personal: bool,
}

impl Default for BlockRules {
    fn default() -> Self {
        Self {
            block_disposable: true,
            block_free: false,
            block_paid_personal: false,
        }
    }
}

impl BlockRules {
    /// Blocks everything except business domains.
    pub fn business_only() -> Self {
        Self {
            block_disposable: true,
            block_free: true,
            block_paid_personal: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDecision {
    pub blocked: bool,
    pub reason: String,
}

/// Splits an address on its first `@`. Returns `MalformedInput` when there
/// is no `@` or nothing after it.
pub fn email_domain(email: &str) -> Result<String> {
    match email.split_once('@') {
        Some((_, domain)) if !domain.trim().is_empty() => Ok(normalize_domain(domain)),
        _ => Err(FilterError::MalformedInput {
            input: email.to_string(),
        }),
    }
}

/// Answers category questions against the three published sets.
#[derive(Debug, Clone, Default)]
pub struct DomainClassifier {
    sets: Partitioned,
}

impl DomainClassifier {
    pub fn new(sets: Partitioned) -> Self {
        Self { sets }
    }

    pub fn from_output(output: &AggregateOutput) -> Self {
        Self::new(output.domains.to_partitioned())
    }

    /// Loads `email_domains.json` from storage.
    pub async fn load<S: Storage>(storage: &S, path: &str) -> Result<Self> {
        if !storage.exists(path).await {
            return Err(FilterError::ConfigurationMissing {
                path: path.to_string(),
            });
        }
        let bytes = storage.read_file(path).await?;
        let output: AggregateOutput = serde_json::from_slice(&bytes)?;
        let classifier = Self::from_output(&output);
        tracing::info!("Loaded {} domains from {}", classifier.len(), path);
        Ok(classifier)
    }

    /// Loads the per-category text files in `output_dir`, for trees where
    /// the JSON artifact is missing.
    pub async fn load_text_files<S: Storage>(storage: &S, output_dir: &str) -> Result<Self> {
        let previous = writer::OutputWriter::new(storage, output_dir)
            .load_previous()
            .await?;
        Ok(Self::new(previous.categories))
    }

    pub async fn fetch_remote(client: &Client, url: &str) -> Result<Self> {
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|source| FilterError::FetchFailure {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(FilterError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let output: AggregateOutput = response.json().await.map_err(|source| {
            FilterError::FetchFailure {
                url: url.to_string(),
                source,
            }
        })?;
        let classifier = Self::from_output(&output);
        tracing::info!("Loaded {} domains from remote data", classifier.len());
        Ok(classifier)
    }

    pub fn sets(&self) -> &Partitioned {
        &self.sets
    }

    pub fn len(&self) -> usize {
        self.sets.total()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checked in order disposable, free, paid personal; anything else is
    /// business.
    pub fn categorize(&self, domain: &str) -> Category {
        let domain = normalize_domain(domain);
        let lookup: [(&DomainSet, Category); 3] = [
            (&self.sets.disposable, Category::Disposable),
            (&self.sets.free, Category::Free),
            (&self.sets.paid_personal, Category::PaidPersonal),
        ];

        lookup
            .into_iter()
            .find(|(set, _)| set.contains(&domain))
            .map(|(_, category)| category)
            .unwrap_or(Category::Business)
    }

    pub fn categorize_email(&self, email: &str) -> Result<Category> {
        email_domain(email).map(|domain| self.categorize(&domain))
    }

    /// Malformed addresses are never business addresses.
    pub fn is_business_email(&self, email: &str) -> bool {
        matches!(self.categorize_email(email), Ok(Category::Business))
    }

    pub fn should_block(&self, email: &str, rules: &BlockRules) -> BlockDecision {
        let domain = match email_domain(email) {
            Ok(domain) => domain,
            Err(e) => {
                tracing::debug!("{}", e);
                return BlockDecision {
                    blocked: true,
                    reason: "Invalid email format".to_string(),
                };
            }
        };

        let (blocked, reason) = match self.categorize(&domain) {
            Category::Disposable if rules.block_disposable => {
                (true, format!("Disposable email domain: {}", domain))
            }
            Category::Free if rules.block_free => (true, format!("Free email provider: {}", domain)),
            Category::PaidPersonal if rules.block_paid_personal => {
                (true, format!("Paid personal email provider: {}", domain))
            }
            category => (false, format!("Allowed email domain: {} ({})", domain, category)),
        };

        BlockDecision { blocked, reason }
    }
}

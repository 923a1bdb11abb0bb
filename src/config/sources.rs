use crate::core::Storage;
use crate::domain::model::{SourceDescriptor, CUSTOM_DISPOSABLE_SOURCE, PAID_PERSONAL_SOURCE};
use crate::utils::error::{FilterError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};

/// Contents of `sources/sources.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcesConfig {
    pub disposable: Vec<SourceDescriptor>,
    pub free_paid: Vec<SourceDescriptor>,
}

impl SourcesConfig {
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Reads and validates the source list. A missing file aborts the run.
    pub async fn load<S: Storage>(storage: &S, path: &str) -> Result<Self> {
        if !storage.exists(path).await {
            return Err(FilterError::ConfigurationMissing {
                path: path.to_string(),
            });
        }

        let bytes = storage.read_file(path).await?;
        let config: Self = serde_json::from_slice(&bytes)?;
        config.validate()?;

        tracing::debug!(
            "Loaded {} disposable and {} free/paid sources from {}",
            config.disposable.len(),
            config.free_paid.len(),
            path
        );
        Ok(config)
    }

    fn all(&self) -> impl Iterator<Item = &SourceDescriptor> {
        self.disposable.iter().chain(self.free_paid.iter())
    }
}

impl Validate for SourcesConfig {
    fn validate(&self) -> Result<()> {
        for source in self.all() {
            validation::validate_non_empty_string("sources.name", &source.name)?;
            validation::validate_url(&format!("sources.{}.url", source.name), &source.url)?;
        }

        let reserved = [CUSTOM_DISPOSABLE_SOURCE, PAID_PERSONAL_SOURCE];
        validation::validate_unique_names(
            "sources.name",
            reserved
                .into_iter()
                .chain(self.all().map(|source| source.name.as_str())),
        )
    }
}

use crate::domain::model::{Aggregation, SourceSets};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = bool> + Send;
}

/// Whether a source already present in the temp directory is downloaded again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchPolicy {
    #[default]
    Always,
    ReuseExisting,
}

/// Paths are relative to the storage root.
pub trait ConfigProvider: Send + Sync {
    fn sources_file(&self) -> &str;
    fn custom_disposable_file(&self) -> &str;
    fn paid_personal_file(&self) -> &str;
    fn allowlist_file(&self) -> &str;
    fn output_dir(&self) -> &str;
    fn temp_dir(&self) -> &str;
    fn fetch_policy(&self) -> FetchPolicy;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<SourceSets>;
    async fn transform(&self, sources: SourceSets) -> Result<Aggregation>;
    async fn load(&self, aggregation: Aggregation) -> Result<String>;
}

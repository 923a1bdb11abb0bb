use crate::core::{loader, FetchPolicy, Storage};
use crate::domain::model::{NamedSource, SourceDescriptor, SourceKind};
use crate::utils::error::{FilterError, Result};
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = concat!("email-domain-filter/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

/// Downloads remote lists one at a time. Any failure is returned
/// immediately; there is no retry.
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    client: Client,
    policy: FetchPolicy,
}

impl SourceFetcher {
    pub fn new(policy: FetchPolicy, timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| FilterError::ValidationError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self::with_client(client, policy))
    }

    pub fn with_client(client: Client, policy: FetchPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> FetchPolicy {
        self.policy
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        tracing::info!("Downloading {}...", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FilterError::FetchFailure {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        tracing::debug!("{} responded with {}", url, status);
        if !status.is_success() {
            return Err(FilterError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| FilterError::FetchFailure {
            url: url.to_string(),
            source,
        })
    }

    /// Downloads `url` into `path`, unless the policy allows reusing a copy
    /// that is already there.
    pub async fn download<S: Storage>(&self, storage: &S, url: &str, path: &str) -> Result<()> {
        if self.policy == FetchPolicy::ReuseExisting && storage.exists(path).await {
            tracing::debug!("Reusing cached {}", path);
            return Ok(());
        }

        let body = self.fetch_text(url).await?;
        storage.write_file(path, body.as_bytes()).await?;
        tracing::debug!("Saved to {}", path);
        Ok(())
    }

    /// Fetches the `index`-th source of a pool into its numbered temp file
    /// and loads it.
    pub async fn fetch_source<S: Storage>(
        &self,
        storage: &S,
        temp_dir: &str,
        kind: SourceKind,
        index: usize,
        source: &SourceDescriptor,
    ) -> Result<NamedSource> {
        let path = temp_file_path(temp_dir, kind, index);
        self.download(storage, &source.url, &path).await?;
        let domains = loader::load_required(storage, &path).await?;
        tracing::info!("  - {}: {} domains", source.name, domains.len());

        Ok(NamedSource {
            name: source.name.clone(),
            domains,
        })
    }

    /// Fetches a whole pool in configuration order.
    pub async fn fetch_all<S: Storage>(
        &self,
        storage: &S,
        temp_dir: &str,
        kind: SourceKind,
        sources: &[SourceDescriptor],
    ) -> Result<Vec<NamedSource>> {
        let mut fetched = Vec::with_capacity(sources.len());
        for (index, source) in sources.iter().enumerate() {
            fetched.push(self.fetch_source(storage, temp_dir, kind, index, source).await?);
        }
        Ok(fetched)
    }
}

pub fn temp_file_path(temp_dir: &str, kind: SourceKind, index: usize) -> String {
    format!("{}/{}_{}.txt", temp_dir, kind.temp_prefix(), index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::memory::MemoryStorage;
    use httpmock::prelude::*;

    fn fetcher(policy: FetchPolicy) -> SourceFetcher {
        SourceFetcher::new(policy, Duration::from_secs(5), DEFAULT_USER_AGENT).unwrap()
    }

    #[test]
    fn test_temp_file_path() {
        assert_eq!(
            temp_file_path("temp", SourceKind::Disposable, 0),
            "temp/disposable_0.txt"
        );
        assert_eq!(
            temp_file_path("temp", SourceKind::FreePaid, 3),
            "temp/free_paid_3.txt"
        );
    }

    #[tokio::test]
    async fn test_fetch_source_writes_temp_file_and_loads_it() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/blocklist.conf");
            then.status(200).body("# list\nMailinator.com\n10minutemail.com\n");
        });

        let storage = MemoryStorage::new();
        let descriptor = SourceDescriptor {
            name: "blocklist".to_string(),
            url: server.url("/blocklist.conf"),
        };
        let source = fetcher(FetchPolicy::Always)
            .fetch_source(&storage, "temp", SourceKind::Disposable, 0, &descriptor)
            .await
            .unwrap();

        mock.assert();
        assert_eq!(source.name, "blocklist");
        assert_eq!(source.domains.len(), 2);
        assert!(storage.exists("temp/disposable_0.txt").await);
    }

    #[tokio::test]
    async fn test_http_error_is_fatal() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404);
        });

        let storage = MemoryStorage::new();
        let err = fetcher(FetchPolicy::Always)
            .download(&storage, &server.url("/missing"), "temp/free_paid_0.txt")
            .await
            .unwrap_err();

        assert!(matches!(err, FilterError::HttpStatus { status: 404, .. }));
        assert!(!storage.exists("temp/free_paid_0.txt").await);
    }

    #[tokio::test]
    async fn test_reuse_existing_skips_download() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/list.txt");
            then.status(200).body("fresh.com\n");
        });

        let storage = MemoryStorage::new();
        storage.write_file("temp/disposable.txt", b"cached.com\n").await.unwrap();

        fetcher(FetchPolicy::ReuseExisting)
            .download(&storage, &server.url("/list.txt"), "temp/disposable.txt")
            .await
            .unwrap();

        mock.assert_hits(0);
        let cached = storage.read_file("temp/disposable.txt").await.unwrap();
        assert_eq!(cached, b"cached.com\n");
    }

    #[tokio::test]
    async fn test_always_policy_refetches() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/list.txt");
            then.status(200).body("fresh.com\n");
        });

        let storage = MemoryStorage::new();
        storage.write_file("temp/disposable.txt", b"cached.com\n").await.unwrap();

        fetcher(FetchPolicy::Always)
            .download(&storage, &server.url("/list.txt"), "temp/disposable.txt")
            .await
            .unwrap();

        mock.assert();
        let stored = storage.read_file("temp/disposable.txt").await.unwrap();
        assert_eq!(stored, b"fresh.com\n");
    }
}

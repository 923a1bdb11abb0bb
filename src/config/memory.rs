use crate::core::Storage;
use crate::utils::error::{FilterError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Storage backed by a shared in-memory map. Clones see the same files.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().await.get(path).cloned()
    }

    pub async fn get_text(&self, path: &str) -> Option<String> {
        self.get_file(path)
            .await
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }

    pub async fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.files.lock().await.keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl Storage for MemoryStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let files = self.files.lock().await;
        files.get(path).cloned().ok_or_else(|| {
            FilterError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("File not found: {}", path),
            ))
        })
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let mut files = self.files.lock().await;
        files.insert(path.to_string(), data.to_vec());
        Ok(())
    }

    async fn exists(&self, path: &str) -> bool {
        self.files.lock().await.contains_key(path)
    }
}

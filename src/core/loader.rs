use crate::core::Storage;
use crate::domain::model::{normalize_domain, DomainSet};
use crate::utils::error::{FilterError, Result};

const COMMENT_MARKER: char = '#';

/// Parses line-delimited text into a domain set. Blank lines and lines
/// starting with `#` are skipped; everything else is trimmed and lowercased.
pub fn parse_domain_list(text: &str) -> DomainSet {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with(COMMENT_MARKER))
        .map(normalize_domain)
        .collect()
}

/// Loads a source that must exist, such as a freshly downloaded list.
pub async fn load_required<S: Storage>(storage: &S, path: &str) -> Result<DomainSet> {
    if !storage.exists(path).await {
        return Err(FilterError::ConfigurationMissing {
            path: path.to_string(),
        });
    }
    let bytes = storage.read_file(path).await?;
    Ok(parse_domain_list(&String::from_utf8_lossy(&bytes)))
}

/// Loads an optional local list; a missing file yields an empty set.
pub async fn load_optional<S: Storage>(storage: &S, path: &str) -> Result<DomainSet> {
    if !storage.exists(path).await {
        tracing::debug!("{} not found, treating as empty", path);
        return Ok(DomainSet::new());
    }
    let bytes = storage.read_file(path).await?;
    Ok(parse_domain_list(&String::from_utf8_lossy(&bytes)))
}

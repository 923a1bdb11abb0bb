use crate::core::classifier::BlockRules;
use crate::core::FetchPolicy;
use crate::utils::error::{FilterError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional settings file. Every key may be omitted; omitted keys keep the
/// built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    pub paths: Option<PathsConfig>,
    pub fetch: Option<FetchConfig>,
    pub classifier: Option<ClassifierConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    pub root: Option<String>,
    pub sources_file: Option<String>,
    pub custom_disposable_file: Option<String>,
    pub paid_personal_file: Option<String>,
    pub allowlist_file: Option<String>,
    pub output_dir: Option<String>,
    pub temp_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchConfig {
    pub policy: Option<FetchPolicy>,
    pub timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub remote_url: Option<String>,
    pub rules: Option<BlockRules>,
}

impl FileConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(FilterError::ConfigurationMissing {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content)?;
        Ok(toml::from_str(&processed)?)
    }
}

/// Replaces `${VAR}` with the environment value. Unset variables are left
/// as written.
fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| FilterError::ValidationError {
        message: format!("Invalid substitution pattern: {}", e),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let content = r#"
[paths]
root = "/srv/domains"
output_dir = "dist"

[fetch]
policy = "reuse_existing"
timeout_seconds = 30

[classifier]
remote_url = "https://example.com/email_domains.json"

[classifier.rules]
block_free = true
"#;

        let config = FileConfig::from_toml_str(content).unwrap();

        let paths = config.paths.unwrap();
        assert_eq!(paths.root.as_deref(), Some("/srv/domains"));
        assert_eq!(paths.output_dir.as_deref(), Some("dist"));
        assert!(paths.temp_dir.is_none());

        let fetch = config.fetch.unwrap();
        assert_eq!(fetch.policy, Some(FetchPolicy::ReuseExisting));
        assert_eq!(fetch.timeout_seconds, Some(30));

        let rules = config.classifier.unwrap().rules.unwrap();
        assert!(rules.block_disposable);
        assert!(rules.block_free);
        assert!(!rules.block_paid_personal);
    }

    #[test]
    fn test_bundled_example_parses() {
        let config = FileConfig::from_toml_str(include_str!("../../filter.example.toml")).unwrap();
        assert_eq!(config.fetch.unwrap().policy, Some(FetchPolicy::Always));
        assert_eq!(config.classifier.unwrap().rules, Some(BlockRules::default()));
    }

    #[test]
    fn test_empty_config_is_valid() {
        let config = FileConfig::from_toml_str("").unwrap();
        assert!(config.paths.is_none());
        assert!(config.fetch.is_none());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("EDF_TEST_USER_AGENT", "domain-bot/2.0");

        let config = FileConfig::from_toml_str(
            r#"
[fetch]
user_agent = "${EDF_TEST_USER_AGENT}"
"#,
        )
        .unwrap();
        assert_eq!(
            config.fetch.unwrap().user_agent.as_deref(),
            Some("domain-bot/2.0")
        );

        std::env::remove_var("EDF_TEST_USER_AGENT");
    }

    #[test]
    fn test_unset_variable_is_left_alone() {
        let processed = substitute_env_vars("url = \"${EDF_TEST_DEFINITELY_UNSET}\"").unwrap();
        assert_eq!(processed, "url = \"${EDF_TEST_DEFINITELY_UNSET}\"");
    }

    #[test]
    fn test_invalid_policy_is_rejected() {
        let err = FileConfig::from_toml_str("[fetch]\npolicy = \"sometimes\"\n").unwrap_err();
        assert!(matches!(err, FilterError::TomlError(_)));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[paths]\nsources_file = \"lists/sources.json\"\n")
            .unwrap();

        let config = FileConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(
            config.paths.unwrap().sources_file.as_deref(),
            Some("lists/sources.json")
        );
    }

    #[test]
    fn test_missing_file_is_configuration_missing() {
        let err = FileConfig::from_file("/nonexistent/email-domain-filter.toml").unwrap_err();
        assert!(matches!(err, FilterError::ConfigurationMissing { .. }));
    }
}

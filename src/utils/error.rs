use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Required configuration file not found: {path}")]
    ConfigurationMissing { path: String },

    #[error("Failed to fetch {url}: {source}")]
    FetchFailure {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Fetching {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Malformed email address: {input:?}")]
    MalformedInput { input: String },

    #[error("Previous output {path} is unreadable: {reason}")]
    CorruptOutput { path: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid value {value:?} for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Input,
    Output,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FilterError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigurationMissing { .. }
            | Self::TomlError(_)
            | Self::InvalidConfigValueError { .. }
            | Self::ValidationError { .. } => ErrorCategory::Configuration,
            Self::FetchFailure { .. } | Self::HttpStatus { .. } => ErrorCategory::Network,
            Self::MalformedInput { .. } => ErrorCategory::Input,
            Self::CorruptOutput { .. } | Self::CsvError(_) | Self::SerializationError(_) => {
                ErrorCategory::Output
            }
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // recovered by the caller, never aborts a run
            Self::MalformedInput { .. } | Self::CorruptOutput { .. } => ErrorSeverity::Low,
            Self::FetchFailure { .. } | Self::HttpStatus { .. } => ErrorSeverity::Medium,
            Self::ConfigurationMissing { .. }
            | Self::TomlError(_)
            | Self::InvalidConfigValueError { .. }
            | Self::ValidationError { .. } => ErrorSeverity::High,
            Self::IoError(_) | Self::CsvError(_) | Self::SerializationError(_) => {
                ErrorSeverity::Critical
            }
        }
    }

    /// Process exit code for a run that ended with this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ConfigurationMissing { .. } => {
                "Run from the project root or pass --root pointing at the directory containing sources/"
            }
            Self::FetchFailure { .. } | Self::HttpStatus { .. } => {
                "Check network access and the source URLs in sources/sources.json, then re-run"
            }
            Self::MalformedInput { .. } => "Pass a full address of the form user@domain",
            Self::CorruptOutput { .. } => {
                "Delete the damaged file under output/; the next run regenerates it"
            }
            Self::TomlError(_) | Self::InvalidConfigValueError { .. } | Self::ValidationError { .. } => {
                "Fix the reported configuration value and re-run"
            }
            Self::IoError(_) => "Check file permissions and free disk space",
            Self::CsvError(_) | Self::SerializationError(_) => {
                "Re-run the aggregation; if it persists, inspect the output directory"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ConfigurationMissing { path } => format!("Missing required file: {}", path),
            Self::FetchFailure { url, .. } => format!("Could not download source {}", url),
            Self::HttpStatus { url, status } => {
                format!("Source {} responded with HTTP {}", url, status)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FilterError>;

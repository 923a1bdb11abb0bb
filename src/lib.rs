pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::app::pipelines::AggregatePipeline;
pub use crate::config::{cli::LocalStorage, memory::MemoryStorage, AggregatorConfig};
pub use crate::core::classifier::{BlockDecision, BlockRules, DomainClassifier};
pub use crate::core::etl::EtlEngine;
pub use crate::domain::model::Category;
pub use crate::utils::error::{FilterError, Result};

pub mod classifier;
pub mod compare;
pub mod etl;
pub mod fetcher;
pub mod loader;
pub mod partition;
pub mod report;
pub mod verify;
pub mod writer;

pub use crate::domain::model::{Aggregation, SourceSets};
pub use crate::domain::ports::{ConfigProvider, FetchPolicy, Pipeline, Storage};
pub use crate::utils::error::Result;

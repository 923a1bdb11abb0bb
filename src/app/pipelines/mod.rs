pub mod aggregate_pipeline;

pub use aggregate_pipeline::AggregatePipeline;

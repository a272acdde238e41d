//! Collection pipelines.
//!
//! - `collect`: the repository and paper runs behind the [`Pipeline`] trait
//! - `aggregate`: merge/dedupe and the staleness filter
//! - `score`: relevance scoring and category tagging
//! - `placeholder`: seedable placeholder citation counts
//! - `scheduler`: periodic jobs publishing into the snapshot stores

pub mod aggregate;
pub mod collect;
pub mod placeholder;
pub mod scheduler;
pub mod score;

pub use collect::{PaperPipeline, Pipeline, RepoPipeline};
pub use scheduler::PipelineJob;

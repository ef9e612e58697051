//! 作业提交与批改核心
//!
//! - [`evaluator`]：单题自动初评
//! - [`aggregator`]：逐题初评并汇总总分
//! - [`merge`]：教师批注合并
//! - [`pipeline`]：提交 / 批改 / 查看流程

pub mod aggregator;
pub mod evaluator;
pub mod merge;
pub mod pipeline;
pub mod scorer;

pub use aggregator::Aggregator;
pub use evaluator::Evaluator;
pub use pipeline::GradingPipeline;
pub use scorer::Scorer;

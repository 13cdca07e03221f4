//! 图节点：Planner、Worker、Evaluator（Tools 节点由 tools::ToolExecutor 承担）

pub mod evaluator;
pub mod planner;
pub mod worker;

pub use evaluator::{Evaluator, Verdict};
pub use planner::Planner;
pub use worker::Worker;

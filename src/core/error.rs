//! Agent 错误类型
//!
//! 只有 Worker ⇄ Tools、Worker ⇄ Evaluator 两个循环在图内部处理；其余错误原样冒泡给 invoke 的调用方。
//! 工具类错误（ToolExecutionFailed / ToolTimeout / PathEscape）由 ToolExecutor 转成工具结果文本，不会中止本轮。

use thiserror::Error;

/// Agent 运行过程中可能出现的错误
#[derive(Error, Debug)]
pub enum AgentError {
    /// 推理引擎不可达或报错（不在内部重试）
    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Tool execution failed: {0}")]
    ToolExecutionFailed(String),

    #[error("Tool timeout: {0}")]
    ToolTimeout(String),

    #[error("Path escape attempt: {0}")]
    PathEscape(String),

    /// 仅在 strict_verdicts 开启时出现：Evaluator 输出既不是 ok 也不是 retry
    #[error("Ambiguous evaluator verdict: {0:?}")]
    AmbiguousVerdict(String),

    /// 单轮节点执行次数达到上限
    #[error("Recursion limit of {limit} steps reached without hitting a stop condition")]
    RecursionLimitExceeded { limit: usize },

    /// 检查点读写失败；线程保留最后一次成功提交的快照
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    /// resume 时线程没有未完成的轮次
    #[error("No pending turn for thread {0}")]
    NoPendingTurn(String),
}

impl AgentError {
    /// 是否为步数上限导致的中止（调用方需与普通回复区分展示）
    pub fn is_recursion_limit(&self) -> bool {
        matches!(self, AgentError::RecursionLimitExceeded { .. })
    }
}

impl From<rusqlite::Error> for AgentError {
    fn from(e: rusqlite::Error) -> Self {
        AgentError::Persistence(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recursion_limit_is_distinct() {
        let err = AgentError::RecursionLimitExceeded { limit: 100 };
        assert!(err.is_recursion_limit());
        assert!(err.to_string().contains("100"));
        assert!(!AgentError::LlmError("boom".into()).is_recursion_limit());
    }
}

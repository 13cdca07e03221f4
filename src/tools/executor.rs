//! 工具执行器（Tool Dispatcher）
//!
//! 持有 ToolRegistry 与全局超时。dispatch 按请求顺序逐个执行最新 assistant 消息上的工具调用，
//! 每个请求恰好产出一条工具结果消息；未知工具、失败与超时都转成错误文本，不会中止本轮。
//! 每次调用输出结构化审计日志（JSON）。

use std::time::{Duration, Instant};

use tokio::time::timeout;

use crate::core::AgentError;
use crate::llm::ToolSpec;
use crate::memory::{Message, ToolCallRequest};
use crate::tools::ToolRegistry;

/// 工具执行器：对每次调用施加超时，并将结果映射为 AgentError
pub struct ToolExecutor {
    registry: ToolRegistry,
    timeout: Duration,
}

impl ToolExecutor {
    pub fn new(registry: ToolRegistry, timeout_secs: u64) -> Self {
        Self {
            registry,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// 执行指定工具；未知工具或工具返回 Err 转为 ToolExecutionFailed，超时返回 ToolTimeout
    pub async fn execute(&self, tool_name: &str, args: serde_json::Value) -> Result<String, AgentError> {
        let start = Instant::now();
        let args_preview = args_preview(&args);

        let result = match self.registry.get(tool_name) {
            Some(tool) => timeout(self.timeout, tool.execute(args)).await,
            None => {
                tracing::warn!(tool = %tool_name, "unknown tool requested");
                Ok(Err(format!(
                    "unknown tool '{}'. Available tools: {}",
                    tool_name,
                    self.registry.tool_names().join(", ")
                )))
            }
        };

        let (ok, outcome): (bool, &str) = match &result {
            Ok(Ok(_)) => (true, "ok"),
            Ok(Err(_)) => (false, "error"),
            Err(_) => (false, "timeout"),
        };
        let audit = serde_json::json!({
            "event": "tool_audit",
            "tool": tool_name,
            "ok": ok,
            "outcome": outcome,
            "duration_ms": start.elapsed().as_millis() as u64,
            "args_preview": args_preview,
        });
        tracing::info!(audit = %audit.to_string(), "tool");

        match result {
            Ok(Ok(content)) => Ok(content),
            Ok(Err(e)) => Err(AgentError::ToolExecutionFailed(e)),
            Err(_) => Err(AgentError::ToolTimeout(tool_name.to_string())),
        }
    }

    /// 依次执行所有请求，返回与请求顺序一致的工具结果消息
    pub async fn dispatch(&self, requests: &[ToolCallRequest]) -> Vec<Message> {
        let mut results = Vec::with_capacity(requests.len());
        for req in requests {
            let msg = match self.execute(&req.name, req.arguments.clone()).await {
                Ok(content) => Message::tool_result(req, content, true),
                Err(e) => Message::tool_result(req, format!("Error: {}", e), false),
            };
            results.push(msg);
        }
        results
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.registry.specs()
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.registry.tool_names()
    }
}

fn args_preview(args: &serde_json::Value) -> String {
    let s = args.to_string();
    if s.len() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{ResolveNewsUrlTool, Tool};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct Slow;

    #[async_trait]
    impl Tool for Slow {
        fn name(&self) -> &str {
            "slow"
        }
        fn description(&self) -> &str {
            "sleeps"
        }
        async fn execute(&self, _args: Value) -> Result<String, String> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("late".into())
        }
    }

    struct Failing;

    #[async_trait]
    impl Tool for Failing {
        fn name(&self) -> &str {
            "failing"
        }
        fn description(&self) -> &str {
            "always fails"
        }
        async fn execute(&self, _args: Value) -> Result<String, String> {
            Err("PUSHOVER_TOKEN not set".into())
        }
    }

    fn executor() -> ToolExecutor {
        let mut reg = ToolRegistry::new();
        reg.register(ResolveNewsUrlTool);
        reg.register(Failing);
        ToolExecutor::new(reg, 5)
    }

    #[tokio::test]
    async fn test_dispatch_preserves_order_and_pairs_ids() {
        let exec = executor();
        let reqs = vec![
            ToolCallRequest::new("resolve_news_url", json!({"query": "bbc news"})),
            ToolCallRequest::new("failing", json!({})),
        ];
        let msgs = exec.dispatch(&reqs).await;
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].content, "https://www.bbc.com/news");
        assert_eq!(msgs[0].tool_result.as_ref().unwrap().call_id, reqs[0].id);
        assert!(!msgs[1].tool_result.as_ref().unwrap().ok);
        assert!(msgs[1].content.contains("PUSHOVER_TOKEN"));
    }

    #[tokio::test]
    async fn test_unknown_tool_yields_error_text() {
        let exec = executor();
        let reqs = vec![ToolCallRequest::new("teleport", json!({}))];
        let msgs = exec.dispatch(&reqs).await;
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].content.starts_with("Error:"));
        assert!(msgs[0].content.contains("teleport"));
        assert!(msgs[0].content.contains("resolve_news_url"));
    }

    #[tokio::test]
    async fn test_timeout_becomes_error_result() {
        let mut reg = ToolRegistry::new();
        reg.register(Slow);
        let exec = ToolExecutor::new(reg, 1);
        let msgs = exec.dispatch(&[ToolCallRequest::new("slow", json!({}))]).await;
        assert!(msgs[0].content.contains("Tool timeout"));
    }
}

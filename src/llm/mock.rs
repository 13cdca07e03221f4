//! Mock LLM 客户端（无 API Key 时的兜底，便于本地跑通整张图）
//!
//! 回复固定为「Echo from Mock: <最后一条 user 消息>」；不会发出工具调用，
//! 评估提示下的回复也不是 "retry"，因此一轮总能在 Planner → Worker → Evaluator 后结束。

use async_trait::async_trait;

use crate::llm::LlmClient;
use crate::memory::{Message, Role};

/// Mock 客户端：回显用户最后一条消息
#[derive(Debug, Default)]
pub struct MockLlmClient;

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("(no input)");

        Ok(format!("Echo from Mock: {}", last_user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ToolSpec;

    #[tokio::test]
    async fn test_mock_never_requests_tools() {
        let tools = vec![ToolSpec {
            name: "search".into(),
            description: "search".into(),
            parameters: serde_json::json!({}),
        }];
        let reply = MockLlmClient
            .complete_with_tools(&[Message::user("hi")], &tools)
            .await
            .unwrap();
        assert!(reply.tool_calls.is_empty());
        assert_eq!(reply.content, "Echo from Mock: hi");
    }
}

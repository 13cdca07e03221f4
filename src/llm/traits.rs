//! LLM 客户端抽象
//!
//! 所有后端（OpenAI 兼容 / DeepSeek / Mock）实现 LlmClient：
//! complete 为纯文本完成；complete_with_tools 绑定工具集，返回回复文本与工具调用请求。
//! complete_with_tools 的默认实现走 JSON-in-text 协议（见 llm::protocol），后端无需原生 function calling。

use async_trait::async_trait;
use serde_json::Value;

use crate::llm::protocol::{parse_reply, tool_protocol_prompt};
use crate::memory::{Message, Role, ToolCallRequest};

/// 提供给推理引擎的工具描述
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// 一次工具感知调用的结果：回复文本 + 零或多个工具调用请求
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LlmReply {
    pub content: String,
    pub tool_calls: Vec<ToolCallRequest>,
}

impl LlmReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }
}

/// LLM 客户端 trait
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 非流式完成
    async fn complete(&self, messages: &[Message]) -> Result<String, String>;

    /// 绑定工具集的完成：把工具协议拼进 system 消息，再解析输出中的工具调用
    async fn complete_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<LlmReply, String> {
        if tools.is_empty() {
            return self.complete(messages).await.map(LlmReply::text);
        }
        let protocol = tool_protocol_prompt(tools);
        let mut full = Vec::with_capacity(messages.len() + 1);
        match messages.first() {
            Some(first) if first.role == Role::System => {
                full.push(Message::system(format!("{}\n\n{}", first.content, protocol)));
                full.extend_from_slice(&messages[1..]);
            }
            _ => {
                full.push(Message::system(protocol));
                full.extend_from_slice(messages);
            }
        }
        let output = self.complete(&full).await?;
        Ok(parse_reply(&output))
    }

    /// 获取累计 token 使用统计：(prompt_tokens, completion_tokens, total_tokens)
    fn token_usage(&self) -> (u64, u64, u64) {
        (0, 0, 0)
    }
}

//! 工具调用 JSON Schema 生成（schemars）
//!
//! 将「合法 tool call」的 JSON 结构注入 Worker 的 system prompt，减少 LLM 输出格式错误。

use schemars::{schema_for, JsonSchema};
use std::collections::HashMap;

/// 单个工具调用：与 llm::protocol 解析的 `{"tool": "...", "args": {...}}` 一致（仅用于 Schema 生成）
#[allow(dead_code)]
#[derive(JsonSchema)]
struct ToolCallFormat {
    /// 工具名，如 search、web_browse、send_push_notification
    pub tool: String,
    /// 工具参数，依工具不同而不同（query、url、text、path、content 等）
    pub args: HashMap<String, serde_json::Value>,
}

/// 一次回复中的多个工具调用，按顺序执行
#[allow(dead_code)]
#[derive(JsonSchema)]
struct ToolCallsEnvelope {
    pub tool_calls: Vec<ToolCallFormat>,
}

/// 返回工具调用的 JSON Schema 字符串，可拼入 system prompt
pub fn tool_call_schema_json() -> String {
    let schema = schema_for!(ToolCallsEnvelope);
    serde_json::to_string_pretty(&schema).unwrap_or_else(|_| String::new())
}

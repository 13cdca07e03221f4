//! JSON-in-text 工具调用协议
//!
//! 模型需要调用工具时输出 `{"tool_calls": [{"tool": "名称", "args": {...}}]}`（单个调用也可写成 `{"tool": ..., "args": ...}`）；
//! parse_reply 从文本中提取 JSON（```json 代码块或首个 `{` 到最后一个 `}`），无法识别时整段作为普通回复。

use serde_json::Value;

use crate::llm::{LlmReply, ToolSpec};
use crate::memory::ToolCallRequest;
use crate::tools::tool_call_schema_json;

/// 生成拼入 system prompt 的工具说明段落
pub fn tool_protocol_prompt(tools: &[ToolSpec]) -> String {
    let mut out = String::from("## Available tools\n");
    for t in tools {
        out.push_str(&format!(
            "- `{}`: {}\n  parameters: {}\n",
            t.name, t.description, t.parameters
        ));
    }
    out.push_str(
        "\n## Calling tools\n\
         To call tools, reply with ONLY a JSON object of this shape (calls run in order):\n\
         {\"tool_calls\": [{\"tool\": \"<name>\", \"args\": {...}}]}\n\
         When no tool is needed, reply with the final answer as plain text.\n\n\
         JSON schema:\n",
    );
    out.push_str(&tool_call_schema_json());
    out
}

/// 提取 JSON 片段，返回 (JSON 之前的文本, JSON 文本)
fn extract_json(trimmed: &str) -> Option<(&str, &str)> {
    if let Some(start) = trimmed.find("```json") {
        let rest = &trimmed[start + 7..];
        let body = rest.find("```").map(|end| rest[..end].trim()).unwrap_or(rest.trim());
        return Some((&trimmed[..start], body));
    }
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end < start {
        return None;
    }
    Some((&trimmed[..start], &trimmed[start..=end]))
}

fn call_from_value(v: &Value) -> Option<ToolCallRequest> {
    let name = v.get("tool").or_else(|| v.get("name"))?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }
    let args = v
        .get("args")
        .or_else(|| v.get("arguments"))
        .cloned()
        .unwrap_or_else(|| Value::Object(Default::default()));
    Some(ToolCallRequest::new(name, args))
}

/// 解析模型输出：含合法工具调用 JSON 则返回调用列表（JSON 之前的文本作为 content），否则整段为回复
pub fn parse_reply(output: &str) -> LlmReply {
    let trimmed = output.trim();
    let Some((prefix, json_str)) = extract_json(trimmed) else {
        return LlmReply::text(trimmed);
    };
    let Ok(value) = serde_json::from_str::<Value>(json_str) else {
        return LlmReply::text(trimmed);
    };

    let calls: Vec<ToolCallRequest> = match value.get("tool_calls").and_then(|v| v.as_array()) {
        Some(items) => items.iter().filter_map(call_from_value).collect(),
        None => call_from_value(&value).into_iter().collect(),
    };

    if calls.is_empty() {
        LlmReply::text(trimmed)
    } else {
        LlmReply {
            content: prefix.trim().to_string(),
            tool_calls: calls,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_answer() {
        let reply = parse_reply("  It is sunny.  ");
        assert_eq!(reply.content, "It is sunny.");
        assert!(reply.tool_calls.is_empty());
    }

    #[test]
    fn test_single_call() {
        let reply = parse_reply(r#"{"tool": "search", "args": {"query": "paris weather"}}"#);
        assert_eq!(reply.tool_calls.len(), 1);
        assert_eq!(reply.tool_calls[0].name, "search");
        assert_eq!(reply.tool_calls[0].arguments["query"], "paris weather");
    }

    #[test]
    fn test_multiple_calls_keep_order_and_prefix() {
        let out = "Let me check.\n```json\n{\"tool_calls\": [{\"tool\": \"resolve_news_url\", \"args\": {\"query\": \"bbc\"}}, {\"tool\": \"web_browse\", \"args\": {\"url\": \"https://www.bbc.com/news\"}}]}\n```";
        let reply = parse_reply(out);
        assert_eq!(reply.content, "Let me check.");
        let names: Vec<_> = reply.tool_calls.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["resolve_news_url", "web_browse"]);
        assert_ne!(reply.tool_calls[0].id, reply.tool_calls[1].id);
    }

    #[test]
    fn test_json_without_tool_is_answer() {
        let out = r#"The config is {"a": 1}"#;
        let reply = parse_reply(out);
        assert!(reply.tool_calls.is_empty());
        assert_eq!(reply.content, out);
    }

    #[test]
    fn test_broken_json_is_answer() {
        let reply = parse_reply("use {braces like this");
        assert!(reply.tool_calls.is_empty());
    }

    #[test]
    fn test_prompt_lists_tools() {
        let prompt = tool_protocol_prompt(&[ToolSpec {
            name: "search".into(),
            description: "Search the web".into(),
            parameters: serde_json::json!({"type": "object"}),
        }]);
        assert!(prompt.contains("`search`"));
        assert!(prompt.contains("tool_calls"));
    }
}

//! search 工具：通过 Serper（Google 搜索 API）检索网页摘要
//!
//! API Key 在调用时从环境变量 SERPER_API_KEY 读取；缺失时返回错误文本而不是启动失败。
//! 结果优先取 answerBox / knowledgeGraph，其次拼接 organic 条目的 snippet；超过 max_result_chars 截断。

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::tools::Tool;

pub const SERPER_API_KEY_ENV: &str = "SERPER_API_KEY";

/// Search 工具
pub struct SearchTool {
    client: Client,
    endpoint: String,
    max_result_chars: usize,
}

impl SearchTool {
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64, max_result_chars: usize) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: endpoint.into(),
            max_result_chars,
        }
    }

    async fn query(&self, q: &str) -> Result<String, String> {
        let api_key = std::env::var(SERPER_API_KEY_ENV)
            .map_err(|_| format!("{} not set", SERPER_API_KEY_ENV))?;
        let resp = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", api_key)
            .json(&serde_json::json!({ "q": q }))
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;
        if !resp.status().is_success() {
            return Err(format!("HTTP {}", resp.status()));
        }
        let body: Value = resp.json().await.map_err(|e| format!("Read body: {}", e))?;
        let text = summarize_results(&body);
        let len = text.chars().count();
        if len > self.max_result_chars {
            Ok(text.chars().take(self.max_result_chars).collect::<String>() + "\n...[truncated]")
        } else {
            Ok(text)
        }
    }
}

/// 把 Serper 响应压成一段可读文本
pub fn summarize_results(body: &Value) -> String {
    if let Some(answer) = body.get("answerBox") {
        for key in ["answer", "snippet"] {
            if let Some(s) = answer.get(key).and_then(|v| v.as_str()) {
                return s.to_string();
            }
        }
    }
    let mut parts = Vec::new();
    if let Some(desc) = body
        .get("knowledgeGraph")
        .and_then(|kg| kg.get("description"))
        .and_then(|v| v.as_str())
    {
        parts.push(desc.to_string());
    }
    if let Some(items) = body.get("organic").and_then(|v| v.as_array()) {
        parts.extend(
            items
                .iter()
                .filter_map(|item| item.get("snippet").and_then(|v| v.as_str()))
                .map(String::from),
        );
    }
    if parts.is_empty() {
        "No good search result found".to_string()
    } else {
        parts.join(" ")
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "Search the Internet using Serper. Args: {\"query\": \"search terms\"}."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Search terms" }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let query = args
            .get("query")
            .or_else(|| args.get("q"))
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .trim();
        if query.is_empty() {
            return Err("Missing query".to_string());
        }
        tracing::info!(query = %query, "search tool query");
        self.query(query).await
    }
}

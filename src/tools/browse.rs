//! web_browse 工具：GET 抓取页面原始 HTML，超长截断

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::tools::Tool;

pub struct WebBrowseTool {
    client: Client,
    max_result_chars: usize,
}

impl WebBrowseTool {
    pub fn new(timeout_secs: u64, max_result_chars: usize) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .user_agent("Mozilla/5.0 (compatible; tripod/0.1)")
            .build()
            .unwrap_or_default();
        Self {
            client,
            max_result_chars,
        }
    }

    async fn fetch(&self, url: &str) -> Result<String, String> {
        let resp = self.client.get(url).send().await.map_err(|e| e.to_string())?;
        let status = resp.status();
        if !status.is_success() {
            return Err(format!("HTTP {}", status));
        }
        let body = resp.text().await.map_err(|e| e.to_string())?;
        Ok(truncate_chars(&body, self.max_result_chars))
    }
}

/// 按字符截断，超长时追加标记
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        text.chars().take(max).collect::<String>() + "\n...[truncated]"
    } else {
        text.to_string()
    }
}

#[async_trait]
impl Tool for WebBrowseTool {
    fn name(&self) -> &str {
        "web_browse"
    }

    fn description(&self) -> &str {
        "Fetch a web page and return its HTML. Args: {\"url\": \"https://...\"}"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": { "type": "string", "description": "Absolute http(s) URL" }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let url = args.get("url").and_then(|v| v.as_str()).unwrap_or("").trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(format!("Browse error: invalid url '{}'", url));
        }
        tracing::info!(url = %url, "web_browse tool execute");
        self.fetch(url)
            .await
            .map_err(|e| format!("Browse error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("天气晴朗", 2), "天气\n...[truncated]");
    }

    #[tokio::test]
    async fn test_rejects_non_http_url() {
        let tool = WebBrowseTool::new(1, 100);
        let err = tool.execute(json!({"url": "file:///etc/passwd"})).await.unwrap_err();
        assert!(err.starts_with("Browse error"));
    }
}

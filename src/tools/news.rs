//! resolve_news_url：把 BBC / CNN 新闻类查询映射为固定首页 URL

use async_trait::async_trait;
use serde_json::Value;

use crate::tools::Tool;

/// 关键字 → URL，按声明顺序匹配第一个被查询包含的关键字
const NEWS_SITES: &[(&str, &str)] = &[
    ("cnn", "https://edition.cnn.com/world"),
    ("cnn latest", "https://edition.cnn.com/world"),
    ("bbc", "https://www.bbc.com/news"),
    ("bbc latest", "https://www.bbc.com/news"),
    ("bbc news", "https://www.bbc.com/news"),
];

/// 无匹配时的返回值
pub const UNKNOWN_NEWS_URL: &str = "UNKNOWN";

pub fn resolve_news_url(query: &str) -> &'static str {
    let q = query.to_lowercase();
    NEWS_SITES
        .iter()
        .find(|(key, _)| q.contains(key))
        .map(|(_, url)| *url)
        .unwrap_or(UNKNOWN_NEWS_URL)
}

pub struct ResolveNewsUrlTool;

#[async_trait]
impl Tool for ResolveNewsUrlTool {
    fn name(&self) -> &str {
        "resolve_news_url"
    }

    fn description(&self) -> &str {
        "Resolve BBC or CNN news queries into the correct URL. Input: plain text. Output: URL or UNKNOWN."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "e.g. 'latest bbc news'" }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let query = args.get("query").and_then(|v| v.as_str()).unwrap_or("");
        Ok(resolve_news_url(query).to_string())
    }
}

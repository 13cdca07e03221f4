//! send_push_notification 工具：通过 Pushover 推送一条消息
//!
//! 凭据 PUSHOVER_TOKEN / PUSHOVER_USER 在调用时读取；缺失时返回错误文本。

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::tools::Tool;

pub const PUSHOVER_TOKEN_ENV: &str = "PUSHOVER_TOKEN";
pub const PUSHOVER_USER_ENV: &str = "PUSHOVER_USER";

pub struct PushNotificationTool {
    client: Client,
    endpoint: String,
}

impl PushNotificationTool {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

fn credential(name: &str) -> Result<String, String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| format!("{} not set", name))
}

#[async_trait]
impl Tool for PushNotificationTool {
    fn name(&self) -> &str {
        "send_push_notification"
    }

    fn description(&self) -> &str {
        "Send a push notification to the user. Args: {\"text\": \"message\"}"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "text": { "type": "string", "description": "Notification text" }
            },
            "required": ["text"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let text = args
            .get("text")
            .or_else(|| args.get("message"))
            .and_then(|v| v.as_str())
            .unwrap_or("");
        let token = credential(PUSHOVER_TOKEN_ENV)?;
        let user = credential(PUSHOVER_USER_ENV)?;
        let resp = self
            .client
            .post(&self.endpoint)
            .form(&[("token", token.as_str()), ("user", user.as_str()), ("message", text)])
            .send()
            .await
            .map_err(|e| format!("Push failed: {}", e))?;
        if !resp.status().is_success() {
            return Err(format!("Push failed: HTTP {}", resp.status()));
        }
        tracing::info!(chars = text.chars().count(), "push notification sent");
        Ok("Push notification sent.".to_string())
    }
}

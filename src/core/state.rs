//! 线程状态：消息历史 + 控制流草稿字段
//!
//! 每个节点执行后整体写入 StateStore；`next` 记录下一个待执行节点，进程重启后据此续跑。

use serde::{Deserialize, Serialize};

use crate::memory::{Message, Role};
use crate::workflow::Node;

/// 单轮内的草稿字段；每轮开始时清空
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scratch {
    pub plan: Option<String>,
    pub worker_output: Option<String>,
    pub evaluation: Option<String>,
    pub redo: Option<bool>,
}

/// 线程快照
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreadState {
    /// 只追加的消息历史（跨轮保留）
    pub messages: Vec<Message>,
    #[serde(default)]
    pub scratch: Scratch,
    /// 下一个待执行节点；None 表示线程空闲
    #[serde(default)]
    pub next: Option<Node>,
    /// 本轮已执行的节点数
    #[serde(default)]
    pub step: usize,
    /// 最近一次提交时间（RFC 3339）
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl ThreadState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_message(&mut self, msg: Message) {
        self.messages.push(msg);
    }

    /// 开始新一轮：追加用户消息、清空草稿与步数，待执行节点置为 START
    pub fn begin_turn(&mut self, user_input: &str) {
        self.messages.push(Message::user(user_input));
        self.scratch = Scratch::default();
        self.step = 0;
        self.next = Some(Node::Start);
    }

    pub fn is_idle(&self) -> bool {
        self.next.is_none()
    }

    pub fn last_user_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == Role::User)
    }

    pub fn last_assistant_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == Role::Assistant)
    }

    /// 最后一条消息是带工具调用的 assistant 消息（尚无对应结果）
    pub fn pending_tool_calls(&self) -> Option<&Message> {
        self.messages
            .last()
            .filter(|m| m.role == Role::Assistant && m.has_tool_calls())
    }

    /// 为最近一条带工具调用的 assistant 消息中尚无结果的请求补写失败结果，返回补写条数
    pub fn close_unanswered_tool_calls(&mut self, reason: &str) -> usize {
        let Some(idx) = self
            .messages
            .iter()
            .rposition(|m| m.role == Role::Assistant && m.has_tool_calls())
        else {
            return 0;
        };
        let answered: Vec<&str> = self.messages[idx + 1..]
            .iter()
            .filter_map(|m| m.tool_result.as_ref())
            .map(|r| r.call_id.as_str())
            .collect();
        let missing: Vec<Message> = self.messages[idx]
            .tool_calls
            .iter()
            .filter(|req| !answered.contains(&req.id.as_str()))
            .map(|req| Message::tool_result(req, format!("Error: {}", reason), false))
            .collect();
        let n = missing.len();
        self.messages.extend(missing);
        n
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(chrono::Utc::now().to_rfc3339());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::ToolCallRequest;

    #[test]
    fn test_begin_turn_resets_scratch_but_keeps_history() {
        let mut state = ThreadState::new();
        state.push_message(Message::user("first"));
        state.push_message(Message::assistant("answer"));
        state.scratch.plan = Some("old plan".into());
        state.step = 7;

        state.begin_turn("second");

        assert_eq!(state.messages.len(), 3);
        assert_eq!(state.scratch, Scratch::default());
        assert_eq!(state.step, 0);
        assert_eq!(state.next, Some(Node::Start));
        assert_eq!(state.last_user_message().unwrap().content, "second");
    }

    #[test]
    fn test_pending_tool_calls_only_for_trailing_assistant() {
        let mut state = ThreadState::new();
        let req = ToolCallRequest::new("search", serde_json::json!({}));
        state.push_message(Message::assistant_with_tools("", vec![req.clone()]));
        assert!(state.pending_tool_calls().is_some());

        state.push_message(Message::tool_result(&req, "done", true));
        assert!(state.pending_tool_calls().is_none());
    }

    #[test]
    fn test_close_unanswered_tool_calls_fills_only_missing() {
        let mut state = ThreadState::new();
        let a = ToolCallRequest::new("search", serde_json::json!({"query": "a"}));
        let b = ToolCallRequest::new("web_browse", serde_json::json!({"url": "b"}));
        state.push_message(Message::user("q"));
        state.push_message(Message::assistant_with_tools("", vec![a.clone(), b.clone()]));
        state.push_message(Message::tool_result(&a, "done", true));

        assert_eq!(state.close_unanswered_tool_calls("turn abandoned"), 1);
        let last = state.messages.last().unwrap();
        let result = last.tool_result.as_ref().unwrap();
        assert_eq!(result.call_id, b.id);
        assert!(!result.ok);
        assert_eq!(last.content, "Error: turn abandoned");

        assert_eq!(state.close_unanswered_tool_calls("turn abandoned"), 0);
    }
}

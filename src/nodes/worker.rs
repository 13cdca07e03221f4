//! Worker：按计划执行任务，可在回复中请求零或多个工具调用
//!
//! 每次运行都只依据 `scratch.plan` 与完整消息历史重新推导，不保存私有状态。
//! 结果写入 `scratch.worker_output`，并追加一条（可能携带工具调用的）assistant 消息。

use std::sync::Arc;

use crate::core::{AgentError, ThreadState};
use crate::llm::{LlmClient, ToolSpec};
use crate::memory::Message;

pub const WORKER_SYSTEM_PROMPT: &str = "You are a worker that executes tasks.";

pub fn worker_system_prompt(plan: &str) -> String {
    format!("{}\nFollow this plan:\n{}", WORKER_SYSTEM_PROMPT, plan)
}

pub struct Worker {
    llm: Arc<dyn LlmClient>,
    tools: Vec<ToolSpec>,
}

impl Worker {
    pub fn new(llm: Arc<dyn LlmClient>, tools: Vec<ToolSpec>) -> Self {
        Self { llm, tools }
    }

    pub async fn run(&self, state: &mut ThreadState) -> Result<(), AgentError> {
        let plan = state.scratch.plan.clone().unwrap_or_default();
        let mut messages = Vec::with_capacity(state.messages.len() + 1);
        messages.push(Message::system(worker_system_prompt(&plan)));
        messages.extend(state.messages.iter().cloned());

        let reply = self
            .llm
            .complete_with_tools(&messages, &self.tools)
            .await
            .map_err(AgentError::LlmError)?;

        tracing::debug!(
            tool_calls = reply.tool_calls.len(),
            chars = reply.content.chars().count(),
            "worker replied"
        );
        state.scratch.worker_output = Some(reply.content.clone());
        state.push_message(Message::assistant_with_tools(reply.content, reply.tool_calls));
        Ok(())
    }
}

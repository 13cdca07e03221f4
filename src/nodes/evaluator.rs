//! Evaluator：判定 Worker 的回答是否可接受
//!
//! 推理引擎只能回答 `retry` 或 `ok`。归一化为 trim + 小写后与 "retry" 精确比较，
//! 不做子串匹配；其它输出视为 ok 并告警，strict 模式下改为返回 AmbiguousVerdict。

use std::sync::Arc;

use crate::core::{AgentError, ThreadState};
use crate::llm::LlmClient;
use crate::memory::Message;

/// 评估结论
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Ok,
    Retry,
    /// 既不是 ok 也不是 retry
    Ambiguous,
}

impl Verdict {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "retry" => Verdict::Retry,
            "ok" => Verdict::Ok,
            _ => Verdict::Ambiguous,
        }
    }

    pub fn redo(self) -> bool {
        self == Verdict::Retry
    }
}

pub fn evaluator_prompt(question: &str, answer: &str) -> String {
    format!(
        "You are an evaluator.\n\n\
         User asked: {}\n\
         Worker answered: {}\n\n\
         Respond with EXACTLY one word:\n\
         \"retry\"  - if the worker answer is wrong/incomplete\n\
         \"ok\"     - if the worker answer is correct\n\n\
         NO explanations.\n\
         NO punctuation.\n\
         NO extra words.",
        question, answer
    )
}

pub struct Evaluator {
    llm: Arc<dyn LlmClient>,
    strict: bool,
}

impl Evaluator {
    pub fn new(llm: Arc<dyn LlmClient>, strict: bool) -> Self {
        Self { llm, strict }
    }

    pub async fn evaluate(&self, question: &str, answer: &str) -> Result<Verdict, AgentError> {
        let messages = vec![Message::user(evaluator_prompt(question, answer))];
        let raw = self
            .llm
            .complete(&messages)
            .await
            .map_err(AgentError::LlmError)?;
        let verdict = Verdict::parse(&raw);
        if verdict == Verdict::Ambiguous {
            if self.strict {
                return Err(AgentError::AmbiguousVerdict(raw));
            }
            tracing::warn!(raw = %raw, "evaluator output is neither 'ok' nor 'retry', treating as ok");
        }
        Ok(verdict)
    }

    /// 写入 `scratch.redo` 与 `scratch.evaluation`；不改动消息历史
    pub async fn run(&self, state: &mut ThreadState) -> Result<(), AgentError> {
        let question = state
            .last_user_message()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let answer = state.scratch.worker_output.clone().unwrap_or_default();
        let verdict = self.evaluate(&question, &answer).await?;
        state.scratch.redo = Some(verdict.redo());
        state.scratch.evaluation = Some(if verdict.redo() { "retry" } else { "ok" }.to_string());
        tracing::info!(redo = verdict.redo(), "evaluator verdict");
        Ok(())
    }
}

//! Planner：把最近一条用户消息压成一段简短的执行计划
//!
//! 只写 `scratch.plan`，不改动消息历史；推理引擎报错原样上抛，不重试。

use std::sync::Arc;

use crate::core::{AgentError, ThreadState};
use crate::llm::LlmClient;
use crate::memory::Message;

pub fn planner_prompt(request: &str) -> String {
    format!(
        "You are a task planner.\n\n\
         User request: {}\n\n\
         Break the task into a SHORT actionable plan.\n\
         No bullet points. Just a short text.",
        request
    )
}

pub struct Planner {
    llm: Arc<dyn LlmClient>,
}

impl Planner {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// 根据用户请求生成计划文本
    pub async fn plan(&self, request: &str) -> Result<String, AgentError> {
        let messages = vec![Message::user(planner_prompt(request))];
        let plan = self
            .llm
            .complete(&messages)
            .await
            .map_err(AgentError::LlmError)?;
        Ok(plan.trim().to_string())
    }

    pub async fn run(&self, state: &mut ThreadState) -> Result<(), AgentError> {
        let request = state
            .last_user_message()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let plan = self.plan(&request).await?;
        tracing::debug!(plan = %plan, "planner produced plan");
        state.scratch.plan = Some(plan);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;

    #[test]
    fn test_prompt_embeds_request() {
        let p = planner_prompt("weather in Paris");
        assert!(p.contains("User request: weather in Paris"));
        assert!(p.starts_with("You are a task planner."));
    }

    #[test]
    fn test_prompt_keeps_braces_in_request() {
        let p = planner_prompt("print {request} literally");
        assert!(p.contains("User request: print {request} literally"));
    }

    #[tokio::test]
    async fn test_run_sets_plan_only() {
        let planner = Planner::new(Arc::new(MockLlmClient));
        let mut state = ThreadState::new();
        state.begin_turn("hello");
        planner.run(&mut state).await.unwrap();
        assert_eq!(state.messages.len(), 1);
        assert!(state.scratch.plan.as_deref().unwrap().starts_with("Echo from Mock"));
    }
}

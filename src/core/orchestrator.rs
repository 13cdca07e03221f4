//! 编排器：驱动 START → PLANNER → WORKER ⇄ TOOLS → EVALUATOR → (WORKER | END) 状态机
//!
//! 每执行完一个节点就把整个线程快照写入 StateStore，然后再计算下一条边；
//! 进程中途退出后，新的编排器可以用 resume 从快照里记录的待执行节点继续。
//! 单轮执行的节点数受 step_limit 约束，这是唯一的熔断手段。

use std::sync::Arc;

use tracing::Instrument;

use crate::core::{AgentError, ThreadState};
use crate::llm::LlmClient;
use crate::memory::StateStore;
use crate::nodes::{Evaluator, Planner, Worker};
use crate::tools::ToolExecutor;
use crate::workflow::{route, Node};

/// 图运行参数
#[derive(Debug, Clone, Copy)]
pub struct GraphOptions {
    /// 单轮最多执行的节点数
    pub step_limit: usize,
    pub strict_verdicts: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            step_limit: 100,
            strict_verdicts: false,
        }
    }
}

/// 节点共享的外部能力：推理引擎与工具执行器
pub struct AgentContext {
    pub llm: Arc<dyn LlmClient>,
    pub executor: ToolExecutor,
}

pub struct Orchestrator {
    llm: Arc<dyn LlmClient>,
    planner: Planner,
    worker: Worker,
    evaluator: Evaluator,
    executor: ToolExecutor,
    store: Arc<dyn StateStore>,
    options: GraphOptions,
}

impl Orchestrator {
    pub fn new(ctx: AgentContext, store: Arc<dyn StateStore>, options: GraphOptions) -> Self {
        let AgentContext { llm, executor } = ctx;
        Self {
            llm: llm.clone(),
            planner: Planner::new(llm.clone()),
            worker: Worker::new(llm.clone(), executor.specs()),
            evaluator: Evaluator::new(llm, options.strict_verdicts),
            executor,
            store,
            options,
        }
    }

    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    /// 开始新一轮：追加用户消息，跑到 END，返回最终 assistant 文本
    ///
    /// 若线程还有未完成的轮次，该轮被放弃（历史保留），其中尚无结果的工具请求补写失败结果，再从新消息重新开始。
    pub async fn invoke(&self, thread_id: &str, user_message: &str) -> Result<String, AgentError> {
        let mut state = self.store.get(thread_id).await?;
        if let Some(pending) = state.next {
            let closed = state.close_unanswered_tool_calls("turn abandoned before the tool ran");
            tracing::warn!(
                thread = %thread_id,
                pending = %pending,
                closed_tool_calls = closed,
                "abandoning unfinished turn"
            );
        }
        state.begin_turn(user_message);
        self.commit(thread_id, &mut state).await?;
        tracing::info!(thread = %thread_id, "turn started");
        self.drive(thread_id, state).await
    }

    /// 从最后一次提交的快照继续未完成的轮次
    pub async fn resume(&self, thread_id: &str) -> Result<String, AgentError> {
        let state = self.store.get(thread_id).await?;
        match state.next {
            None => Err(AgentError::NoPendingTurn(thread_id.to_string())),
            Some(node) => {
                tracing::info!(thread = %thread_id, node = %node, step = state.step, "resuming turn");
                self.drive(thread_id, state).await
            }
        }
    }

    async fn drive(&self, thread_id: &str, mut state: ThreadState) -> Result<String, AgentError> {
        loop {
            let node = match state.next {
                Some(node) => node,
                None => break,
            };

            if !node.is_executable() {
                match node {
                    Node::End => {
                        state.next = None;
                        self.commit(thread_id, &mut state).await?;
                        break;
                    }
                    _ => {
                        state.next = Some(route(node, &state));
                        continue;
                    }
                }
            }

            if state.step >= self.options.step_limit {
                let limit = self.options.step_limit;
                tracing::error!(thread = %thread_id, limit, node = %node, "step limit reached");
                state.next = None;
                if let Err(e) = self.commit(thread_id, &mut state).await {
                    tracing::warn!(thread = %thread_id, error = %e, "failed to persist aborted turn");
                }
                return Err(AgentError::RecursionLimitExceeded { limit });
            }

            let span = tracing::info_span!("node", thread = %thread_id, node = %node, step = state.step);
            self.execute(node, &mut state).instrument(span).await?;
            state.step += 1;
            let next = route(node, &state);
            tracing::debug!(from = %node, to = %next, "transition");
            state.next = Some(next);
            self.commit(thread_id, &mut state).await?;
        }

        let answer = state
            .last_assistant_message()
            .map(|m| m.content.clone())
            .or_else(|| state.scratch.worker_output.clone())
            .unwrap_or_default();
        let (prompt_tokens, completion_tokens, total_tokens) = self.llm.token_usage();
        tracing::info!(
            thread = %thread_id,
            steps = state.step,
            prompt_tokens,
            completion_tokens,
            total_tokens,
            "turn finished"
        );
        Ok(answer)
    }

    async fn execute(&self, node: Node, state: &mut ThreadState) -> Result<(), AgentError> {
        match node {
            Node::Planner => self.planner.run(state).await,
            Node::Worker => self.worker.run(state).await,
            Node::Evaluator => self.evaluator.run(state).await,
            Node::Tools => {
                let requests = state
                    .pending_tool_calls()
                    .map(|m| m.tool_calls.clone())
                    .unwrap_or_default();
                let results = self.executor.dispatch(&requests).await;
                for msg in results {
                    state.push_message(msg);
                }
                Ok(())
            }
            Node::Start | Node::End => Ok(()),
        }
    }

    async fn commit(&self, thread_id: &str, state: &mut ThreadState) -> Result<(), AgentError> {
        state.touch();
        self.store.put(thread_id, state).await
    }
}

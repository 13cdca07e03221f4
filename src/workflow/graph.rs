//! 状态机转移表
//!
//! 所有条件边集中在 TRANSITIONS 中，由 route 统一求值；同一 from 节点按表中顺序取第一条满足条件的边。

use crate::core::ThreadState;
use crate::workflow::types::*;

/// 完整的转移表
pub const TRANSITIONS: &[Transition] = &[
    Transition::new(Node::Start, Condition::Always, Node::Planner),
    Transition::new(Node::Planner, Condition::Always, Node::Worker),
    Transition::new(Node::Worker, Condition::PendingToolCalls, Node::Tools),
    Transition::new(Node::Worker, Condition::NoToolCalls, Node::Evaluator),
    // 工具结果永远回到 Worker，不直接进入评估
    Transition::new(Node::Tools, Condition::Always, Node::Worker),
    Transition::new(Node::Evaluator, Condition::Redo, Node::Worker),
    Transition::new(Node::Evaluator, Condition::Accepted, Node::End),
];

/// 条件在当前状态下是否成立
pub fn holds(condition: Condition, state: &ThreadState) -> bool {
    match condition {
        Condition::Always => true,
        Condition::PendingToolCalls => state.pending_tool_calls().is_some(),
        Condition::NoToolCalls => state.pending_tool_calls().is_none(),
        Condition::Redo => state.scratch.redo == Some(true),
        Condition::Accepted => state.scratch.redo != Some(true),
    }
}

/// 根据转移表计算 from 之后的节点；END 之后仍为 END
pub fn route(from: Node, state: &ThreadState) -> Node {
    TRANSITIONS
        .iter()
        .filter(|t| t.from == from)
        .find(|t| holds(t.when, state))
        .map(|t| t.to)
        .unwrap_or(Node::End)
}

/// 某节点的所有出边（用于检查与展示）
pub fn outgoing(from: Node) -> Vec<Transition> {
    TRANSITIONS.iter().filter(|t| t.from == from).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{Message, ToolCallRequest};

    #[test]
    fn test_unconditional_edges() {
        let state = ThreadState::new();
        assert_eq!(route(Node::Start, &state), Node::Planner);
        assert_eq!(route(Node::Planner, &state), Node::Worker);
        assert_eq!(route(Node::Tools, &state), Node::Worker);
    }

    #[test]
    fn test_worker_routes_to_tools_when_calls_pending() {
        let mut state = ThreadState::new();
        state.push_message(Message::assistant_with_tools(
            "",
            vec![ToolCallRequest::new("search", serde_json::json!({"query": "x"}))],
        ));
        assert_eq!(route(Node::Worker, &state), Node::Tools);
    }

    #[test]
    fn test_worker_routes_to_evaluator_without_calls() {
        let mut state = ThreadState::new();
        state.push_message(Message::assistant("done"));
        assert_eq!(route(Node::Worker, &state), Node::Evaluator);
    }

    #[test]
    fn test_evaluator_branch() {
        let mut state = ThreadState::new();
        state.scratch.redo = Some(true);
        assert_eq!(route(Node::Evaluator, &state), Node::Worker);

        state.scratch.redo = Some(false);
        assert_eq!(route(Node::Evaluator, &state), Node::End);

        state.scratch.redo = None;
        assert_eq!(route(Node::Evaluator, &state), Node::End);
    }

    #[test]
    fn test_every_executable_node_has_an_exit() {
        for node in [Node::Start, Node::Planner, Node::Worker, Node::Tools, Node::Evaluator] {
            assert!(!outgoing(node).is_empty(), "{node} has no outgoing edge");
        }
        assert!(outgoing(Node::End).is_empty());
    }

    #[test]
    fn test_tools_never_reach_evaluator_directly() {
        assert!(outgoing(Node::Tools).iter().all(|t| t.to == Node::Worker));
    }
}

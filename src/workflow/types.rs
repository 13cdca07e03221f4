//! 状态机类型定义
//!
//! 节点、边条件与转移表项

use serde::{Deserialize, Serialize};

/// 状态机节点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Start,
    Planner,
    Worker,
    Tools,
    Evaluator,
    End,
}

impl Node {
    pub fn as_str(&self) -> &'static str {
        match self {
            Node::Start => "start",
            Node::Planner => "planner",
            Node::Worker => "worker",
            Node::Tools => "tools",
            Node::Evaluator => "evaluator",
            Node::End => "end",
        }
    }

    /// START / END 只是边界，不会被执行
    pub fn is_executable(&self) -> bool {
        !matches!(self, Node::Start | Node::End)
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 边条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// 无条件
    Always,
    /// 最新 assistant 消息带有待执行的工具调用
    PendingToolCalls,
    /// 最新 assistant 消息没有工具调用
    NoToolCalls,
    /// Evaluator 设置了 redo
    Redo,
    /// Evaluator 接受了结果
    Accepted,
}

/// 转移表中的一条边
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Node,
    pub when: Condition,
    pub to: Node,
}

impl Transition {
    pub const fn new(from: Node, when: Condition, to: Node) -> Self {
        Self { from, when, to }
    }
}

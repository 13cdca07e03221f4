//! Tripod - Planner / Worker / Evaluator 任务智能体
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型、线程状态、编排器与构建器
//! - **llm**: LLM 客户端抽象、JSON-in-text 工具协议与实现（OpenAI 兼容 / DeepSeek / Mock）
//! - **memory**: 消息模型与线程快照持久化（内存 / SQLite 检查点日志）
//! - **nodes**: 图节点 Planner、Worker、Evaluator
//! - **observability**: tracing 初始化
//! - **tools**: 工具（search、web_browse、send_push_notification、resolve_news_url、write_file）与执行器
//! - **workflow**: 节点、条件边与转移表

pub mod config;
pub mod core;
pub mod llm;
pub mod memory;
pub mod nodes;
pub mod observability;
pub mod tools;
pub mod workflow;

pub use crate::core::{AgentBuilder, AgentError, Orchestrator};

//! 核心层：错误类型、线程状态、编排器与构建器

pub mod builder;
pub mod error;
pub mod orchestrator;
pub mod state;

pub use builder::{create_llm_from_config, AgentBuilder};
pub use error::AgentError;
pub use orchestrator::{AgentContext, GraphOptions, Orchestrator};
pub use state::{Scratch, ThreadState};

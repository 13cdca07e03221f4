//! LLM 层：客户端抽象、工具调用协议与实现（OpenAI 兼容 / DeepSeek / Mock）

pub mod mock;
pub mod openai;
pub mod protocol;
pub mod traits;

pub use mock::MockLlmClient;
pub use openai::OpenAiClient;
pub use protocol::{parse_reply, tool_protocol_prompt};
pub use traits::{LlmClient, LlmReply, ToolSpec};

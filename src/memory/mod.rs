//! 记忆层：对话消息模型与线程状态持久化（内存 / SQLite）

pub mod conversation;
pub mod persistence;
pub mod sqlite_store;

pub use conversation::{Message, Role, ToolCallRequest, ToolCallResult};
pub use persistence::{MemoryStateStore, StateStore};
pub use sqlite_store::SqliteStateStore;

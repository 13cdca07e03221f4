//! 线程状态存储抽象层
//!
//! get 对不存在的线程返回空的初始状态；put 对单个写入者是原子的。
//! 同一线程的并发写入由调用方串行化，存储本身不做仲裁。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::core::{AgentError, ThreadState};

/// 状态存储接口
#[async_trait]
pub trait StateStore: Send + Sync {
    /// 读取线程最近一次提交的快照；线程不存在时返回 ThreadState::default()
    async fn get(&self, thread_id: &str) -> Result<ThreadState, AgentError>;

    /// 提交线程快照；失败时之前提交的快照保持不变
    async fn put(&self, thread_id: &str, state: &ThreadState) -> Result<(), AgentError>;
}

/// 内存状态存储（测试与临时会话用，进程退出即丢失）
#[derive(Default)]
pub struct MemoryStateStore {
    threads: RwLock<HashMap<String, ThreadState>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn thread_count(&self) -> usize {
        self.threads.read().await.len()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, thread_id: &str) -> Result<ThreadState, AgentError> {
        Ok(self
            .threads
            .read()
            .await
            .get(thread_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn put(&self, thread_id: &str, state: &ThreadState) -> Result<(), AgentError> {
        self.threads
            .write()
            .await
            .insert(thread_id.to_string(), state.clone());
        Ok(())
    }
}

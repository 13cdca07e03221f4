//! SQLite 检查点存储
//!
//! 单文件数据库，checkpoints 表只追加：每次 put 插入一行完整快照（JSON），get 取该线程 id 最大的一行。
//! 单条 INSERT 即一次提交，写失败不会影响之前已提交的快照。
//! rusqlite 为同步 API，调用放在 spawn_blocking 中执行。

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use crate::core::{AgentError, ThreadState};
use crate::memory::StateStore;

/// SQLite 状态存储
#[derive(Clone)]
pub struct SqliteStateStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStateStore {
    /// 打开（或创建）数据库文件并初始化表
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, AgentError> {
        if let Some(parent) = db_path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| AgentError::Persistence(format!("create db dir: {}", e)))?;
            }
        }
        let conn = Connection::open(db_path.as_ref())?;
        Self::from_connection(conn)
    }

    /// 内存数据库（测试用）
    pub fn in_memory() -> Result<Self, AgentError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, AgentError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS checkpoints (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                thread_id TEXT NOT NULL,
                step INTEGER NOT NULL,
                next_node TEXT,
                state TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_checkpoints_thread ON checkpoints(thread_id, id);",
        )?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 在阻塞线程池中持锁执行一次数据库操作
    async fn with_conn<T, F>(&self, f: F) -> Result<T, AgentError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, AgentError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| AgentError::Persistence("sqlite connection lock poisoned".to_string()))?;
            f(&guard)
        })
        .await
        .map_err(|e| AgentError::Persistence(format!("blocking task failed: {}", e)))?
    }

    /// 某线程已写入的检查点数量
    pub async fn checkpoint_count(&self, thread_id: &str) -> Result<usize, AgentError> {
        let thread_id = thread_id.to_string();
        self.with_conn(move |conn| {
            let n: i64 = conn.query_row(
                "SELECT COUNT(*) FROM checkpoints WHERE thread_id = ?1",
                params![thread_id],
                |row| row.get(0),
            )?;
            Ok(n as usize)
        })
        .await
    }
}

#[async_trait]
impl StateStore for SqliteStateStore {
    async fn get(&self, thread_id: &str) -> Result<ThreadState, AgentError> {
        let thread_id = thread_id.to_string();
        let raw: Option<String> = self
            .with_conn(move |conn| {
                Ok(conn
                    .query_row(
                        "SELECT state FROM checkpoints WHERE thread_id = ?1 ORDER BY id DESC LIMIT 1",
                        params![thread_id],
                        |row| row.get(0),
                    )
                    .optional()?)
            })
            .await?;

        match raw {
            Some(json) => serde_json::from_str(&json)
                .map_err(|e| AgentError::Persistence(format!("corrupt checkpoint: {}", e))),
            None => Ok(ThreadState::default()),
        }
    }

    async fn put(&self, thread_id: &str, state: &ThreadState) -> Result<(), AgentError> {
        let json = serde_json::to_string(state)
            .map_err(|e| AgentError::Persistence(format!("serialize checkpoint: {}", e)))?;
        let thread_id = thread_id.to_string();
        let step = state.step as i64;
        let next_node = state.next.map(|n| n.as_str().to_string());
        let now = chrono::Utc::now().to_rfc3339();

        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO checkpoints (thread_id, step, next_node, state, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![thread_id, step, next_node, json, now],
            )?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Message;
    use crate::workflow::Node;

    #[tokio::test]
    async fn test_newest_checkpoint_wins() {
        let store = SqliteStateStore::in_memory().unwrap();
        let mut state = ThreadState::new();
        state.begin_turn("hi");
        store.put("t", &state).await.unwrap();

        state.push_message(Message::assistant("hello"));
        state.next = None;
        store.put("t", &state).await.unwrap();

        let loaded = store.get("t").await.unwrap();
        assert_eq!(loaded.messages.len(), 2);
        assert!(loaded.is_idle());
        assert_eq!(store.checkpoint_count("t").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_threads_are_isolated() {
        let store = SqliteStateStore::in_memory().unwrap();
        let mut a = ThreadState::new();
        a.begin_turn("for a");
        store.put("a", &a).await.unwrap();

        assert!(store.get("b").await.unwrap().messages.is_empty());
        assert_eq!(store.get("a").await.unwrap().next, Some(Node::Start));
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.db");
        {
            let store = SqliteStateStore::open(&path).unwrap();
            let mut state = ThreadState::new();
            state.begin_turn("persist me");
            store.put("t", &state).await.unwrap();
        }
        let reopened = SqliteStateStore::open(&path).unwrap();
        let state = reopened.get("t").await.unwrap();
        assert_eq!(state.messages[0].content, "persist me");
    }
}

//! write_file 工具：在工作区沙箱内写文件
//!
//! 路径必须是相对路径且不含 `..`；父目录不存在时自动创建。
//! 写入前再校验一次规范化后的父目录仍在根目录之下（防符号链接逃逸）。

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use crate::core::AgentError;
use crate::tools::Tool;

/// 工作区沙箱：只允许在 root_dir 之下写入
#[derive(Debug, Clone)]
pub struct Workspace {
    root_dir: PathBuf,
}

impl Workspace {
    pub fn new(root_dir: impl AsRef<Path>) -> Self {
        let root = root_dir.as_ref().to_path_buf();
        let root_dir = root.canonicalize().unwrap_or(root);
        Self { root_dir }
    }

    /// 把相对路径解析到根目录下；绝对路径与 `..` 一律拒绝
    pub fn resolve(&self, path: &str) -> Result<PathBuf, AgentError> {
        let rel = Path::new(path.trim());
        if rel.as_os_str().is_empty() {
            return Err(AgentError::ToolExecutionFailed("Missing path".to_string()));
        }
        for component in rel.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => return Err(AgentError::PathEscape(path.to_string())),
            }
        }
        Ok(self.root_dir.join(rel))
    }

    fn root_canon(&self) -> PathBuf {
        self.root_dir
            .canonicalize()
            .unwrap_or_else(|_| self.root_dir.clone())
    }

    /// 规范化路径上最深的已存在祖先，并确认它仍在根目录之下
    fn check_existing_ancestor(&self, path: &Path, raw: &str) -> Result<(), AgentError> {
        let root_canon = self.root_canon();
        let ancestor = path
            .ancestors()
            .find(|p| p.exists())
            .unwrap_or(self.root_dir.as_path());
        let canon = ancestor
            .canonicalize()
            .map_err(|e| AgentError::ToolExecutionFailed(e.to_string()))?;
        if canon.starts_with(&root_canon) {
            Ok(())
        } else {
            Err(AgentError::PathEscape(raw.to_string()))
        }
    }

    pub fn write_file(&self, path: &str, content: &str) -> Result<PathBuf, AgentError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            // 先校验再建目录，符号链接指向根外时不留下任何目录
            self.check_existing_ancestor(parent, path)?;
            std::fs::create_dir_all(parent).map_err(|e| {
                AgentError::ToolExecutionFailed(format!("Create dir failed: {}", e))
            })?;
        }
        if target.is_symlink() {
            self.check_existing_ancestor(&target, path)?;
        }
        std::fs::write(&target, content)
            .map_err(|e| AgentError::ToolExecutionFailed(format!("Write failed: {}", e)))?;
        Ok(target)
    }
}

/// WriteFile 工具
pub struct WriteFileTool {
    workspace: Workspace,
}

impl WriteFileTool {
    pub fn new(root_dir: impl AsRef<Path>) -> Self {
        Self {
            workspace: Workspace::new(root_dir),
        }
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write text to a file inside the workspace. Args: {\"path\": \"relative path\", \"content\": \"text\"}"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": { "type": "string", "description": "Path relative to the workspace" },
                "content": { "type": "string" }
            },
            "required": ["path", "content"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let path = args.get("path").and_then(|v| v.as_str()).unwrap_or("");
        let content = args.get("content").and_then(|v| v.as_str()).unwrap_or("");
        tracing::info!(path = %path, bytes = content.len(), "write_file tool execute");
        self.workspace
            .write_file(path, content)
            .map(|_| format!("Wrote {} bytes to {}", content.len(), path))
            .map_err(|e| e.to_string())
    }
}

//! Agent 构建器：根据 AppConfig 组装 LLM、工具注册表、状态存储与编排器
//!
//! REPL 与单次 --prompt 模式共用这一套初始化逻辑。

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::{AgentContext, AgentError, GraphOptions, Orchestrator};
use crate::llm::{LlmClient, MockLlmClient, OpenAiClient};
use crate::memory::{SqliteStateStore, StateStore};
use crate::tools::{
    PushNotificationTool, ResolveNewsUrlTool, SearchTool, ToolExecutor, ToolRegistry,
    WebBrowseTool, WriteFileTool,
};

pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";

/// 根据配置与环境变量选择 LLM 后端（DeepSeek / OpenAI 兼容 / Mock）
///
/// provider 为 deepseek 且存在 DEEPSEEK_API_KEY 时走 DeepSeek；存在 OPENAI_API_KEY 时走 OpenAI 兼容端点；
/// 两者都没有则回落到 Mock。
pub fn create_llm_from_config(cfg: &AppConfig) -> Arc<dyn LlmClient> {
    let provider = cfg.llm.provider.to_lowercase();
    let deepseek_key = std::env::var("DEEPSEEK_API_KEY").ok();
    let openai_key = std::env::var("OPENAI_API_KEY").ok();

    match (provider.as_str(), deepseek_key, openai_key) {
        ("mock", _, _) => {
            tracing::info!("Using Mock LLM");
            Arc::new(MockLlmClient)
        }
        ("deepseek", Some(key), _) | (_, Some(key), None) => {
            let model = cfg
                .llm
                .deepseek
                .model
                .clone()
                .or_else(|| cfg.llm.model.clone())
                .unwrap_or_else(|| "deepseek-chat".to_string());
            let base = cfg.llm.base_url.as_deref().unwrap_or(DEEPSEEK_BASE_URL);
            tracing::info!("Using DeepSeek LLM ({})", model);
            Arc::new(OpenAiClient::new(Some(base), &model, Some(&key)))
        }
        (_, _, Some(key)) => {
            let model = cfg
                .llm
                .openai
                .model
                .clone()
                .or_else(|| cfg.llm.model.clone())
                .unwrap_or_else(|| "gpt-4o-mini".to_string());
            tracing::info!("Using OpenAI LLM ({})", model);
            Arc::new(OpenAiClient::new(cfg.llm.base_url.as_deref(), &model, Some(&key)))
        }
        _ => {
            tracing::warn!("No API key set, using Mock LLM");
            Arc::new(MockLlmClient)
        }
    }
}

/// Agent 构建器
pub struct AgentBuilder {
    config: AppConfig,
    workspace: PathBuf,
    llm: Option<Arc<dyn LlmClient>>,
    store: Option<Arc<dyn StateStore>>,
}

impl AgentBuilder {
    pub fn new(config: AppConfig) -> Self {
        let workspace = config
            .app
            .workspace_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("workspace"));
        Self {
            config,
            workspace,
            llm: None,
            store: None,
        }
    }

    /// 指定 LLM 客户端（测试或嵌入时使用），否则按配置创建
    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// 指定状态存储，否则打开 app.db_path 处的 SQLite 文件
    pub fn with_store(mut self, store: Arc<dyn StateStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_workspace(mut self, workspace: impl Into<PathBuf>) -> Self {
        self.workspace = workspace.into();
        self
    }

    /// 按配置注册工具；write_file 仅在 tools.enable_write_file 开启时注册
    pub fn build_tool_registry(&self) -> ToolRegistry {
        let tools_cfg = &self.config.tools;
        let mut tools = ToolRegistry::new();
        tools.register(SearchTool::new(
            tools_cfg.search.endpoint.clone(),
            tools_cfg.search.timeout_secs,
            tools_cfg.search.max_result_chars,
        ));
        tools.register(PushNotificationTool::new(tools_cfg.push.endpoint.clone()));
        tools.register(WebBrowseTool::new(
            tools_cfg.browse.timeout_secs,
            tools_cfg.browse.max_result_chars,
        ));
        tools.register(ResolveNewsUrlTool);
        if tools_cfg.enable_write_file {
            if let Err(e) = std::fs::create_dir_all(&self.workspace) {
                tracing::warn!(error = %e, "failed to create workspace directory");
            }
            tools.register(WriteFileTool::new(&self.workspace));
        }
        tools
    }

    pub fn graph_options(&self) -> GraphOptions {
        GraphOptions {
            step_limit: self.config.graph.step_limit,
            strict_verdicts: self.config.graph.strict_verdicts,
        }
    }

    pub fn build(self) -> Result<Orchestrator, AgentError> {
        let llm = match &self.llm {
            Some(llm) => llm.clone(),
            None => create_llm_from_config(&self.config),
        };
        let store: Arc<dyn StateStore> = match &self.store {
            Some(store) => store.clone(),
            None => Arc::new(SqliteStateStore::open(&self.config.app.db_path)?),
        };
        let executor = ToolExecutor::new(self.build_tool_registry(), self.config.tools.tool_timeout_secs);
        tracing::info!(tools = ?executor.tool_names(), "tools registered");
        Ok(Orchestrator::new(
            AgentContext { llm, executor },
            store,
            self.graph_options(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_file_is_opt_in() {
        let builder = AgentBuilder::new(AppConfig::default());
        let names = builder.build_tool_registry().tool_names();
        assert_eq!(
            names,
            vec!["search", "send_push_notification", "web_browse", "resolve_news_url"]
        );

        let dir = tempfile::tempdir().unwrap();
        let mut cfg = AppConfig::default();
        cfg.tools.enable_write_file = true;
        let builder = AgentBuilder::new(cfg).with_workspace(dir.path());
        assert!(builder
            .build_tool_registry()
            .tool_names()
            .contains(&"write_file".to_string()));
    }

    #[test]
    fn test_graph_options_follow_config() {
        let mut cfg = AppConfig::default();
        cfg.graph.step_limit = 7;
        cfg.graph.strict_verdicts = true;
        let opts = AgentBuilder::new(cfg).graph_options();
        assert_eq!(opts.step_limit, 7);
        assert!(opts.strict_verdicts);
    }
}

//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `TRIPOD__*` 覆盖（双下划线表示嵌套，如 `TRIPOD__GRAPH__STEP_LIMIT=50`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub graph: GraphSection,
    pub tools: ToolsSection,
}

/// [app] 段：应用名、工作目录、检查点库与默认线程
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub name: Option<String>,
    /// write_file 的沙箱根目录，未设置时用 ./workspace
    pub workspace_root: Option<PathBuf>,
    pub db_path: PathBuf,
    pub thread_id: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: None,
            workspace_root: None,
            db_path: PathBuf::from("tripod.db"),
            thread_id: "default-thread".to_string(),
        }
    }
}

/// [llm] 段：后端选择
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// 后端：deepseek / openai / mock；实际选择还取决于对应的 API Key 是否存在
    pub provider: String,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub deepseek: LlmModelSection,
    pub openai: LlmModelSection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: None,
            base_url: None,
            deepseek: LlmModelSection::default(),
            openai: LlmModelSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LlmModelSection {
    pub model: Option<String>,
}

/// [graph] 段：单轮步数上限与评估严格模式
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GraphSection {
    pub step_limit: usize,
    /// 开启后，Evaluator 输出既非 ok 也非 retry 时中止本轮
    pub strict_verdicts: bool,
}

impl Default for GraphSection {
    fn default() -> Self {
        Self {
            step_limit: 100,
            strict_verdicts: false,
        }
    }
}

/// [tools] 段
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsSection {
    /// 单次工具调用超时（秒）
    pub tool_timeout_secs: u64,
    pub enable_write_file: bool,
    pub search: SearchSection,
    pub browse: BrowseSection,
    pub push: PushSection,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            tool_timeout_secs: 30,
            enable_write_file: false,
            search: SearchSection::default(),
            browse: BrowseSection::default(),
            push: PushSection::default(),
        }
    }
}

/// [tools.search] 段：Serper 端点、超时、结果截断长度
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    pub endpoint: String,
    pub timeout_secs: u64,
    pub max_result_chars: usize,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            endpoint: "https://google.serper.dev/search".to_string(),
            timeout_secs: 15,
            max_result_chars: 8000,
        }
    }
}

/// [tools.browse] 段
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowseSection {
    pub timeout_secs: u64,
    pub max_result_chars: usize,
}

impl Default for BrowseSection {
    fn default() -> Self {
        Self {
            timeout_secs: 20,
            max_result_chars: 20000,
        }
    }
}

/// [tools.push] 段
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PushSection {
    pub endpoint: String,
}

impl Default for PushSection {
    fn default() -> Self {
        Self {
            endpoint: "https://api.pushover.net/1/messages.json".to_string(),
        }
    }
}

/// 加载配置，环境变量 TRIPOD__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml，找到则作为第一源
/// 2. 若传入 config_path，则追加该文件（可覆盖前面的键；文件不存在视为错误）
/// 3. 最后叠加环境变量 TRIPOD__*
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    for name in ["config/default", "../config/default"] {
        if std::path::Path::new(&format!("{}.toml", name)).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(path) = config_path {
        builder = builder.add_source(config::File::from(path).required(true));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("TRIPOD")
            .separator("__")
            .try_parsing(true),
    );

    builder.build()?.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.graph.step_limit, 100);
        assert!(!cfg.graph.strict_verdicts);
        assert!(!cfg.tools.enable_write_file);
        assert_eq!(cfg.tools.browse.timeout_secs, 20);
        assert_eq!(cfg.app.thread_id, "default-thread");
    }

    #[test]
    fn test_file_overrides_partial_sections() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[graph]\nstep_limit = 12\n\n[tools]\nenable_write_file = true").unwrap();
        let cfg = load_config(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(cfg.graph.step_limit, 12);
        assert!(cfg.tools.enable_write_file);
        assert_eq!(cfg.tools.tool_timeout_secs, 30);
        assert_eq!(cfg.tools.search.max_result_chars, 8000);
    }
}

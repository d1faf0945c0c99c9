//! 应用配置管理
//!
//! 启动时加载一次：可选的 JSON 配置文件，再叠加环境变量。加载完成后配置不可变，
//! 通过 `AppState` 注入各个处理器。

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::AppError;

/// `.env` 模板中的占位密钥，等同于未配置
pub const PLACEHOLDER_API_KEY: &str = "your_openai_api_key_here";

/// 获取默认配置文件路径（可执行文件同级目录）
fn default_config_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("config.json")
}

/// 运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayMode {
    /// 返回固定的测试数据，不调用外部服务
    Mock,
    /// 调用真实的补全服务
    Production,
}

impl RelayMode {
    /// 根据密钥判断运行模式
    pub fn from_api_key(api_key: &str) -> Self {
        let key = api_key.trim();
        if key.is_empty() || key == PLACEHOLDER_API_KEY {
            RelayMode::Mock
        } else {
            RelayMode::Production
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelayMode::Mock => "mock",
            RelayMode::Production => "production",
        }
    }
}

impl fmt::Display for RelayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 模型回复缺少字段时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyPolicy {
    /// 缺失字段填充默认值（空字符串 / 空列表 / false）
    #[default]
    Lenient,
    /// 缺失字段视为错误
    Strict,
}

impl FromStr for ReplyPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(ReplyPolicy::Lenient),
            "strict" => Ok(ReplyPolicy::Strict),
            other => Err(AppError::Config(format!(
                "Unknown reply policy '{}', expected 'lenient' or 'strict'",
                other
            ))),
        }
    }
}

/// 应用配置结构体
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// LLM API 密钥
    #[serde(default)]
    pub api_key: String,

    /// LLM API 基础 URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// 模型名称
    #[serde(default = "default_model")]
    pub model: String,

    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 允许跨域访问 `/api/*` 的来源
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    #[serde(default)]
    pub reply_policy: ReplyPolicy,

    /// 自定义 mock 数据目录，未设置时使用内置数据
    #[serde(default)]
    pub fixtures_dir: Option<PathBuf>,

    /// LLM 请求日志目录，未设置时不记录
    #[serde(default)]
    pub request_log_dir: Option<PathBuf>,
}

fn default_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_allowed_origins() -> Vec<String> {
    [
        "http://localhost:5173",
        "http://localhost:5174",
        "http://127.0.0.1:5173",
        "http://127.0.0.1:5174",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
            host: default_host(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
            reply_policy: ReplyPolicy::default(),
            fixtures_dir: None,
            request_log_dir: None,
        }
    }
}

impl AppConfig {
    /// 加载配置
    ///
    /// 顺序：`RELAY_CONFIG` 指定的文件（或可执行文件旁的 config.json）→ 环境变量。
    pub fn load() -> Result<Self, AppError> {
        let explicit = std::env::var("RELAY_CONFIG").ok().map(PathBuf::from);
        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None => {
                let path = default_config_path();
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// 从 JSON 文件加载配置
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            AppError::Config(format!("Failed to parse config {}: {}", path.display(), e))
        })
    }

    /// 用环境变量覆盖配置
    ///
    /// `lookup` 抽象了环境读取，便于测试。空字符串视为未设置。
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(api_key) = lookup("OPENAI_API_KEY") {
            self.api_key = api_key;
        }
        if let Some(base_url) = get("OPENAI_BASE_URL") {
            self.base_url = base_url;
        }
        if let Some(model) = get("OPENAI_MODEL") {
            self.model = model;
        }
        if let Some(host) = get("RELAY_HOST") {
            self.host = host;
        }
        if let Some(port) = get("RELAY_PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| AppError::Config(format!("Invalid RELAY_PORT: {}", port)))?;
        }
        if let Some(origins) = get("RELAY_ALLOWED_ORIGINS") {
            self.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(policy) = get("RELAY_REPLY_POLICY") {
            self.reply_policy = policy.parse()?;
        }
        if let Some(dir) = get("RELAY_FIXTURES_DIR") {
            self.fixtures_dir = Some(PathBuf::from(dir));
        }
        if let Some(dir) = get("RELAY_REQUEST_LOG_DIR") {
            self.request_log_dir = Some(PathBuf::from(dir));
        }

        Ok(())
    }

    /// 运行模式，由密钥决定
    pub fn mode(&self) -> RelayMode {
        RelayMode::from_api_key(&self.api_key)
    }

    /// 监听地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

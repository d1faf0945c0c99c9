//! 应用状态管理
//!
//! 定义在请求处理器之间共享的状态。启动后只读。

use std::sync::Arc;
use tracing::info;

use crate::config::{AppConfig, RelayMode};
use crate::error::{AppError, AppResult};
use crate::llm::LlmClient;
use crate::services::{CompletionBackend, MockFixtures, RelayService};
use crate::utils::RequestLogger;

/// 应用共享状态
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub relay: RelayService,
}

impl AppState {
    pub fn new(config: AppConfig, relay: RelayService) -> Self {
        Self {
            config: Arc::new(config),
            relay,
        }
    }

    /// 当前运行模式
    pub fn mode(&self) -> RelayMode {
        self.relay.mode()
    }
}

/// 根据配置构建补全后端
fn build_backend(config: &AppConfig) -> AppResult<CompletionBackend> {
    match config.mode() {
        RelayMode::Mock => {
            let fixtures = MockFixtures::load(config.fixtures_dir.as_deref())?;
            Ok(CompletionBackend::Mock(Arc::new(fixtures)))
        }
        RelayMode::Production => {
            let mut client = LlmClient::new(&config.api_key, &config.base_url, &config.model)?;

            if let Some(dir) = &config.request_log_dir {
                let logger = RequestLogger::new(dir).map_err(|e| {
                    AppError::Config(format!(
                        "Failed to create request log dir {}: {}",
                        dir.display(),
                        e
                    ))
                })?;
                info!("LLM request log: {}", logger.log_path().display());
                client = client.with_request_logger(Arc::new(logger));
            }

            info!("Completion model: {}", client.model());
            Ok(CompletionBackend::Live(Arc::new(client)))
        }
    }
}

/// 创建可共享的应用状态
pub fn create_shared_state(config: AppConfig) -> AppResult<Arc<AppState>> {
    let backend = build_backend(&config)?;
    let relay = RelayService::new(backend, config.reply_policy);
    Ok(Arc::new(AppState::new(config, relay)))
}

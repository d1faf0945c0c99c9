//! LLM 客户端

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use super::format::build_openai_endpoint;
use super::openai::complete_openai;
use super::types::{ChatMessage, ChatOptions, LlmError};
use crate::utils::RequestLogger;

/// 请求超时（秒）
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// 文本补全服务
///
/// 服务层只依赖这个 trait，测试中可替换为固定回复的实现。
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// 发送一次对话，返回第一个 completion 的文本
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: ChatOptions,
    ) -> Result<String, LlmError>;
}

/// OpenAI 兼容的 LLM 客户端
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
    endpoint: String,
    model: String,
    logger: Option<Arc<RequestLogger>>,
}

impl LlmClient {
    /// 创建新的 LLM 客户端
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(LlmError::ConfigError("API Key is required".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(5)
            .build()
            .map_err(LlmError::HttpError)?;

        let base_url = base_url.into();
        let endpoint = build_openai_endpoint(&base_url);

        Ok(Self {
            client,
            api_key,
            base_url,
            endpoint,
            model: model.into(),
            logger: None,
        })
    }

    /// 启用 JSONL 请求日志
    pub fn with_request_logger(mut self, logger: Arc<RequestLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// 当前使用的模型
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionService for LlmClient {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: ChatOptions,
    ) -> Result<String, LlmError> {
        info!(
            "LLM request: model={}, temperature={:?}",
            self.model, options.temperature
        );

        let start = Instant::now();
        let entry = self.logger.as_ref().map(|logger| {
            logger.log_request(
                &RequestLogger::generate_request_id(),
                &self.endpoint,
                &self.model,
                &messages,
                options.temperature,
                REQUEST_TIMEOUT_SECS,
                &self.base_url,
                &self.api_key,
            )
        });

        let result = complete_openai(
            &self.client,
            &self.api_key,
            &self.endpoint,
            &messages,
            &self.model,
            &options,
        )
        .await;

        match &result {
            Ok(content) => {
                info!(
                    "LLM response received: {} chars in {}ms",
                    content.len(),
                    start.elapsed().as_millis()
                );
                if let (Some(logger), Some(entry)) = (&self.logger, entry) {
                    logger.log_success(entry, start, content.len(), content);
                }
            }
            Err(e) => {
                warn!("LLM request failed: {}", e);
                if let (Some(logger), Some(entry)) = (&self.logger, entry) {
                    logger.log_error(entry, start, e.kind(), &e.to_string(), e.status_code());
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_api_key() {
        let err = LlmClient::new("", "https://api.openai.com", "gpt-3.5-turbo")
            .err()
            .unwrap();
        assert!(matches!(err, LlmError::ConfigError(_)));
    }

    #[test]
    fn test_new_builds_endpoint() {
        let client = LlmClient::new("sk-test", "https://api.openai.com/", "gpt-3.5-turbo").unwrap();
        assert_eq!(client.endpoint, "https://api.openai.com/v1/chat/completions");
        assert_eq!(client.model(), "gpt-3.5-turbo");
    }
}

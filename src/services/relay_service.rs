//! 补全中继服务
//!
//! 根据启动时确定的运行模式，返回 mock 数据或调用补全服务并解析回复。

use std::sync::Arc;
use tracing::info;

use super::mock_fixtures::MockFixtures;
use super::prompt_service::PromptKind;
use super::reply_parser::parse_reply;
use crate::config::{RelayMode, ReplyPolicy};
use crate::error::AppResult;
use crate::llm::CompletionService;
use crate::models::{
    CodeCompletion, DeploySummary, DeploymentValidation, GenerateCodeResponse, StructuredReply,
};

/// 补全后端
#[derive(Clone)]
pub enum CompletionBackend {
    /// 固定数据
    Mock(Arc<MockFixtures>),
    /// 外部补全服务
    Live(Arc<dyn CompletionService>),
}

/// 中继服务
#[derive(Clone)]
pub struct RelayService {
    backend: CompletionBackend,
    policy: ReplyPolicy,
}

impl RelayService {
    pub fn new(backend: CompletionBackend, policy: ReplyPolicy) -> Self {
        Self { backend, policy }
    }

    /// 当前运行模式
    pub fn mode(&self) -> RelayMode {
        match self.backend {
            CompletionBackend::Mock(_) => RelayMode::Mock,
            CompletionBackend::Live(_) => RelayMode::Production,
        }
    }

    /// 根据想法生成代码
    pub async fn generate_code(&self, idea: &str) -> AppResult<GenerateCodeResponse> {
        match &self.backend {
            CompletionBackend::Mock(fixtures) => Ok(fixtures.generate_code(idea)),
            CompletionBackend::Live(completion) => {
                let reply: CodeCompletion =
                    self.complete(completion.as_ref(), PromptKind::GenerateCode, idea).await?;
                Ok(GenerateCodeResponse {
                    success: true,
                    code: reply.component,
                    description: reply.description,
                    tech_stack: reply.tech_stack,
                    deployment_ready: reply.deployment_ready,
                })
            }
        }
    }

    /// 判断代码是否可以部署
    pub async fn validate_deployment(&self, code: &str) -> AppResult<DeploymentValidation> {
        match &self.backend {
            CompletionBackend::Mock(fixtures) => Ok(fixtures.validation.clone()),
            CompletionBackend::Live(completion) => {
                self.complete(completion.as_ref(), PromptKind::ValidateDeployment, code)
                    .await
            }
        }
    }

    /// 生成部署后总结
    pub async fn post_deploy_summary(&self, code: &str) -> AppResult<DeploySummary> {
        match &self.backend {
            CompletionBackend::Mock(fixtures) => Ok(fixtures.summary.clone()),
            CompletionBackend::Live(completion) => {
                self.complete(completion.as_ref(), PromptKind::PostDeploySummary, code)
                    .await
            }
        }
    }

    /// 渲染提示词，调用补全服务，解析回复
    async fn complete<T: StructuredReply>(
        &self,
        completion: &dyn CompletionService,
        kind: PromptKind,
        text: &str,
    ) -> AppResult<T> {
        info!("Relaying {} request ({} chars)", kind.name(), text.len());

        let content = completion
            .complete(kind.build_messages(text), kind.chat_options())
            .await?;

        parse_reply(&content, self.policy)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::llm::{ChatMessage, ChatOptions, LlmError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::{json, Value};

    /// 返回固定文本并记录收到的请求
    pub(crate) struct FakeCompletion {
        reply: Result<String, u16>,
        pub calls: Mutex<Vec<(Vec<ChatMessage>, Option<f64>)>>,
    }

    impl FakeCompletion {
        pub(crate) fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                calls: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn failing(status: u16) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(status),
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionService for FakeCompletion {
        async fn complete(
            &self,
            messages: Vec<ChatMessage>,
            options: ChatOptions,
        ) -> Result<String, LlmError> {
            self.calls.lock().push((messages, options.temperature));
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(LlmError::ApiError {
                    status: *status,
                    message: "upstream unavailable".to_string(),
                }),
            }
        }
    }

    fn live(fake: &Arc<FakeCompletion>, policy: ReplyPolicy) -> RelayService {
        RelayService::new(CompletionBackend::Live(fake.clone()), policy)
    }

    fn mock() -> RelayService {
        let fixtures = MockFixtures::builtin().unwrap();
        RelayService::new(CompletionBackend::Mock(Arc::new(fixtures)), ReplyPolicy::Lenient)
    }

    #[tokio::test]
    async fn test_mock_mode_never_calls_out() {
        let service = mock();
        assert_eq!(service.mode(), RelayMode::Mock);

        let generated = service.generate_code("Todo app for teams").await.unwrap();
        assert!(generated.code.as_str().unwrap().contains("Todo app for teams"));

        let validation = service.validate_deployment("code").await.unwrap();
        assert_eq!(validation.is_ready, true);
        assert_eq!(validation.issues, json!([]));

        let summary = service.post_deploy_summary("code").await.unwrap();
        assert!(summary.summary.as_str().unwrap().contains("React component"));
    }

    #[tokio::test]
    async fn test_live_generate_maps_component_to_code() {
        let fake = FakeCompletion::replying(
            "```json\n{\"component\": \"export default function App() {}\", \"description\": \"A todo app\", \"techStack\": [\"React\"], \"deploymentReady\": true}\n```",
        );
        let service = live(&fake, ReplyPolicy::Lenient);
        assert_eq!(service.mode(), RelayMode::Production);

        let response = service.generate_code("Todo app").await.unwrap();
        assert_eq!(response.code, "export default function App() {}");
        assert_eq!(response.description, "A todo app");
        assert_eq!(response.tech_stack, json!(["React"]));
        assert_eq!(response.deployment_ready, true);

        let calls = fake.calls.lock();
        assert_eq!(calls.len(), 1);
        let (messages, temperature) = &calls[0];
        assert_eq!(*temperature, Some(0.7));
        assert_eq!(messages.len(), 2);
        assert!(messages[1].content.contains("USER IDEA: Todo app"));
    }

    #[tokio::test]
    async fn test_live_validation_uses_lower_temperature() {
        let fake = FakeCompletion::replying(r#"{"isReady": false, "issues": ["Missing import"]}"#);
        let service = live(&fake, ReplyPolicy::Lenient);

        let validation = service.validate_deployment("const x = ;").await.unwrap();
        assert_eq!(validation.is_ready, false);
        assert_eq!(validation.issues, json!(["Missing import"]));
        assert_eq!(validation.recommendations, json!([]));
        assert_eq!(fake.calls.lock()[0].1, Some(0.5));
    }

    #[tokio::test]
    async fn test_live_missing_keys_default_to_empty() {
        let fake = FakeCompletion::replying("{}");
        let service = live(&fake, ReplyPolicy::Lenient);

        let response = service.generate_code("idea").await.unwrap();
        assert_eq!(response.code, "");
        assert_eq!(response.description, "");
        assert_eq!(response.tech_stack, json!([]));
        assert_eq!(response.deployment_ready, false);
    }

    #[tokio::test]
    async fn test_live_reply_values_are_forwarded_unchanged() {
        let fake = FakeCompletion::replying(
            r#"{"component": "<App/>", "techStack": "React", "deploymentReady": "true"}"#,
        );
        let response = live(&fake, ReplyPolicy::Lenient)
            .generate_code("idea")
            .await
            .unwrap();
        assert_eq!(response.tech_stack, "React");
        assert_eq!(response.deployment_ready, "true");
        assert_eq!(response.description, "");

        let fake = FakeCompletion::replying(
            r#"{"isReady": false, "issues": [{"line": 3, "message": "Missing import"}], "recommendations": null}"#,
        );
        let validation = live(&fake, ReplyPolicy::Strict)
            .validate_deployment("code")
            .await
            .unwrap();
        assert_eq!(validation.issues[0]["message"], "Missing import");
        assert_eq!(validation.recommendations, Value::Null);
    }

    #[tokio::test]
    async fn test_live_strict_policy_rejects_missing_keys() {
        let fake = FakeCompletion::replying(r#"{"summary": "done"}"#);
        let service = live(&fake, ReplyPolicy::Strict);

        let err = service.post_deploy_summary("code").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidReply(_)));
    }

    #[tokio::test]
    async fn test_live_invalid_json_and_upstream_errors() {
        let fake = FakeCompletion::replying("I cannot help with that.");
        let err = live(&fake, ReplyPolicy::Lenient)
            .generate_code("idea")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidReply(_)));

        let fake = FakeCompletion::failing(429);
        let err = live(&fake, ReplyPolicy::Lenient)
            .validate_deployment("code")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Llm(LlmError::ApiError { status: 429, .. })));
    }
}

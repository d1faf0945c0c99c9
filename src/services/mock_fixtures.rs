//! Mock 模式的固定数据
//!
//! 启动时加载一次：默认使用编译进二进制的 `fixtures/` 数据，也可以通过配置指定目录替换。

use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::error::{AppError, AppResult};
use crate::models::{DeploySummary, DeploymentValidation, GenerateCodeResponse};

const RESPONSES_FILE: &str = "mock_responses.json";
const CODE_TEMPLATE_FILE: &str = "generated_app.jsx";

const BUILTIN_RESPONSES: &str = include_str!("../../fixtures/mock_responses.json");
const BUILTIN_CODE_TEMPLATE: &str = include_str!("../../fixtures/generated_app.jsx");

const TITLE_PLACEHOLDER: &str = "{{title}}";
const IDEA_PLACEHOLDER: &str = "{{idea}}";

/// 代码生成的 mock 配置
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateFixture {
    /// 想法为空时使用的标题
    pub default_title: String,
    pub description_template: String,
    pub tech_stack: Vec<String>,
    pub deployment_ready: bool,
}

#[derive(Debug, Deserialize)]
struct ResponsesFile {
    generate: GenerateFixture,
    validation: DeploymentValidation,
    summary: DeploySummary,
}

/// 各端点的 mock 数据
#[derive(Debug, Clone)]
pub struct MockFixtures {
    pub generate: GenerateFixture,
    /// 代码模板，包含 `{{title}}` 与 `{{idea}}` 占位符
    pub code_template: String,
    pub validation: DeploymentValidation,
    pub summary: DeploySummary,
}

impl MockFixtures {
    /// 内置数据
    pub fn builtin() -> AppResult<Self> {
        Self::parse(BUILTIN_RESPONSES, BUILTIN_CODE_TEMPLATE)
    }

    /// 从目录加载，目录为空时使用内置数据
    pub fn load(dir: Option<&Path>) -> AppResult<Self> {
        let Some(dir) = dir else {
            return Self::builtin();
        };

        let read = |name: &str| {
            let path = dir.join(name);
            fs::read_to_string(&path).map_err(|e| {
                AppError::Config(format!("Failed to read fixture {}: {}", path.display(), e))
            })
        };

        Self::parse(&read(RESPONSES_FILE)?, &read(CODE_TEMPLATE_FILE)?)
    }

    fn parse(responses: &str, code_template: &str) -> AppResult<Self> {
        let file: ResponsesFile = serde_json::from_str(responses)
            .map_err(|e| AppError::Config(format!("Invalid mock fixtures: {}", e)))?;

        Ok(Self {
            generate: file.generate,
            code_template: code_template.trim_end_matches(['\r', '\n']).to_string(),
            validation: file.validation,
            summary: file.summary,
        })
    }

    /// 从想法中取标题：第一个空白分隔的词
    pub fn derive_title<'a>(&'a self, idea: &'a str) -> &'a str {
        idea.split_whitespace()
            .next()
            .unwrap_or(&self.generate.default_title)
    }

    /// 生成代码的 mock 响应
    pub fn generate_code(&self, idea: &str) -> GenerateCodeResponse {
        let title = self.derive_title(idea);
        // 先替换标题，避免想法文本中的占位符被二次替换
        let code = self
            .code_template
            .replace(TITLE_PLACEHOLDER, title)
            .replace(IDEA_PLACEHOLDER, idea);

        let description = self
            .generate
            .description_template
            .replace(IDEA_PLACEHOLDER, idea);

        GenerateCodeResponse {
            success: true,
            code: Value::String(code),
            description: Value::String(description),
            tech_stack: Value::from(self.generate.tech_stack.clone()),
            deployment_ready: Value::Bool(self.generate.deployment_ready),
        }
    }
}

//! Prompt 构建服务
//!
//! 每个端点对应一个固定模板：系统角色、用户提示词和采样温度。调用方文本原样插入模板。

use crate::llm::{ChatMessage, ChatOptions};

const GENERATE_SYSTEM_PROMPT: &str =
    "You are an expert web developer. Always return valid JSON.";

const VALIDATE_SYSTEM_PROMPT: &str =
    "You are an expert code reviewer. Always return valid JSON.";

const SUMMARY_SYSTEM_PROMPT: &str =
    "You are a technical documentation expert. Always return valid JSON.";

/// 提示词类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// 根据想法生成 React 组件
    GenerateCode,
    /// 判断代码能否部署
    ValidateDeployment,
    /// 部署后总结
    PostDeploySummary,
}

impl PromptKind {
    /// 日志用名称
    pub fn name(&self) -> &'static str {
        match self {
            PromptKind::GenerateCode => "generate-code",
            PromptKind::ValidateDeployment => "validate-deployment",
            PromptKind::PostDeploySummary => "post-deploy-summary",
        }
    }

    /// 系统角色提示词
    pub fn system_prompt(&self) -> &'static str {
        match self {
            PromptKind::GenerateCode => GENERATE_SYSTEM_PROMPT,
            PromptKind::ValidateDeployment => VALIDATE_SYSTEM_PROMPT,
            PromptKind::PostDeploySummary => SUMMARY_SYSTEM_PROMPT,
        }
    }

    /// 采样温度：校验需要更确定的输出
    pub fn temperature(&self) -> f64 {
        match self {
            PromptKind::ValidateDeployment => 0.5,
            PromptKind::GenerateCode | PromptKind::PostDeploySummary => 0.7,
        }
    }

    /// 渲染用户提示词
    pub fn render(&self, text: &str) -> String {
        match self {
            PromptKind::GenerateCode => format!(
                r#"You are an expert web developer. Generate a complete, production-ready React.js website based on this idea:

USER IDEA: {text}

REQUIREMENTS:
1. Generate ONLY the React component code (functional components with hooks)
2. Use modern React best practices
3. Include responsive design with Tailwind CSS classes
4. Make it visually appealing and interactive

OUTPUT FORMAT (Return ONLY valid JSON):
{{"component": "// Code here", "description": "Brief description", "techStack": ["React", "Tailwind CSS"], "deploymentReady": true}}

Generate the code now:"#
            ),
            PromptKind::ValidateDeployment => format!(
                r#"Analyze this React code and determine if it's ready for deployment.

CODE:
{text}

Check for: 1. Valid React syntax, 2. Missing imports, 3. Component structure, 4. Errors

Return ONLY valid JSON: {{"isReady": true/false, "issues": [...], "recommendations": [...]}}"#
            ),
            PromptKind::PostDeploySummary => format!(
                r#"Provide a post-deployment summary for this React app.

CODE:
{text}

Return ONLY JSON: {{"summary": "...", "features": [...], "improvements": [...]}}"#
            ),
        }
    }

    /// 构建两条消息的对话：系统角色 + 用户提示词
    pub fn build_messages(&self, text: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system_prompt()),
            ChatMessage::user(self.render(text)),
        ]
    }

    /// 本类型请求使用的聊天选项
    pub fn chat_options(&self) -> ChatOptions {
        ChatOptions {
            temperature: Some(self.temperature()),
        }
    }
}

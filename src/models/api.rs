//! REST API 请求/响应模型

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::reply::{DeploySummary, DeploymentValidation};

/// 生成代码请求
#[derive(Debug, Default, Deserialize)]
pub struct GenerateCodeRequest {
    #[serde(default)]
    pub idea: String,
}

/// 校验 / 总结请求，均以代码文本为输入
#[derive(Debug, Default, Deserialize)]
pub struct CodeRequest {
    #[serde(default)]
    pub code: String,
}

/// 生成代码响应
///
/// 除 `success` 外的字段直接转发模型回复中的值。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCodeResponse {
    pub success: bool,
    pub code: Value,
    pub description: Value,
    pub tech_stack: Value,
    pub deployment_ready: Value,
}

/// 部署校验响应
#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    pub success: bool,
    pub validation: DeploymentValidation,
}

/// 部署后总结响应
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub success: bool,
    pub summary: DeploySummary,
}

/// 健康检查响应
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub mode: &'static str,
}

//! 模型回复的结构化表示
//!
//! 字段名与提示词中要求模型输出的 JSON 键一致。字段值保持模型返回的原样，
//! 只在键缺失时（宽松策略）补默认值：空字符串 / 空列表 / false。

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 回复类型需要声明提示词中要求的键，严格策略据此检查
pub trait StructuredReply: DeserializeOwned {
    const KEYS: &'static [&'static str];
}

fn empty_string() -> Value {
    Value::String(String::new())
}

fn empty_list() -> Value {
    Value::Array(Vec::new())
}

fn not_set() -> Value {
    Value::Bool(false)
}

/// 代码生成回复
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeCompletion {
    /// React 组件源码
    #[serde(default = "empty_string")]
    pub component: Value,
    #[serde(default = "empty_string")]
    pub description: Value,
    #[serde(default = "empty_list")]
    pub tech_stack: Value,
    #[serde(default = "not_set")]
    pub deployment_ready: Value,
}

impl StructuredReply for CodeCompletion {
    const KEYS: &'static [&'static str] =
        &["component", "description", "techStack", "deploymentReady"];
}

/// 部署校验回复
///
/// 模型返回的其他键原样转发。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentValidation {
    #[serde(default = "not_set")]
    pub is_ready: Value,
    #[serde(default = "empty_list")]
    pub issues: Value,
    #[serde(default = "empty_list")]
    pub recommendations: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StructuredReply for DeploymentValidation {
    const KEYS: &'static [&'static str] = &["isReady", "issues", "recommendations"];
}

/// 部署后总结回复
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploySummary {
    #[serde(default = "empty_string")]
    pub summary: Value,
    #[serde(default = "empty_list")]
    pub features: Value,
    #[serde(default = "empty_list")]
    pub improvements: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StructuredReply for DeploySummary {
    const KEYS: &'static [&'static str] = &["summary", "features", "improvements"];
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_keys_default() {
        let reply: CodeCompletion = serde_json::from_str(r#"{"component": "x"}"#).unwrap();
        assert_eq!(reply.component, "x");
        assert_eq!(reply.description, "");
        assert_eq!(reply.tech_stack, json!([]));
        assert_eq!(reply.deployment_ready, false);

        let validation: DeploymentValidation = serde_json::from_str("{}").unwrap();
        assert_eq!(
            serde_json::to_value(&validation).unwrap(),
            json!({"isReady": false, "issues": [], "recommendations": []})
        );
    }

    #[test]
    fn test_present_values_are_kept_as_is() {
        let validation: DeploymentValidation = serde_json::from_str(
            r#"{"isReady": "true", "issues": [{"line": 3, "message": "Missing import"}], "recommendations": null, "score": 7}"#,
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(&validation).unwrap(),
            json!({
                "isReady": "true",
                "issues": [{"line": 3, "message": "Missing import"}],
                "recommendations": null,
                "score": 7
            })
        );

        let summary: DeploySummary = serde_json::from_str(r#"{"features": null}"#).unwrap();
        assert_eq!(summary.features, Value::Null);
        assert_eq!(summary.summary, "");
        assert_eq!(summary.improvements, json!([]));
    }
}

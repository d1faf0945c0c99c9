//! 模型回复解析
//!
//! 去掉 markdown 代码围栏后按 JSON 对象解析，再映射为具体的回复类型。

use serde_json::Value;

use crate::config::ReplyPolicy;
use crate::error::{AppError, AppResult};
use crate::models::StructuredReply;

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// 去掉首尾的代码围栏
///
/// 按位置裁剪：开头最多去掉一个 ```` ```json ```` 或 ```` ``` ````，结尾最多去掉一个 ```` ``` ````，
/// 不做结构化的 markdown 解析。
pub fn strip_code_fence(text: &str) -> &str {
    let mut text = text.trim();

    if let Some(rest) = text.strip_prefix(JSON_FENCE) {
        text = rest;
    } else if let Some(rest) = text.strip_prefix(FENCE) {
        text = rest;
    }

    if let Some(rest) = text.strip_suffix(FENCE) {
        text = rest;
    }

    text.trim()
}

/// 解析补全文本为 JSON 对象
pub fn parse_json_object(text: &str) -> AppResult<serde_json::Map<String, Value>> {
    match serde_json::from_str::<Value>(strip_code_fence(text))? {
        Value::Object(map) => Ok(map),
        other => Err(AppError::InvalidReply(format!(
            "Expected a JSON object from the completion service, got {}",
            json_type_name(&other)
        ))),
    }
}

/// 解析为具体回复类型
///
/// 严格策略下，提示词要求的键必须全部出现。
pub fn parse_reply<T: StructuredReply>(text: &str, policy: ReplyPolicy) -> AppResult<T> {
    let map = parse_json_object(text)?;

    if policy == ReplyPolicy::Strict {
        let missing: Vec<&str> = T::KEYS
            .iter()
            .copied()
            .filter(|key| !map.contains_key(*key))
            .collect();
        if !missing.is_empty() {
            return Err(AppError::InvalidReply(format!(
                "Completion reply is missing keys: {}",
                missing.join(", ")
            )));
        }
    }

    Ok(serde_json::from_value(Value::Object(map))?)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CodeCompletion, DeploySummary, DeploymentValidation};
    use serde_json::json;

    #[test]
    fn test_strip_json_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  {\"a\":1}\n"), "{\"a\":1}");
    }

    #[test]
    fn test_strip_only_one_leading_fence() {
        // 只去掉一个开头围栏，剩下的仍然保留
        assert_eq!(strip_code_fence("```json```{}```"), "```{}");
        assert_eq!(strip_code_fence("```{}"), "{}");
        assert_eq!(strip_code_fence("{}```"), "{}");
    }

    #[test]
    fn test_parse_fenced_and_plain_identically() {
        let fenced = parse_json_object("```json\n{\"a\":1}\n```").unwrap();
        let plain = parse_json_object("{\"a\":1}").unwrap();
        assert_eq!(fenced, plain);
        assert_eq!(Value::Object(fenced), json!({"a": 1}));
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = parse_json_object("Sure! Here is your code").unwrap_err();
        assert!(matches!(err, AppError::InvalidReply(ref msg) if !msg.is_empty()));

        let err = parse_json_object("[1, 2]").unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_lenient_fills_defaults() {
        let reply: DeploymentValidation =
            parse_reply(r#"{"isReady": true}"#, ReplyPolicy::Lenient).unwrap();
        assert_eq!(reply.is_ready, true);
        assert_eq!(reply.issues, json!([]));
        assert_eq!(reply.recommendations, json!([]));
    }

    #[test]
    fn test_strict_reports_missing_keys() {
        let err = parse_reply::<DeploySummary>(r#"{"summary": "ok"}"#, ReplyPolicy::Strict)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Completion reply is missing keys: features, improvements"
        );

        let reply: CodeCompletion = parse_reply(
            r#"```json
{"component": "<App/>", "description": "d", "techStack": ["React"], "deploymentReady": true}
```"#,
            ReplyPolicy::Strict,
        )
        .unwrap();
        assert_eq!(reply.component, "<App/>");
        assert_eq!(reply.tech_stack, json!(["React"]));
    }

    #[test]
    fn test_unexpected_value_shapes_are_accepted() {
        let reply: DeploymentValidation = parse_reply(
            r#"{"isReady": "yes", "issues": [{"line": 3, "message": "Missing import"}], "recommendations": null}"#,
            ReplyPolicy::Strict,
        )
        .unwrap();
        assert_eq!(reply.is_ready, "yes");
        assert_eq!(reply.issues, json!([{"line": 3, "message": "Missing import"}]));
        assert_eq!(reply.recommendations, Value::Null);

        let reply: DeploySummary =
            parse_reply(r#"{"summary": 42, "features": null}"#, ReplyPolicy::Lenient).unwrap();
        assert_eq!(reply.summary, 42);
        assert_eq!(reply.features, Value::Null);
        assert_eq!(reply.improvements, json!([]));
    }
}

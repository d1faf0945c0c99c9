//! 统一错误处理模块
//!
//! 定义应用级错误类型，并实现 axum 的 IntoResponse trait 以便自动转换为 HTTP 响应。
//! 所有错误统一序列化为 `{"success": false, "error": "..."}`。

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm::LlmError;

/// 请求体缺失或无法解析时返回的固定消息
pub const NO_JSON_MESSAGE: &str = "No JSON data received";

/// 应用错误枚举
#[derive(Error, Debug)]
pub enum AppError {
    /// 配置相关错误
    #[error("{0}")]
    Config(String),

    /// LLM 调用错误
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// 模型回复无法解析或缺少字段
    #[error("{0}")]
    InvalidReply(String),

    /// 请求参数错误
    #[error("{0}")]
    BadRequest(String),
}

impl AppError {
    /// 对应的 HTTP 状态码
    ///
    /// 只区分客户端输入错误（400），其余一律 500。
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Llm(_)
            | AppError::InvalidReply(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        AppError::BadRequest(NO_JSON_MESSAGE.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidReply(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let body = Json(json!({
            "success": false,
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

/// 便捷类型别名
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::BadRequest(NO_JSON_MESSAGE.into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::InvalidReply("bad".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Llm(LlmError::EmptyResponse).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_json_error_becomes_invalid_reply() {
        let err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let app_err = AppError::from(err);
        assert!(matches!(app_err, AppError::InvalidReply(ref msg) if !msg.is_empty()));
    }
}

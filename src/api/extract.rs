//! 请求体提取器
//!
//! 请求体缺失、无法解析或为 null 时统一返回 400 `No JSON data received`。
//! 空对象是否同样拒绝由请求类型决定。

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AppError, NO_JSON_MESSAGE};
use crate::models::{CodeRequest, GenerateCodeRequest};

/// 可由 [`JsonBody`] 提取的请求类型
pub trait RequestBody: DeserializeOwned {
    /// 空对象 `{}` 视为没有收到数据
    const REJECT_EMPTY: bool = false;
}

impl RequestBody for GenerateCodeRequest {
    const REJECT_EMPTY: bool = true;
}

impl RequestBody for CodeRequest {}

/// JSON 请求体
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: RequestBody,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state).await?;

        match &value {
            Value::Object(map) if !(T::REJECT_EMPTY && map.is_empty()) => {}
            _ => return Err(AppError::BadRequest(NO_JSON_MESSAGE.to_string())),
        }

        let body = serde_json::from_value(value)
            .map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e)))?;
        Ok(JsonBody(body))
    }
}

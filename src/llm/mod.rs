//! LLM 模块
//!
//! 提供 OpenAI 兼容的 Chat Completions 客户端，以及供服务层使用的 `CompletionService` 抽象。

mod client;
mod format;
mod openai;
mod types;

pub use client::{CompletionService, LlmClient};
pub use types::*;

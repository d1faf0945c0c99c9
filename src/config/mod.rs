//! 配置模块

mod app_config;

pub use app_config::{AppConfig, RelayMode, ReplyPolicy};

#[cfg(test)]
pub use app_config::PLACEHOLDER_API_KEY;

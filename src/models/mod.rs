//! 数据模型

mod api;
mod reply;

pub use api::*;
pub use reply::*;

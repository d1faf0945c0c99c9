//! 服务层模块

mod mock_fixtures;
mod prompt_service;
mod relay_service;
mod reply_parser;

pub use mock_fixtures::MockFixtures;
pub use relay_service::{CompletionBackend, RelayService};

#[cfg(test)]
pub(crate) use relay_service::tests::FakeCompletion;

//! External service integrations and orchestration.

pub mod http_publisher;
pub mod publish;
pub mod seed;
pub mod telegram;

pub use http_publisher::HttpPublisher;
pub use publish::PublishDispatcher;
pub use seed::seed_system_templates;
pub use telegram::{DisabledNotifier, TelegramNotifier};

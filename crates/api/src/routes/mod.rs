//! HTTP route handlers.

pub mod content;
pub mod health;
pub mod templates;
pub mod workflow;

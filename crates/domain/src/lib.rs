//! Domain layer for the content engine backend.
//!
//! This crate contains:
//! - Domain models (ContentTemplate, ScheduledContent, Schedule)
//! - The approval workflow state machine
//! - The recurrence evaluator and calendar projection
//! - Collaborator traits for platform publishing and notifications
//! - Domain error types

pub mod error;
pub mod models;
pub mod services;

pub use error::EngineError;

//! Shared utilities and common types for the content engine backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Cursor-based pagination for content listings
//! - Common validation logic for schedules and platform sets

pub mod pagination;
pub mod validation;

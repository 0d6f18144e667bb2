//! Domain models for the content engine.

pub mod content;
pub mod platform;
pub mod schedule;
pub mod status;
pub mod template;
pub mod workflow;

pub use content::{ContentFilters, ScheduledContent};
pub use platform::{Platform, PlatformResult};
pub use schedule::{DayOfWeek, Schedule, ScheduleKind};
pub use status::{ContentStatus, WorkflowAction};
pub use template::ContentTemplate;
pub use workflow::{ApprovalEntry, WorkflowSettings};

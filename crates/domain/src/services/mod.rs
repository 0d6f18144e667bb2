//! Domain services for the content engine.
//!
//! Services contain business logic that operates on domain models.

pub mod calendar;
pub mod notification;
pub mod publisher;
pub mod recurrence;

pub use calendar::{build_calendar, CalendarDay, CalendarEntry, CalendarView};
pub use notification::{
    ApprovalRequestedPayload, MockNotificationService, NotificationResult, NotificationService,
    NotificationType, PublishFailedPayload,
};
pub use publisher::{
    all_succeeded, merge_results, platforms_to_attempt, result_from_outcome, MockPublisher,
    PlatformPublisher, PublishOutcome, PublishPayload,
};
pub use recurrence::occurrences_in_range;

//! Background job scheduler and job implementations.

mod pool_metrics;
mod publish_due;
mod scheduler;

pub use pool_metrics::PoolMetricsJob;
pub use publish_due::PublishDueJob;
pub use scheduler::JobScheduler;

//! Scheduler errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("scheduler is shut down")]
    ShutDown,

    #[error("failed to start timer thread: {0}")]
    Io(#[from] std::io::Error),
}

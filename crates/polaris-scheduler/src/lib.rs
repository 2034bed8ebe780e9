//! Delay/repeat task scheduling.
//!
//! A dedicated timer thread decides *when* a task fires; task bodies run on a
//! tokio runtime, so a slow body never delays other tasks' due times.

pub mod error;
pub mod scheduler;
pub mod task;

pub use error::SchedulerError;
pub use scheduler::{Scheduler, TaskBuilder};
pub use task::{Task, TaskContext, TaskId, TaskKind};

use std::time::{Duration, Instant};

use crate::error::BatchError;

/// Type alias for job execution results.
///
/// A `JobResult` is a `Result` that contains either:
/// - A successful value with execution details
/// - A `BatchError` indicating what went wrong
pub type JobResult<T> = Result<T, BatchError>;

/// Represents a job that can be executed.
///
/// A job is a container for a sequence of steps that are executed in order. The job is
/// responsible for orchestrating the steps and reporting the overall result.
pub trait Job {
    /// The details reported by a successful run.
    type Output;

    /// Runs the job and returns the result of the job execution.
    ///
    /// # Returns
    /// - `Ok(Self::Output)` when the job executes successfully
    /// - `Err(BatchError)` when the job execution fails
    fn run(&self) -> JobResult<Self::Output>;
}

/// Represents the execution of a job.
///
/// A `JobExecution` contains timing information about a job run:
/// - When it started
/// - When it ended
/// - How long it took to execute
#[derive(Debug, Clone, Copy)]
pub struct JobExecution {
    /// The time when the job started executing
    pub start: Instant,
    /// The time when the job finished executing
    pub end: Instant,
    /// The total duration of the job execution
    pub duration: Duration,
}

impl JobExecution {
    /// Closes an execution that started at `start`.
    pub fn since(start: Instant) -> Self {
        JobExecution {
            start,
            end: Instant::now(),
            duration: start.elapsed(),
        }
    }
}

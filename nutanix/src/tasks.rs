//! Waiting on asynchronous Prism tasks
//!
//! Every mutating v4 call answers with a task reference. [`TaskWaiter::wait`]
//! polls the task until it reaches a terminal state, the timeout elapses or
//! the request context is cancelled.

use std::time::Duration;

use thiserror::Error;
use tfplug::Context;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::api::common::TaskReference;
use crate::api::prism::tasks::Task;
use crate::api::{ApiError, Client};
use crate::enums::TaskStatus;

/// Affected-entity kind of a created storage container
pub const STORAGE_CONTAINER_REL: &str = "clustermgmt:config:storage-containers";
/// Affected-entity kind of a created cluster profile
pub const CLUSTER_PROFILE_REL: &str = "clustermgmt:config:cluster-profiles";

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20 * 60);

#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("error_detail: {message}, progress_message: {progress}")]
    Failed { message: String, progress: i64 },

    #[error("timeout while waiting for task to complete after {0:?}")]
    Timeout(Duration),

    #[error("context cancelled while waiting for task")]
    Cancelled,

    #[error("task {task} did not report an affected entity of kind {rel}")]
    EntityNotFound { task: String, rel: String },

    #[error("response did not contain a task reference")]
    MissingTaskId,
}

#[derive(Clone)]
pub struct TaskWaiter {
    client: Client,
    poll_interval: Duration,
}

impl TaskWaiter {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Polls until the task succeeds. `FAILED` and `CANCELED` end the wait
    /// with the task's first error message; any other status keeps polling.
    pub async fn wait(
        &self,
        ctx: &Context,
        task: &TaskReference,
        timeout: Duration,
    ) -> Result<Task, TaskError> {
        let task_id = task.ext_id.as_deref().ok_or(TaskError::MissingTaskId)?;
        let started = Instant::now();
        let deadline = started + timeout;

        loop {
            if ctx.is_cancelled() {
                return Err(cancelled_or_timeout(ctx, timeout));
            }

            let current = self.client.prism().tasks().get(task_id).await?;
            let status = current.status.unwrap_or(TaskStatus::Unknown);
            debug!(
                task = task_id,
                status = %status,
                progress = current.progress_percentage.unwrap_or(0),
                "polled task"
            );

            match status {
                TaskStatus::Succeeded => return Ok(current),
                TaskStatus::Failed | TaskStatus::Canceled => {
                    let message = current
                        .first_error_message()
                        .unwrap_or("task ended without an error message")
                        .to_string();
                    warn!(task = task_id, status = %status, "task did not succeed");
                    return Err(TaskError::Failed {
                        message,
                        progress: current.progress_percentage.unwrap_or(0),
                    });
                }
                _ => {}
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(TaskError::Timeout(timeout));
            }

            let pause = self.poll_interval.min(deadline - now);
            tokio::select! {
                _ = sleep(pause) => {}
                _ = ctx.cancelled() => return Err(cancelled_or_timeout(ctx, timeout)),
            }
        }
    }

    /// Waits for the task, then pulls the ext_id of the entity it created
    pub async fn wait_for_entity(
        &self,
        ctx: &Context,
        task: &TaskReference,
        rel: &str,
        timeout: Duration,
    ) -> Result<String, TaskError> {
        let finished = self.wait(ctx, task, timeout).await?;
        entity_id(&finished, rel)
    }
}

/// The first affected entity of kind `rel`
pub fn entity_id(task: &Task, rel: &str) -> Result<String, TaskError> {
    task.entity_ext_id(rel)
        .map(str::to_string)
        .ok_or_else(|| TaskError::EntityNotFound {
            task: task.ext_id.clone().unwrap_or_default(),
            rel: rel.to_string(),
        })
}

// An expired context deadline reads as a timeout, not a user cancellation
fn cancelled_or_timeout(ctx: &Context, timeout: Duration) -> TaskError {
    match ctx.remaining() {
        Some(left) if left.is_zero() => TaskError::Timeout(timeout),
        _ => TaskError::Cancelled,
    }
}

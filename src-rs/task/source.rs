use async_trait::async_trait;

use super::types::AgentTask;
use crate::error::PollError;

/// Read-only view of the backend's task status table.
#[async_trait]
pub trait TaskSource: Send + Sync {
    async fn fetch_task(&self, task_id: &str) -> Result<AgentTask, PollError>;
}

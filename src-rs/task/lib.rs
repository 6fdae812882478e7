pub mod poller;
pub mod source;
pub mod types;

pub use poller::{TaskObserver, TaskPoller};
pub use source::TaskSource;
pub use types::{AgentTask, PollState, TaskStatus, DEFAULT_TASK_ERROR};

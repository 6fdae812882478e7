pub mod config;
pub mod error;
pub mod helpers;
pub mod session;
pub mod workflow;

#[path = "task/lib.rs"]
pub mod task;
#[path = "api/lib.rs"]
pub mod api;

pub use api::ContentWeaverClient;
pub use config::{ClientConfig, PollPolicy};
pub use error::{ClientError, ConfigError, PollError};
pub use session::{NoSession, SessionProvider, StaticToken};
pub use task::{AgentTask, PollState, TaskObserver, TaskPoller, TaskSource, TaskStatus};
pub use workflow::{AgentOperation, ContentType, WorkflowStage};

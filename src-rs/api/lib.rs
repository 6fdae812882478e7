pub mod client;
pub mod models;

pub use client::{poller, submit_and_observe, ContentWeaverClient};
pub use models::{
    ContentPlanRequest, Document, DocumentUpdate, DocumentUpload, NewDocument, NewSource,
    NewWorkflow, ResearchRequest, SocialMediaRequest, Source, SourceUpdate, StageRequest,
    StyleAnalysisRequest, TaskHandle, Workflow, WorkflowUpdate,
};

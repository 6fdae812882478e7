use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::models::{
    ContentPlanRequest, Document, DocumentUpdate, DocumentUpload, NewDocument, NewSource,
    NewWorkflow, ResearchRequest, SocialMediaRequest, Source, SourceUpdate, StageRequest,
    StyleAnalysisRequest, TaskHandle, Workflow, WorkflowUpdate,
};
use crate::config::{ClientConfig, PollPolicy};
use crate::error::{ClientError, PollError};
use crate::session::SessionProvider;
use crate::task::{AgentTask, TaskObserver, TaskPoller, TaskSource};
use crate::workflow::AgentOperation;

/// Async client for the ContentWeaver REST backend.
pub struct ContentWeaverClient {
    base_url: Url,
    session: Arc<dyn SessionProvider>,
    client: Client,
    poll: PollPolicy,
}

impl ContentWeaverClient {
    pub fn new(config: &ClientConfig, session: Arc<dyn SessionProvider>) -> Result<Self, ClientError> {
        let base_url = Url::parse(config.base_url.trim())
            .map_err(|err| ClientError::InvalidInput(format!("base url {}: {}", config.base_url, err)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidInput(format!(
                "base url cannot hold paths: {}",
                config.base_url
            )));
        }
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            base_url,
            session,
            client,
            poll: config.poll.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn poll_policy(&self) -> &PollPolicy {
        &self.poll
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        if segments.iter().any(|segment| segment.trim().is_empty()) {
            return Err(ClientError::InvalidInput("empty path segment".to_string()));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidInput("base url cannot hold paths".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let mut builder = self.client.request(method, url);
        if let Some(token) = self.session.access_token() {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                builder = builder.header(AUTHORIZATION, value);
            }
        }
        builder
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let body = self.send(builder).await?;
        serde_json::from_str::<T>(&body).map_err(|err| ClientError::MalformedResponse(err.to_string()))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<String, ClientError> {
        let resp = builder.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.text().await?);
        }
        // the status already explains the failure; the body is best effort
        let body = resp.text().await.unwrap_or_default();
        Err(ClientError::Http {
            status: status.as_u16(),
            body,
        })
    }

    async fn list<T: DeserializeOwned>(
        &self,
        collection: &str,
        workflow_id: Option<&str>,
    ) -> Result<Vec<T>, ClientError> {
        let mut builder = self.request(Method::GET, self.endpoint(&[collection])?);
        if let Some(id) = workflow_id {
            builder = builder.query(&[("workflow_id", id)]);
        }
        let value = self.send_json::<Value>(builder).await?;
        unwrap_list(value, collection)
    }

    pub async fn get_task(&self, task_id: &str) -> Result<AgentTask, ClientError> {
        let url = self.endpoint(&["agents", "tasks", task_id])?;
        let mut task = self.send_json::<AgentTask>(self.request(Method::GET, url)).await?;
        if task.id.is_empty() {
            task.id = task_id.to_string();
        }
        Ok(task)
    }

    /// POST a form-encoded submission and return the enqueued task.
    pub async fn submit<F: Serialize + ?Sized>(
        &self,
        operation: AgentOperation,
        form: &F,
    ) -> Result<TaskHandle, ClientError> {
        let url = self.endpoint(&["agents", operation.endpoint()])?;
        let handle = self
            .send_json::<TaskHandle>(self.request(Method::POST, url).form(form))
            .await?;
        if handle.task_id.trim().is_empty() {
            return Err(ClientError::MalformedResponse(format!(
                "{} returned an empty task id",
                operation
            )));
        }
        debug!(operation = %operation, task_id = %handle.task_id, "task submitted");
        Ok(handle)
    }

    pub async fn research(&self, req: &ResearchRequest) -> Result<TaskHandle, ClientError> {
        self.submit(AgentOperation::Research, req).await
    }

    pub async fn analyze_style(&self, req: &StyleAnalysisRequest) -> Result<TaskHandle, ClientError> {
        self.submit(AgentOperation::StyleAnalysis, req).await
    }

    pub async fn plan_content(&self, req: &ContentPlanRequest) -> Result<TaskHandle, ClientError> {
        self.submit(AgentOperation::ContentPlan, req).await
    }

    pub async fn write(&self, req: &StageRequest) -> Result<TaskHandle, ClientError> {
        self.submit(AgentOperation::Write, req).await
    }

    pub async fn fact_check(&self, req: &StageRequest) -> Result<TaskHandle, ClientError> {
        self.submit(AgentOperation::FactCheck, req).await
    }

    pub async fn edit(&self, req: &StageRequest) -> Result<TaskHandle, ClientError> {
        self.submit(AgentOperation::Edit, req).await
    }

    pub async fn optimize_seo(&self, req: &StageRequest) -> Result<TaskHandle, ClientError> {
        self.submit(AgentOperation::SeoOptimize, req).await
    }

    pub async fn social_media(&self, req: &SocialMediaRequest) -> Result<TaskHandle, ClientError> {
        self.submit(AgentOperation::SocialMedia, req).await
    }

    pub async fn list_workflows(&self) -> Result<Vec<Workflow>, ClientError> {
        self.list("workflows", None).await
    }

    pub async fn get_workflow(&self, id: &str) -> Result<Workflow, ClientError> {
        let url = self.endpoint(&["workflows", id])?;
        self.send_json(self.request(Method::GET, url)).await
    }

    pub async fn create_workflow(&self, new: &NewWorkflow) -> Result<Workflow, ClientError> {
        if new.title.trim().is_empty() {
            return Err(ClientError::InvalidInput("workflow title required".to_string()));
        }
        let url = self.endpoint(&["workflows"])?;
        self.send_json(self.request(Method::POST, url).json(new)).await
    }

    pub async fn update_workflow(&self, id: &str, update: &WorkflowUpdate) -> Result<Workflow, ClientError> {
        let url = self.endpoint(&["workflows", id])?;
        self.send_json(self.request(Method::PATCH, url).json(update)).await
    }

    pub async fn delete_workflow(&self, id: &str) -> Result<(), ClientError> {
        let url = self.endpoint(&["workflows", id])?;
        self.send(self.request(Method::DELETE, url)).await.map(|_| ())
    }

    /// Move a workflow to the stage after its current one.
    pub async fn advance_stage(&self, id: &str) -> Result<Workflow, ClientError> {
        let workflow = self.get_workflow(id).await?;
        if workflow.stage.is_final() {
            return Ok(workflow);
        }
        let next = workflow.stage.next(workflow.content_type);
        debug!(workflow_id = %id, from = %workflow.stage, to = %next, "advancing workflow");
        let update = WorkflowUpdate {
            stage: Some(next),
            ..WorkflowUpdate::default()
        };
        self.update_workflow(id, &update).await
    }

    pub async fn list_documents(&self, workflow_id: Option<&str>) -> Result<Vec<Document>, ClientError> {
        self.list("documents", workflow_id).await
    }

    pub async fn get_document(&self, id: &str) -> Result<Document, ClientError> {
        let url = self.endpoint(&["documents", id])?;
        self.send_json(self.request(Method::GET, url)).await
    }

    pub async fn create_document(&self, new: &NewDocument) -> Result<Document, ClientError> {
        let url = self.endpoint(&["documents"])?;
        self.send_json(self.request(Method::POST, url).json(new)).await
    }

    pub async fn upload_document(&self, upload: DocumentUpload) -> Result<Document, ClientError> {
        if upload.bytes.is_empty() {
            return Err(ClientError::InvalidInput("document upload is empty".to_string()));
        }
        let mut part = Part::bytes(upload.bytes).file_name(upload.file_name);
        if let Some(mime) = &upload.mime_type {
            part = part.mime_str(mime)?;
        }
        let mut form = Form::new().text("title", upload.title).part("file", part);
        if let Some(workflow_id) = upload.workflow_id {
            form = form.text("workflow_id", workflow_id);
        }
        let url = self.endpoint(&["documents", "upload"])?;
        self.send_json(self.request(Method::POST, url).multipart(form)).await
    }

    pub async fn update_document(&self, id: &str, update: &DocumentUpdate) -> Result<Document, ClientError> {
        let url = self.endpoint(&["documents", id])?;
        self.send_json(self.request(Method::PATCH, url).json(update)).await
    }

    pub async fn delete_document(&self, id: &str) -> Result<(), ClientError> {
        let url = self.endpoint(&["documents", id])?;
        self.send(self.request(Method::DELETE, url)).await.map(|_| ())
    }

    pub async fn list_sources(&self, workflow_id: Option<&str>) -> Result<Vec<Source>, ClientError> {
        self.list("sources", workflow_id).await
    }

    pub async fn get_source(&self, id: &str) -> Result<Source, ClientError> {
        let url = self.endpoint(&["sources", id])?;
        self.send_json(self.request(Method::GET, url)).await
    }

    pub async fn create_source(&self, new: &NewSource) -> Result<Source, ClientError> {
        let url = self.endpoint(&["sources"])?;
        self.send_json(self.request(Method::POST, url).json(new)).await
    }

    pub async fn update_source(&self, id: &str, update: &SourceUpdate) -> Result<Source, ClientError> {
        let url = self.endpoint(&["sources", id])?;
        self.send_json(self.request(Method::PATCH, url).json(update)).await
    }

    pub async fn delete_source(&self, id: &str) -> Result<(), ClientError> {
        let url = self.endpoint(&["sources", id])?;
        self.send(self.request(Method::DELETE, url)).await.map(|_| ())
    }
}

/// A poller reading through `client` with its configured policy.
pub fn poller(client: &Arc<ContentWeaverClient>) -> TaskPoller {
    let source: Arc<dyn TaskSource> = client.clone();
    TaskPoller::new(source, client.poll.clone())
}

/// Submit an operation and start observing the task it enqueued.
pub async fn submit_and_observe<F: Serialize + ?Sized>(
    client: &Arc<ContentWeaverClient>,
    operation: AgentOperation,
    form: &F,
) -> Result<(TaskHandle, TaskObserver), ClientError> {
    let handle = client.submit(operation, form).await?;
    let observer = poller(client).observe(Some(handle.task_id.clone()));
    Ok((handle, observer))
}

#[async_trait]
impl TaskSource for ContentWeaverClient {
    async fn fetch_task(&self, task_id: &str) -> Result<AgentTask, PollError> {
        self.get_task(task_id).await.map_err(PollError::from)
    }
}

fn unwrap_list<T: DeserializeOwned>(value: Value, key: &str) -> Result<Vec<T>, ClientError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove(key).or_else(|| map.remove("items")) {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(ClientError::MalformedResponse(format!(
                    "expected a list of {}",
                    key
                )))
            }
        },
        _ => {
            return Err(ClientError::MalformedResponse(format!(
                "expected a list of {}",
                key
            )))
        }
    };
    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(|err| ClientError::MalformedResponse(err.to_string())))
        .collect()
}

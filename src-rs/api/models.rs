use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::workflow::{ContentType, WorkflowStage};

/// Returned by every agent submission endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTaskHandle")]
pub struct TaskHandle {
    pub task_id: String,
    pub workflow_id: Option<String>,
}

/// Wire shape of a submission response. Backends answer with a bare handle
/// or with the whole enqueued task record, so every id spelling is optional.
#[derive(Deserialize)]
struct RawTaskHandle {
    #[serde(default)]
    task_id: Option<String>,
    #[serde(default, rename = "taskId")]
    task_id_camel: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    workflow_id: Option<String>,
    #[serde(default, rename = "workflowId")]
    workflow_id_camel: Option<String>,
}

impl TryFrom<RawTaskHandle> for TaskHandle {
    type Error = String;

    fn try_from(raw: RawTaskHandle) -> Result<Self, Self::Error> {
        let task_id = [raw.task_id, raw.task_id_camel, raw.id]
            .into_iter()
            .flatten()
            .find(|id| !id.trim().is_empty())
            .ok_or_else(|| "missing task id".to_string())?;
        Ok(Self {
            task_id,
            workflow_id: raw.workflow_id.or(raw.workflow_id_camel),
        })
    }
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ResearchRequest {
    pub topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct StyleAnalysisRequest {
    pub sample_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ContentPlanRequest {
    pub workflow_id: String,
    pub topic: String,
    pub content_type: ContentType,
}

/// Form for the stage endpoints that only act on an existing workflow
/// (write, fact-check, edit, seo-optimize).
#[derive(Clone, Debug, Default, Serialize)]
pub struct StageRequest {
    pub workflow_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct SocialMediaRequest {
    pub workflow_id: String,
    pub platform: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: String,
    pub title: String,
    pub content_type: ContentType,
    pub stage: WorkflowStage,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Workflow {
    pub fn progress_percent(&self) -> u8 {
        self.stage.progress_percent(self.content_type)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct NewWorkflow {
    pub title: String,
    pub content_type: ContentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct WorkflowUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<WorkflowStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub workflow_id: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct NewDocument {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct DocumentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
}

/// File sent to the multipart upload endpoint.
#[derive(Clone, Debug)]
pub struct DocumentUpload {
    pub title: String,
    pub file_name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
    pub workflow_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub workflow_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct NewSource {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct SourceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn task_handle_accepts_camel_case_id() {
        let handle: TaskHandle = serde_json::from_value(json!({"taskId": "abc"})).unwrap();
        assert_eq!(handle.task_id, "abc");
        assert!(handle.workflow_id.is_none());
    }

    #[test]
    fn task_handle_accepts_full_task_record() {
        let handle: TaskHandle = serde_json::from_value(json!({
            "id": "t1",
            "task_id": "t1",
            "status": "pending",
            "workflowId": "w7"
        }))
        .unwrap();
        assert_eq!(handle.task_id, "t1");
        assert_eq!(handle.workflow_id.as_deref(), Some("w7"));
    }

    #[test]
    fn task_handle_prefers_task_id_over_record_id() {
        let handle: TaskHandle =
            serde_json::from_value(json!({"id": "row-3", "task_id": "t9"})).unwrap();
        assert_eq!(handle.task_id, "t9");
    }

    #[test]
    fn task_handle_without_any_id_is_rejected() {
        let err = serde_json::from_value::<TaskHandle>(json!({"status": "pending"})).unwrap_err();
        assert!(err.to_string().contains("missing task id"));
    }

    #[test]
    fn workflow_keeps_unknown_fields() {
        let workflow: Workflow = serde_json::from_value(json!({
            "id": "w1",
            "title": "Rust in production",
            "content_type": "blog_article",
            "stage": "writing",
            "user_id": "u9"
        }))
        .unwrap();
        assert_eq!(workflow.stage, WorkflowStage::Writing);
        assert_eq!(workflow.extra.get("user_id"), Some(&json!("u9")));
        assert_eq!(workflow.progress_percent(), 37);
    }
}

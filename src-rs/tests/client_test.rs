//! HTTP client behavior against a wiremock backend.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use contentweaver_rs::api::{
    poller, submit_and_observe, DocumentUpload, ResearchRequest, SocialMediaRequest, StageRequest,
};
use contentweaver_rs::helpers::build_client;
use contentweaver_rs::{
    AgentOperation, ClientConfig, ClientError, ContentType, ContentWeaverClient, NoSession,
    PollPolicy, StaticToken, TaskStatus, WorkflowStage,
};

async fn client_for(server: &MockServer, token: Option<&str>) -> Arc<ContentWeaverClient> {
    let config = ClientConfig {
        base_url: format!("{}/api", server.uri()),
        request_timeout: Duration::from_secs(5),
        poll: PollPolicy::from_millis(10).unwrap(),
    };
    match token {
        Some(token) => build_client(&config, Arc::new(StaticToken::new(token))).unwrap(),
        None => build_client(&config, Arc::new(NoSession)).unwrap(),
    }
}

fn workflow_json(stage: &str, content_type: &str) -> serde_json::Value {
    json!({
        "id": "w1",
        "title": "Shipping async Rust",
        "content_type": content_type,
        "stage": stage,
        "created_at": "2024-05-01T10:00:00Z"
    })
}

#[tokio::test]
async fn get_task_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/agents/tasks/t1"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "t1",
            "status": "completed",
            "result": {"outline": ["intro"]}
        })))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server, Some("secret")).await;

    let task = client.get_task("t1").await.unwrap();

    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.result, Some(json!({"outline": ["intro"]})));
}

#[tokio::test]
async fn submissions_are_form_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/agents/research"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("topic=rust"))
        .and(body_string_contains("workflow_id=w1"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"taskId": "r-1"})))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server, None).await;

    let handle = client
        .research(&ResearchRequest {
            topic: "rust".to_string(),
            workflow_id: Some("w1".to_string()),
            depth: None,
        })
        .await
        .unwrap();

    assert_eq!(handle.task_id, "r-1");
}

#[tokio::test]
async fn every_operation_posts_to_its_endpoint() {
    let server = MockServer::start().await;
    for operation in AgentOperation::ALL {
        Mock::given(method("POST"))
            .and(path(format!("/api/agents/{}", operation.endpoint())))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"task_id": operation.endpoint()})),
            )
            .expect(1)
            .mount(&server)
            .await;
    }
    let client = client_for(&server, None).await;
    let stage = StageRequest {
        workflow_id: "w1".to_string(),
        instructions: None,
    };

    assert_eq!(client.write(&stage).await.unwrap().task_id, "write");
    assert_eq!(client.fact_check(&stage).await.unwrap().task_id, "fact-check");
    assert_eq!(client.edit(&stage).await.unwrap().task_id, "edit");
    assert_eq!(client.optimize_seo(&stage).await.unwrap().task_id, "seo-optimize");
    let social = SocialMediaRequest {
        workflow_id: "w1".to_string(),
        platform: "linkedin".to_string(),
    };
    assert_eq!(client.social_media(&social).await.unwrap().task_id, "social-media");
    for operation in [AgentOperation::StyleAnalysis, AgentOperation::Research, AgentOperation::ContentPlan] {
        let handle = client.submit(operation, &[("workflow_id", "w1")]).await.unwrap();
        assert_eq!(handle.task_id, operation.endpoint());
    }
}

#[tokio::test]
async fn non_success_status_maps_to_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/workflows/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;
    let client = client_for(&server, None).await;

    let err = client.get_workflow("missing").await.unwrap_err();

    assert!(err.is_not_found());
    match err {
        ClientError::Http { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn undecodable_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/agents/tasks/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;
    let client = client_for(&server, None).await;

    let err = client.get_task("t1").await.unwrap_err();

    assert!(matches!(err, ClientError::MalformedResponse(_)));
}

#[tokio::test]
async fn polling_over_http_reaches_completed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/agents/tasks/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "processing"})))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/agents/tasks/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "result": {"sources": 4}
        })))
        .mount(&server)
        .await;
    let client = client_for(&server, None).await;
    let mut observer = poller(&client).observe(Some("t1".to_string()));

    let state = tokio::time::timeout(Duration::from_secs(5), observer.wait_for_terminal())
        .await
        .unwrap();

    assert_eq!(state.status, TaskStatus::Completed);
    assert_eq!(state.result, Some(json!({"sources": 4})));
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn http_failure_while_polling_fails_the_task() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/agents/tasks/t1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server, None).await;
    let mut observer = poller(&client).observe(Some("t1".to_string()));

    let state = tokio::time::timeout(Duration::from_secs(5), observer.wait_for_terminal())
        .await
        .unwrap();

    assert_eq!(state.status, TaskStatus::Failed);
    assert!(state.error.unwrap().contains("http 500"));
}

#[tokio::test]
async fn submit_and_observe_follows_the_new_task() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/agents/style-analysis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": "s-9", "workflow_id": "w1"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/agents/tasks/s-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "failed",
            "error": "sample text too short"
        })))
        .mount(&server)
        .await;
    let client = client_for(&server, None).await;

    let (handle, mut observer) = submit_and_observe(
        &client,
        AgentOperation::StyleAnalysis,
        &[("sample_text", "hi")],
    )
    .await
    .unwrap();
    let state = tokio::time::timeout(Duration::from_secs(5), observer.wait_for_terminal())
        .await
        .unwrap();

    assert_eq!(handle.workflow_id.as_deref(), Some("w1"));
    assert_eq!(state.task_id.as_deref(), Some("s-9"));
    assert_eq!(state.error.as_deref(), Some("sample text too short"));
}

#[tokio::test]
async fn lists_accept_wrapped_collections_and_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/workflows"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"workflows": [workflow_json("research", "blog_article")]})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/sources"))
        .and(query_param("workflow_id", "w1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "s1", "title": "RFC 2616", "url": "https://example.org/rfc2616"}
        ])))
        .mount(&server)
        .await;
    let client = client_for(&server, None).await;

    let workflows = client.list_workflows().await.unwrap();
    let sources = client.list_sources(Some("w1")).await.unwrap();

    assert_eq!(workflows.len(), 1);
    assert_eq!(workflows[0].stage, WorkflowStage::Research);
    assert_eq!(sources[0].url.as_deref(), Some("https://example.org/rfc2616"));
}

#[tokio::test]
async fn advance_stage_skips_seo_for_linkedin_posts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/workflows/w1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(workflow_json("editing", "linkedin_post")))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/workflows/w1"))
        .and(body_partial_json(json!({"stage": "social"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(workflow_json("social", "linkedin_post")))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server, None).await;

    let workflow = client.advance_stage("w1").await.unwrap();

    assert_eq!(workflow.stage, WorkflowStage::Social);
    assert_eq!(workflow.content_type, ContentType::LinkedinPost);
}

#[tokio::test]
async fn upload_sends_multipart_and_delete_accepts_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/documents/upload"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(body_string_contains("notes.md"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "d1",
            "title": "Notes",
            "file_name": "notes.md"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/documents/d1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server, None).await;

    let document = client
        .upload_document(DocumentUpload {
            title: "Notes".to_string(),
            file_name: "notes.md".to_string(),
            mime_type: Some("text/markdown".to_string()),
            bytes: b"# draft".to_vec(),
            workflow_id: None,
        })
        .await
        .unwrap();
    client.delete_document(&document.id).await.unwrap();

    assert_eq!(document.file_name.as_deref(), Some("notes.md"));
}

#[tokio::test]
async fn empty_upload_is_rejected_before_sending() {
    let server = MockServer::start().await;
    let client = client_for(&server, None).await;

    let err = client
        .upload_document(DocumentUpload {
            title: "Empty".to_string(),
            file_name: "empty.txt".to_string(),
            mime_type: None,
            bytes: Vec::new(),
            workflow_id: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::InvalidInput(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn submission_accepts_full_task_record() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/agents/research"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "t1",
            "task_id": "t1",
            "status": "pending"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server, None).await;

    let handle = client
        .research(&ResearchRequest {
            topic: "tokio internals".to_string(),
            ..ResearchRequest::default()
        })
        .await
        .unwrap();

    assert_eq!(handle.task_id, "t1");
}

#[tokio::test]
async fn truncated_success_body_is_a_network_error() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let backend = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 4096];
        let _ = stream.read(&mut request).await.unwrap();
        stream
            .write_all(
                b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\n{\"status\":",
            )
            .await
            .unwrap();
        stream.shutdown().await.unwrap();
    });
    let config = ClientConfig {
        base_url: format!("http://{}/api", addr),
        request_timeout: Duration::from_secs(5),
        poll: PollPolicy::from_millis(10).unwrap(),
    };
    let client = build_client(&config, Arc::new(NoSession)).unwrap();

    let err = client.get_task("t1").await.unwrap_err();

    assert!(matches!(err, ClientError::Network(_)), "got {:?}", err);
    backend.await.unwrap();
}

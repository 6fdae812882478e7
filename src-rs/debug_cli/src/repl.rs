use std::sync::Arc;

use contentweaver_rs::api::{
    poller, ContentPlanRequest, NewWorkflow, ResearchRequest, SocialMediaRequest, StageRequest,
    StyleAnalysisRequest, TaskHandle,
};
use contentweaver_rs::helpers::{build_client, session_from_token};
use contentweaver_rs::{AgentOperation, ClientError, ContentType, ContentWeaverClient, TaskObserver};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::models::CLIConfig;
use crate::render;

pub struct REPL {
    pub config: CLIConfig,
    pub client: Arc<ContentWeaverClient>,
}

impl REPL {
    pub fn new(config: CLIConfig, client: Arc<ContentWeaverClient>) -> Self {
        Self { config, client }
    }

    pub async fn run(&mut self) {
        render::banner(&self.config);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            render::prompt();
            // once watch() has listened for Ctrl-C the default handler is gone,
            // so the prompt has to listen too
            let line = tokio::select! {
                read = lines.next_line() => match read {
                    Ok(Some(line)) => line,
                    Ok(None) | Err(_) => break,
                },
                _ = tokio::signal::ctrl_c() => {
                    println!();
                    break;
                }
            };
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('/') {
                if self.handle_command(&line).await {
                    break;
                }
                continue;
            }
            self.research(&line).await;
        }
    }

    async fn handle_command(&mut self, line: &str) -> bool {
        let mut parts = line.splitn(2, ' ');
        let cmd = parts.next().unwrap_or("").trim_start_matches('/');
        let rest = parts.next().unwrap_or("").trim();
        match cmd {
            "exit" | "quit" => return true,
            "help" => render::help(),
            "research" => {
                if rest.is_empty() {
                    render::error("usage: /research <topic>");
                } else {
                    self.research(rest).await;
                }
            }
            "style" => {
                if rest.is_empty() {
                    render::error("usage: /style <sample text>");
                } else {
                    let req = StyleAnalysisRequest {
                        sample_text: rest.to_string(),
                        workflow_id: None,
                    };
                    let submitted = self.client.analyze_style(&req).await;
                    self.follow(submitted).await;
                }
            }
            "plan" => match rest.split_once(' ') {
                Some((workflow_id, topic)) => self.plan(workflow_id, topic.trim()).await,
                None => render::error("usage: /plan <workflow_id> <topic>"),
            },
            "write" => self.stage(AgentOperation::Write, rest).await,
            "factcheck" => self.stage(AgentOperation::FactCheck, rest).await,
            "edit" => self.stage(AgentOperation::Edit, rest).await,
            "seo" => self.stage(AgentOperation::SeoOptimize, rest).await,
            "social" => {
                let mut args = rest.split_whitespace();
                match args.next() {
                    Some(workflow_id) => {
                        let req = SocialMediaRequest {
                            workflow_id: workflow_id.to_string(),
                            platform: args.next().unwrap_or("linkedin").to_string(),
                        };
                        let submitted = self.client.social_media(&req).await;
                        self.follow(submitted).await;
                    }
                    None => render::error("usage: /social <workflow_id> [platform]"),
                }
            }
            "task" => {
                if rest.is_empty() {
                    render::error("usage: /task <id>");
                } else {
                    let observer = poller(&self.client).observe(Some(rest.to_string()));
                    self.watch(observer).await;
                }
            }
            "workflows" => match self.client.list_workflows().await {
                Ok(items) => render::workflows(&items),
                Err(err) => render::error(&err.to_string()),
            },
            "workflow" => match self.client.get_workflow(rest).await {
                Ok(item) => render::workflow(&item),
                Err(err) => render::error(&err.to_string()),
            },
            "new" => self.create_workflow(rest).await,
            "advance" => match self.client.advance_stage(rest).await {
                Ok(item) => render::workflow(&item),
                Err(err) => render::error(&err.to_string()),
            },
            "delete" => match self.client.delete_workflow(rest).await {
                Ok(()) => render::info("workflow deleted"),
                Err(err) => render::error(&err.to_string()),
            },
            "documents" => match self.client.list_documents(optional(rest)).await {
                Ok(items) => render::documents(&items),
                Err(err) => render::error(&err.to_string()),
            },
            "sources" => match self.client.list_sources(optional(rest)).await {
                Ok(items) => render::sources(&items),
                Err(err) => render::error(&err.to_string()),
            },
            "config" => render::config(&self.config),
            "base" => {
                if rest.is_empty() {
                    render::info(&format!("base: {}", self.config.client.base_url));
                } else {
                    let previous = self.config.client.base_url.clone();
                    self.config.client.base_url = rest.to_string();
                    if self.rebuild_client() {
                        render::info("base url updated");
                    } else {
                        self.config.client.base_url = previous;
                    }
                }
            }
            "token" => {
                self.config.token = optional(rest).map(str::to_string);
                if self.rebuild_client() {
                    render::info("token updated");
                }
            }
            "interval" => match rest.parse::<u64>() {
                Ok(ms) => match self.config.set_interval(ms) {
                    Ok(()) => {
                        if self.rebuild_client() {
                            render::info("poll interval updated");
                        }
                    }
                    Err(err) => render::error(&err.to_string()),
                },
                Err(_) => render::info(&format!("interval: {}ms", self.config.interval().as_millis())),
            },
            _ => render::info("unknown command, type /help"),
        }
        false
    }

    fn rebuild_client(&mut self) -> bool {
        match build_client(&self.config.client, session_from_token(self.config.token.clone())) {
            Ok(client) => {
                debug!(base = %client.base_url(), "client rebuilt");
                self.client = client;
                true
            }
            Err(err) => {
                render::error(&err.to_string());
                false
            }
        }
    }

    async fn research(&mut self, topic: &str) {
        let req = ResearchRequest {
            topic: topic.to_string(),
            ..ResearchRequest::default()
        };
        let submitted = self.client.research(&req).await;
        self.follow(submitted).await;
    }

    async fn plan(&mut self, workflow_id: &str, topic: &str) {
        let workflow = match self.client.get_workflow(workflow_id).await {
            Ok(workflow) => workflow,
            Err(err) => return render::error(&err.to_string()),
        };
        let req = ContentPlanRequest {
            workflow_id: workflow.id,
            topic: topic.to_string(),
            content_type: workflow.content_type,
        };
        let submitted = self.client.plan_content(&req).await;
        self.follow(submitted).await;
    }

    async fn stage(&mut self, operation: AgentOperation, workflow_id: &str) {
        if workflow_id.is_empty() {
            return render::error(&format!("usage: /{} <workflow_id>", operation));
        }
        let req = StageRequest {
            workflow_id: workflow_id.to_string(),
            instructions: None,
        };
        let submitted = self.client.submit(operation, &req).await;
        self.follow(submitted).await;
    }

    async fn create_workflow(&mut self, rest: &str) {
        let Some((kind, title)) = rest.split_once(' ') else {
            return render::error("usage: /new <article|linkedin> <title>");
        };
        let content_type = match kind.parse::<ContentType>() {
            Ok(content_type) => content_type,
            Err(err) => return render::error(&err),
        };
        let new = NewWorkflow {
            title: title.trim().to_string(),
            content_type,
            topic: None,
        };
        match self.client.create_workflow(&new).await {
            Ok(item) => render::workflow(&item),
            Err(err) => render::error(&err.to_string()),
        }
    }

    async fn follow(&mut self, submitted: Result<TaskHandle, ClientError>) {
        match submitted {
            Ok(handle) => {
                render::submitted(&handle);
                let observer = poller(&self.client).observe(Some(handle.task_id));
                self.watch(observer).await;
            }
            Err(err) => render::error(&err.to_string()),
        }
    }

    /// Print every state change until the task ends or Ctrl-C is pressed.
    async fn watch(&self, mut observer: TaskObserver) {
        loop {
            tokio::select! {
                changed = observer.changed() => match changed {
                    Some(state) => {
                        render::poll_state(&state, self.config.debug);
                        if state.is_terminal() {
                            return;
                        }
                    }
                    None => return,
                },
                _ = tokio::signal::ctrl_c() => {
                    observer.cancel();
                    render::info("stopped watching");
                    return;
                }
            }
        }
    }
}

fn optional(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

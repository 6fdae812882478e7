use std::io::{self, Write};

use contentweaver_rs::api::{Document, Source, TaskHandle, Workflow};
use contentweaver_rs::{PollState, TaskStatus};

use crate::models::CLIConfig;

pub fn banner(cfg: &CLIConfig) {
    println!("ContentWeaver Debug CLI");
    println!("API: {}", cfg.client.base_url);
    println!("Poll interval: {}ms", cfg.interval().as_millis());
    println!("Type /help for commands.");
}

pub fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

pub fn help() {
    println!("Commands:");
    println!("  /help                          Show commands");
    println!("  /exit | /quit                  Exit");
    println!("  /research <topic>              Research a topic (plain text does the same)");
    println!("  /style <sample text>           Analyze writing style");
    println!("  /plan <workflow_id> <topic>    Plan content for a workflow");
    println!("  /write <workflow_id>           Write a draft");
    println!("  /factcheck <workflow_id>       Fact-check the draft");
    println!("  /edit <workflow_id>            Edit the draft");
    println!("  /seo <workflow_id>             Optimize for search");
    println!("  /social <workflow_id> [name]   Generate social posts (default linkedin)");
    println!("  /task <id>                     Watch an existing task");
    println!("  /workflows                     List workflows");
    println!("  /workflow <id>                 Show a workflow");
    println!("  /new <article|linkedin> <title> Create a workflow");
    println!("  /advance <id>                  Move a workflow to its next stage");
    println!("  /delete <id>                   Delete a workflow");
    println!("  /documents [workflow_id]       List documents");
    println!("  /sources [workflow_id]         List sources");
    println!("  /config                        Show current config");
    println!("  /base <url>                    Update base URL");
    println!("  /token <token>                 Update bearer token");
    println!("  /interval <ms>                 Update poll interval");
    println!("Ctrl-C stops watching a task, or exits at the prompt.");
}

pub fn submitted(handle: &TaskHandle) {
    match &handle.workflow_id {
        Some(workflow) => println!("task {} queued (workflow {})", handle.task_id, workflow),
        None => println!("task {} queued", handle.task_id),
    }
}

pub fn poll_state(state: &PollState, debug: bool) {
    let id = state.task_id.as_deref().unwrap_or("-");
    match state.status {
        TaskStatus::Completed => {
            println!("[{}] {}", state.status, id);
            if let Some(result) = &state.result {
                if debug {
                    println!("{}", serde_json::to_string_pretty(result).unwrap_or_default());
                } else {
                    println!("{}", summarize(result));
                }
            }
        }
        TaskStatus::Failed => {
            println!(
                "[{}] {}: {}",
                state.status,
                id,
                state.error.as_deref().unwrap_or("unknown error")
            );
        }
        _ => {
            let marker = if state.is_polling { "..." } else { "" };
            println!("[{}] {}{}", state.status, id, marker);
        }
    }
}

fn summarize(result: &serde_json::Value) -> String {
    let text = match result {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    if text.chars().count() > 400 {
        let cut: String = text.chars().take(400).collect();
        format!("{}... (use --debug for the full result)", cut)
    } else {
        text
    }
}

pub fn workflows(items: &[Workflow]) {
    if items.is_empty() {
        println!("no workflows");
        return;
    }
    for workflow in items {
        println!(
            "[{:>3}%] {} - {} ({}, {})",
            workflow.progress_percent(),
            workflow.id,
            workflow.title,
            workflow.content_type,
            workflow.stage
        );
    }
}

pub fn workflow(item: &Workflow) {
    println!("workflow {}", item.id);
    println!("  title: {}", item.title);
    println!("  type: {}", item.content_type);
    println!("  stage: {} ({}%)", item.stage, item.progress_percent());
    if let Some(topic) = &item.topic {
        println!("  topic: {}", topic);
    }
    if let Some(updated) = &item.updated_at {
        println!("  updated: {}", updated.to_rfc3339());
    }
    if let Some(content) = &item.content {
        println!("  content: {} chars", content.chars().count());
    }
}

pub fn documents(items: &[Document]) {
    if items.is_empty() {
        println!("no documents");
        return;
    }
    for doc in items {
        let file = doc.file_name.as_deref().unwrap_or("-");
        println!("{} - {} [{}]", doc.id, doc.title, file);
    }
}

pub fn sources(items: &[Source]) {
    if items.is_empty() {
        println!("no sources");
        return;
    }
    for source in items {
        println!("{} - {} {}", source.id, source.title, source.url.as_deref().unwrap_or(""));
    }
}

pub fn config(cfg: &CLIConfig) {
    println!("config:");
    println!("  base: {}", cfg.client.base_url);
    println!("  interval: {}ms", cfg.interval().as_millis());
    println!("  backoff: {:.2}", cfg.client.poll.backoff());
    match cfg.client.poll.max_duration() {
        Some(limit) => println!("  max poll: {}s", limit.as_secs()),
        None => println!("  max poll: unbounded"),
    }
    println!("  token: {}", if cfg.token.is_some() { "set" } else { "none" });
    println!("  debug: {}", cfg.debug);
}

pub fn info(msg: &str) {
    println!("{}", msg);
}

pub fn error(msg: &str) {
    eprintln!("error: {}", msg);
}

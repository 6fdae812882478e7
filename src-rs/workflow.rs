use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    BlogArticle,
    LinkedinPost,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::BlogArticle => "blog_article",
            ContentType::LinkedinPost => "linkedin_post",
        }
    }

    pub fn stages(self) -> Vec<WorkflowStage> {
        WorkflowStage::ALL
            .iter()
            .copied()
            .filter(|stage| stage.applies_to(self))
            .collect()
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "blog_article" | "article" | "blog" => Ok(ContentType::BlogArticle),
            "linkedin_post" | "linkedin" => Ok(ContentType::LinkedinPost),
            other => Err(format!("unknown content type: {}", other)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    StyleAnalysis,
    Research,
    Planning,
    Writing,
    FactCheck,
    Editing,
    Seo,
    Social,
    Completed,
}

impl WorkflowStage {
    pub const ALL: [WorkflowStage; 9] = [
        WorkflowStage::StyleAnalysis,
        WorkflowStage::Research,
        WorkflowStage::Planning,
        WorkflowStage::Writing,
        WorkflowStage::FactCheck,
        WorkflowStage::Editing,
        WorkflowStage::Seo,
        WorkflowStage::Social,
        WorkflowStage::Completed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowStage::StyleAnalysis => "style_analysis",
            WorkflowStage::Research => "research",
            WorkflowStage::Planning => "planning",
            WorkflowStage::Writing => "writing",
            WorkflowStage::FactCheck => "fact_check",
            WorkflowStage::Editing => "editing",
            WorkflowStage::Seo => "seo",
            WorkflowStage::Social => "social",
            WorkflowStage::Completed => "completed",
        }
    }

    pub fn index(self) -> usize {
        WorkflowStage::ALL
            .iter()
            .position(|stage| *stage == self)
            .unwrap_or(0)
    }

    pub fn is_final(self) -> bool {
        self == WorkflowStage::Completed
    }

    pub fn applies_to(self, content_type: ContentType) -> bool {
        !(self == WorkflowStage::Seo && content_type == ContentType::LinkedinPost)
    }

    /// The stage after this one for `content_type`; `Completed` stays put.
    pub fn next(self, content_type: ContentType) -> WorkflowStage {
        WorkflowStage::ALL
            .iter()
            .copied()
            .skip(self.index() + 1)
            .find(|stage| stage.applies_to(content_type))
            .unwrap_or(WorkflowStage::Completed)
    }

    pub fn progress_percent(self, content_type: ContentType) -> u8 {
        let stages = content_type.stages();
        let last = stages.len().saturating_sub(1).max(1);
        let pos = stages
            .iter()
            .position(|stage| *stage == self)
            .unwrap_or_else(|| stages.iter().filter(|stage| **stage < self).count());
        ((pos.min(last) * 100) / last) as u8
    }
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowStage {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
        WorkflowStage::ALL
            .iter()
            .copied()
            .find(|stage| stage.as_str() == normalized)
            .ok_or_else(|| format!("unknown workflow stage: {}", raw))
    }
}

/// Agent operations exposed by the submission endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AgentOperation {
    StyleAnalysis,
    Research,
    ContentPlan,
    Write,
    FactCheck,
    Edit,
    SeoOptimize,
    SocialMedia,
}

impl AgentOperation {
    pub const ALL: [AgentOperation; 8] = [
        AgentOperation::StyleAnalysis,
        AgentOperation::Research,
        AgentOperation::ContentPlan,
        AgentOperation::Write,
        AgentOperation::FactCheck,
        AgentOperation::Edit,
        AgentOperation::SeoOptimize,
        AgentOperation::SocialMedia,
    ];

    pub fn endpoint(self) -> &'static str {
        match self {
            AgentOperation::StyleAnalysis => "style-analysis",
            AgentOperation::Research => "research",
            AgentOperation::ContentPlan => "content-plan",
            AgentOperation::Write => "write",
            AgentOperation::FactCheck => "fact-check",
            AgentOperation::Edit => "edit",
            AgentOperation::SeoOptimize => "seo-optimize",
            AgentOperation::SocialMedia => "social-media",
        }
    }

    pub fn stage(self) -> WorkflowStage {
        match self {
            AgentOperation::StyleAnalysis => WorkflowStage::StyleAnalysis,
            AgentOperation::Research => WorkflowStage::Research,
            AgentOperation::ContentPlan => WorkflowStage::Planning,
            AgentOperation::Write => WorkflowStage::Writing,
            AgentOperation::FactCheck => WorkflowStage::FactCheck,
            AgentOperation::Edit => WorkflowStage::Editing,
            AgentOperation::SeoOptimize => WorkflowStage::Seo,
            AgentOperation::SocialMedia => WorkflowStage::Social,
        }
    }
}

impl fmt::Display for AgentOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

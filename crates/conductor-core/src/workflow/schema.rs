//! Workflow template schema.
//!
//! Templates are loaded from YAML (or built in) and are immutable afterwards:
//!
//! ```yaml
//! name: pipeline_a
//! display_name: "Pipeline A"
//! description: "Clean the text, then detect its language"
//! output_format: combined     # combined | separate
//! steps:
//!   - agent: agent-a-text-processor
//!     operation: clean
//!     input_field: text
//!   - agent: agent-d-language-detector
//!     operation: detect
//!     input_field: text
//!     depends_on: 0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ServerError;

/// How step results are folded into the workflow result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// One document: every step's result fields merged, plus the step list.
    #[default]
    Combined,
    /// The template name and the raw step results, unmerged.
    Separate,
}

/// One step of a template, bound to one agent and one operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSpec {
    #[serde(rename = "agent", alias = "agent_id", alias = "agentId")]
    pub agent_id: String,

    #[serde(default = "default_operation")]
    pub operation: String,

    /// Input field forwarded to the agent; the whole input when missing.
    #[serde(default = "default_input_field", alias = "inputField")]
    pub input_field: String,

    /// May run concurrently with neighbouring parallel steps.
    #[serde(default, alias = "parallel", alias = "parallelGroup")]
    pub parallel_group: bool,

    /// Index of an earlier step whose result fields feed this step's input.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "dependsOn")]
    pub depends_on: Option<usize>,
}

fn default_operation() -> String {
    "process".to_string()
}

fn default_input_field() -> String {
    "input".to_string()
}

impl StepSpec {
    pub fn new(agent_id: &str, operation: &str, input_field: &str) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            operation: operation.to_string(),
            input_field: input_field.to_string(),
            parallel_group: false,
            depends_on: None,
        }
    }

    pub fn parallel(mut self) -> Self {
        self.parallel_group = true;
        self
    }

    pub fn depends_on(mut self, index: usize) -> Self {
        self.depends_on = Some(index);
        self
    }

    /// Eligible for concurrent dispatch: parallel and without a dependency edge.
    pub fn is_independent(&self) -> bool {
        self.parallel_group && self.depends_on.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowTemplate {
    /// Lookup key.
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none", alias = "displayName")]
    pub display_name: Option<String>,

    #[serde(default)]
    pub description: String,

    pub steps: Vec<StepSpec>,

    #[serde(default, alias = "outputFormat")]
    pub output_format: OutputFormat,
}

impl WorkflowTemplate {
    /// Parse and validate a template from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ServerError> {
        let template: Self = serde_yaml::from_str(yaml)
            .map_err(|e| ServerError::Config(format!("Failed to parse template YAML: {}", e)))?;
        template.validate()?;
        Ok(template)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ServerError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ServerError::Config(format!(
                "Failed to read template file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml(&content)
            .map_err(|e| ServerError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// Structural checks done once at load time.
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.name.trim().is_empty() {
            return Err(ServerError::Config("template name is empty".to_string()));
        }
        if self.steps.is_empty() {
            return Err(ServerError::Config(format!(
                "template '{}' has no steps",
                self.name
            )));
        }
        for (index, step) in self.steps.iter().enumerate() {
            if step.agent_id.trim().is_empty() {
                return Err(ServerError::Config(format!(
                    "template '{}' step {} has no agent",
                    self.name, index
                )));
            }
            if let Some(dep) = step.depends_on {
                if dep >= index {
                    return Err(ServerError::Config(format!(
                        "template '{}' step {} depends on step {}, which does not precede it",
                        self.name, index, dep
                    )));
                }
            }
        }
        Ok(())
    }
}

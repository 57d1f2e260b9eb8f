//! Workflow Template Catalog: built-in templates plus optional YAML files.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ServerError;
use crate::workflow::schema::{OutputFormat, StepSpec, WorkflowTemplate};

/// Read-only lookup of templates by name.
#[derive(Debug, Clone, Default)]
pub struct WorkflowCatalog {
    templates: BTreeMap<String, WorkflowTemplate>,
}

impl WorkflowCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Catalog holding the built-in templates.
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        for template in builtin_templates() {
            catalog.templates.insert(template.name.clone(), template);
        }
        catalog
    }

    /// Built-ins, then every template found in `dir` when one is given.
    pub fn load(dir: Option<&str>) -> Result<Self, ServerError> {
        let mut catalog = Self::builtin();
        if let Some(dir) = dir {
            let n = catalog.load_dir(dir)?;
            tracing::info!("[Workflow] Loaded {} templates from '{}'", n, dir);
        }
        Ok(catalog)
    }

    /// Add a validated template. Names must be unique.
    pub fn insert(&mut self, template: WorkflowTemplate) -> Result<(), ServerError> {
        template.validate()?;
        if self.templates.contains_key(&template.name) {
            return Err(ServerError::Config(format!(
                "duplicate workflow template '{}'",
                template.name
            )));
        }
        self.templates.insert(template.name.clone(), template);
        Ok(())
    }

    /// Load every `*.yaml` / `*.yml` file in a directory.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize, ServerError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(ServerError::Config(format!(
                "Template directory '{}' does not exist",
                dir.display()
            )));
        }

        let mut paths = Vec::new();
        let entries = std::fs::read_dir(dir).map_err(|e| {
            ServerError::Config(format!(
                "Failed to read directory '{}': {}",
                dir.display(),
                e
            ))
        })?;
        for entry in entries {
            let path = entry
                .map_err(|e| ServerError::Config(format!("Directory entry error: {}", e)))?
                .path();
            match path.extension().and_then(|e| e.to_str()) {
                Some("yaml") | Some("yml") => paths.push(path),
                _ => continue,
            }
        }
        paths.sort();

        let count = paths.len();
        for path in paths {
            let template = WorkflowTemplate::from_file(&path)?;
            tracing::info!("[Workflow] Loaded template: {}", template.name);
            self.insert(template)?;
        }
        Ok(count)
    }

    pub fn get(&self, name: &str) -> Option<&WorkflowTemplate> {
        self.templates.get(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.templates.keys().cloned().collect()
    }

    pub fn list(&self) -> Vec<&WorkflowTemplate> {
        self.templates.values().collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn builtin_templates() -> Vec<WorkflowTemplate> {
    vec![
        WorkflowTemplate {
            name: "text_analysis_pipeline".to_string(),
            display_name: Some("Text Analysis Pipeline".to_string()),
            description: "Complete text analysis using multiple agents".to_string(),
            steps: vec![
                StepSpec::new("agent-a-text-processor", "clean", "text"),
                StepSpec::new("agent-d-language-detector", "detect", "text"),
                StepSpec::new("agent-c-sentiment-analyzer", "detailed", "text"),
            ],
            output_format: OutputFormat::Combined,
        },
        WorkflowTemplate {
            name: "math_text_combo".to_string(),
            display_name: Some("Math and Text Processing".to_string()),
            description: "Process mathematical expressions and analyze text".to_string(),
            steps: vec![
                StepSpec::new("agent-b-math-calculator", "calculate", "input").parallel(),
                StepSpec::new("agent-a-text-processor", "analyze", "input").parallel(),
            ],
            output_format: OutputFormat::Separate,
        },
        WorkflowTemplate {
            name: "multilingual_sentiment".to_string(),
            display_name: Some("Multilingual Sentiment Analysis".to_string()),
            description: "Detect language and analyze sentiment".to_string(),
            steps: vec![
                StepSpec::new("agent-d-language-detector", "detect", "text"),
                StepSpec::new("agent-c-sentiment-analyzer", "basic", "text").depends_on(0),
            ],
            output_format: OutputFormat::Combined,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_builtin_templates_are_valid() {
        let catalog = WorkflowCatalog::builtin();
        assert_eq!(catalog.len(), 3);
        for template in catalog.list() {
            template.validate().unwrap();
        }
        let sentiment = catalog.get("multilingual_sentiment").unwrap();
        assert_eq!(sentiment.steps[1].depends_on, Some(0));
        assert!(catalog.get("no_such_template").is_none());
    }

    #[test]
    fn test_load_dir_adds_yaml_templates() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("echo.yaml"),
            "name: echo_twice\nsteps:\n  - agent: echo\n  - agent: echo\n    depends_on: 0\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut catalog = WorkflowCatalog::builtin();
        let n = catalog.load_dir(dir.path()).unwrap();
        assert_eq!(n, 1);
        assert_eq!(catalog.len(), 4);
        assert!(catalog.names().contains(&"echo_twice".to_string()));
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("dup.yml"),
            "name: math_text_combo\nsteps:\n  - agent: math\n",
        )
        .unwrap();

        let err = WorkflowCatalog::load(dir.path().to_str()).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_missing_dir_is_a_config_error() {
        let mut catalog = WorkflowCatalog::empty();
        assert!(matches!(
            catalog.load_dir("/no/such/dir"),
            Err(ServerError::Config(_))
        ));
    }
}

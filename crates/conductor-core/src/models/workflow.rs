use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    Processing,
    Completed,
    Error,
}

impl WorkflowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Processing)
    }
}

/// Which step an aborted workflow stopped at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedStep {
    pub index: usize,
    pub agent_id: String,
    pub operation: String,
}

/// State of one accepted workflow run.
///
/// `status` moves `processing → completed | error` exactly once; the
/// transition methods ignore any later attempt to change a terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowInstance {
    pub id: String,
    pub template_name: String,
    pub status: WorkflowStatus,
    pub step_results: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_step: Option<FailedStep>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl WorkflowInstance {
    pub fn new(id: String, template_name: String) -> Self {
        Self {
            id,
            template_name,
            status: WorkflowStatus::Processing,
            step_results: Vec::new(),
            result: None,
            error: None,
            failed_step: None,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn complete(&mut self, result: serde_json::Value) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = WorkflowStatus::Completed;
        self.result = Some(result);
        self.completed_at = Some(Utc::now());
        true
    }

    pub fn fail(&mut self, error: impl Into<String>, failed_step: Option<FailedStep>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = WorkflowStatus::Error;
        self.error = Some(error.into());
        self.failed_step = failed_step;
        self.completed_at = Some(Utc::now());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states_are_never_revisited() {
        let mut wf = WorkflowInstance::new("wf-1".into(), "pipeline".into());
        assert!(wf.fail("boom", None));
        assert!(!wf.complete(serde_json::json!({ "x": 1 })));
        assert_eq!(wf.status, WorkflowStatus::Error);
        assert!(wf.result.is_none());
        assert!(!wf.fail("again", None));
        assert_eq!(wf.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_serializes_camel_case_without_empty_fields() {
        let wf = WorkflowInstance::new("wf-2".into(), "pipeline".into());
        let json = serde_json::to_value(&wf).unwrap();
        assert_eq!(json["templateName"], "pipeline");
        assert_eq!(json["status"], "processing");
        assert!(json.get("result").is_none());
        assert!(json.get("completedAt").is_none());
    }
}

//! Workflow Execution Engine.
//!
//! `submit` accepts a run and returns its id at once; the run itself executes
//! on a spawned task that first takes a permit from a semaphore sized by
//! `maxConcurrentWorkflows`. Each run owns its `WorkflowInstance` and
//! publishes a snapshot to the [`WorkflowStore`] after every transition.
//!
//! Steps are grouped into stages. A maximal run of consecutive independent
//! steps (`parallel_group` without `depends_on`) is one stage and fans out
//! on a `JoinSet`; every other step is a stage of its own. A stage starts
//! only after the previous one has fully completed, so a dependency's result
//! is always in `step_results` before its dependent starts.
//!
//! Any step failure aborts the run. Completed steps are not compensated.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Map, Value};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::client::RemoteTaskClient;
use crate::error::ServerError;
use crate::events::ProgressLog;
use crate::models::event::EventKind;
use crate::models::workflow::{FailedStep, WorkflowInstance};
use crate::store::WorkflowStore;
use crate::workflow::catalog::WorkflowCatalog;
use crate::workflow::merge;
use crate::workflow::schema::{StepSpec, WorkflowTemplate};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Stage {
    Single(usize),
    Parallel(Vec<usize>),
}

fn plan(steps: &[StepSpec]) -> Vec<Stage> {
    let mut stages = Vec::new();
    let mut run: Vec<usize> = Vec::new();
    for (i, step) in steps.iter().enumerate() {
        if step.is_independent() {
            run.push(i);
            continue;
        }
        flush(&mut stages, &mut run);
        stages.push(Stage::Single(i));
    }
    flush(&mut stages, &mut run);
    stages
}

fn flush(stages: &mut Vec<Stage>, run: &mut Vec<usize>) {
    match run.len() {
        0 => {}
        1 => stages.push(Stage::Single(run[0])),
        _ => stages.push(Stage::Parallel(std::mem::take(run))),
    }
    run.clear();
}

struct StepFailure {
    index: usize,
    error: ServerError,
}

#[derive(Clone)]
pub struct WorkflowEngine {
    catalog: Arc<WorkflowCatalog>,
    client: RemoteTaskClient,
    store: WorkflowStore,
    log: ProgressLog,
    permits: Arc<Semaphore>,
    task_timeout: Duration,
}

impl WorkflowEngine {
    pub fn new(
        catalog: Arc<WorkflowCatalog>,
        client: RemoteTaskClient,
        store: WorkflowStore,
        log: ProgressLog,
        max_concurrent: usize,
    ) -> Self {
        let task_timeout = client.default_timeout();
        Self {
            catalog,
            client,
            store,
            log,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            task_timeout,
        }
    }

    pub fn catalog(&self) -> &WorkflowCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &WorkflowStore {
        &self.store
    }

    /// Permits currently free; equals `maxConcurrentWorkflows` when idle.
    pub fn available_slots(&self) -> usize {
        self.permits.available_permits()
    }

    /// Accept a run and return its id. Execution continues in the background.
    pub async fn submit(&self, template_name: &str, input: Value) -> Result<String, ServerError> {
        let (instance, template, input) = self.accept(template_name, input).await?;
        let id = instance.id.clone();
        if let Some(template) = template {
            let engine = self.clone();
            tokio::spawn(async move {
                engine.execute(instance, template, input).await;
            });
        }
        Ok(id)
    }

    /// Accept and execute a run on the caller's task, returning the terminal
    /// instance.
    pub async fn run(&self, template_name: &str, input: Value) -> Result<WorkflowInstance, ServerError> {
        let (instance, template, input) = self.accept(template_name, input).await?;
        match template {
            Some(template) => Ok(self.execute(instance, template, input).await),
            None => Ok(instance),
        }
    }

    /// Poll the store until the run is terminal or `timeout` elapses.
    pub async fn wait(&self, workflow_id: &str, timeout: Duration) -> Option<WorkflowInstance> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let current = self.store.get(workflow_id).await?;
            if current.status.is_terminal() || tokio::time::Instant::now() >= deadline {
                return Some(current);
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    /// Create and publish the instance. An unknown template fails it here,
    /// before anything is dispatched.
    async fn accept(
        &self,
        template_name: &str,
        input: Value,
    ) -> Result<(WorkflowInstance, Option<WorkflowTemplate>, Map<String, Value>), ServerError> {
        let input = match input {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(ServerError::BadRequest(format!(
                    "workflow input must be an object, got {}",
                    other
                )))
            }
        };

        let mut instance = WorkflowInstance::new(
            uuid::Uuid::new_v4().to_string(),
            template_name.to_string(),
        );
        let id = instance.id.clone();
        self.store.publish(&instance).await;
        self.log
            .record(
                &id,
                EventKind::Processing,
                format!("Starting workflow: {}", template_name),
                None,
            )
            .await;

        let Some(template) = self.catalog.get(template_name).cloned() else {
            let err = ServerError::UnknownWorkflowType(template_name.to_string());
            tracing::warn!("[Workflow] {} rejected: {}", id, err);
            instance.fail(err.to_string(), None);
            self.store.publish(&instance).await;
            self.log.record(&id, EventKind::Error, err.to_string(), None).await;
            return Ok((instance, None, input));
        };

        tracing::info!("[Workflow] Accepted {} ({})", id, template.name);
        Ok((instance, Some(template), input))
    }

    async fn execute(
        &self,
        mut instance: WorkflowInstance,
        template: WorkflowTemplate,
        input: Map<String, Value>,
    ) -> WorkflowInstance {
        let _permit = match self.permits.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                instance.fail(format!("worker pool unavailable: {}", e), None);
                self.store.publish(&instance).await;
                return instance;
            }
        };

        let id = instance.id.clone();
        self.log
            .record(
                &id,
                EventKind::Processing,
                format!("Executing workflow: {}", template.label()),
                Some(json!({ "steps": template.steps.len() })),
            )
            .await;

        for stage in plan(&template.steps) {
            let outcome = match stage {
                Stage::Single(i) => {
                    let step_input = merge::step_input(&input, &template.steps[i], &instance.step_results);
                    self.run_step(&id, i, &template.steps[i], step_input)
                        .await
                        .map(|r| vec![r])
                        .map_err(|error| (Vec::new(), StepFailure { index: i, error }))
                }
                Stage::Parallel(indices) => self.run_parallel(&id, &template, &input, indices).await,
            };

            match outcome {
                Ok(results) => {
                    instance.step_results.extend(results);
                    self.store.publish(&instance).await;
                }
                Err((completed, failure)) => {
                    instance.step_results.extend(completed);
                    return self.abort(instance, &template, failure).await;
                }
            }
        }

        let result = merge::aggregate(&template, &instance.step_results);
        instance.complete(result.clone());
        self.store.publish(&instance).await;
        tracing::info!("[Workflow] {} completed", id);
        self.log
            .record(
                &id,
                EventKind::Completed,
                "Workflow completed successfully",
                Some(result),
            )
            .await;
        instance
    }

    /// Fan out a parallel stage. On failure, returns the results of the
    /// steps before the first failed index, in step order.
    async fn run_parallel(
        &self,
        id: &str,
        template: &WorkflowTemplate,
        input: &Map<String, Value>,
        indices: Vec<usize>,
    ) -> Result<Vec<Value>, (Vec<Value>, StepFailure)> {
        let mut tasks = JoinSet::new();
        for &i in &indices {
            let engine = self.clone();
            let step = template.steps[i].clone();
            let step_input = input.clone();
            let id = id.to_string();
            tasks.spawn(async move {
                let outcome = engine.run_step(&id, i, &step, step_input).await;
                (i, outcome)
            });
        }

        let mut outcomes: Vec<(usize, Result<Value, ServerError>)> = Vec::with_capacity(indices.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    tracing::error!("[Workflow] {} step task panicked: {}", id, e);
                }
            }
        }
        outcomes.sort_by_key(|(i, _)| *i);

        let mut results = Vec::with_capacity(indices.len());
        for &i in &indices {
            match outcomes.iter().position(|(idx, _)| *idx == i) {
                Some(pos) => match std::mem::replace(&mut outcomes[pos].1, Ok(Value::Null)) {
                    Ok(value) => results.push(value),
                    Err(error) => return Err((results, StepFailure { index: i, error })),
                },
                None => {
                    let error = ServerError::Internal(format!("step {} did not report", i + 1));
                    return Err((results, StepFailure { index: i, error }));
                }
            }
        }
        Ok(results)
    }

    async fn run_step(
        &self,
        id: &str,
        index: usize,
        step: &StepSpec,
        step_input: Map<String, Value>,
    ) -> Result<Value, ServerError> {
        self.log
            .record(
                id,
                EventKind::Processing,
                format!("Step {}: {} - {}", index + 1, step.agent_id, step.operation),
                None,
            )
            .await;

        let payload = merge::step_payload(step, step_input);
        let handle = self.client.dispatch(&step.agent_id, payload).await?;

        self.log
            .record(
                id,
                EventKind::Processing,
                format!(
                    "Waiting for {} to complete task {}",
                    step.agent_id, handle.remote_task_id
                ),
                Some(json!({ "taskId": handle.remote_task_id })),
            )
            .await;

        let result = self.client.await_completion(&handle, self.task_timeout).await?;

        self.log
            .record(
                id,
                EventKind::Processing,
                format!("Step {} completed successfully", index + 1),
                None,
            )
            .await;
        Ok(result)
    }

    async fn abort(
        &self,
        mut instance: WorkflowInstance,
        template: &WorkflowTemplate,
        failure: StepFailure,
    ) -> WorkflowInstance {
        let step = &template.steps[failure.index];
        let message = format!(
            "Step {} ({} - {}) failed: {}",
            failure.index + 1,
            step.agent_id,
            step.operation,
            failure.error
        );
        tracing::warn!("[Workflow] {} aborted: {}", instance.id, message);

        instance.fail(
            message.clone(),
            Some(FailedStep {
                index: failure.index,
                agent_id: step.agent_id.clone(),
                operation: step.operation.clone(),
            }),
        );
        self.store.publish(&instance).await;
        self.log
            .record(
                &instance.id,
                EventKind::Error,
                message,
                Some(json!({ "step": failure.index, "agent": step.agent_id })),
            )
            .await;
        instance
    }
}

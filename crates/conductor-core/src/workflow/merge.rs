//! Pure data plumbing between steps: step input, remote payload and the
//! final aggregated result.

use serde_json::{json, Map, Value};

use crate::workflow::schema::{OutputFormat, StepSpec, WorkflowTemplate};

/// The `result` member of a step's terminal status document.
fn result_of(step_result: &Value) -> Option<&Value> {
    step_result.get("result")
}

/// Copy of the workflow input, shallow-merged with the dependency's result
/// fields when the step has a `depends_on` edge. Dependency fields win.
pub fn step_input(
    input: &Map<String, Value>,
    step: &StepSpec,
    step_results: &[Value],
) -> Map<String, Value> {
    let mut merged = input.clone();
    if let Some(Value::Object(fields)) = step
        .depends_on
        .and_then(|k| step_results.get(k))
        .and_then(result_of)
    {
        for (key, value) in fields {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// `tasks.send` params: the operation plus the step's input field, or the
/// whole input under that field name when it is absent.
pub fn step_payload(step: &StepSpec, input: Map<String, Value>) -> Value {
    let value = match input.get(&step.input_field) {
        Some(v) => v.clone(),
        None => Value::Object(input),
    };
    let mut payload = Map::new();
    payload.insert("operation".to_string(), Value::String(step.operation.clone()));
    payload.insert(step.input_field.clone(), value);
    Value::Object(payload)
}

/// Final workflow result for the template's output format.
pub fn aggregate(template: &WorkflowTemplate, step_results: &[Value]) -> Value {
    match template.output_format {
        OutputFormat::Separate => json!({
            "workflow": template.name,
            "individual_results": step_results,
        }),
        OutputFormat::Combined => {
            let mut combined = Map::new();
            for (i, step_result) in step_results.iter().enumerate() {
                match result_of(step_result) {
                    Some(Value::Object(fields)) => {
                        for (key, value) in fields {
                            combined.insert(key.clone(), value.clone());
                        }
                    }
                    Some(other) => {
                        combined.insert(format!("step_{}_result", i + 1), other.clone());
                    }
                    None => {}
                }
            }
            combined.insert("workflow".to_string(), Value::String(template.name.clone()));
            combined.insert("steps".to_string(), Value::Array(step_results.to_vec()));
            Value::Object(combined)
        }
    }
}

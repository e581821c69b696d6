//! Template resolution for `{{ inputs.KEY }}` placeholders

use crate::core::{inputs::Inputs, pipeline::Pipeline, step::Params};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::debug;

fn input_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\{\{\s*inputs\.([^\s{}]+)\s*\}\}$").expect("input template pattern is valid")
    })
}

fn list_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\{\{\s*(?:inputs\.)?([^\s{}]+)\s*\}\}$").expect("list template pattern is valid")
    })
}

/// Inputs key referenced by a string of the exact form `{{ inputs.KEY }}`
pub fn template_key(value: &str) -> Option<&str> {
    input_pattern()
        .captures(value)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Inputs key named by a `params_list` expression
///
/// Accepts `{{ inputs.KEY }}`, `{{ KEY }}` or a bare `KEY`.
pub fn list_key(expression: &str) -> String {
    let expression = expression.trim();
    if let Some(key) = list_pattern().captures(expression).and_then(|caps| caps.get(1)) {
        return key.as_str().to_string();
    }
    expression
        .strip_prefix("inputs.")
        .unwrap_or(expression)
        .to_string()
}

/// Substitute a single value; `None` when it is not a template
///
/// A template naming a missing key resolves to `null`.
pub fn resolve_value(value: &Value, inputs: &Inputs) -> Option<Value> {
    let key = template_key(value.as_str()?)?;
    Some(inputs.get(key).cloned().unwrap_or(Value::Null))
}

/// Resolve top-level string params in place, returning how many were substituted
///
/// Nested lists and mappings are left untouched.
pub fn resolve_params(params: &mut Params, inputs: &Inputs) -> usize {
    let mut resolved = 0;
    for (key, value) in params.iter_mut() {
        if let Some(new_value) = resolve_value(value, inputs) {
            debug!("Template match: key={} raw={} resolved={}", key, value, new_value);
            *value = new_value;
            resolved += 1;
        }
    }
    resolved
}

/// Resolve every step's params against the inputs
pub fn resolve_pipeline(pipeline: &mut Pipeline, inputs: &Inputs) -> usize {
    debug!("Starting template resolution for pipeline {}", pipeline.name);
    let mut total = 0;
    for step in &mut pipeline.steps {
        if let Some(params) = step.params.as_mut() {
            let count = resolve_params(params, inputs);
            if count > 0 {
                debug!("Resolved {} template(s) in step {}", count, step.name);
            }
            total += count;
        }
    }
    debug!("Template resolution completed ({} substitution(s))", total);
    total
}

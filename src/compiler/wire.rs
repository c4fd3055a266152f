use crate::error::SerializationError;
use crate::schema::ParamsSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The declarative graph consumed by the remote execution engine.
///
/// Field order is the wire order; every map keeps insertion order so repeated
/// compilations of the same chain produce byte-identical JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledChain {
    pub studio_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub params_schema: CompiledParamsSchema,
    pub transformations: CompiledTransformations,
    #[serde(default)]
    pub publicly_triggerable: bool,
    #[serde(default)]
    pub public: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompiledParamsSchema {
    pub properties: ParamsSchema,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledTransformations {
    pub steps: Vec<CompiledStep>,
    #[serde(default)]
    pub output: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledStep {
    pub name: String,
    pub transformation: String,
    pub params: serde_json::Map<String, Value>,
    /// `Some(Value::Null)` is the literal condition `null`, which is emitted.
    #[serde(
        rename = "if",
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub condition: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreach: Option<Value>,
}

/// Keeps an explicit `null` as `Some(Value::Null)` instead of `None`.
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl CompiledChain {
    pub fn to_value(&self) -> Result<Value, SerializationError> {
        serde_json::to_value(self).map_err(|e| SerializationError::Json(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, SerializationError> {
        serde_json::to_string(self).map_err(|e| SerializationError::Json(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String, SerializationError> {
        serde_json::to_string_pretty(self).map_err(|e| SerializationError::Json(e.to_string()))
    }

    /// Parses a previously compiled chain, e.g. one written by the CLI.
    pub fn from_json(json: &str) -> Result<Self, SerializationError> {
        serde_json::from_str(json).map_err(|e| SerializationError::Json(e.to_string()))
    }

    pub fn steps(&self) -> &[CompiledStep] {
        &self.transformations.steps
    }

    pub fn step(&self, name: &str) -> Option<&CompiledStep> {
        self.transformations.steps.iter().find(|step| step.name == name)
    }

    pub fn output(&self) -> &Value {
        &self.transformations.output
    }
}

impl CompiledStep {
    /// Names of the steps this step reads from, in first-reference order.
    ///
    /// Scans every template string in `params`, `if` and `foreach` for
    /// `{{steps.<name>...}}` roots.
    pub fn dependencies(&self) -> Vec<String> {
        let mut found = Vec::new();
        for value in self.params.values() {
            collect_step_roots(value, &mut found);
        }
        for value in self.condition.iter().chain(self.foreach.iter()) {
            collect_step_roots(value, &mut found);
        }
        found
    }

    /// All `{{...}}` paths used by this step, in walk order.
    pub fn template_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        for value in self
            .params
            .values()
            .chain(self.condition.iter())
            .chain(self.foreach.iter())
        {
            collect_template_paths(value, &mut paths);
        }
        paths
    }
}

fn collect_step_roots(value: &Value, found: &mut Vec<String>) {
    let mut paths = Vec::new();
    collect_template_paths(value, &mut paths);
    for path in paths {
        let Some(rest) = path.strip_prefix("steps.") else {
            continue;
        };
        let end = rest
            .find(|c: char| c == '.' || c == '[')
            .unwrap_or(rest.len());
        let name = &rest[..end];
        if !name.is_empty() && !found.iter().any(|existing| existing == name) {
            found.push(name.to_string());
        }
    }
}

fn collect_template_paths(value: &Value, paths: &mut Vec<String>) {
    match value {
        Value::String(text) => paths.extend(template_paths_in(text)),
        Value::Array(items) => items.iter().for_each(|item| collect_template_paths(item, paths)),
        Value::Object(map) => map.values().for_each(|item| collect_template_paths(item, paths)),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// Extracts the trimmed contents of every `{{ ... }}` in `text`.
pub fn template_paths_in(text: &str) -> Vec<String> {
    let mut paths = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find("{{") {
        let after_open = &rest[start + 2..];
        let Some(end) = after_open.find("}}") else {
            break;
        };
        let path = after_open[..end].trim();
        if !path.is_empty() {
            paths.push(path.to_string());
        }
        rest = &after_open[end + 2..];
    }
    paths
}

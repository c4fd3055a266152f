//! Compiles a [`Chain`] into the wire-format graph.
//!
//! Compilation is a pure deep walk over the builder's state. Mappings and
//! sequences keep their key/element order, literals pass through unchanged,
//! and every [`Reference`] leaf becomes its `{{path}}` template string. The
//! walk is structural: no transformation is special-cased.

use crate::chain::{Chain, Condition, IterationSource, Output, Step};
use crate::error::SerializationError;
use crate::reference::Reference;
use crate::value::{Param, ParamMap};
use serde_json::{Map, Number, Value};
use tracing::debug;

mod wire;

pub use wire::*;

/// Compiles `chain` without mutating it. Repeated calls yield identical output.
pub fn compile(chain: &Chain) -> Result<CompiledChain, SerializationError> {
    let steps = chain
        .steps()
        .iter()
        .enumerate()
        .map(|(index, step)| compile_step(step, &format!("transformations.steps[{}]", index)))
        .collect::<Result<Vec<_>, _>>()?;

    let output = compile_output(chain)?;

    debug!(
        studio_id = chain.studio_id(),
        steps = steps.len(),
        "compiled chain"
    );

    Ok(CompiledChain {
        studio_id: chain.studio_id().to_string(),
        title: chain.title().to_string(),
        description: chain.description().to_string(),
        params_schema: CompiledParamsSchema {
            properties: chain.params_schema().cloned().unwrap_or_default(),
        },
        transformations: CompiledTransformations { steps, output },
        publicly_triggerable: chain.is_publicly_triggerable(),
        public: chain.is_public(),
    })
}

fn compile_step(step: &Step, location: &str) -> Result<CompiledStep, SerializationError> {
    let params = substitute_map(step.params(), &format!("{}.params", location))?;

    let condition = step.condition().map(|condition| match condition {
        Condition::Literal(b) => Value::Bool(*b),
        Condition::Null => Value::Null,
        Condition::Ref(reference) => template(reference),
    });

    let foreach = step
        .iteration_source()
        .map(|source| match source {
            IterationSource::Ref(reference) => Ok(template(reference)),
            IterationSource::Items(items) => {
                substitute_array(items, &format!("{}.foreach", location))
            }
        })
        .transpose()?;

    Ok(CompiledStep {
        name: step.name().to_string(),
        transformation: step.transformation().to_string(),
        params,
        condition,
        foreach,
    })
}

/// The defined output, or the last step's result when none was defined.
fn compile_output(chain: &Chain) -> Result<Value, SerializationError> {
    const LOCATION: &str = "transformations.output";
    match chain.output() {
        Some(Output::Mapping(map)) => substitute_map(map, LOCATION).map(Value::Object),
        Some(Output::Ref(reference)) => Ok(template(reference)),
        Some(Output::Null) => Ok(Value::Null),
        None => Ok(chain
            .steps()
            .last()
            .map(|step| template(&step.result_reference()))
            .unwrap_or(Value::Null)),
    }
}

fn template(reference: &Reference) -> Value {
    Value::String(reference.to_template_string())
}

fn substitute_map(map: &ParamMap, location: &str) -> Result<Map<String, Value>, SerializationError> {
    let mut compiled = Map::with_capacity(map.len());
    for (key, value) in map {
        let value = substitute(value, &format!("{}.{}", location, key))?;
        compiled.insert(key.clone(), value);
    }
    Ok(compiled)
}

fn substitute_array(items: &[Param], location: &str) -> Result<Value, SerializationError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| substitute(item, &format!("{}[{}]", location, index)))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

/// Replaces every reference in `param` with its template string.
pub fn substitute(param: &Param, location: &str) -> Result<Value, SerializationError> {
    match param {
        Param::Null => Ok(Value::Null),
        Param::Bool(b) => Ok(Value::Bool(*b)),
        Param::Integer(n) => Ok(Value::Number(Number::from(*n))),
        Param::Unsigned(n) => Ok(Value::Number(Number::from(*n))),
        Param::Float(n) => {
            Number::from_f64(*n)
                .map(Value::Number)
                .ok_or_else(|| SerializationError::NonFiniteNumber {
                    path: location.to_string(),
                    value: *n,
                })
        }
        Param::String(s) => Ok(Value::String(s.clone())),
        Param::Array(items) => substitute_array(items, location),
        Param::Object(map) => substitute_map(map, location).map(Value::Object),
        Param::Ref(reference) => Ok(template(reference)),
    }
}

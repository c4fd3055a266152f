use super::Chain;
use crate::error::DefinitionError;
use crate::params;
use crate::reference::Reference;
use itertools::Itertools;
use tracing::debug;

/// Transformation id of the remote step that evaluates inline code.
pub const CODE_TRANSFORMATION: &str = "js_code_transformation";

impl Chain {
    /// Adds a step that runs `function_source` in the remote code sandbox.
    ///
    /// `function_source` is the text of a function expression in the sandbox
    /// language (e.g. `({ answer }) => answer.toUpperCase()`). It is called
    /// with one object whose keys are those of `inputs`, each bound to the
    /// referenced value. Paths are rendered with null-safe accessors so a
    /// missing intermediate value yields `undefined` instead of a crash.
    ///
    /// Returns the output reference of the generated step; the function's
    /// return value is available under its `transformed` field.
    pub fn embed_code<K, R>(
        &mut self,
        inputs: impl IntoIterator<Item = (K, R)>,
        function_source: &str,
    ) -> Result<Reference, DefinitionError>
    where
        K: Into<String>,
        R: Into<Reference>,
    {
        let function_source = function_source.trim();
        if function_source.is_empty() {
            return Err(DefinitionError::EmptyCode);
        }

        let inputs: Vec<(String, Reference)> = inputs
            .into_iter()
            .map(|(key, reference)| (key.into(), reference.into()))
            .collect();
        debug!(inputs = inputs.len(), "embedding inline code step");

        let code = render_inline_code(&inputs, function_source);
        self.add_step(CODE_TRANSFORMATION, params! { "code" => code })
    }
}

/// Wraps `function_source` in a self-invoking closure fed by `inputs`.
fn render_inline_code(inputs: &[(String, Reference)], function_source: &str) -> String {
    let object_content = inputs
        .iter()
        .map(|(key, reference)| {
            format!(
                "{}: {}",
                serde_json::Value::String(key.clone()),
                reference.to_optional_path()
            )
        })
        .join(", ");

    format!(
        "return (() => {{\n  const _$$params = {{ {} }};\n  return ({})(_$$params);\n}})();",
        object_content, function_source
    )
}

//! Human-readable tree rendering of a compiled chain.

use crate::compiler::{CompiledChain, CompiledStep};
use itertools::Itertools;
use serde_json::Value;
use std::fmt;

/// Renders a [`CompiledChain`] as an indented tree, one branch per step.
///
/// ```text
/// pdf-qa (Ask questions about a short PDF)
/// ├── pdf_to_text [pdf_to_text]
/// │   └── pdf_url: {{params.pdf_url}}
/// └── prompt_completion [prompt_completion]
///     ├── if: {{params.enabled}}
///     └── prompt: "..."
/// ```
pub struct DisplayChain<'a> {
    pub chain: &'a CompiledChain,
}

impl<'a> DisplayChain<'a> {
    pub fn new(chain: &'a CompiledChain) -> Self {
        Self { chain }
    }

    fn fmt_step(
        &self,
        f: &mut fmt::Formatter<'_>,
        step: &CompiledStep,
        prefix: &str,
        is_last: bool,
    ) -> fmt::Result {
        let node_marker = if is_last { "└── " } else { "├── " };
        writeln!(f, "{}{}{} [{}]", prefix, node_marker, step.name, step.transformation)?;

        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
        let mut lines: Vec<(String, String)> = Vec::new();
        if let Some(condition) = &step.condition {
            lines.push(("if".to_string(), summarize(condition)));
        }
        if let Some(source) = &step.foreach {
            lines.push(("foreach".to_string(), summarize(source)));
        }
        for (key, value) in &step.params {
            lines.push((key.clone(), summarize(value)));
        }

        let count = lines.len();
        for (i, (key, value)) in lines.into_iter().enumerate() {
            let marker = if i + 1 == count { "└── " } else { "├── " };
            writeln!(f, "{}{}{}: {}", child_prefix, marker, key, value)?;
        }
        Ok(())
    }
}

impl<'a> fmt::Display for DisplayChain<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.chain.title.is_empty() {
            writeln!(f, "{}", self.chain.studio_id)?;
        } else {
            writeln!(f, "{} ({})", self.chain.studio_id, self.chain.title)?;
        }

        let steps = self.chain.steps();
        for (i, step) in steps.iter().enumerate() {
            self.fmt_step(f, step, "", i + 1 == steps.len())?;
        }
        write!(f, "output: {}", summarize(self.chain.output()))
    }
}

const MAX_INLINE_LEN: usize = 60;

/// One-line rendering of a wire value, truncating long text.
fn summarize(value: &Value) -> String {
    match value {
        Value::String(text) if text.starts_with("{{") && text.ends_with("}}") => text.clone(),
        Value::String(text) => {
            let flat = text.replace('\n', "\\n");
            if flat.chars().count() > MAX_INLINE_LEN {
                let cut: String = flat.chars().take(MAX_INLINE_LEN).collect();
                format!("\"{}...\"", cut)
            } else {
                format!("\"{}\"", flat)
            }
        }
        Value::Object(map) => {
            let entries = map
                .iter()
                .map(|(key, value)| format!("{}: {}", key, summarize(value)))
                .join(", ");
            format!("{{ {} }}", entries)
        }
        other => other.to_string(),
    }
}

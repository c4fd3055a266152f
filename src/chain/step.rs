use crate::reference::Reference;
use crate::value::{Param, ParamMap};
use ahash::{AHashMap, AHashSet};
use std::fmt;

/// One configured invocation of a transformation.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub(crate) name: String,
    pub(crate) transformation: String,
    pub(crate) params: ParamMap,
    pub(crate) condition: Option<Condition>,
    pub(crate) foreach: Option<IterationSource>,
}

impl Step {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transformation(&self) -> &str {
        &self.transformation
    }

    pub fn params(&self) -> &ParamMap {
        &self.params
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    pub fn iteration_source(&self) -> Option<&IterationSource> {
        self.foreach.as_ref()
    }

    pub fn is_iterated(&self) -> bool {
        self.foreach.is_some()
    }

    /// `steps.<name>.results` for iterated steps, `steps.<name>.output` otherwise.
    pub fn result_reference(&self) -> Reference {
        if self.is_iterated() {
            Reference::step_results(&self.name)
        } else {
            Reference::step_output(&self.name)
        }
    }
}

/// The run condition attached to steps added inside `with_condition`.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Literal(bool),
    Null,
    Ref(Reference),
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Literal(b) => write!(f, "{}", b),
            Condition::Null => write!(f, "null"),
            Condition::Ref(reference) => write!(f, "{}", reference.to_template_string()),
        }
    }
}

impl From<bool> for Condition {
    fn from(value: bool) -> Self {
        Condition::Literal(value)
    }
}

impl From<Option<bool>> for Condition {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Condition::Null, Condition::Literal)
    }
}

impl From<Reference> for Condition {
    fn from(value: Reference) -> Self {
        Condition::Ref(value)
    }
}

impl From<&Reference> for Condition {
    fn from(value: &Reference) -> Self {
        Condition::Ref(value.clone())
    }
}

/// The array an iterated step runs over.
#[derive(Debug, Clone, PartialEq)]
pub enum IterationSource {
    Items(Vec<Param>),
    Ref(Reference),
}

impl fmt::Display for IterationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IterationSource::Items(items) => write!(f, "[{} items]", items.len()),
            IterationSource::Ref(reference) => write!(f, "{}", reference.to_template_string()),
        }
    }
}

impl From<Reference> for IterationSource {
    fn from(value: Reference) -> Self {
        IterationSource::Ref(value)
    }
}

impl From<&Reference> for IterationSource {
    fn from(value: &Reference) -> Self {
        IterationSource::Ref(value.clone())
    }
}

impl<T: Into<Param>> From<Vec<T>> for IterationSource {
    fn from(items: Vec<T>) -> Self {
        IterationSource::Items(items.into_iter().map(Into::into).collect())
    }
}

/// Allocates unique step names.
///
/// The first step of a transformation is named after it; the k-th is named
/// `<transformation>_k`. Earlier steps are never renamed.
#[derive(Debug, Clone, Default)]
pub(crate) struct StepNamer {
    per_transformation: AHashMap<String, usize>,
    taken: AHashSet<String>,
}

impl StepNamer {
    pub(crate) fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Picks the name for the next step of `transformation` without recording it.
    pub(crate) fn next_name(&self, transformation: &str) -> String {
        let existing = self
            .per_transformation
            .get(transformation)
            .copied()
            .unwrap_or(0);
        if existing == 0 && !self.is_taken(transformation) {
            return transformation.to_string();
        }

        // An explicitly named step may already hold `<transformation>_N`.
        let mut suffix = existing + 1;
        loop {
            let candidate = format!("{}_{}", transformation, suffix);
            if !self.is_taken(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }

    pub(crate) fn record(&mut self, name: &str, transformation: &str) {
        self.taken.insert(name.to_string());
        *self
            .per_transformation
            .entry(transformation.to_string())
            .or_insert(0) += 1;
    }
}

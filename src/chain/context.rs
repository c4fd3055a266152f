use super::step::StepNamer;
use super::{Chain, Condition, IterationSource};
use crate::error::DefinitionError;
use crate::reference::Reference;
use tracing::debug;

/// The single-slot scopes a builder call may run under.
///
/// Each slot is filled for the duration of exactly one `with_*` call and is
/// cleared on every exit path, including errors raised by the body.
#[derive(Debug, Clone, Default)]
pub(super) struct ActiveContexts {
    pub(super) condition: Option<Condition>,
    pub(super) iteration: Option<IterationSource>,
}

/// Builder state captured on entry to a `with_*` body.
struct Checkpoint {
    steps: usize,
    namer: StepNamer,
    params_defined: bool,
    output_defined: bool,
}

/// The special references available inside an iteration body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationScope {
    /// `foreach.item`: the current element.
    pub item: Reference,
    /// `foreach.index`: the current position.
    pub index: Reference,
}

impl IterationScope {
    fn new() -> Self {
        Self {
            item: Reference::foreach_item(),
            index: Reference::foreach_index(),
        }
    }
}

impl Chain {
    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            steps: self.steps.len(),
            namer: self.namer.clone(),
            params_defined: self.params_schema.is_some(),
            output_defined: self.output.is_some(),
        }
    }

    /// Discards everything a failed body added.
    fn rollback(&mut self, checkpoint: Checkpoint) {
        let discarded = self.steps.len().saturating_sub(checkpoint.steps);
        self.steps.truncate(checkpoint.steps);
        self.namer = checkpoint.namer;
        if !checkpoint.params_defined {
            self.params_schema = None;
        }
        if !checkpoint.output_defined {
            self.output = None;
        }
        debug!(discarded, "rolled back failed context body");
    }

    /// Runs `body` with `condition` attached to every step it adds.
    ///
    /// Conditions do not nest: calling this again from inside `body` fails
    /// with [`DefinitionError::ConditionAlreadyActive`]. If `body` fails,
    /// every step it added is discarded.
    pub fn with_condition<T, F>(
        &mut self,
        condition: impl Into<Condition>,
        body: F,
    ) -> Result<T, DefinitionError>
    where
        F: FnOnce(&mut Chain) -> Result<T, DefinitionError>,
    {
        if self.contexts.condition.is_some() {
            return Err(DefinitionError::ConditionAlreadyActive);
        }

        let condition = condition.into();
        debug!(%condition, "entering conditional context");
        let checkpoint = self.checkpoint();
        self.contexts.condition = Some(condition);
        let result = body(self);
        self.contexts.condition = None;
        debug!("left conditional context");

        if result.is_err() {
            self.rollback(checkpoint);
        }
        result
    }

    /// Runs a single step once per element of `source`.
    ///
    /// `body` receives the `foreach.item`/`foreach.index` references and must
    /// add exactly one step. Returns `steps.<name>.results`, the per-item
    /// result array of that step. On any failure the chain is left as it was
    /// before the call.
    pub fn with_iteration<T, F>(
        &mut self,
        source: impl Into<IterationSource>,
        body: F,
    ) -> Result<Reference, DefinitionError>
    where
        F: FnOnce(&mut Chain, IterationScope) -> Result<T, DefinitionError>,
    {
        if self.contexts.iteration.is_some() {
            return Err(DefinitionError::IterationAlreadyActive);
        }

        let source = source.into();
        debug!(%source, "entering iteration context");
        let checkpoint = self.checkpoint();
        let steps_before = checkpoint.steps;
        self.contexts.iteration = Some(source);
        let result = body(self, IterationScope::new());
        self.contexts.iteration = None;
        debug!("left iteration context");

        if let Err(e) = result {
            self.rollback(checkpoint);
            return Err(e);
        }
        let added = self.steps.len() - steps_before;
        if added != 1 {
            self.rollback(checkpoint);
            return Err(DefinitionError::IterationStepCount { added });
        }

        match self.steps.last() {
            Some(step) => Ok(Reference::step_results(&step.name)),
            None => Err(DefinitionError::IterationStepCount { added: 0 }),
        }
    }
}

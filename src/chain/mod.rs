//! The step graph builder.
//!
//! A [`Chain`] accumulates a parameter schema, an ordered list of steps and an
//! optional output mapping. Builder calls return [`Reference`]s to values that
//! will only exist once the chain runs remotely; those references are threaded
//! into later steps' parameters and compiled into `{{path}}` templates.
//!
//! Lifecycle: params are defined once, steps are appended (optionally inside a
//! conditional or iteration context), the output is defined at most once, and
//! [`Chain::compile`] can then be called any number of times.

use crate::compiler::{self, CompiledChain};
use crate::error::{DefinitionError, SerializationError};
use crate::reference::Reference;
use crate::schema::ParamsSchema;
use crate::value::{Param, ParamMap};
use tracing::debug;

mod builder;
mod code;
mod context;
mod output;
mod step;

pub use builder::ChainBuilder;
pub use code::CODE_TRANSFORMATION;
pub use context::IterationScope;
pub use output::{IntoChainOutput, Output};
pub use step::{Condition, IterationSource, Step};

use context::ActiveContexts;
use step::StepNamer;

/// The `studio_id` emitted for chains that were never given an id.
pub const LOCAL_DEV_CHAIN_ID: &str = "LOCAL_DEV_CHAIN";

/// A chain graph under construction.
///
/// Not safe to drive from several logical flows at once: the conditional and
/// iteration contexts are single slots, not stacks.
#[derive(Debug, Clone, Default)]
pub struct Chain {
    chain_id: Option<String>,
    title: String,
    description: String,
    publicly_triggerable: bool,
    public: bool,
    params_schema: Option<ParamsSchema>,
    steps: Vec<Step>,
    output: Option<Output>,
    namer: StepNamer,
    contexts: ActiveContexts,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ChainBuilder {
        ChainBuilder::new()
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = description.to_string();
    }

    /// Anyone holding the chain id may trigger a publicly triggerable chain.
    pub fn set_publicly_triggerable(&mut self, value: bool) {
        self.publicly_triggerable = value;
    }

    /// Public chains are listed, with all their steps, in the template gallery.
    pub fn set_public(&mut self, value: bool) {
        self.public = value;
    }

    pub fn set_chain_id(&mut self, chain_id: &str) {
        self.chain_id = Some(chain_id.to_string());
    }

    pub fn chain_id(&self) -> Option<&str> {
        self.chain_id.as_deref()
    }

    /// The id sent on the wire, falling back to [`LOCAL_DEV_CHAIN_ID`].
    pub fn studio_id(&self) -> &str {
        self.chain_id.as_deref().unwrap_or(LOCAL_DEV_CHAIN_ID)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_publicly_triggerable(&self) -> bool {
        self.publicly_triggerable
    }

    pub fn is_public(&self) -> bool {
        self.public
    }

    pub fn params_schema(&self) -> Option<&ParamsSchema> {
        self.params_schema.as_ref()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step(&self, name: &str) -> Option<&Step> {
        self.steps.iter().find(|step| step.name == name)
    }

    pub fn output(&self) -> Option<&Output> {
        self.output.as_ref()
    }

    /// Registers the parameter schema and returns the `params` root reference.
    pub fn define_params(&mut self, schema: ParamsSchema) -> Result<Reference, DefinitionError> {
        if self.params_schema.is_some() {
            return Err(DefinitionError::ParamsAlreadyDefined);
        }
        debug!(count = schema.len(), "defining chain params");
        self.params_schema = Some(schema);
        Ok(Reference::params())
    }

    /// Appends a step, naming it after its transformation.
    ///
    /// The returned reference points at the step's output, or at its per-item
    /// results when the step is added inside [`Chain::with_iteration`].
    pub fn add_step(
        &mut self,
        transformation: &str,
        params: ParamMap,
    ) -> Result<Reference, DefinitionError> {
        let name = self.namer.next_name(transformation);
        self.push_step(name, transformation, params)
    }

    /// Appends a step under a caller-chosen name.
    pub fn add_named_step(
        &mut self,
        name: &str,
        transformation: &str,
        params: ParamMap,
    ) -> Result<Reference, DefinitionError> {
        if self.namer.is_taken(name) {
            return Err(DefinitionError::DuplicateStepName {
                name: name.to_string(),
            });
        }
        self.push_step(name.to_string(), transformation, params)
    }

    fn push_step(
        &mut self,
        name: String,
        transformation: &str,
        params: ParamMap,
    ) -> Result<Reference, DefinitionError> {
        let step = Step {
            name,
            transformation: transformation.to_string(),
            params,
            condition: self.contexts.condition.clone(),
            foreach: self.contexts.iteration.clone(),
        };
        debug!(
            step = %step.name,
            transformation = %step.transformation,
            conditional = step.condition.is_some(),
            iterated = step.foreach.is_some(),
            "adding step"
        );

        if step.foreach.is_none() {
            let condition = match &step.condition {
                Some(Condition::Ref(reference)) => Some(reference),
                _ => None,
            };
            let stray = step
                .params
                .values()
                .flat_map(Param::references)
                .chain(condition)
                .find(|reference| reference.root().is_iteration_scoped());
            if let Some(reference) = stray {
                return Err(DefinitionError::IterationReferenceOutsideIteration {
                    step: step.name.clone(),
                    path: reference.to_plain_path(),
                });
            }
        }

        self.namer.record(&step.name, &step.transformation);
        let reference = step.result_reference();
        self.steps.push(step);
        Ok(reference)
    }

    /// Registers the terminal output mapping.
    pub fn define_output(&mut self, output: impl Into<Output>) -> Result<(), DefinitionError> {
        if self.output.is_some() {
            return Err(DefinitionError::OutputAlreadyDefined);
        }
        debug!("defining chain output");
        self.output = Some(output.into());
        Ok(())
    }

    /// Compiles the chain into its wire format without mutating it.
    pub fn compile(&self) -> Result<CompiledChain, SerializationError> {
        compiler::compile(self)
    }
}

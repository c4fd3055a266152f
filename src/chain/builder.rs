use super::{Chain, IntoChainOutput};
use crate::error::DefinitionError;
use crate::reference::Reference;
use crate::schema::{ParamSchema, ParamsSchema};
use tracing::debug;

/// Fluent entry point for defining a whole chain in one expression.
///
/// ```
/// use stepchain::prelude::*;
///
/// let chain = Chain::builder()
///     .title("Summarise a PDF")
///     .param("pdf_url", ParamSchema::string())
///     .define(|chain, params| {
///         let text = chain.add_step("pdf_to_text", params! { "pdf_url" => params.field("pdf_url") })?;
///         let summary = chain.add_step("prompt_completion", params! {
///             "prompt" => format!("Summarise:\n{}", text.field("text").to_template_string()),
///         })?;
///         Ok(Output::mapping([("summary", summary.field("answer"))]))
///     })?;
///
/// assert_eq!(chain.steps().len(), 2);
/// # Ok::<(), stepchain::error::DefinitionError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ChainBuilder {
    chain_id: Option<String>,
    title: Option<String>,
    description: Option<String>,
    publicly_triggerable: bool,
    public: bool,
    params: ParamsSchema,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chain_id(mut self, chain_id: &str) -> Self {
        self.chain_id = Some(chain_id.to_string());
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn publicly_triggerable(mut self, value: bool) -> Self {
        self.publicly_triggerable = value;
        self
    }

    pub fn public(mut self, value: bool) -> Self {
        self.public = value;
        self
    }

    /// Declares one input parameter. Later declarations of the same name win.
    pub fn param(mut self, name: &str, schema: ParamSchema) -> Self {
        self.params.insert(name.to_string(), schema);
        self
    }

    /// Merges a whole schema into the declared parameters.
    pub fn params(mut self, schema: ParamsSchema) -> Self {
        self.params.extend(schema);
        self
    }

    /// Produces a chain with its metadata and params set and no steps yet,
    /// together with the `params` root reference.
    pub fn build(self) -> (Chain, Reference) {
        let mut chain = Chain::new();
        if let Some(chain_id) = &self.chain_id {
            chain.set_chain_id(chain_id);
        }
        if let Some(title) = &self.title {
            chain.set_title(title);
        }
        if let Some(description) = &self.description {
            chain.set_description(description);
        }
        chain.set_publicly_triggerable(self.publicly_triggerable);
        chain.set_public(self.public);
        chain.params_schema = Some(self.params);
        (chain, Reference::params())
    }

    /// Builds the chain and runs `setup` to add its steps.
    ///
    /// Whatever `setup` returns becomes the chain's output; returning `()` or
    /// `None` leaves the output to default to the last step's result. Any
    /// error aborts the definition and no chain is produced.
    pub fn define<O, F>(self, setup: F) -> Result<Chain, DefinitionError>
    where
        O: IntoChainOutput,
        F: FnOnce(&mut Chain, Reference) -> Result<O, DefinitionError>,
    {
        let (mut chain, params) = self.build();
        let output = setup(&mut chain, params)?;
        if let Some(output) = output.into_chain_output() {
            chain.define_output(output)?;
        }
        debug!(
            studio_id = chain.studio_id(),
            steps = chain.steps().len(),
            "chain defined"
        );
        Ok(chain)
    }
}

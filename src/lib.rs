//! # Stepchain - Declarative Transformation Pipelines
//!
//! **Stepchain** lets host code describe, in a fluent builder style, a directed
//! pipeline of named remote compute operations ("transformations") and compiles
//! that description into a declarative, serializable graph for a remote
//! execution engine.
//!
//! ## Core Workflow
//!
//! Nothing is executed locally. The builder only records what should happen:
//!
//! 1.  **Define Params**: Register the chain's input schema. You get back a
//!     [`Reference`](reference::Reference) rooted at `params`.
//! 2.  **Add Steps**: Each `add_step` call returns a reference to that step's
//!     future output. Feed those references into later steps' parameters,
//!     optionally inside a conditional (`with_condition`) or per-element
//!     (`with_iteration`) context.
//! 3.  **Define Output**: Map output keys to references (optional).
//! 4.  **Compile**: `compile()` deep-walks the chain and replaces every
//!     reference with its `{{path}}` template string. It is pure and can be
//!     called any number of times.
//!
//! ## Quick Start
//!
//! ```rust
//! use stepchain::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let chain = Chain::builder()
//!         .title("Ask questions about a short PDF")
//!         .param("pdf_url", ParamSchema::string())
//!         .param("question", ParamSchema::string())
//!         .define(|chain, params| {
//!             let pdf = chain.add_step("pdf_to_text", params! {
//!                 "pdf_url" => params.field("pdf_url"),
//!             })?;
//!             let split = chain.add_step("split_text", params! {
//!                 "method" => "tokens",
//!                 "num_tokens" => 500,
//!                 "text" => pdf.field("text"),
//!             })?;
//!             let prompt = format!(
//!                 "{}\n\nQuestion: {}",
//!                 split.field("chunks").to_template_string(),
//!                 params.field("question").to_template_string(),
//!             );
//!             let completion = chain.add_step("prompt_completion", params! { "prompt" => prompt })?;
//!             Ok(Output::mapping([("answer", completion.field("answer"))]))
//!         })?;
//!
//!     let compiled = chain.compile()?;
//!     assert_eq!(compiled.steps().len(), 3);
//!     assert_eq!(
//!         compiled.output()["answer"],
//!         "{{steps.prompt_completion.output.answer}}"
//!     );
//!     println!("{}", compiled.to_json_pretty()?);
//!     Ok(())
//! }
//! ```

pub mod chain;
pub mod client;
pub mod compiler;
pub mod display;
pub mod error;
pub mod prelude;
pub mod reference;
pub mod schema;
pub mod value;

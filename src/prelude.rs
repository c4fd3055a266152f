//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the
//! stepchain crate, plus the [`params!`](crate::params) macro.
//!
//! # Example
//!
//! ```rust
//! use stepchain::prelude::*;
//!
//! let mut chain = Chain::new();
//! let params = chain.define_params(ParamsSchema::new())?;
//! chain.add_step("echo", params! { "value" => params.field("value") })?;
//! assert_eq!(chain.compile()?.steps()[0].name, "echo");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Builder
pub use crate::chain::{
    Chain, ChainBuilder, Condition, IntoChainOutput, IterationScope, IterationSource, Output, Step,
};
pub use crate::params;

// References and values
pub use crate::reference::{Reference, ReferenceRoot};
pub use crate::schema::{ContentType, ParamSchema, ParamsSchema, SchemaMetadata};
pub use crate::value::{Param, ParamMap};

// Compiled output
pub use crate::compiler::{CompiledChain, CompiledStep};
pub use crate::display::DisplayChain;

// Execution contract
pub use crate::client::{ClientConfig, EnvLoader, ExecutionClient, RunChainRequest, RunChainResponse};

// Error types
pub use crate::error::{ConfigError, DefinitionError, ExecutionError, SerializationError};

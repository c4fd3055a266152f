use crate::client::{RunError, RunStatus};
use thiserror::Error;

/// Errors raised while a chain is being defined.
///
/// Every variant is a caller-side definition mistake. They are raised
/// synchronously by the builder call that broke the rule, and the chain being
/// built should be discarded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    #[error(
        "Params already defined. If you want to add more params, add them in the initial define_params call"
    )]
    ParamsAlreadyDefined,

    #[error(
        "Output already defined. If you want to add more output, add them in the initial define_output call"
    )]
    OutputAlreadyDefined,

    #[error("Nested conditions are not supported: a condition is already active")]
    ConditionAlreadyActive,

    #[error("Nested iterations are not supported: an iteration is already active")]
    IterationAlreadyActive,

    #[error("An iteration body must add exactly one step, but it added {added}")]
    IterationStepCount { added: usize },

    #[error("Step with name '{name}' already exists. Provide a different explicit name")]
    DuplicateStepName { name: String },

    #[error(
        "Step '{step}' uses '{path}', which only exists inside with_iteration"
    )]
    IterationReferenceOutsideIteration { step: String, path: String },

    #[error("Embedded code requires a non-empty function source")]
    EmptyCode,
}

/// Errors raised while compiling a chain into its wire format.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SerializationError {
    #[error("Value at '{path}' is not serializable: {value} is not a finite number")]
    NonFiniteNumber { path: String, value: f64 },

    #[error("Failed to encode compiled chain: {0}")]
    Json(String),
}

/// Errors relayed by an execution client.
///
/// The crate never produces remote failures itself; `Incomplete` carries the
/// engine's own error records unmodified.
#[derive(Error, Debug, Clone)]
pub enum ExecutionError {
    #[error(transparent)]
    Serialization(#[from] SerializationError),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("API error: {message}")]
    Api { message: String },

    #[error("Chain failed to complete successfully (status: {status})")]
    Incomplete {
        status: RunStatus,
        errors: Vec<RunError>,
    },
}

/// Errors raised while loading client configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid token: expected '<project>:<api_key>:<region>'")]
    InvalidToken,

    #[error("Environment variable '{name}' is not set")]
    MissingVar { name: String },

    #[error("Could not read env file '{path}': {message}")]
    Io { path: String, message: String },
}
